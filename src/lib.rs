//! # spark-dom
//!
//! Reactive attribute binding and conditional rendering for DOM-like trees.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for
//! fine-grained reactivity.
//!
//! ## Architecture
//!
//! Two independent engines share one shape: intercept a write, reconcile an
//! external tree, optionally notify a subscriber.
//!
//! ```text
//! tree ──► scan ──► model ──► reactive object
//!                                   │ write
//!                                   ▼
//!                   sync / reconcile ──► tree ──► observer
//! ```
//!
//! Everything is single threaded and synchronous. N writes produce N syncs
//! (or N reconciliation passes) and N notifications; nothing is batched.
//!
//! ## Modules
//!
//! - [`types`] - The dynamic [`Value`] carried by fields and conditions
//! - [`target`] - The [`Document`] capability set and its implementations
//! - [`bind`] - Attribute binding engine (`{...name}` markers)
//! - [`render_if`] - Conditional rendering engine (`_if` / `_else` markers)
//! - [`reactive`] - Accessors and observer slots shared by both engines
//! - [`diagnostics`] - Non-fatal warnings
//! - [`error`] - Fatal errors
//!
//! ## Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use spark_dom::*;
//!
//! let document = Rc::new(MemoryDocument::new());
//! let app = document.element(document.body(), "div", &[("id", "app")]);
//! document.element(app, "button", &[("{...submit}", "")]);
//! document.element(app, "p", &[("_if", "open")]);
//!
//! let data = bind(&document, "app", DataObject::new().with(
//!     "submit",
//!     Manager::new().with("class", "btn"),
//! ))?;
//! data.get("submit").unwrap().set("class", "btn active")?;
//!
//! let cond = setup(&document, "app", ConditionModel::new().with("open", false))?;
//! cond.set("open", true);
//! ```

pub mod bind;
pub mod diagnostics;
pub mod error;
pub mod reactive;
pub mod render_if;
pub mod target;
pub mod types;

// Re-export commonly used items
pub use types::Value;

pub use error::{Error, Result};

pub use diagnostics::{
    CollectingDiagnostics, Diagnostics, SharedDiagnostics, TracingDiagnostics, Warning,
};

pub use target::{Document, Event, Listener, MemoryDocument, NodeId};
#[cfg(feature = "web")]
pub use target::WebDocument;

pub use reactive::{Accessor, KeyedObservers, ObserverHandle, ObserverSlot};

pub use bind::{
    bind, classify, spread, to_attrs, DataObject, FieldKind, Handler, Manager, ToAttrs,
    SET_ATTRS,
};

pub use render_if::{
    reconcile, render_if, scan, setup, ConditionModel, ConditionalRenderSetting,
    ReactiveCondition, RenderIf, WeakCondition, ABSENCE_ATTR, PRESENCE_ATTR,
};
