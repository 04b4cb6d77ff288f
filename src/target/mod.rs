//! Rendering Target - The tree both engines synchronize against.
//!
//! The engines never depend on a concrete tree, only on the [`Document`]
//! capability set:
//! - lookup by id
//! - attribute get/set/remove and live element properties
//! - event handler assignment
//! - descendant, child and sibling enumeration in document order
//! - node-kind test (element vs. anything else)
//! - insert-before / replace-child / remove-child / append-child
//!
//! Node identity is plain equality on [`Document::Node`] handles.
//!
//! Two implementations ship with the crate:
//! - [`MemoryDocument`] - arena-backed, used by the tests and headless hosts
//! - `WebDocument` - `web-sys` adapter, behind the `web` feature

mod memory;
#[cfg(feature = "web")]
mod web;

pub use memory::*;
#[cfg(feature = "web")]
pub use web::*;

use std::fmt::Debug;
use std::rc::Rc;

use crate::types::Value;

// =============================================================================
// Events
// =============================================================================

/// An event delivered to a listener installed on an element.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    /// Event type without the `on` prefix (`"click"`, `"input"`, ...).
    pub kind: String,
    /// Optional payload supplied by the host.
    pub detail: Value,
}

impl Event {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            detail: Value::Null,
        }
    }

    pub fn with_detail(kind: impl Into<String>, detail: impl Into<Value>) -> Self {
        Self {
            kind: kind.into(),
            detail: detail.into(),
        }
    }
}

/// Listener installed on an element's event-handler property.
pub type Listener = Rc<dyn Fn(&Event)>;

// =============================================================================
// Document
// =============================================================================

/// The rendering-target capability set.
///
/// Every method takes `&self`: the tree is shared by the reactive objects
/// that keep writing into it, so implementations use interior mutability.
/// Methods that receive an element where a non-element node is passed are
/// expected to do nothing (and return empty/`None`).
pub trait Document {
    /// Handle to a node. Equality is node identity.
    type Node: Clone + PartialEq + Debug;

    fn get_element_by_id(&self, id: &str) -> Option<Self::Node>;

    fn is_element(&self, node: &Self::Node) -> bool;

    // -------------------------------------------------------------------------
    // Attributes and properties
    // -------------------------------------------------------------------------

    /// Attribute names in the element's attribute order.
    fn attribute_names(&self, element: &Self::Node) -> Vec<String>;

    fn has_attribute(&self, element: &Self::Node, name: &str) -> bool;

    fn get_attribute(&self, element: &Self::Node, name: &str) -> Option<String>;

    fn set_attribute(&self, element: &Self::Node, name: &str, value: &str);

    fn remove_attribute(&self, element: &Self::Node, name: &str);

    /// Live element property (`value`, `checked`, `currentTime`, ...).
    fn property(&self, element: &Self::Node, name: &str) -> Value;

    fn set_property(&self, element: &Self::Node, name: &str, value: Value);

    /// Assign (or clear, with `None`) the handler property `name`, e.g. `onclick`.
    fn set_event_listener(&self, element: &Self::Node, name: &str, listener: Option<Listener>);

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    /// Every descendant element, in document order.
    fn descendants(&self, node: &Self::Node) -> Vec<Self::Node>;

    /// Element children only.
    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

    /// All child nodes, elements and otherwise.
    fn child_nodes(&self, node: &Self::Node) -> Vec<Self::Node>;

    fn has_child_nodes(&self, node: &Self::Node) -> bool {
        !self.child_nodes(node).is_empty()
    }

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    fn next_element_sibling(&self, node: &Self::Node) -> Option<Self::Node>;

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    /// Insert `node` into `parent` right before `reference`, moving it if attached elsewhere.
    fn insert_before(&self, parent: &Self::Node, node: &Self::Node, reference: &Self::Node);

    /// Put `node` where `old` is in `parent`; `old` is detached.
    fn replace_child(&self, parent: &Self::Node, node: &Self::Node, old: &Self::Node);

    fn remove_child(&self, parent: &Self::Node, child: &Self::Node);

    fn append_child(&self, parent: &Self::Node, child: &Self::Node);
}
