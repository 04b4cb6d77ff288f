//! Conditional Rendering Engine - Attach, detach and swap marked elements.
//!
//! Elements carrying a presence marker (`_if="key"`) are shown while the
//! condition `key` is truthy. An element directly following it with an
//! absence marker (`_else`) is shown in its place while the key is falsy.
//!
//! ```text
//! <div id="app">                     cond { open: false }
//!   <p _if="open">Details</p>   ──►   <div id="app">
//!   <p _else>Closed</p>                 <p>Closed</p>
//! </div>                              </div>
//! ```
//!
//! # Lifecycle
//!
//! 1. [`scan`] walks the root once, read only, and builds an immutable list
//!    of [`ConditionalRenderSetting`]s. A marker conflict aborts here, before
//!    anything in the tree has changed.
//! 2. The consumed markers are stripped and the model is wrapped in a
//!    [`ReactiveCondition`].
//! 3. [`reconcile`] runs once (initial render) and again, synchronously,
//!    after every accepted write.
//!
//! Reconciliation is positional: each setting remembers the element index it
//! had at scan time and is never re-indexed, so unrelated structural changes
//! in the same container shift where elements are re-inserted.

mod condition;
mod markers;
mod reconcile;
mod scan;

pub use condition::*;
pub use markers::*;
pub use reconcile::*;
pub use scan::*;
