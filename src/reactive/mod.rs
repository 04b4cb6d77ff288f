//! Reactive plumbing shared by both engines.
//!
//! - [`Accessor`] - explicit get/set pair standing in for an intercepted property
//! - [`ObserverSlot`] - single-subscriber slot, first subscriber wins
//! - [`KeyedObservers`] - one subscriber per key, revocable from inside the callback
//!
//! None of these hold a `RefCell` borrow while a callback runs, so callbacks
//! are free to write back into the object that notified them.

mod accessor;
mod observer;

pub use accessor::*;
pub use observer::*;
