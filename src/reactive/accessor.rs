//! Reactive accessor interface.

use crate::bind::Manager;
use crate::error::Result;
use crate::types::Value;

/// A get/set pair that performs side effects on write.
///
/// Installed by [`spread`](crate::bind::spread) for every field of a manager;
/// [`Manager::get`] and [`Manager::set`] dispatch through it.
pub trait Accessor {
    /// Read the field as the caller sees it. May emit diagnostics.
    fn get(&self) -> Value;

    /// Write the field. `owner` is the manager the accessor is installed on.
    ///
    /// On error nothing observable has changed: no tree mutation, no stored
    /// value update, no notification.
    fn set(&self, owner: &Manager, value: Value) -> Result<()>;

    /// Last value written, without side effects or diagnostics.
    fn snapshot(&self) -> Value;
}
