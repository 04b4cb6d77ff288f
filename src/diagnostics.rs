//! Non-fatal diagnostics.
//!
//! Both engines report recoverable problems through a [`Diagnostics`] sink and
//! carry on with the offending item skipped. The default sink,
//! [`TracingDiagnostics`], turns every warning into a `tracing` event;
//! [`CollectingDiagnostics`] keeps them for later inspection.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

// =============================================================================
// Warning
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A `{...name}` marker names a manager missing from the data object.
    UnresolvedManager { name: String },
    /// A bulk assignment key is not an own field of the manager.
    UnexpectedProperty { name: String },
    /// An event field was read back.
    CannotReadEvent { name: String },
    /// Presence/absence markers are misused. Setup aborts after this.
    MarkerConflict { reason: String },
    /// `observe` was called for a key the condition model does not have.
    UnknownConditionKey { key: String },
    /// `observe` was called for a key that already has a subscriber.
    ObserverAlreadyRegistered { key: String },
}

impl Warning {
    /// Short stable identifier, used as the `kind` field in log events.
    pub fn kind(&self) -> &'static str {
        match self {
            Warning::UnresolvedManager { .. } => "unresolved_manager",
            Warning::UnexpectedProperty { .. } => "unexpected_property",
            Warning::CannotReadEvent { .. } => "cannot_read_event",
            Warning::MarkerConflict { .. } => "marker_conflict",
            Warning::UnknownConditionKey { .. } => "unknown_condition_key",
            Warning::ObserverAlreadyRegistered { .. } => "observer_already_registered",
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnresolvedManager { name } => write!(
                f,
                "found an attribute manager named \"{name}\", but it is not defined in the data object"
            ),
            Warning::UnexpectedProperty { name } => {
                write!(f, "the \"{name}\" property was not defined in the manager object")
            }
            Warning::CannotReadEvent { name } => {
                write!(f, "\"{name}\" is an event, its value cannot be read")
            }
            Warning::MarkerConflict { reason } => f.write_str(reason),
            Warning::UnknownConditionKey { key } => {
                write!(f, "\"{key}\" is not a conditional property")
            }
            Warning::ObserverAlreadyRegistered { key } => {
                write!(f, "\"{key}\" is already being observed")
            }
        }
    }
}

// =============================================================================
// Sinks
// =============================================================================

/// Receiver for non-fatal warnings.
pub trait Diagnostics {
    fn warn(&self, warning: Warning);
}

/// Shared handle to a diagnostics sink.
pub type SharedDiagnostics = Rc<dyn Diagnostics>;

/// Logs each warning through `tracing` at WARN level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn warn(&self, warning: Warning) {
        tracing::warn!(kind = warning.kind(), "{warning}");
    }
}

/// Records warnings in order. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct CollectingDiagnostics {
    warnings: Rc<RefCell<Vec<Warning>>>,
}

impl CollectingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every warning received so far.
    pub fn warnings(&self) -> Vec<Warning> {
        self.warnings.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.warnings.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.warnings.borrow_mut().clear();
    }
}

impl Diagnostics for CollectingDiagnostics {
    fn warn(&self, warning: Warning) {
        tracing::debug!(kind = warning.kind(), "collected warning: {warning}");
        self.warnings.borrow_mut().push(warning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_diagnostics_shares_buffer() {
        let sink = CollectingDiagnostics::new();
        let shared: SharedDiagnostics = Rc::new(sink.clone());

        shared.warn(Warning::UnexpectedProperty { name: "foo".into() });
        shared.warn(Warning::CannotReadEvent { name: "onclick".into() });

        assert_eq!(sink.len(), 2, "clones should see the same warnings");
        assert_eq!(sink.warnings()[1].kind(), "cannot_read_event");

        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_warning_messages_name_the_item() {
        let w = Warning::UnresolvedManager { name: "btn".into() };
        assert!(w.to_string().contains("\"btn\""));
    }
}
