//! Field accessors and element synchronization.

use std::rc::Rc;

use spark_signals::{signal, Signal};

use super::{FieldKind, Manager};
use crate::diagnostics::{SharedDiagnostics, Warning};
use crate::error::{Error, Result};
use crate::reactive::{Accessor, ObserverSlot};
use crate::target::{Document, Event, Listener};
use crate::types::Value;

/// Falsy sentinel returned when an event field is read.
pub const EVENT_READ_SENTINEL: Value = Value::Bool(false);

// =============================================================================
// Synchronization
// =============================================================================

/// Push `value` for field `name` onto `element`.
///
/// Validation happens before any tree mutation, so an `Err` leaves the
/// element untouched.
pub fn sync_field<D: Document>(
    document: &D,
    element: &D::Node,
    name: &str,
    kind: FieldKind,
    value: &Value,
    owner: &Manager,
) -> Result<()> {
    match kind {
        FieldKind::Special => {
            let value = if value.is_null() {
                Value::Text(String::new())
            } else {
                value.clone()
            };
            document.set_property(element, name, value);
        }
        FieldKind::Event => {
            let listener = listener_for(name, value, owner)?;
            document.set_event_listener(element, name, listener);
        }
        FieldKind::Plain => {
            if value.is_null() {
                if document.has_attribute(element, name) {
                    document.remove_attribute(element, name);
                }
            } else {
                // Written on every assignment, unchanged values included
                document.set_attribute(element, name, &value.to_string());
            }
        }
    }
    Ok(())
}

/// Wrap a handler value so the tree can call it with its owning manager.
fn listener_for(name: &str, value: &Value, owner: &Manager) -> Result<Option<Listener>> {
    match value {
        Value::Null => Ok(None),
        Value::Handler(handler) => {
            let handler = handler.clone();
            let owner = owner.downgrade();
            let listener: Listener = Rc::new(move |event: &Event| {
                if let Some(manager) = owner.upgrade() {
                    handler.call(&manager, event);
                }
            });
            Ok(Some(listener))
        }
        other => Err(Error::InvalidEventHandler {
            event: name.to_string(),
            found: other.type_name(),
        }),
    }
}

// =============================================================================
// FieldAccessor
// =============================================================================

/// Reactive accessor for one manager field bound to one element.
///
/// The shadow value lives in a signal, so reading a plain field inside a
/// `spark_signals::effect` subscribes the effect to later writes.
pub struct FieldAccessor<D: Document> {
    document: Rc<D>,
    element: D::Node,
    name: String,
    kind: FieldKind,
    shadow: Signal<Value>,
    observer: Rc<ObserverSlot>,
    diagnostics: SharedDiagnostics,
}

impl<D: Document> FieldAccessor<D> {
    pub fn new(
        document: Rc<D>,
        element: D::Node,
        name: &str,
        kind: FieldKind,
        initial: Value,
        observer: Rc<ObserverSlot>,
        diagnostics: SharedDiagnostics,
    ) -> Self {
        Self {
            document,
            element,
            name: name.to_string(),
            kind,
            shadow: signal(initial),
            observer,
            diagnostics,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn element(&self) -> &D::Node {
        &self.element
    }
}

impl<D: Document> Accessor for FieldAccessor<D> {
    fn get(&self) -> Value {
        match self.kind {
            FieldKind::Special => self.document.property(&self.element, &self.name),
            FieldKind::Event => {
                self.diagnostics.warn(Warning::CannotReadEvent {
                    name: self.name.clone(),
                });
                EVENT_READ_SENTINEL
            }
            FieldKind::Plain => self.shadow.get(),
        }
    }

    fn set(&self, owner: &Manager, value: Value) -> Result<()> {
        sync_field(&*self.document, &self.element, &self.name, self.kind, &value, owner)?;
        self.shadow.set(value.clone());
        self.observer.notify(&self.name, &value);
        Ok(())
    }

    fn snapshot(&self) -> Value {
        self.shadow.get()
    }
}

// =============================================================================
// Tests
// =============================================================================
