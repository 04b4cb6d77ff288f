//! Managers and data objects.
//!
//! A [`Manager`] is the nested object bound to one element. Before binding
//! it is a plain ordered field map; [`spread`](super::spread) turns every
//! field present at that moment into a reactive one. Fields added later are
//! stored plainly and never sync.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::diagnostics::{SharedDiagnostics, TracingDiagnostics, Warning};
use crate::error::{Error, Result};
use crate::reactive::{Accessor, ObserverSlot};
use crate::target::Event;
use crate::types::Value;

/// Pseudo-field routing a write to [`Manager::set_attrs`].
pub const SET_ATTRS: &str = "setAttrs";

// =============================================================================
// Handler
// =============================================================================

/// Event handler stored in an event field.
///
/// Called with the manager it belongs to and the event. Two handlers are
/// equal only if they are the same allocation.
#[derive(Clone)]
pub struct Handler(Rc<dyn Fn(&Manager, &Event)>);

impl Handler {
    pub fn new(handler: impl Fn(&Manager, &Event) + 'static) -> Self {
        Self(Rc::new(handler))
    }

    pub fn call(&self, manager: &Manager, event: &Event) {
        (self.0)(manager, event)
    }
}

impl PartialEq for Handler {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler(..)")
    }
}

// =============================================================================
// Manager
// =============================================================================

enum Field {
    Plain(Value),
    Reactive(Rc<dyn Accessor>),
}

struct ManagerInner {
    fields: RefCell<Vec<(String, Field)>>,
    observer: Rc<ObserverSlot>,
    diagnostics: RefCell<SharedDiagnostics>,
}

/// Shared handle to a manager object. Clones refer to the same fields.
#[derive(Clone)]
pub struct Manager(Rc<ManagerInner>);

/// Non-owning manager handle, held by listeners installed in the tree.
#[derive(Clone)]
pub struct WeakManager(Weak<ManagerInner>);

impl WeakManager {
    pub fn upgrade(&self) -> Option<Manager> {
        self.0.upgrade().map(Manager)
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}

impl Manager {
    pub fn new() -> Self {
        Self(Rc::new(ManagerInner {
            fields: RefCell::new(Vec::new()),
            observer: Rc::new(ObserverSlot::new()),
            diagnostics: RefCell::new(Rc::new(TracingDiagnostics)),
        }))
    }

    /// Builder form of [`set`](Self::set) for unbound managers.
    pub fn with(self, name: &str, value: impl Into<Value>) -> Self {
        self.insert_plain(name, value.into());
        self
    }

    pub fn downgrade(&self) -> WeakManager {
        WeakManager(Rc::downgrade(&self.0))
    }

    /// Whether both handles point at the same manager.
    pub fn ptr_eq(&self, other: &Manager) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    // -------------------------------------------------------------------------
    // Field access
    // -------------------------------------------------------------------------

    /// Read a field. Unknown names read as `Null`.
    pub fn get(&self, name: &str) -> Value {
        let accessor = {
            let fields = self.0.fields.borrow();
            match fields.iter().find(|(field, _)| field == name) {
                Some((_, Field::Plain(value))) => return value.clone(),
                Some((_, Field::Reactive(accessor))) => accessor.clone(),
                None => return Value::Null,
            }
        };
        accessor.get()
    }

    /// Write a field.
    ///
    /// Reactive fields sync their element and notify the observer. Other
    /// names are stored as plain values (added if missing) without any sync.
    /// [`SET_ATTRS`] routes to [`set_attrs`](Self::set_attrs).
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        if name == SET_ATTRS {
            return self.set_attrs(value);
        }

        let accessor = {
            let fields = self.0.fields.borrow();
            fields.iter().find_map(|(field, slot)| match slot {
                Field::Reactive(accessor) if field == name => Some(accessor.clone()),
                _ => None,
            })
        };

        match accessor {
            Some(accessor) => accessor.set(self, value),
            None => {
                self.insert_plain(name, value);
                Ok(())
            }
        }
    }

    /// Bulk assignment. `props` must be a [`Value::Map`].
    ///
    /// Keys that are not own fields are skipped with a warning. Every other
    /// entry goes through [`set`](Self::set) on its own: one sync and one
    /// notification per entry. The first failing entry stops the rest.
    pub fn set_attrs(&self, props: Value) -> Result<()> {
        let Value::Map(entries) = props else {
            return Err(Error::InvalidBulkValue {
                found: props.type_name(),
            });
        };

        for (name, value) in entries {
            if !self.has_field(&name) {
                self.diagnostics().warn(Warning::UnexpectedProperty { name });
                continue;
            }
            self.set(&name, value)?;
        }
        Ok(())
    }

    /// Subscribe to every reactive write. Only the first call succeeds.
    ///
    /// The slot is never cleared, so a callback holding a strong clone of
    /// this manager keeps both alive forever. Capture [`downgrade`](Self::downgrade)
    /// instead when the callback writes back.
    pub fn observe(&self, callback: impl Fn(&str, &Value) + 'static) -> bool {
        self.0.observer.register(Rc::new(callback))
    }

    pub fn is_observed(&self) -> bool {
        self.0.observer.is_occupied()
    }

    // -------------------------------------------------------------------------
    // Introspection
    // -------------------------------------------------------------------------

    pub fn has_field(&self, name: &str) -> bool {
        self.0.fields.borrow().iter().any(|(field, _)| field == name)
    }

    /// Whether `name` has an accessor installed.
    pub fn is_reactive(&self, name: &str) -> bool {
        self.0
            .fields
            .borrow()
            .iter()
            .any(|(field, slot)| field == name && matches!(slot, Field::Reactive(_)))
    }

    /// Field names in insertion order.
    pub fn field_names(&self) -> Vec<String> {
        self.0
            .fields
            .borrow()
            .iter()
            .map(|(field, _)| field.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.fields.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.fields.borrow().is_empty()
    }

    // -------------------------------------------------------------------------
    // Crate internals used by spread()
    // -------------------------------------------------------------------------

    /// Current `(name, value)` pairs, read without side effects.
    pub(crate) fn snapshot(&self) -> Vec<(String, Value)> {
        self.0
            .fields
            .borrow()
            .iter()
            .map(|(field, slot)| {
                let value = match slot {
                    Field::Plain(value) => value.clone(),
                    Field::Reactive(accessor) => accessor.snapshot(),
                };
                (field.clone(), value)
            })
            .collect()
    }

    pub(crate) fn install(&self, name: &str, accessor: Rc<dyn Accessor>) {
        let mut fields = self.0.fields.borrow_mut();
        match fields.iter_mut().find(|(field, _)| field == name) {
            Some((_, slot)) => *slot = Field::Reactive(accessor),
            None => fields.push((name.to_string(), Field::Reactive(accessor))),
        }
    }

    pub(crate) fn observer_slot(&self) -> Rc<ObserverSlot> {
        self.0.observer.clone()
    }

    pub(crate) fn diagnostics(&self) -> SharedDiagnostics {
        self.0.diagnostics.borrow().clone()
    }

    pub(crate) fn set_diagnostics(&self, diagnostics: SharedDiagnostics) {
        *self.0.diagnostics.borrow_mut() = diagnostics;
    }

    fn insert_plain(&self, name: &str, value: Value) {
        let mut fields = self.0.fields.borrow_mut();
        match fields.iter_mut().find(|(field, _)| field == name) {
            Some((_, slot)) => *slot = Field::Plain(value),
            None => fields.push((name.to_string(), Field::Plain(value))),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Manager {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let manager = Manager::new();
        for (name, value) in iter {
            let name: String = name.into();
            manager.insert_plain(&name, value.into());
        }
        manager
    }
}

impl fmt::Debug for Manager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager")
            .field("fields", &self.field_names())
            .field("observed", &self.is_observed())
            .finish()
    }
}

// =============================================================================
// DataObject
// =============================================================================

/// Named managers, resolved by `{...name}` markers. Insertion ordered.
#[derive(Clone, Debug, Default)]
pub struct DataObject {
    managers: Vec<(String, Manager)>,
}

impl DataObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, manager: Manager) -> Self {
        self.insert(name, manager);
        self
    }

    /// Add or replace the manager under `name`.
    pub fn insert(&mut self, name: &str, manager: Manager) {
        match self.managers.iter_mut().find(|(existing, _)| existing == name) {
            Some((_, slot)) => *slot = manager,
            None => self.managers.push((name.to_string(), manager)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Manager> {
        self.managers
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, manager)| manager)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.managers.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.managers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.managers.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Manager)> for DataObject {
    fn from_iter<I: IntoIterator<Item = (K, Manager)>>(iter: I) -> Self {
        let mut data = DataObject::new();
        for (name, manager) in iter {
            let name: String = name.into();
            data.insert(&name, manager);
        }
        data
    }
}

// =============================================================================
// Tests
// =============================================================================
