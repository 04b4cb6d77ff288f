//! Observer slots.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::types::Value;

// =============================================================================
// Single slot
// =============================================================================

/// Callback notified with `(field_name, new_value)` after a reactive write.
pub type FieldObserver = Rc<dyn Fn(&str, &Value)>;

/// Holds at most one subscriber. The first registration wins; there is no
/// replacement and no unsubscribe.
#[derive(Default)]
pub struct ObserverSlot {
    callback: RefCell<Option<FieldObserver>>,
}

impl ObserverSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `callback` if the slot is empty. Returns whether it was stored.
    pub fn register(&self, callback: FieldObserver) -> bool {
        let mut slot = self.callback.borrow_mut();
        if slot.is_some() {
            return false;
        }
        *slot = Some(callback);
        true
    }

    pub fn is_occupied(&self) -> bool {
        self.callback.borrow().is_some()
    }

    pub fn notify(&self, name: &str, value: &Value) {
        // Clone out first so the callback may write back into its owner
        let callback = self.callback.borrow().clone();
        if let Some(callback) = callback {
            callback(name, value);
        }
    }
}

impl fmt::Debug for ObserverSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverSlot")
            .field("occupied", &self.is_occupied())
            .finish()
    }
}

// =============================================================================
// Keyed slots
// =============================================================================

/// Callback notified after an accepted condition write.
pub type ConditionObserver = Rc<dyn Fn(&ObserverHandle, &Value)>;

type Registry = RefCell<HashMap<String, ConditionObserver>>;

/// Capability handed to a keyed observer while it runs.
pub struct ObserverHandle {
    key: String,
    registry: Weak<Registry>,
}

impl ObserverHandle {
    /// The key this subscription is attached to.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Remove this key's subscription. Later writes no longer notify.
    pub fn stop_observing(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().remove(&self.key);
        }
    }
}

/// At most one subscriber per key.
#[derive(Default)]
pub struct KeyedObservers {
    registry: Rc<Registry>,
}

impl KeyedObservers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.registry.borrow().contains_key(key)
    }

    /// Store `callback` under `key` unless one is already there.
    pub fn register(&self, key: &str, callback: ConditionObserver) -> bool {
        let mut registry = self.registry.borrow_mut();
        if registry.contains_key(key) {
            return false;
        }
        registry.insert(key.to_string(), callback);
        true
    }

    pub fn remove(&self, key: &str) -> bool {
        self.registry.borrow_mut().remove(key).is_some()
    }

    pub fn notify(&self, key: &str, value: &Value) {
        let callback = self.registry.borrow().get(key).cloned();
        let Some(callback) = callback else { return };

        let handle = ObserverHandle {
            key: key.to_string(),
            registry: Rc::downgrade(&self.registry),
        };
        callback(&handle, value);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_slot_first_subscriber_wins() {
        let slot = ObserverSlot::new();
        let first = Rc::new(Cell::new(0));
        let second = Rc::new(Cell::new(0));
        let first_clone = first.clone();
        let second_clone = second.clone();

        assert!(slot.register(Rc::new(move |_: &str, _: &Value| first_clone.set(first_clone.get() + 1))));
        assert!(!slot.register(Rc::new(move |_: &str, _: &Value| second_clone.set(second_clone.get() + 1))));

        slot.notify("title", &Value::from("x"));
        assert_eq!(first.get(), 1);
        assert_eq!(second.get(), 0, "rejected subscriber must never run");
    }

    #[test]
    fn test_empty_slot_notify_is_noop() {
        let slot = ObserverSlot::new();
        slot.notify("title", &Value::Null);
        assert!(!slot.is_occupied());
    }

    #[test]
    fn test_keyed_stop_observing_from_callback() {
        let observers = KeyedObservers::new();
        let calls = Rc::new(Cell::new(0));
        let calls_clone = calls.clone();

        observers.register(
            "open",
            Rc::new(move |handle: &ObserverHandle, _value: &Value| {
                calls_clone.set(calls_clone.get() + 1);
                assert_eq!(handle.key(), "open");
                handle.stop_observing();
            }),
        );

        observers.notify("open", &Value::Bool(true));
        observers.notify("open", &Value::Bool(false));

        assert_eq!(calls.get(), 1, "callback revoked itself after the first call");
        assert!(!observers.contains("open"));
    }

    #[test]
    fn test_keyed_register_rejects_duplicates() {
        let observers = KeyedObservers::new();
        assert!(observers.register("a", Rc::new(|_: &ObserverHandle, _: &Value| {})));
        assert!(!observers.register("a", Rc::new(|_: &ObserverHandle, _: &Value| {})));
        assert!(observers.register("b", Rc::new(|_: &ObserverHandle, _: &Value| {})));
        assert!(observers.remove("a"));
        assert!(!observers.remove("a"));
    }
}
