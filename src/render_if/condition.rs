//! The condition model, its reactive wrapper, and the `render_if` entry point.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::{reconcile, scan, ConditionalRenderSetting};
use crate::diagnostics::{Diagnostics, SharedDiagnostics, TracingDiagnostics, Warning};
use crate::error::{Error, Result};
use crate::reactive::{KeyedObservers, ObserverHandle};
use crate::target::Document;
use crate::types::Value;

// =============================================================================
// ConditionModel
// =============================================================================

/// Condition values keyed by the names used in `_if` markers.
///
/// The key set is fixed once the model is wrapped by [`render_if`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionModel {
    entries: Vec<(String, Value)>,
}

impl ConditionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Add or overwrite `key`.
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ConditionModel {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut model = ConditionModel::new();
        for (key, value) in iter {
            let key: String = key.into();
            model.insert(&key, value);
        }
        model
    }
}

// =============================================================================
// Options
// =============================================================================

/// Configuration for [`render_if`].
///
/// ```ignore
/// let cond = RenderIf::new(document.clone(), "app")
///     .diagnostics(CollectingDiagnostics::new())
///     .run(ConditionModel::new().with("open", false))?;
/// cond.set("open", true);
/// ```
pub struct RenderIf<D: Document> {
    document: Rc<D>,
    root: String,
    diagnostics: SharedDiagnostics,
}

impl<D: Document> RenderIf<D> {
    pub fn new(document: Rc<D>, root: impl Into<String>) -> Self {
        Self {
            document,
            root: root.into(),
            diagnostics: Rc::new(TracingDiagnostics),
        }
    }

    /// Route warnings to `sink` instead of `tracing`.
    pub fn diagnostics(mut self, sink: impl Diagnostics + 'static) -> Self {
        self.diagnostics = Rc::new(sink);
        self
    }

    pub fn shared_diagnostics(mut self, sink: SharedDiagnostics) -> Self {
        self.diagnostics = sink;
        self
    }

    pub fn run(self, model: ConditionModel) -> Result<ReactiveCondition<D>> {
        render_if(self, model)
    }
}

// =============================================================================
// Entry points
// =============================================================================

/// Shorthand for [`render_if`] with default diagnostics.
pub fn setup<D: Document>(
    document: &Rc<D>,
    root: &str,
    model: ConditionModel,
) -> Result<ReactiveCondition<D>> {
    render_if(RenderIf::new(document.clone(), root), model)
}

/// Scan the root for `_if`/`_else` markers and render the initial state.
///
/// Fails with [`Error::Lookup`] if the root id does not resolve. A marker
/// conflict is reported as [`Warning::MarkerConflict`] and then returned as
/// [`Error::MarkerConflict`]; in that case the tree is left exactly as it
/// was, markers included.
pub fn render_if<D: Document>(options: RenderIf<D>, model: ConditionModel) -> Result<ReactiveCondition<D>> {
    let RenderIf {
        document,
        root,
        diagnostics,
    } = options;

    let root_node = document
        .get_element_by_id(&root)
        .ok_or_else(|| Error::Lookup { id: root.clone() })?;

    let scanned = match scan(&*document, &root_node) {
        Ok(scanned) => scanned,
        Err(Error::MarkerConflict { reason }) => {
            diagnostics.warn(Warning::MarkerConflict {
                reason: reason.clone(),
            });
            return Err(Error::MarkerConflict { reason });
        }
        Err(err) => return Err(err),
    };
    scanned.strip_markers(&*document);

    tracing::debug!(
        root = %root,
        settings = scanned.settings.len(),
        keys = model.len(),
        "conditional rendering ready"
    );

    let condition = ReactiveCondition {
        inner: Rc::new(ConditionInner {
            document,
            settings: scanned.settings,
            model: RefCell::new(model.entries),
            observers: KeyedObservers::new(),
            diagnostics,
        }),
    };
    condition.reconcile();
    Ok(condition)
}

// =============================================================================
// ReactiveCondition
// =============================================================================

struct ConditionInner<D: Document> {
    document: Rc<D>,
    settings: Vec<ConditionalRenderSetting<D::Node>>,
    model: RefCell<Vec<(String, Value)>>,
    observers: KeyedObservers,
    diagnostics: SharedDiagnostics,
}

/// Handle to a wrapped condition model. Clones share the same state.
///
/// Writes are accepted only for keys the model had when it was wrapped. Each
/// accepted write reconciles the tree, then notifies that key's observer.
pub struct ReactiveCondition<D: Document> {
    inner: Rc<ConditionInner<D>>,
}

impl<D: Document> Clone for ReactiveCondition<D> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// Non-owning condition handle, for observers that write back.
pub struct WeakCondition<D: Document> {
    inner: Weak<ConditionInner<D>>,
}

impl<D: Document> Clone for WeakCondition<D> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<D: Document> WeakCondition<D> {
    pub fn upgrade(&self) -> Option<ReactiveCondition<D>> {
        self.inner.upgrade().map(|inner| ReactiveCondition { inner })
    }
}

impl<D: Document> ReactiveCondition<D> {
    pub fn downgrade(&self) -> WeakCondition<D> {
        WeakCondition {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Current value of `key`. Unknown keys read as `Null`.
    pub fn get(&self, key: &str) -> Value {
        self.inner
            .model
            .borrow()
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.clone())
            .unwrap_or_default()
    }

    /// Write `key`. Returns `false`, with no other effect, for unknown keys.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> bool {
        let value = value.into();
        {
            let mut model = self.inner.model.borrow_mut();
            let Some((_, slot)) = model.iter_mut().find(|(existing, _)| existing == key) else {
                tracing::trace!(key, "dropped write to unknown condition key");
                return false;
            };
            *slot = value.clone();
        }

        self.reconcile();
        self.inner.observers.notify(key, &value);
        true
    }

    /// Keys cannot be removed. Always returns `false`.
    pub fn delete(&self, key: &str) -> bool {
        tracing::trace!(key, "ignored delete on condition model");
        false
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner
            .model
            .borrow()
            .iter()
            .any(|(existing, _)| existing == key)
    }

    /// Keys in model order.
    pub fn keys(&self) -> Vec<String> {
        self.inner
            .model
            .borrow()
            .iter()
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Subscribe to accepted writes of `key`.
    ///
    /// The callback gets an [`ObserverHandle`] that can end the subscription
    /// from inside the call. Returns `false` with a warning if `key` already
    /// has a subscriber or is not a model key.
    ///
    /// A callback holding a strong clone of this condition forms a cycle that
    /// lives until it calls `stop_observing`; capture [`downgrade`](Self::downgrade)
    /// to write back instead.
    pub fn observe(&self, key: &str, callback: impl Fn(&ObserverHandle, &Value) + 'static) -> bool {
        if self.inner.observers.contains(key) {
            self.inner.diagnostics.warn(Warning::ObserverAlreadyRegistered {
                key: key.to_string(),
            });
            return false;
        }
        if !self.contains_key(key) {
            self.inner.diagnostics.warn(Warning::UnknownConditionKey {
                key: key.to_string(),
            });
            return false;
        }
        self.inner.observers.register(key, Rc::new(callback))
    }

    pub fn is_observed(&self, key: &str) -> bool {
        self.inner.observers.contains(key)
    }

    /// Run a full reconciliation pass against the current values.
    pub fn reconcile(&self) {
        let model = self.inner.model.borrow().clone();
        reconcile(&*self.inner.document, &self.inner.settings, |key| {
            model
                .iter()
                .find(|(existing, _)| existing == key)
                .is_some_and(|(_, value)| value.is_truthy())
        });
    }

    /// Settings found by the scan, in scan order.
    pub fn settings(&self) -> &[ConditionalRenderSetting<D::Node>] {
        &self.inner.settings
    }

    pub fn document(&self) -> &Rc<D> {
        &self.inner.document
    }
}

impl<D: Document> fmt::Debug for ReactiveCondition<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveCondition")
            .field("model", &*self.inner.model.borrow())
            .field("settings", &self.inner.settings.len())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingDiagnostics;
    use crate::render_if::{ABSENCE_ATTR, PRESENCE_ATTR};
    use crate::target::{MemoryDocument, NodeId};
    use std::cell::Cell;

    fn app() -> (Rc<MemoryDocument>, NodeId) {
        let doc = Rc::new(MemoryDocument::new());
        let app = doc.element(doc.body(), "div", &[("id", "app")]);
        (doc, app)
    }

    #[test]
    fn test_missing_root_is_lookup_error() {
        let (doc, _app) = app();
        let err = setup(&doc, "nope", ConditionModel::new()).unwrap_err();
        assert_eq!(err, Error::Lookup { id: "nope".into() });
    }

    #[test]
    fn test_toggle_detaches_and_restores() {
        let (doc, root) = app();
        let a = doc.element(root, "p", &[(PRESENCE_ATTR, "k")]);
        let b = doc.element(root, "p", &[]);

        let cond = setup(&doc, "app", ConditionModel::new().with("k", true)).unwrap();
        assert_eq!(doc.children(&root), vec![a, b]);
        assert!(!doc.has_attribute(&a, PRESENCE_ATTR), "marker stripped");

        assert!(cond.set("k", false));
        assert_eq!(doc.children(&root), vec![b]);

        assert!(cond.set("k", true));
        assert_eq!(doc.children(&root), vec![a, b]);
    }

    #[test]
    fn test_initial_render_applies_falsy_values() {
        let (doc, root) = app();
        doc.element(root, "p", &[(PRESENCE_ATTR, "k")]);
        let b = doc.element(root, "p", &[]);

        setup(&doc, "app", ConditionModel::new().with("k", 0)).unwrap();
        assert_eq!(doc.children(&root), vec![b]);
    }

    #[test]
    fn test_missing_model_key_counts_as_falsy() {
        let (doc, root) = app();
        doc.element(root, "p", &[(PRESENCE_ATTR, "absent")]);

        let cond = setup(&doc, "app", ConditionModel::new()).unwrap();
        assert!(doc.children(&root).is_empty());
        assert!(!cond.set("absent", true), "key was never in the model");
    }

    #[test]
    fn test_unknown_key_write_has_no_effect() {
        let (doc, root) = app();
        let a = doc.element(root, "p", &[(PRESENCE_ATTR, "k")]);

        let cond = setup(&doc, "app", ConditionModel::new().with("k", true)).unwrap();
        let calls = Rc::new(Cell::new(0));
        let calls_clone = calls.clone();
        assert!(cond.observe("k", move |_: &ObserverHandle, _: &Value| {
            calls_clone.set(calls_clone.get() + 1)
        }));

        assert!(!cond.set("other", false));
        assert_eq!(cond.keys(), vec!["k"]);
        assert_eq!(cond.get("other"), Value::Null);
        assert_eq!(doc.children(&root), vec![a]);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_delete_is_a_no_op() {
        let (doc, _root) = app();
        let cond = setup(&doc, "app", ConditionModel::new().with("k", true)).unwrap();

        assert!(!cond.delete("k"));
        assert!(cond.contains_key("k"));
        assert_eq!(cond.get("k"), Value::Bool(true));
    }

    #[test]
    fn test_observer_runs_after_reconcile() {
        let (doc, root) = app();
        let a = doc.element(root, "p", &[(PRESENCE_ATTR, "k")]);

        let cond = setup(&doc, "app", ConditionModel::new().with("k", true)).unwrap();
        let attached = Rc::new(RefCell::new(Vec::new()));
        let attached_clone = attached.clone();
        let observed_doc = doc.clone();
        cond.observe("k", move |_: &ObserverHandle, value: &Value| {
            attached_clone
                .borrow_mut()
                .push((value.clone(), observed_doc.is_connected(a)));
        });

        cond.set("k", false);
        cond.set("k", true);

        assert_eq!(
            attached.borrow().as_slice(),
            &[(Value::Bool(false), false), (Value::Bool(true), true)]
        );
    }

    #[test]
    fn test_stop_observing_from_inside_callback() {
        let (doc, root) = app();
        doc.element(root, "p", &[(PRESENCE_ATTR, "k")]);

        let cond = setup(&doc, "app", ConditionModel::new().with("k", true)).unwrap();
        let calls = Rc::new(Cell::new(0));
        let calls_clone = calls.clone();
        cond.observe("k", move |handle: &ObserverHandle, _: &Value| {
            calls_clone.set(calls_clone.get() + 1);
            handle.stop_observing();
        });

        cond.set("k", false);
        cond.set("k", true);

        assert_eq!(calls.get(), 1);
        assert!(!cond.is_observed("k"));
        assert!(cond.observe("k", |_: &ObserverHandle, _: &Value| {}), "slot is free again");
    }

    #[test]
    fn test_observe_rejections_warn() {
        let (doc, _root) = app();
        let sink = CollectingDiagnostics::new();
        let cond = RenderIf::new(doc.clone(), "app")
            .diagnostics(sink.clone())
            .run(ConditionModel::new().with("k", true))
            .unwrap();

        assert!(cond.observe("k", |_: &ObserverHandle, _: &Value| {}));
        assert!(!cond.observe("k", |_: &ObserverHandle, _: &Value| {}));
        assert!(!cond.observe("nope", |_: &ObserverHandle, _: &Value| {}));

        assert_eq!(
            sink.warnings(),
            vec![
                Warning::ObserverAlreadyRegistered { key: "k".into() },
                Warning::UnknownConditionKey { key: "nope".into() },
            ]
        );
    }

    #[test]
    fn test_conflict_leaves_tree_untouched() {
        let (doc, root) = app();
        let a = doc.element(root, "p", &[(PRESENCE_ATTR, "a")]);
        let bad = doc.element(root, "p", &[(PRESENCE_ATTR, "b"), (ABSENCE_ATTR, "")]);
        let sink = CollectingDiagnostics::new();

        let err = RenderIf::new(doc.clone(), "app")
            .diagnostics(sink.clone())
            .run(ConditionModel::new().with("a", false).with("b", false))
            .unwrap_err();

        assert!(matches!(err, Error::MarkerConflict { .. }));
        assert_eq!(sink.len(), 1);
        assert!(matches!(sink.warnings()[0], Warning::MarkerConflict { .. }));
        assert_eq!(doc.children(&root), vec![a, bad], "nothing detached");
        assert!(doc.has_attribute(&a, PRESENCE_ATTR), "earlier markers not stripped");
        assert!(doc.has_attribute(&bad, ABSENCE_ATTR));
    }
}
