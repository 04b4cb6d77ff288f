//! Binding entry points: `to_attrs`, `bind`, `spread`.

use std::rc::Rc;
use std::sync::LazyLock;

use regex::Regex;

use super::{classify, sync_field, DataObject, FieldAccessor, Manager};
use crate::diagnostics::{Diagnostics, SharedDiagnostics, TracingDiagnostics, Warning};
use crate::error::{Error, Result};
use crate::target::Document;

static MANAGER_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\{\.{3}([^\s{}]+)\}$").expect("manager marker pattern is valid")
});

/// Extract `name` from a `{...name}` attribute, if it is one.
pub fn manager_name(attribute: &str) -> Option<&str> {
    MANAGER_MARKER
        .captures(attribute)
        .and_then(|captures| captures.get(1))
        .map(|name| name.as_str())
}

// =============================================================================
// Options
// =============================================================================

/// Configuration for [`to_attrs`].
///
/// ```ignore
/// let data = ToAttrs::new(document.clone(), "app")
///     .diagnostics(CollectingDiagnostics::new())
///     .run(data)?;
/// ```
pub struct ToAttrs<D: Document> {
    document: Rc<D>,
    root: String,
    diagnostics: SharedDiagnostics,
}

impl<D: Document + 'static> ToAttrs<D> {
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

    pub fn run(self, data: DataObject) -> Result<DataObject> {
        to_attrs(self, data)
    }
}

// =============================================================================
// Entry points
// =============================================================================

/// Shorthand for [`to_attrs`] with default diagnostics.
pub fn bind<D: Document + 'static>(
    document: &Rc<D>,
    root: &str,
    data: DataObject,
) -> Result<DataObject> {
    to_attrs(ToAttrs::new(document.clone(), root), data)
}

/// Bind every `{...name}`-marked element under the root to its manager.
///
/// Fails with [`Error::Lookup`] if the root id does not resolve, and with
/// [`Error::InvalidEventHandler`] if a manager carries a non-callable value
/// in an event field. Markers naming a missing manager are reported as
/// [`Warning::UnresolvedManager`] and left in place.
pub fn to_attrs<D: Document + 'static>(options: ToAttrs<D>, data: DataObject) -> Result<DataObject> {
    let ToAttrs {
        document,
        root,
        diagnostics,
    } = options;

    let root_node = document
        .get_element_by_id(&root)
        .ok_or_else(|| Error::Lookup { id: root.clone() })?;

    // Snapshot before any marker is stripped
    let elements = document.descendants(&root_node);
    tracing::debug!(root = %root, elements = elements.len(), "binding attribute managers");

    let mut bound = 0usize;
    for element in &elements {
        let attributes = document.attribute_names(element);
        let [attribute] = attributes.as_slice() else {
            continue;
        };
        let Some(name) = manager_name(attribute) else {
            continue;
        };

        match data.get(name) {
            Some(manager) => {
                document.remove_attribute(element, attribute);
                spread(&document, element, manager, &diagnostics)?;
                bound += 1;
            }
            None => diagnostics.warn(Warning::UnresolvedManager {
                name: name.to_string(),
            }),
        }
    }

    tracing::debug!(root = %root, bound, "attribute managers bound");
    Ok(data)
}

/// Sync every current field of `manager` onto `element` and make it reactive.
///
/// Null values are skipped by the initial sync. Spreading an already bound
/// manager again re-targets its accessors at the new element, using the last
/// written values; its observer subscription is kept.
pub fn spread<D: Document + 'static>(
    document: &Rc<D>,
    element: &D::Node,
    manager: &Manager,
    diagnostics: &SharedDiagnostics,
) -> Result<()> {
    manager.set_diagnostics(diagnostics.clone());
    let observer = manager.observer_slot();

    for (name, value) in manager.snapshot() {
        let kind = classify(&name);

        if !value.is_null() {
            sync_field(&**document, element, &name, kind, &value, manager)?;
        }

        let accessor = FieldAccessor::new(
            document.clone(),
            element.clone(),
            &name,
            kind,
            value,
            observer.clone(),
            diagnostics.clone(),
        );
        manager.install(&name, Rc::new(accessor));
    }

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
