//! In-memory rendering target.
//!
//! Nodes are NOT objects. They are indices into an arena owned by the
//! document:
//!
//! ```text
//! NodeId 0: <body>          (parent=None, children=[1, 3])
//! NodeId 1: <div id="app">  (parent=0,    children=[2])
//! NodeId 2: "hello"         (parent=1)
//! NodeId 3: <span>          (parent=0)
//! ```
//!
//! Detached nodes stay in the arena with `parent=None`, so a node removed by
//! a reconciliation pass can be re-inserted later with its attributes,
//! properties and listeners intact.

use std::cell::RefCell;
use std::collections::HashMap;

use super::{Document, Event, Listener};
use crate::types::Value;

/// Handle to a node of a [`MemoryDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
enum NodeKind {
    Element(String),
    Text(String),
}

struct NodeData {
    kind: NodeKind,
    attributes: Vec<(String, String)>,
    properties: HashMap<String, Value>,
    listeners: HashMap<String, Listener>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            attributes: Vec::new(),
            properties: HashMap::new(),
            listeners: HashMap::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element(_))
    }
}

// =============================================================================
// MemoryDocument
// =============================================================================

/// Arena-backed [`Document`]. Node 0 is the `<body>` every lookup starts from.
pub struct MemoryDocument {
    nodes: RefCell<Vec<NodeData>>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self {
            nodes: RefCell::new(vec![NodeData::new(NodeKind::Element("body".into()))]),
        }
    }

    /// The document body. Only nodes attached under it are found by id.
    pub fn body(&self) -> NodeId {
        NodeId(0)
    }

    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Allocate a detached element.
    pub fn create_element(&self, tag: &str) -> NodeId {
        self.allocate(NodeKind::Element(tag.to_string()))
    }

    /// Allocate a detached text node.
    pub fn create_text(&self, content: &str) -> NodeId {
        self.allocate(NodeKind::Text(content.to_string()))
    }

    /// Create an element with attributes and append it to `parent`.
    pub fn element(&self, parent: NodeId, tag: &str, attributes: &[(&str, &str)]) -> NodeId {
        let node = self.create_element(tag);
        for (name, value) in attributes {
            self.set_attribute(&node, name, value);
        }
        self.append_child(&parent, &node);
        node
    }

    /// Create a text node and append it to `parent`.
    pub fn text(&self, parent: NodeId, content: &str) -> NodeId {
        let node = self.create_text(content);
        self.append_child(&parent, &node);
        node
    }

    fn allocate(&self, kind: NodeKind) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(NodeData::new(kind));
        NodeId(nodes.len() - 1)
    }

    // -------------------------------------------------------------------------
    // Inspection
    // -------------------------------------------------------------------------

    pub fn tag_name(&self, node: NodeId) -> Option<String> {
        match &self.nodes.borrow().get(node.0)?.kind {
            NodeKind::Element(tag) => Some(tag.clone()),
            NodeKind::Text(_) => None,
        }
    }

    pub fn text_content(&self, node: NodeId) -> Option<String> {
        match &self.nodes.borrow().get(node.0)?.kind {
            NodeKind::Text(content) => Some(content.clone()),
            NodeKind::Element(_) => None,
        }
    }

    /// Whether a listener is installed under the handler property `name`.
    pub fn has_listener(&self, node: NodeId, name: &str) -> bool {
        self.nodes
            .borrow()
            .get(node.0)
            .is_some_and(|data| data.listeners.contains_key(name))
    }

    /// Fire `event` at `node`'s `on<kind>` handler. Returns whether one ran.
    ///
    /// The arena is not borrowed while the listener runs, so the listener may
    /// write back into the document.
    pub fn dispatch_event(&self, node: NodeId, event: &Event) -> bool {
        let name = format!("on{}", event.kind);
        let listener = self
            .nodes
            .borrow()
            .get(node.0)
            .and_then(|data| data.listeners.get(&name).cloned());

        match listener {
            Some(listener) => {
                listener(event);
                true
            }
            None => false,
        }
    }

    /// Whether `node` is reachable from the body.
    pub fn is_connected(&self, node: NodeId) -> bool {
        let nodes = self.nodes.borrow();
        let mut current = Some(node);
        while let Some(id) = current {
            if id == self.body() {
                return true;
            }
            current = nodes.get(id.0).and_then(|data| data.parent);
        }
        false
    }

    /// Unlink `node` from its parent, if any.
    fn detach(nodes: &mut [NodeData], node: NodeId) {
        if let Some(parent) = nodes[node.0].parent.take() {
            nodes[parent.0].children.retain(|&child| child != node);
        }
    }

    /// Whether `node` is `parent` or one of its ancestors. Moving it under
    /// `parent` would then create a cycle.
    fn would_cycle(nodes: &[NodeData], parent: NodeId, node: NodeId) -> bool {
        let mut current = Some(parent);
        while let Some(id) = current {
            if id == node {
                return true;
            }
            current = nodes[id.0].parent;
        }
        false
    }

    fn valid(nodes: &[NodeData], ids: &[NodeId]) -> bool {
        ids.iter().all(|id| id.0 < nodes.len())
    }

    fn collect_descendants(nodes: &[NodeData], node: NodeId, out: &mut Vec<NodeId>) {
        for &child in &nodes[node.0].children {
            if nodes[child.0].is_element() {
                out.push(child);
            }
            Self::collect_descendants(nodes, child, out);
        }
    }
}

impl Document for MemoryDocument {
    type Node = NodeId;

    fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        let body = self.body();
        let nodes = self.nodes.borrow();
        let mut found = Vec::new();
        Self::collect_descendants(&nodes, body, &mut found);
        found.into_iter().find(|node| {
            nodes[node.0]
                .attributes
                .iter()
                .any(|(name, value)| name == "id" && value == id)
        })
    }

    fn is_element(&self, node: &NodeId) -> bool {
        self.nodes
            .borrow()
            .get(node.0)
            .is_some_and(NodeData::is_element)
    }

    fn attribute_names(&self, element: &NodeId) -> Vec<String> {
        self.nodes
            .borrow()
            .get(element.0)
            .map(|data| data.attributes.iter().map(|(name, _)| name.clone()).collect())
            .unwrap_or_default()
    }

    fn has_attribute(&self, element: &NodeId, name: &str) -> bool {
        self.get_attribute(element, name).is_some()
    }

    fn get_attribute(&self, element: &NodeId, name: &str) -> Option<String> {
        let nodes = self.nodes.borrow();
        nodes
            .get(element.0)?
            .attributes
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value.clone())
    }

    fn set_attribute(&self, element: &NodeId, name: &str, value: &str) {
        let mut nodes = self.nodes.borrow_mut();
        let Some(data) = nodes.get_mut(element.0) else { return };
        if !data.is_element() {
            return;
        }
        match data.attributes.iter_mut().find(|(attr, _)| attr == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => data.attributes.push((name.to_string(), value.to_string())),
        }
    }

    fn remove_attribute(&self, element: &NodeId, name: &str) {
        if let Some(data) = self.nodes.borrow_mut().get_mut(element.0) {
            data.attributes.retain(|(attr, _)| attr != name);
        }
    }

    fn property(&self, element: &NodeId, name: &str) -> Value {
        self.nodes
            .borrow()
            .get(element.0)
            .and_then(|data| data.properties.get(name).cloned())
            .unwrap_or_default()
    }

    fn set_property(&self, element: &NodeId, name: &str, value: Value) {
        if let Some(data) = self.nodes.borrow_mut().get_mut(element.0) {
            data.properties.insert(name.to_string(), value);
        }
    }

    fn set_event_listener(&self, element: &NodeId, name: &str, listener: Option<Listener>) {
        let mut nodes = self.nodes.borrow_mut();
        let Some(data) = nodes.get_mut(element.0) else { return };
        match listener {
            Some(listener) => {
                data.listeners.insert(name.to_string(), listener);
            }
            None => {
                data.listeners.remove(name);
            }
        }
    }

    fn descendants(&self, node: &NodeId) -> Vec<NodeId> {
        let nodes = self.nodes.borrow();
        let mut out = Vec::new();
        if node.0 < nodes.len() {
            Self::collect_descendants(&nodes, *node, &mut out);
        }
        out
    }

    fn children(&self, node: &NodeId) -> Vec<NodeId> {
        let nodes = self.nodes.borrow();
        nodes
            .get(node.0)
            .map(|data| {
                data.children
                    .iter()
                    .copied()
                    .filter(|child| nodes[child.0].is_element())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn child_nodes(&self, node: &NodeId) -> Vec<NodeId> {
        self.nodes
            .borrow()
            .get(node.0)
            .map(|data| data.children.clone())
            .unwrap_or_default()
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.nodes.borrow().get(node.0)?.parent
    }

    fn next_element_sibling(&self, node: &NodeId) -> Option<NodeId> {
        let nodes = self.nodes.borrow();
        let parent = nodes.get(node.0)?.parent?;
        let siblings = &nodes[parent.0].children;
        let position = siblings.iter().position(|child| child == node)?;
        siblings[position + 1..]
            .iter()
            .copied()
            .find(|sibling| nodes[sibling.0].is_element())
    }

    fn insert_before(&self, parent: &NodeId, node: &NodeId, reference: &NodeId) {
        let mut nodes = self.nodes.borrow_mut();
        if !Self::valid(&nodes, &[*parent, *node, *reference]) || node == reference {
            return;
        }
        if nodes[reference.0].parent != Some(*parent) {
            tracing::warn!(?parent, ?reference, "insert_before: reference is not a child of parent");
            return;
        }
        if Self::would_cycle(&nodes, *parent, *node) {
            tracing::warn!(?parent, ?node, "insert_before: node is an ancestor of parent");
            return;
        }
        Self::detach(&mut nodes, *node);
        let children = &mut nodes[parent.0].children;
        let position = children
            .iter()
            .position(|child| child == reference)
            .unwrap_or(children.len());
        children.insert(position, *node);
        nodes[node.0].parent = Some(*parent);
    }

    fn replace_child(&self, parent: &NodeId, node: &NodeId, old: &NodeId) {
        let mut nodes = self.nodes.borrow_mut();
        if !Self::valid(&nodes, &[*parent, *node, *old]) || node == old {
            return;
        }
        if nodes[old.0].parent != Some(*parent) {
            tracing::warn!(?parent, ?old, "replace_child: old node is not a child of parent");
            return;
        }
        if Self::would_cycle(&nodes, *parent, *node) {
            tracing::warn!(?parent, ?node, "replace_child: node is an ancestor of parent");
            return;
        }
        Self::detach(&mut nodes, *node);
        let Some(position) = nodes[parent.0].children.iter().position(|child| child == old) else {
            return;
        };
        nodes[parent.0].children[position] = *node;
        nodes[node.0].parent = Some(*parent);
        nodes[old.0].parent = None;
    }

    fn remove_child(&self, parent: &NodeId, child: &NodeId) {
        let mut nodes = self.nodes.borrow_mut();
        if !Self::valid(&nodes, &[*parent, *child]) {
            return;
        }
        if nodes[child.0].parent == Some(*parent) {
            Self::detach(&mut nodes, *child);
        }
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) {
        let mut nodes = self.nodes.borrow_mut();
        if !Self::valid(&nodes, &[*parent, *child]) {
            return;
        }
        if Self::would_cycle(&nodes, *parent, *child) {
            tracing::warn!(?parent, ?child, "append_child: child is an ancestor of parent");
            return;
        }
        Self::detach(&mut nodes, *child);
        nodes[parent.0].children.push(*child);
        nodes[child.0].parent = Some(*parent);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_lookup_by_id_only_finds_connected_nodes() {
        let doc = MemoryDocument::new();
        let app = doc.element(doc.body(), "div", &[("id", "app")]);
        let detached = doc.create_element("div");
        doc.set_attribute(&detached, "id", "ghost");

        assert_eq!(doc.get_element_by_id("app"), Some(app));
        assert_eq!(doc.get_element_by_id("ghost"), None, "detached nodes are not found");
        assert!(doc.is_connected(app));
        assert!(!doc.is_connected(detached));
    }

    #[test]
    fn test_attributes_keep_order_and_overwrite_in_place() {
        let doc = MemoryDocument::new();
        let el = doc.element(doc.body(), "a", &[("href", "/"), ("class", "x")]);

        doc.set_attribute(&el, "href", "/home");
        assert_eq!(doc.attribute_names(&el), vec!["href", "class"]);
        assert_eq!(doc.get_attribute(&el, "href").as_deref(), Some("/home"));

        doc.remove_attribute(&el, "href");
        assert!(!doc.has_attribute(&el, "href"));
    }

    #[test]
    fn test_children_skip_text_nodes() {
        let doc = MemoryDocument::new();
        let root = doc.element(doc.body(), "div", &[]);
        let a = doc.element(root, "p", &[]);
        doc.text(root, "between");
        let b = doc.element(root, "p", &[]);

        assert_eq!(doc.children(&root), vec![a, b]);
        assert_eq!(doc.child_nodes(&root).len(), 3);
        assert_eq!(doc.next_element_sibling(&a), Some(b));
        assert_eq!(doc.next_element_sibling(&b), None);
    }

    #[test]
    fn test_descendants_in_document_order() {
        let doc = MemoryDocument::new();
        let root = doc.element(doc.body(), "div", &[]);
        let a = doc.element(root, "section", &[]);
        let a1 = doc.element(a, "p", &[]);
        let b = doc.element(root, "footer", &[]);

        assert_eq!(doc.descendants(&root), vec![a, a1, b]);
    }

    #[test]
    fn test_mutations_move_nodes() {
        let doc = MemoryDocument::new();
        let root = doc.element(doc.body(), "div", &[]);
        let a = doc.element(root, "a", &[]);
        let b = doc.element(root, "b", &[]);
        let c = doc.create_element("c");

        doc.replace_child(&root, &c, &a);
        assert_eq!(doc.children(&root), vec![c, b]);
        assert_eq!(doc.parent(&a), None, "replaced node is detached");

        doc.insert_before(&root, &a, &c);
        assert_eq!(doc.children(&root), vec![a, c, b]);

        doc.append_child(&root, &a);
        assert_eq!(doc.children(&root), vec![c, b, a], "append moves an attached node");

        doc.remove_child(&root, &b);
        assert_eq!(doc.children(&root), vec![c, a]);
    }

    #[test]
    fn test_moving_an_ancestor_under_its_descendant_is_rejected() {
        let doc = MemoryDocument::new();
        let root = doc.element(doc.body(), "div", &[]);
        let section = doc.element(root, "section", &[]);
        let leaf = doc.element(section, "p", &[]);

        doc.append_child(&leaf, &root);
        doc.append_child(&section, &section);
        doc.insert_before(&section, &root, &leaf);
        doc.replace_child(&section, &root, &leaf);

        assert_eq!(doc.parent(&root), Some(doc.body()), "root stays where it was");
        assert_eq!(doc.children(&section), vec![leaf]);
        assert!(doc.children(&leaf).is_empty());
        assert!(doc.is_connected(leaf));
        assert_eq!(doc.descendants(&root), vec![section, leaf]);
    }

    #[test]
    fn test_dispatch_event_runs_listener() {
        let doc = MemoryDocument::new();
        let button = doc.element(doc.body(), "button", &[]);
        let clicks = Rc::new(Cell::new(0));
        let clicks_clone = clicks.clone();

        doc.set_event_listener(
            &button,
            "onclick",
            Some(Rc::new(move |_event: &Event| clicks_clone.set(clicks_clone.get() + 1))),
        );

        assert!(doc.dispatch_event(button, &Event::new("click")));
        assert!(!doc.dispatch_event(button, &Event::new("input")));
        assert_eq!(clicks.get(), 1);

        doc.set_event_listener(&button, "onclick", None);
        assert!(!doc.has_listener(button, "onclick"));
    }
}
