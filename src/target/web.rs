//! Browser rendering target backed by `web-sys`.
//!
//! Node handles are `web_sys::Node`s; equality on them is JS identity. DOM
//! calls that throw are logged at ERROR level and otherwise ignored, since
//! the [`Document`] operations have no failure channel.

use std::cell::RefCell;

use js_sys::{Array, Object, Reflect};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, Node};

use super::{Document, Event, Listener};
use crate::types::Value;

type JsListener = Closure<dyn FnMut(web_sys::Event)>;

/// [`Document`] over a live browser document.
pub struct WebDocument {
    document: web_sys::Document,
    /// Closures installed as handler properties, kept alive while installed.
    listeners: RefCell<Vec<(Element, String, JsListener)>>,
}

impl WebDocument {
    pub fn new(document: web_sys::Document) -> Self {
        Self {
            document,
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// The current window's document, if running in a browser context.
    pub fn from_window() -> Option<Self> {
        web_sys::window()?.document().map(Self::new)
    }

    pub fn inner(&self) -> &web_sys::Document {
        &self.document
    }

    fn element<'a>(&self, node: &'a Node) -> Option<&'a Element> {
        node.dyn_ref::<Element>()
    }
}

fn report<T>(operation: &str, result: Result<T, JsValue>) {
    if let Err(err) = result {
        tracing::error!(operation, ?err, "DOM operation failed");
    }
}

// =============================================================================
// Value conversion
// =============================================================================

fn to_js(value: &Value) -> JsValue {
    match value {
        Value::Null => JsValue::NULL,
        Value::Bool(flag) => JsValue::from_bool(*flag),
        Value::Number(number) => JsValue::from_f64(*number),
        Value::Text(text) => JsValue::from_str(text),
        // Handlers only travel through set_event_listener
        Value::Handler(_) => JsValue::UNDEFINED,
        Value::Map(entries) => {
            let object = Object::new();
            for (key, entry) in entries {
                report(
                    "Reflect.set",
                    Reflect::set(&object, &JsValue::from_str(key), &to_js(entry)),
                );
            }
            object.into()
        }
    }
}

fn from_js(value: &JsValue) -> Value {
    if let Some(flag) = value.as_bool() {
        Value::Bool(flag)
    } else if let Some(number) = value.as_f64() {
        Value::Number(number)
    } else if let Some(text) = value.as_string() {
        Value::Text(text)
    } else {
        Value::Null
    }
}

// =============================================================================
// Document
// =============================================================================

impl Document for WebDocument {
    type Node = Node;

    fn get_element_by_id(&self, id: &str) -> Option<Node> {
        self.document.get_element_by_id(id).map(Node::from)
    }

    fn is_element(&self, node: &Node) -> bool {
        node.dyn_ref::<Element>().is_some()
    }

    fn attribute_names(&self, element: &Node) -> Vec<String> {
        let Some(element) = self.element(element) else {
            return Vec::new();
        };
        let names: Array = element.get_attribute_names();
        names.iter().filter_map(|name| name.as_string()).collect()
    }

    fn has_attribute(&self, element: &Node, name: &str) -> bool {
        self.element(element)
            .is_some_and(|element| element.has_attribute(name))
    }

    fn get_attribute(&self, element: &Node, name: &str) -> Option<String> {
        self.element(element)?.get_attribute(name)
    }

    fn set_attribute(&self, element: &Node, name: &str, value: &str) {
        if let Some(element) = self.element(element) {
            report("setAttribute", element.set_attribute(name, value));
        }
    }

    fn remove_attribute(&self, element: &Node, name: &str) {
        if let Some(element) = self.element(element) {
            report("removeAttribute", element.remove_attribute(name));
        }
    }

    fn property(&self, element: &Node, name: &str) -> Value {
        match Reflect::get(element, &JsValue::from_str(name)) {
            Ok(value) => from_js(&value),
            Err(err) => {
                tracing::error!(property = name, ?err, "reading element property failed");
                Value::Null
            }
        }
    }

    fn set_property(&self, element: &Node, name: &str, value: Value) {
        report(
            "Reflect.set",
            Reflect::set(element, &JsValue::from_str(name), &to_js(&value)),
        );
    }

    fn set_event_listener(&self, element: &Node, name: &str, listener: Option<Listener>) {
        let Some(element) = self.element(element) else {
            return;
        };
        let key = JsValue::from_str(name);
        let mut listeners = self.listeners.borrow_mut();

        // Drop the closure of whatever handler this replaces
        listeners.retain(|(installed, installed_name, _)| {
            !(installed == element && installed_name == name)
        });

        match listener {
            Some(listener) => {
                let closure: JsListener = Closure::wrap(Box::new(move |event: web_sys::Event| {
                    listener(&Event::new(event.type_()));
                }) as Box<dyn FnMut(web_sys::Event)>);
                report("Reflect.set", Reflect::set(element, &key, closure.as_ref()));
                listeners.push((element.clone(), name.to_string(), closure));
            }
            None => report("Reflect.set", Reflect::set(element, &key, &JsValue::NULL)),
        }
    }

    fn descendants(&self, node: &Node) -> Vec<Node> {
        let Some(element) = self.element(node) else {
            return Vec::new();
        };
        match element.query_selector_all("*") {
            Ok(list) => (0..list.length()).filter_map(|index| list.item(index)).collect(),
            Err(err) => {
                tracing::error!(?err, "querySelectorAll failed");
                Vec::new()
            }
        }
    }

    fn children(&self, node: &Node) -> Vec<Node> {
        let Some(element) = self.element(node) else {
            return Vec::new();
        };
        let children = element.children();
        (0..children.length())
            .filter_map(|index| children.item(index))
            .map(Node::from)
            .collect()
    }

    fn child_nodes(&self, node: &Node) -> Vec<Node> {
        let nodes = node.child_nodes();
        (0..nodes.length()).filter_map(|index| nodes.item(index)).collect()
    }

    fn has_child_nodes(&self, node: &Node) -> bool {
        node.has_child_nodes()
    }

    fn parent(&self, node: &Node) -> Option<Node> {
        node.parent_node()
    }

    fn next_element_sibling(&self, node: &Node) -> Option<Node> {
        self.element(node)?.next_element_sibling().map(Node::from)
    }

    fn insert_before(&self, parent: &Node, node: &Node, reference: &Node) {
        report("insertBefore", parent.insert_before(node, Some(reference)));
    }

    fn replace_child(&self, parent: &Node, node: &Node, old: &Node) {
        report("replaceChild", parent.replace_child(node, old));
    }

    fn remove_child(&self, parent: &Node, child: &Node) {
        report("removeChild", parent.remove_child(child));
    }

    fn append_child(&self, parent: &Node, child: &Node) {
        report("appendChild", parent.append_child(child));
    }
}
