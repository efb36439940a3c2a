//! Minimal in-memory DOM
//!
//! Just enough element tree for overlay rendering: creation, `data-*`
//! attributes, class lists, inline style, ordered insertion, subtree removal,
//! and class-selector queries. Nodes live in an arena keyed by [`NodeId`];
//! removing a node drops its whole subtree and invalidates those ids.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::rc::Rc;

/// Arena key of a DOM element
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

pub type SharedDom = Rc<RefCell<Dom>>;

#[derive(Debug, Clone)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub classes: Vec<String>,
    pub style: Vec<(String, String)>,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
}

impl Element {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            attributes: Vec::new(),
            classes: Vec::new(),
            style: Vec::new(),
            children: Vec::new(),
            parent: None,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn style(&self, property: &str) -> Option<&str> {
        self.style
            .iter()
            .find(|(k, _)| k == property)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

#[derive(Debug)]
pub struct Dom {
    nodes: HashMap<NodeId, Element>,
    root: NodeId,
    next_id: u32,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    /// Create a document with an empty `body` root
    pub fn new() -> Self {
        let root = NodeId(1);
        let mut nodes = HashMap::new();
        nodes.insert(root, Element::new("body"));
        Self {
            nodes,
            root,
            next_id: 2,
        }
    }

    pub fn shared() -> SharedDom {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    pub fn element(&self, node: NodeId) -> Option<&Element> {
        self.nodes.get(&node)
    }

    /// Create a detached element
    pub fn create_element(&mut self, name: &str) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, Element::new(name));
        id
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: impl Into<String>) {
        let Some(element) = self.nodes.get_mut(&node) else {
            return;
        };
        let value = value.into();
        match element.attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value,
            None => element.attributes.push((name.to_string(), value)),
        }
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes.get(&node).and_then(|e| e.attribute(name))
    }

    /// Replace the class list with the whitespace-separated names in `class_name`
    pub fn set_class_name(&mut self, node: NodeId, class_name: &str) {
        if let Some(element) = self.nodes.get_mut(&node) {
            element.classes = class_name.split_whitespace().map(str::to_string).collect();
        }
    }

    pub fn set_style(&mut self, node: NodeId, property: &str, value: impl Into<String>) {
        let Some(element) = self.nodes.get_mut(&node) else {
            return;
        };
        let value = value.into();
        match element.style.iter_mut().find(|(k, _)| k == property) {
            Some((_, v)) => *v = value,
            None => element.style.push((property.to_string(), value)),
        }
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.nodes.get(&node).and_then(|e| e.style(property))
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(&node)
            .map_or(&[][..], |e| e.children.as_slice())
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|e| e.parent)
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_child_at(parent, child, None);
    }

    /// Insert `child` before the current first child of `parent`
    pub fn insert_first_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_child_at(parent, child, Some(0));
    }

    fn insert_child_at(&mut self, parent: NodeId, child: NodeId, index: Option<usize>) {
        if parent == child || !self.contains(parent) || !self.contains(child) {
            return;
        }
        self.detach(child);
        if let Some(element) = self.nodes.get_mut(&child) {
            element.parent = Some(parent);
        }
        if let Some(element) = self.nodes.get_mut(&parent) {
            match index {
                Some(i) => element.children.insert(i.min(element.children.len()), child),
                None => element.children.push(child),
            }
        }
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.parent(node) else {
            return;
        };
        if let Some(element) = self.nodes.get_mut(&parent) {
            element.children.retain(|c| *c != node);
        }
        if let Some(element) = self.nodes.get_mut(&node) {
            element.parent = None;
        }
    }

    /// Remove a node and its subtree from the document
    ///
    /// Returns `false` if the node does not exist. The root cannot be removed.
    pub fn remove(&mut self, node: NodeId) -> bool {
        if node == self.root || !self.contains(node) {
            return false;
        }
        self.detach(node);
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            if let Some(element) = self.nodes.remove(&id) {
                stack.extend(element.children);
            }
        }
        true
    }

    /// Attached elements carrying `class`, in document order
    pub fn query_class(&self, class: &str) -> Vec<NodeId> {
        let mut matches = Vec::new();
        self.walk(self.root, &mut |id, element| {
            if element.has_class(class) {
                matches.push(id);
            }
        });
        matches
    }

    /// Resolve a single-class selector such as `.text-highlight-a`
    ///
    /// Anything other than one `.class` term matches nothing.
    pub fn query_selector_all(&self, selector: &str) -> Vec<NodeId> {
        match selector.trim().strip_prefix('.') {
            Some(class) if !class.is_empty() && !class.contains(['.', ' ', '#']) => {
                self.query_class(class)
            }
            _ => Vec::new(),
        }
    }

    fn walk(&self, node: NodeId, visit: &mut impl FnMut(NodeId, &Element)) {
        if let Some(element) = self.nodes.get(&node) {
            visit(node, element);
            for child in &element.children {
                self.walk(*child, visit);
            }
        }
    }

    /// Serialize a subtree as HTML
    pub fn to_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, 0, &mut out);
        out
    }

    fn write_html(&self, node: NodeId, depth: usize, out: &mut String) {
        let Some(element) = self.nodes.get(&node) else {
            return;
        };
        let indent = "  ".repeat(depth);
        let _ = write!(out, "{}<{}", indent, element.name);
        if !element.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", element.classes.join(" "));
        }
        for (name, value) in &element.attributes {
            let _ = write!(out, " {}=\"{}\"", name, escape_attr(value));
        }
        if !element.style.is_empty() {
            let style: Vec<String> = element
                .style
                .iter()
                .map(|(k, v)| format!("{}: {}", k, v))
                .collect();
            let _ = write!(out, " style=\"{}\"", escape_attr(&style.join("; ")));
        }
        if element.children.is_empty() {
            let _ = writeln!(out, "></{}>", element.name);
            return;
        }
        out.push_str(">\n");
        for child in &element.children {
            self.write_html(*child, depth + 1, out);
        }
        let _ = writeln!(out, "{}</{}>", indent, element.name);
    }
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_first_child_reverses_creation_order() {
        let mut dom = Dom::new();
        let page = dom.create_element("div");
        dom.append_child(dom.root(), page);
        let a = dom.create_element("div");
        let b = dom.create_element("div");
        dom.insert_first_child(page, a);
        dom.insert_first_child(page, b);
        assert_eq!(dom.children(page), &[b, a]);
    }

    #[test]
    fn test_remove_drops_subtree() {
        let mut dom = Dom::new();
        let page = dom.create_element("div");
        let child = dom.create_element("span");
        dom.append_child(dom.root(), page);
        dom.append_child(page, child);

        assert!(dom.remove(page));
        assert!(!dom.contains(child));
        assert!(dom.children(dom.root()).is_empty());
        assert!(!dom.remove(page));
    }

    #[test]
    fn test_root_cannot_be_removed() {
        let mut dom = Dom::new();
        let root = dom.root();
        assert!(!dom.remove(root));
        assert!(dom.contains(root));
    }

    #[test]
    fn test_query_only_sees_attached_nodes() {
        let mut dom = Dom::new();
        let attached = dom.create_element("div");
        let detached = dom.create_element("div");
        dom.set_class_name(attached, "text-highlight text-highlight-a");
        dom.set_class_name(detached, "text-highlight-a");
        dom.append_child(dom.root(), attached);

        assert_eq!(dom.query_selector_all(".text-highlight-a"), vec![attached]);
        assert!(dom.query_selector_all("text-highlight-a").is_empty());
        assert!(dom.query_selector_all(".a .b").is_empty());
    }

    #[test]
    fn test_set_attribute_overwrites() {
        let mut dom = Dom::new();
        let node = dom.create_element("div");
        dom.set_attribute(node, "data-page-num", "1");
        dom.set_attribute(node, "data-page-num", "2");
        assert_eq!(dom.attribute(node, "data-page-num"), Some("2"));
        assert_eq!(dom.element(node).unwrap().attributes.len(), 1);
    }

    #[test]
    fn test_to_html_serializes_style_and_classes() {
        let mut dom = Dom::new();
        let node = dom.create_element("DIV");
        dom.set_class_name(node, "a b");
        dom.set_style(node, "left", "10px");
        dom.append_child(dom.root(), node);
        let html = dom.to_html(dom.root());
        assert!(html.contains("<div class=\"a b\" style=\"left: 10px\"></div>"));
        assert!(html.starts_with("<body>"));
    }
}
