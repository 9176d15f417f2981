use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;

use hudkit_events::InteractionKind;
use tracing::trace;

use super::{Dom, ListenerId, ListenerOptions, NodeId, UiScope};

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    /// Set only for top-level elements
    scope: Option<UiScope>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    text: String,
    hidden: bool,
    attached: bool,
}

impl Node {
    fn new(tag: &str, scope: Option<UiScope>, parent: Option<NodeId>) -> Self {
        Self {
            tag: tag.to_string(),
            scope,
            parent,
            children: Vec::new(),
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            styles: BTreeMap::new(),
            text: String::new(),
            hidden: false,
            attached: false,
        }
    }
}

/// In-memory [`Dom`] used by the replay CLI and by tests
///
/// Besides the element tree it keeps counters of every write and removal so
/// callers can assert how much UI work a handler did.
#[derive(Debug, Default)]
pub struct HeadlessDom {
    nodes: BTreeMap<NodeId, Node>,
    next_node: u64,
    css_variables: HashMap<String, String>,
    stylesheets: BTreeMap<String, String>,
    listeners: BTreeMap<ListenerId, (InteractionKind, ListenerOptions)>,
    next_listener: u64,
    mutations: u64,
    removals: u64,
    peak_attached: BTreeMap<UiScope, usize>,
    refuse_elements: bool,
    refuse_attach: bool,
}

impl HeadlessDom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a CSS custom property, as a theme would
    pub fn with_css_variable(mut self, name: &str, value: &str) -> Self {
        self.set_css_variable(name, value);
        self
    }

    pub fn set_css_variable(&mut self, name: &str, value: &str) {
        self.css_variables
            .insert(name.to_string(), value.to_string());
    }

    /// Make `create_element` return `None`, like a host without a UI root
    pub fn refuse_element_creation(&mut self, refuse: bool) {
        self.refuse_elements = refuse;
    }

    /// Make `attach` fail, like a host whose scope root is missing
    pub fn refuse_attach(&mut self, refuse: bool) {
        self.refuse_attach = refuse;
    }

    /// Number of writes performed so far (creation, attach, removal, setters)
    pub fn mutation_count(&self) -> u64 {
        self.mutations
    }

    /// Number of successful `remove` calls
    pub fn removal_count(&self) -> u64 {
        self.removals
    }

    /// Top-level elements currently attached in `scope`
    pub fn attached_count(&self, scope: UiScope) -> usize {
        self.nodes
            .values()
            .filter(|node| node.scope == Some(scope) && node.attached)
            .count()
    }

    /// Highest number of elements ever attached at once in `scope`
    pub fn peak_attached(&self, scope: UiScope) -> usize {
        self.peak_attached.get(&scope).copied().unwrap_or(0)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    /// Whether `node` is reachable from an attached top-level element
    pub fn is_connected(&self, node: NodeId) -> bool {
        let mut current = node;
        loop {
            let Some(n) = self.nodes.get(&current) else {
                return false;
            };
            match n.parent {
                Some(parent) => current = parent,
                None => return n.attached,
            }
        }
    }

    /// Find the first connected element matching `#id`, `.class` or a tag name
    pub fn query_selector(&self, selector: &str) -> Option<NodeId> {
        self.query_selector_all(selector).into_iter().next()
    }

    pub fn query_selector_all(&self, selector: &str) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(id, node)| Self::matches(node, selector) && self.is_connected(**id))
            .map(|(id, _)| *id)
            .collect()
    }

    fn matches(node: &Node, selector: &str) -> bool {
        if let Some(id) = selector.strip_prefix('#') {
            node.attributes.get("id").is_some_and(|value| value == id)
        } else if let Some(class) = selector.strip_prefix('.') {
            node.classes.iter().any(|c| c == class)
        } else {
            node.tag == selector
        }
    }

    pub fn text(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(&node).map(|n| n.text.as_str())
    }

    /// Text of the first connected element matching `selector`
    pub fn text_of(&self, selector: &str) -> Option<&str> {
        self.query_selector(selector).and_then(|node| self.text(node))
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes
            .get(&node)
            .and_then(|n| n.attributes.get(name))
            .map(String::as_str)
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.nodes
            .get(&node)
            .and_then(|n| n.styles.get(property))
            .map(String::as_str)
    }

    pub fn classes(&self, node: NodeId) -> &[String] {
        self.nodes
            .get(&node)
            .map(|n| n.classes.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_hidden(&self, node: NodeId) -> Option<bool> {
        self.nodes.get(&node).map(|n| n.hidden)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(&node)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn stylesheet(&self, key: &str) -> Option<&str> {
        self.stylesheets.get(key).map(String::as_str)
    }

    pub fn stylesheet_count(&self) -> usize {
        self.stylesheets.len()
    }

    /// Registered listeners, in registration order
    pub fn listeners(&self) -> Vec<(InteractionKind, ListenerOptions)> {
        self.listeners.values().copied().collect()
    }

    /// Render the attached tree, one element per line
    pub fn render(&self) -> String {
        let mut out = String::new();
        let roots: BTreeMap<UiScope, Vec<NodeId>> =
            self.nodes
                .iter()
                .filter(|(_, node)| node.attached)
                .fold(BTreeMap::new(), |mut acc, (id, node)| {
                    if let Some(scope) = node.scope {
                        acc.entry(scope).or_insert_with(Vec::new).push(*id);
                    }
                    acc
                });

        for (scope, nodes) in roots {
            let _ = writeln!(out, "[{:?}]", scope);
            for node in nodes {
                self.render_node(&mut out, node, 1);
            }
        }
        out
    }

    fn render_node(&self, out: &mut String, id: NodeId, depth: usize) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };

        let _ = write!(out, "{}<{}", "  ".repeat(depth), node.tag);
        if !node.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", node.classes.join(" "));
        }
        for (name, value) in &node.attributes {
            let _ = write!(out, " {}=\"{}\"", name, value);
        }
        if node.hidden {
            let _ = write!(out, " hidden");
        }
        let _ = write!(out, ">");
        if !node.text.is_empty() {
            let _ = write!(out, " {}", node.text);
        }
        out.push('\n');

        for child in &node.children {
            self.render_node(out, *child, depth + 1);
        }
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        self.nodes.insert(id, node);
        self.mutations += 1;
        id
    }

    fn with_node(&mut self, node: NodeId, f: impl FnOnce(&mut Node)) {
        if let Some(n) = self.nodes.get_mut(&node) {
            f(n);
            self.mutations += 1;
        } else {
            trace!(target: "dom", "Write to missing node {:?} ignored", node);
        }
    }

    fn remove_subtree(&mut self, node: NodeId) {
        if let Some(removed) = self.nodes.remove(&node) {
            for child in removed.children {
                self.remove_subtree(child);
            }
        }
    }
}

impl Dom for HeadlessDom {
    fn create_element(&mut self, scope: UiScope) -> Option<NodeId> {
        if self.refuse_elements {
            return None;
        }
        Some(self.alloc(Node::new("div", Some(scope), None)))
    }

    fn create_child(&mut self, parent: NodeId, tag: &str) -> Option<NodeId> {
        if !self.nodes.contains_key(&parent) {
            return None;
        }
        let id = self.alloc(Node::new(tag, None, Some(parent)));
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(id);
        }
        Some(id)
    }

    fn attach(&mut self, node: NodeId) -> bool {
        if self.refuse_attach {
            return false;
        }
        let scope = match self.nodes.get_mut(&node) {
            Some(n) if n.attached => return true,
            Some(n) => match n.scope {
                Some(scope) => {
                    n.attached = true;
                    scope
                }
                None => return false,
            },
            None => return false,
        };
        self.mutations += 1;

        let attached = self.attached_count(scope);
        let peak = self.peak_attached.entry(scope).or_insert(0);
        *peak = (*peak).max(attached);
        true
    }

    fn remove(&mut self, node: NodeId) -> bool {
        let Some(parent) = self.nodes.get(&node).map(|n| n.parent) else {
            return false;
        };
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|child| *child != node);
        }
        self.remove_subtree(node);
        self.mutations += 1;
        self.removals += 1;
        true
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        self.with_node(node, |n| n.text = text.to_string());
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        self.with_node(node, |n| {
            n.attributes.insert(name.to_string(), value.to_string());
        });
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        self.with_node(node, |n| {
            if !n.classes.iter().any(|c| c == class) {
                n.classes.push(class.to_string());
            }
        });
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        self.with_node(node, |n| {
            n.styles.insert(property.to_string(), value.to_string());
        });
    }

    fn set_hidden(&mut self, node: NodeId, hidden: bool) {
        self.with_node(node, |n| n.hidden = hidden);
    }

    fn css_variable(&self, name: &str) -> Option<String> {
        self.css_variables.get(name).map(|value| value.trim().to_string())
    }

    fn inject_stylesheet(&mut self, key: &str, css: &str) -> bool {
        if self.stylesheets.contains_key(key) {
            return false;
        }
        self.stylesheets.insert(key.to_string(), css.to_string());
        self.mutations += 1;
        true
    }

    fn add_event_listener(
        &mut self,
        kind: InteractionKind,
        options: ListenerOptions,
    ) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.insert(id, (kind, options));
        id
    }

    fn remove_event_listener(&mut self, listener: ListenerId) -> bool {
        self.listeners.remove(&listener).is_some()
    }
}
