//! In-memory document model
//!
//! Mirrors the subset of the host page's element tree the engine reads and
//! writes: tags, attributes, class lists, text, inline display and horizontal
//! scroll offset. Structural changes on connected nodes are queued as
//! [`MutationRecord`]s and handed out in batches by [`Document::take_records`],
//! the same contract a browser mutation observer provides.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque handle to an element. Never reused within a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single element
#[derive(Debug, Clone, Default)]
pub struct Element {
    pub tag: String,
    attrs: BTreeMap<String, String>,
    classes: Vec<String>,
    text: String,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    display: Option<String>,
    scroll_left: f64,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn is(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Own text, not including descendants
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A batch entry of structural changes under one parent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub target: NodeId,
    pub added: Vec<NodeId>,
    pub removed: Vec<NodeId>,
}

/// Declarative element description used to build subtrees
#[derive(Debug, Clone, Default)]
pub struct ElementSpec {
    tag: String,
    attrs: Vec<(String, String)>,
    classes: Vec<String>,
    text: String,
    children: Vec<ElementSpec>,
}

impl ElementSpec {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    /// Add one or more space-separated classes
    pub fn class(mut self, classes: &str) -> Self {
        self.classes
            .extend(classes.split_whitespace().map(str::to_string));
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }

    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn child(mut self, child: ElementSpec) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = ElementSpec>) -> Self {
        self.children.extend(children);
        self
    }
}

/// Arena-backed element tree rooted at `<body>`
#[derive(Debug, Clone)]
pub struct Document {
    nodes: HashMap<NodeId, Element>,
    body: NodeId,
    next_id: u64,
    records: Vec<MutationRecord>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let body = NodeId(0);
        let mut nodes = HashMap::new();
        nodes.insert(body, Element::new("body"));
        Self {
            nodes,
            body,
            next_id: 1,
            records: Vec::new(),
        }
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.nodes.get(&id)
    }

    /// True while the node exists (it may be detached)
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// True when the node is reachable from `<body>`
    pub fn is_connected(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.body {
                return true;
            }
            current = self.nodes.get(&node).and_then(|el| el.parent);
        }
        false
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ─────────────────────────────────────────────────────────
    // Tree Construction
    // ─────────────────────────────────────────────────────────

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, Element::new(tag));
        id
    }

    /// Append `child` as the last child of `parent`, moving it if attached
    /// elsewhere. Returns false when either node is unknown or the move would
    /// create a cycle.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if !self.contains(parent) || !self.contains(child) || child == self.body {
            return false;
        }
        if self.ancestors_inclusive(parent).contains(&child) {
            return false;
        }

        self.detach(child);

        if let Some(el) = self.nodes.get_mut(&child) {
            el.parent = Some(parent);
        }
        if let Some(el) = self.nodes.get_mut(&parent) {
            el.children.push(child);
        }

        if self.is_connected(parent) {
            self.records.push(MutationRecord {
                target: parent,
                added: vec![child],
                removed: Vec::new(),
            });
        }
        true
    }

    /// Build a subtree from an [`ElementSpec`] and append it under `parent` in one step.
    ///
    /// Produces a single mutation record for the subtree root, like appending
    /// a prepared fragment.
    pub fn insert(&mut self, parent: NodeId, spec: ElementSpec) -> NodeId {
        let root = self.build(spec);
        self.append_child(parent, root);
        root
    }

    fn build(&mut self, spec: ElementSpec) -> NodeId {
        let id = self.create_element(&spec.tag);
        if let Some(el) = self.nodes.get_mut(&id) {
            for (name, value) in spec.attrs {
                el.attrs.insert(name, value);
            }
            for class in spec.classes {
                if !el.classes.contains(&class) {
                    el.classes.push(class);
                }
            }
            el.text = spec.text;
        }
        for child_spec in spec.children {
            let child = self.build(child_spec);
            if let Some(el) = self.nodes.get_mut(&child) {
                el.parent = Some(id);
            }
            if let Some(el) = self.nodes.get_mut(&id) {
                el.children.push(child);
            }
        }
        id
    }

    /// Remove a node and destroy its whole subtree
    pub fn remove(&mut self, id: NodeId) -> bool {
        if id == self.body || !self.contains(id) {
            return false;
        }

        let was_connected = self.is_connected(id);
        let parent = self.detach(id);

        let mut doomed = self.descendants(id);
        doomed.push(id);
        for node in doomed {
            self.nodes.remove(&node);
        }

        if let (true, Some(parent)) = (was_connected, parent) {
            self.records.push(MutationRecord {
                target: parent,
                added: Vec::new(),
                removed: vec![id],
            });
        }
        true
    }

    fn detach(&mut self, id: NodeId) -> Option<NodeId> {
        let parent = self.nodes.get_mut(&id).and_then(|el| el.parent.take())?;
        if let Some(el) = self.nodes.get_mut(&parent) {
            el.children.retain(|&c| c != id);
        }
        Some(parent)
    }

    /// Drain queued structural changes
    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.records)
    }

    pub fn has_pending_records(&self) -> bool {
        !self.records.is_empty()
    }

    // ─────────────────────────────────────────────────────────
    // Attributes & Classes
    // ─────────────────────────────────────────────────────────

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|el| el.attr(name))
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.element(id).is_some_and(|el| el.has_attr(name))
    }

    /// Check an attribute's exact value
    pub fn attr_is(&self, id: NodeId, name: &str, value: &str) -> bool {
        self.attr(id, name) == Some(value)
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(el) = self.nodes.get_mut(&id) {
            el.attrs.insert(name.to_string(), value.to_string());
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let Some(el) = self.nodes.get_mut(&id) {
            el.attrs.remove(name);
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).is_some_and(|el| el.has_class(class))
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if let Some(el) = self.nodes.get_mut(&id) {
            if !el.has_class(class) {
                el.classes.push(class.to_string());
            }
        }
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if let Some(el) = self.nodes.get_mut(&id) {
            el.classes.retain(|c| c != class);
        }
    }

    /// Flip a class; returns whether it is now present
    pub fn toggle_class(&mut self, id: NodeId, class: &str) -> bool {
        if self.has_class(id, class) {
            self.remove_class(id, class);
            false
        } else {
            self.add_class(id, class);
            self.has_class(id, class)
        }
    }

    /// Add every class of a space-separated list
    pub fn add_classes(&mut self, id: NodeId, classes: &str) {
        for class in classes.split_whitespace() {
            self.add_class(id, class);
        }
    }

    /// Remove every class of a space-separated list
    pub fn remove_classes(&mut self, id: NodeId, classes: &str) {
        for class in classes.split_whitespace() {
            self.remove_class(id, class);
        }
    }

    // ─────────────────────────────────────────────────────────
    // Text, Style & Scroll
    // ─────────────────────────────────────────────────────────

    pub fn set_text(&mut self, id: NodeId, text: &str) {
        if let Some(el) = self.nodes.get_mut(&id) {
            el.text = text.to_string();
        }
    }

    /// Concatenated text of the node and its descendants, in document order
    pub fn text_content(&self, id: NodeId) -> String {
        self.text_content_excluding(id, |_| false)
    }

    /// Text content skipping any subtree whose root matches `skip`
    pub fn text_content_excluding<F>(&self, id: NodeId, skip: F) -> String
    where
        F: Fn(&Element) -> bool,
    {
        let mut out = String::new();
        self.collect_text(id, &skip, &mut out);
        out
    }

    fn collect_text<F>(&self, id: NodeId, skip: &F, out: &mut String)
    where
        F: Fn(&Element) -> bool,
    {
        let Some(el) = self.element(id) else {
            return;
        };
        out.push_str(&el.text);
        for &child in &el.children {
            if self.element(child).is_some_and(|c| !skip(c)) {
                self.collect_text(child, skip, out);
            }
        }
    }

    /// Inline `display` value, `None` when unset
    pub fn display(&self, id: NodeId) -> Option<&str> {
        self.element(id).and_then(|el| el.display.as_deref())
    }

    pub fn set_display(&mut self, id: NodeId, display: &str) {
        if let Some(el) = self.nodes.get_mut(&id) {
            el.display = Some(display.to_string());
        }
    }

    pub fn scroll_left(&self, id: NodeId) -> f64 {
        self.element(id).map_or(0.0, |el| el.scroll_left)
    }

    /// Set the horizontal scroll offset; negative offsets clamp to zero
    pub fn set_scroll_left(&mut self, id: NodeId, offset: f64) {
        if let Some(el) = self.nodes.get_mut(&id) {
            el.scroll_left = offset.max(0.0);
        }
    }

    // ─────────────────────────────────────────────────────────
    // Traversal & Queries
    // ─────────────────────────────────────────────────────────

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.element(id).and_then(|el| el.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.element(id).map_or(&[], |el| el.children.as_slice())
    }

    /// All descendants in document (pre-)order, excluding `id`
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// `id` followed by its ancestors up to the root
    pub fn ancestors_inclusive(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.contains(id).then_some(id);
        while let Some(node) = current {
            out.push(node);
            current = self.parent(node);
        }
        out
    }

    /// Nearest of `id` and its ancestors matching `pred`
    pub fn closest<F>(&self, id: NodeId, pred: F) -> Option<NodeId>
    where
        F: Fn(&Element) -> bool,
    {
        self.ancestors_inclusive(id)
            .into_iter()
            .find(|&node| self.element(node).is_some_and(&pred))
    }

    /// First descendant of `root` matching `pred`, in document order
    pub fn find<F>(&self, root: NodeId, pred: F) -> Option<NodeId>
    where
        F: Fn(&Element) -> bool,
    {
        self.descendants(root)
            .into_iter()
            .find(|&node| self.element(node).is_some_and(&pred))
    }

    /// All descendants of `root` matching `pred`, in document order
    pub fn find_all<F>(&self, root: NodeId, pred: F) -> Vec<NodeId>
    where
        F: Fn(&Element) -> bool,
    {
        self.descendants(root)
            .into_iter()
            .filter(|&node| self.element(node).is_some_and(&pred))
            .collect()
    }

    /// First connected element whose `id` attribute equals `dom_id`
    pub fn get_element_by_id(&self, dom_id: &str) -> Option<NodeId> {
        self.find(self.body, |el| el.attr("id") == Some(dom_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu_item(href: &str, label: &str) -> ElementSpec {
        ElementSpec::new("li").class("nav-item").child(
            ElementSpec::new("a")
                .class("nav-link")
                .attr("href", href)
                .child(ElementSpec::new("p").text(label)),
        )
    }

    #[test]
    fn test_new_document_has_body() {
        let doc = Document::new();
        assert!(doc.element(doc.body()).unwrap().is("body"));
        assert!(doc.is_connected(doc.body()));
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_insert_builds_subtree_and_records_root() {
        let mut doc = Document::new();
        let body = doc.body();
        let li = doc.insert(body, menu_item("./a.html", "A"));

        let records = doc.take_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].target, body);
        assert_eq!(records[0].added, vec![li]);
        assert!(!doc.has_pending_records());

        let link = doc.find(li, |el| el.is("a")).unwrap();
        assert_eq!(doc.attr(link, "href"), Some("./a.html"));
        assert_eq!(doc.text_content(li), "A");
    }

    #[test]
    fn test_detached_changes_are_not_recorded() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        let span = doc.create_element("span");
        doc.append_child(div, span);
        assert!(!doc.has_pending_records());

        doc.append_child(doc.body(), div);
        assert_eq!(doc.take_records().len(), 1);
        assert!(doc.is_connected(span));
    }

    #[test]
    fn test_remove_destroys_subtree() {
        let mut doc = Document::new();
        let body = doc.body();
        let li = doc.insert(body, menu_item("./a.html", "A"));
        let link = doc.find(li, |el| el.is("a")).unwrap();
        doc.take_records();

        assert!(doc.remove(li));
        assert!(!doc.contains(li));
        assert!(!doc.contains(link));
        assert!(doc.children(body).is_empty());

        let records = doc.take_records();
        assert_eq!(records[0].removed, vec![li]);
        assert!(!doc.remove(body));
    }

    #[test]
    fn test_append_rejects_cycles() {
        let mut doc = Document::new();
        let outer = doc.insert(doc.body(), ElementSpec::new("div"));
        let inner = doc.insert(outer, ElementSpec::new("div"));
        assert!(!doc.append_child(inner, outer));
        assert_eq!(doc.parent(inner), Some(outer));
    }

    #[test]
    fn test_append_moves_existing_child() {
        let mut doc = Document::new();
        let a = doc.insert(doc.body(), ElementSpec::new("div"));
        let b = doc.insert(doc.body(), ElementSpec::new("div"));
        let child = doc.insert(a, ElementSpec::new("span"));

        doc.append_child(b, child);
        assert!(doc.children(a).is_empty());
        assert_eq!(doc.children(b), &[child]);
    }

    #[test]
    fn test_class_operations() {
        let mut doc = Document::new();
        let el = doc.insert(doc.body(), ElementSpec::new("div").class("tab-pane fade"));

        doc.add_class(el, "active");
        doc.add_class(el, "active");
        assert_eq!(doc.element(el).unwrap().classes().len(), 3);

        assert!(!doc.toggle_class(el, "fade"));
        assert!(doc.toggle_class(el, "fade"));

        doc.add_classes(el, "bg-secondary  text-white");
        assert!(doc.has_class(el, "text-white"));
        doc.remove_classes(el, "bg-secondary text-white");
        assert!(!doc.has_class(el, "bg-secondary"));
    }

    #[test]
    fn test_text_content_excluding() {
        let mut doc = Document::new();
        let p = doc.insert(
            doc.body(),
            ElementSpec::new("p")
                .text("Reports ")
                .child(ElementSpec::new("span").class("right").text("4")),
        );
        assert_eq!(doc.text_content(p), "Reports 4");
        assert_eq!(
            doc.text_content_excluding(p, |el| el.has_class("right")),
            "Reports "
        );
    }

    #[test]
    fn test_queries_follow_document_order() {
        let mut doc = Document::new();
        let body = doc.body();
        doc.insert(body, menu_item("./a.html", "A"));
        doc.insert(body, menu_item("./b.html", "B"));

        let links = doc.find_all(body, |el| el.has_class("nav-link"));
        assert_eq!(links.len(), 2);
        assert_eq!(doc.attr(links[1], "href"), Some("./b.html"));

        let p = doc.find(links[0], |el| el.is("p")).unwrap();
        let li = doc.closest(p, |el| el.has_class("nav-item")).unwrap();
        assert_eq!(doc.parent(li), Some(body));
    }

    #[test]
    fn test_get_element_by_id_ignores_detached() {
        let mut doc = Document::new();
        let detached = doc.create_element("div");
        doc.set_attr(detached, "id", "ghost");
        assert_eq!(doc.get_element_by_id("ghost"), None);

        let el = doc.insert(doc.body(), ElementSpec::new("div").id("real"));
        assert_eq!(doc.get_element_by_id("real"), Some(el));
    }

    #[test]
    fn test_scroll_left_clamps_at_zero() {
        let mut doc = Document::new();
        let strip = doc.insert(doc.body(), ElementSpec::new("ul"));
        doc.set_scroll_left(strip, 80.0);
        assert_eq!(doc.scroll_left(strip), 80.0);
        doc.set_scroll_left(strip, -40.0);
        assert_eq!(doc.scroll_left(strip), 0.0);
    }

    #[test]
    fn test_display_and_attributes() {
        let mut doc = Document::new();
        let el = doc.insert(doc.body(), ElementSpec::new("div"));
        assert_eq!(doc.display(el), None);
        doc.set_display(el, "none");
        assert_eq!(doc.display(el), Some("none"));

        doc.set_attr(el, "aria-loaded", "true");
        assert!(doc.attr_is(el, "aria-loaded", "true"));
        doc.remove_attr(el, "aria-loaded");
        assert!(!doc.has_attr(el, "aria-loaded"));
    }
}
