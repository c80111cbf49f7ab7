// src/document/tree.rs
//
// Live Document Tree
//
// An arena-backed element tree that behaves like the slice of the DOM the
// enrichment pipeline touches: elements with ordered attributes, text nodes,
// re-parenting on append, and child-list mutation notifications for the
// subtree under the root element.
//
// CRITICAL RULES:
// - Node ids are never reused; a detached node keeps its id and contents
// - Every accessor tolerates unknown ids (returns None / empty) instead of
//   panicking, so stale ids from mutation records are harmless
// - Only mutations of nodes attached to the root are reported to observers

use std::collections::VecDeque;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// Identifier of a node inside one Document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

/// One child-list change, as a mutation observer would report it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub target: NodeId,
    pub added: Vec<NodeId>,
    pub removed: Vec<NodeId>,
}

/// The document: `<html>` root with `<head>` and `<body>`
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    head: NodeId,
    body: NodeId,
    observers: Vec<UnboundedSender<MutationRecord>>,
}

impl Document {
    /// Create an empty document with html/head/body
    pub fn new() -> Self {
        let mut document = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            head: NodeId(0),
            body: NodeId(0),
            observers: Vec::new(),
        };

        let root = document.create_element("html");
        let head = document.create_element("head");
        let body = document.create_element("body");
        document.link(root, head);
        document.link(root, body);

        document.root = root;
        document.head = head;
        document.body = body;
        document
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn head(&self) -> NodeId {
        self.head
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    // ========================================================================
    // OBSERVATION
    // ========================================================================

    /// Subscribe to child-list mutations anywhere under the root.
    ///
    /// Dropping the receiver unsubscribes on the next mutation.
    pub fn observe(&mut self) -> UnboundedReceiver<MutationRecord> {
        let (sender, receiver) = unbounded_channel();
        self.observers.push(sender);
        receiver
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    fn notify(&mut self, record: MutationRecord) {
        if record.added.is_empty() && record.removed.is_empty() {
            return;
        }
        if !self.is_attached(record.target) {
            return;
        }
        self.observers
            .retain(|observer| observer.send(record.clone()).is_ok());
    }

    // ========================================================================
    // CONSTRUCTION & STRUCTURE
    // ========================================================================

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
        })
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Append `child` as the last child of `parent`, moving it out of its
    /// current parent first. Returns false (and changes nothing) when either
    /// id is unknown, when parent is a text node, or when the move would put
    /// a node inside its own subtree.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if !self.is_element(parent) || !self.contains(child) {
            return false;
        }
        if child == parent || self.is_ancestor_of(child, parent) {
            return false;
        }

        if let Some(old_parent) = self.detach(child) {
            self.notify(MutationRecord {
                target: old_parent,
                added: Vec::new(),
                removed: vec![child],
            });
        }

        self.link(parent, child);
        self.notify(MutationRecord {
            target: parent,
            added: vec![child],
            removed: Vec::new(),
        });
        true
    }

    /// Detach every child of `node` (innerHTML = "")
    pub fn clear_children(&mut self, node: NodeId) {
        let removed = match self.nodes.get_mut(node.0) {
            Some(n) => std::mem::take(&mut n.children),
            None => return,
        };
        for child in &removed {
            if let Some(c) = self.nodes.get_mut(child.0) {
                c.parent = None;
            }
        }
        self.notify(MutationRecord {
            target: node,
            added: Vec::new(),
            removed,
        });
    }

    /// Detach `node` from its parent, if any
    pub fn remove(&mut self, node: NodeId) {
        if let Some(old_parent) = self.detach(node) {
            self.notify(MutationRecord {
                target: old_parent,
                added: Vec::new(),
                removed: vec![node],
            });
        }
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        if let Some(c) = self.nodes.get_mut(child.0) {
            c.parent = Some(parent);
        }
        if let Some(p) = self.nodes.get_mut(parent.0) {
            p.children.push(child);
        }
    }

    fn detach(&mut self, node: NodeId) -> Option<NodeId> {
        let parent = self.nodes.get_mut(node.0)?.parent.take()?;
        if let Some(p) = self.nodes.get_mut(parent.0) {
            p.children.retain(|c| *c != node);
        }
        Some(parent)
    }

    // ========================================================================
    // NAVIGATION
    // ========================================================================

    pub fn contains(&self, node: NodeId) -> bool {
        node.0 < self.nodes.len()
    }

    pub(crate) fn node(&self, node: NodeId) -> Option<&Node> {
        self.nodes.get(node.0)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0)?.parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// True when the node is reachable from the root element
    pub fn is_attached(&self, node: NodeId) -> bool {
        node == self.root || self.is_ancestor_of(self.root, node)
    }

    fn is_ancestor_of(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.parent(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Nearest inclusive ancestor with the given tag
    pub fn closest(&self, node: NodeId, tag: &str) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(id) = current {
            if self.tag(id) == Some(tag) {
                return Some(id);
            }
            current = self.parent(id);
        }
        None
    }

    /// All descendants of `node` in document order, excluding `node`
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: VecDeque<NodeId> = self.children(node).iter().copied().collect();
        while let Some(id) = stack.pop_front() {
            out.push(id);
            for child in self.children(id).iter().rev() {
                stack.push_front(*child);
            }
        }
        out
    }

    /// `node` itself followed by its descendants, filtered by `predicate`
    pub fn find_all<P>(&self, node: NodeId, predicate: P) -> Vec<NodeId>
    where
        P: Fn(&Document, NodeId) -> bool,
    {
        std::iter::once(node)
            .chain(self.descendants(node))
            .filter(|id| predicate(self, *id))
            .collect()
    }

    /// First attached element with the given id attribute
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.find_all(self.root, |doc, n| doc.attribute(n, "id") == Some(id))
            .into_iter()
            .next()
    }

    // ========================================================================
    // ELEMENT DATA
    // ========================================================================

    pub fn is_element(&self, node: NodeId) -> bool {
        matches!(
            self.nodes.get(node.0).map(|n| &n.kind),
            Some(NodeKind::Element { .. })
        )
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Element { tag, .. } => Some(tag.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(Node {
            kind: NodeKind::Element { attributes, .. },
            ..
        }) = self.nodes.get_mut(node.0)
        {
            match attributes.iter_mut().find(|(key, _)| key == name) {
                Some((_, existing)) => *existing = value.to_string(),
                None => attributes.push((name.to_string(), value.to_string())),
            }
        }
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(Node {
            kind: NodeKind::Element { attributes, .. },
            ..
        }) = self.nodes.get_mut(node.0)
        {
            attributes.retain(|(key, _)| key != name);
        }
    }

    // ========================================================================
    // CLASSES & STYLE
    // ========================================================================

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.attribute(node, "class")
            .map(|classes| classes.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if self.has_class(node, class) || !self.is_element(node) {
            return;
        }
        let classes = match self.attribute(node, "class") {
            Some(existing) if !existing.trim().is_empty() => {
                format!("{} {}", existing.trim(), class)
            }
            _ => class.to_string(),
        };
        self.set_attribute(node, "class", &classes);
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(existing) = self.attribute(node, "class") {
            let remaining: Vec<&str> = existing.split_whitespace().filter(|c| *c != class).collect();
            let joined = remaining.join(" ");
            self.set_attribute(node, "class", &joined);
        }
    }

    /// Replace all classes starting with `prefix` by `class`
    pub fn replace_class_with_prefix(&mut self, node: NodeId, prefix: &str, class: &str) {
        if let Some(existing) = self.attribute(node, "class") {
            let mut kept: Vec<String> = existing
                .split_whitespace()
                .filter(|c| !c.starts_with(prefix))
                .map(str::to_string)
                .collect();
            kept.push(class.to_string());
            let joined = kept.join(" ");
            self.set_attribute(node, "class", &joined);
        } else {
            self.set_attribute(node, "class", class);
        }
    }

    pub fn style_property(&self, node: NodeId, property: &str) -> Option<String> {
        self.attribute(node, "style")?
            .split(';')
            .filter_map(|decl| decl.split_once(':'))
            .find(|(name, _)| name.trim() == property)
            .map(|(_, value)| value.trim().to_string())
    }

    /// Set one declaration inside the inline `style` attribute
    pub fn set_style_property(&mut self, node: NodeId, property: &str, value: &str) {
        let mut declarations: Vec<(String, String)> = self
            .attribute(node, "style")
            .unwrap_or("")
            .split(';')
            .filter_map(|decl| decl.split_once(':'))
            .map(|(name, v)| (name.trim().to_string(), v.trim().to_string()))
            .filter(|(name, _)| !name.is_empty() && name != property)
            .collect();
        declarations.push((property.to_string(), value.to_string()));

        let style = declarations
            .iter()
            .map(|(name, v)| format!("{}: {}", name, v))
            .collect::<Vec<_>>()
            .join("; ");
        self.set_attribute(node, "style", &style);
    }

    // ========================================================================
    // TEXT
    // ========================================================================

    /// Concatenated text of the node and its descendants
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        for id in std::iter::once(node).chain(self.descendants(node)) {
            if let Some(Node {
                kind: NodeKind::Text(text),
                ..
            }) = self.nodes.get(id.0)
            {
                out.push_str(text);
            }
        }
        out
    }

    /// Replace the children of an element by a single text node
    pub fn set_text(&mut self, node: NodeId, text: &str) {
        if !self.is_element(node) {
            return;
        }
        self.clear_children(node);
        let text_node = self.create_text(text);
        self.append_child(node, text_node);
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
