use super::node::XmlNodeData;
use super::xname::XName;
use indextree::{Arena, NodeId};

#[derive(Debug, Clone)]
pub struct XmlDocument {
    arena: Arena<XmlNodeData>,
    root: Option<NodeId>,
}

impl XmlDocument {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&XmlNodeData> {
        self.arena.get(id).map(|node| node.get())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut XmlNodeData> {
        self.arena.get_mut(id).map(|node| node.get_mut())
    }

    pub fn add_root(&mut self, data: XmlNodeData) -> NodeId {
        let id = self.arena.new_node(data);
        self.root = Some(id);
        id
    }

    pub fn add_child(&mut self, parent: NodeId, data: XmlNodeData) -> NodeId {
        let child = self.arena.new_node(data);
        parent.append(child, &mut self.arena);
        child
    }

    pub fn add_before(&mut self, sibling: NodeId, data: XmlNodeData) -> NodeId {
        let new_node = self.arena.new_node(data);
        sibling.insert_before(new_node, &mut self.arena);
        new_node
    }

    pub fn add_after(&mut self, sibling: NodeId, data: XmlNodeData) -> NodeId {
        let new_node = self.arena.new_node(data);
        sibling.insert_after(new_node, &mut self.arena);
        new_node
    }

    /// Detaches `node` together with its whole subtree.
    pub fn remove(&mut self, node: NodeId) {
        node.remove_subtree(&mut self.arena);
    }

    pub fn remove_children(&mut self, node: NodeId) {
        let children: Vec<_> = self.children(node).collect();
        for child in children {
            self.remove(child);
        }
    }

    /// Copies the subtree rooted at `node` and inserts the copy as its next sibling.
    pub fn clone_after(&mut self, node: NodeId) -> Option<NodeId> {
        let data = self.get(node)?.clone();
        let copy = self.add_after(node, data);
        self.clone_children_into(node, copy);
        Some(copy)
    }

    /// Copies the subtree rooted at `node` as the last child of `parent`.
    pub fn copy_into(&mut self, node: NodeId, parent: NodeId) -> Option<NodeId> {
        let data = self.get(node)?.clone();
        let copy = self.add_child(parent, data);
        self.clone_children_into(node, copy);
        Some(copy)
    }

    fn clone_children_into(&mut self, from: NodeId, to: NodeId) {
        let children: Vec<_> = self.children(from).collect();
        for child in children {
            let Some(data) = self.get(child).cloned() else {
                continue;
            };
            let copy = self.add_child(to, data);
            self.clone_children_into(child, copy);
        }
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &XName, value: &str) {
        if let Some(data) = self.get_mut(node) {
            data.set_attribute(name, value);
        }
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &XName) {
        if let Some(data) = self.get_mut(node) {
            data.remove_attribute(name);
        }
    }

    pub fn attribute(&self, node: NodeId, name: &XName) -> Option<&str> {
        self.get(node)?.attribute(name)
    }

    pub fn name(&self, node: NodeId) -> Option<&XName> {
        self.get(node)?.name()
    }

    pub fn is_named(&self, node: NodeId, name: &XName) -> bool {
        self.get(node).is_some_and(|d| d.is_named(name))
    }

    pub fn children(&self, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        parent.children(&self.arena)
    }

    /// Child elements only, skipping text, comments and processing instructions.
    pub fn element_children(&self, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(parent)
            .filter(move |&id| self.get(id).map(|d| d.is_element()).unwrap_or(false))
    }

    /// Pre-order traversal starting with `node` itself.
    pub fn descendants(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        node.descendants(&self.arena)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.arena.get(node)?.parent()
    }

    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        node.ancestors(&self.arena)
    }

    pub fn elements_by_name<'a>(
        &'a self,
        parent: NodeId,
        name: &'a XName,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.children(parent)
            .filter(move |&child_id| self.is_named(child_id, name))
    }

    pub fn find_child(&self, parent: NodeId, name: &XName) -> Option<NodeId> {
        self.elements_by_name(parent, name).next()
    }

    pub fn find_descendant(&self, node: NodeId, name: &XName) -> Option<NodeId> {
        self.descendants(node)
            .skip(1)
            .find(|&id| self.is_named(id, name))
    }

    pub fn descendants_named<'a>(
        &'a self,
        node: NodeId,
        name: &'a XName,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.descendants(node)
            .skip(1)
            .filter(move |&id| self.is_named(id, name))
    }

    /// Concatenated text of every text node below `node`.
    pub fn text_content(&self, node: NodeId) -> String {
        self.descendants(node)
            .filter_map(|id| self.get(id).and_then(|d| d.text_value()))
            .collect()
    }

    /// Replaces every child of `node` with a single text node.
    pub fn set_text(&mut self, node: NodeId, text: &str) {
        self.remove_children(node);
        if !text.is_empty() {
            self.add_child(node, XmlNodeData::text(text));
        }
    }
}

impl Default for XmlDocument {
    fn default() -> Self {
        Self::new()
    }
}
