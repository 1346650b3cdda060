//! Path node model.
//!
//! Every grammar statement of a run is merged into one [`PathTree`]. Nodes
//! live in an arena and refer to their parent by [`NodeId`], so statements
//! sharing a prefix share the same ancestor nodes.

use crate::naming;
use std::collections::HashMap;
use std::fmt;

/// Index of a node inside its [`PathTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// An intermediate directory. Dynamic folders are addressed by a runtime key.
    Folder { dynamic: bool },
    /// The leaf document, optionally decoded into `target`.
    File { target: Option<syn::Path> },
}

impl NodeKind {
    pub fn is_folder(&self) -> bool {
        matches!(self, NodeKind::Folder { .. })
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Folder { dynamic: true } => write!(f, "a dynamic folder"),
            NodeKind::Folder { dynamic: false } => write!(f, "a static folder"),
            NodeKind::File { target: Some(target) } => {
                write!(f, "a record of `{}`", naming::path_text(target))
            }
            NodeKind::File { target: None } => write!(f, "an untyped record"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    name: String,
    kind: NodeKind,
    parent: Option<NodeId>,
}

impl Node {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_folder(&self) -> bool {
        self.kind.is_folder()
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self.kind, NodeKind::Folder { dynamic: true })
    }

    pub fn target(&self) -> Option<&syn::Path> {
        match &self.kind {
            NodeKind::File { target } => target.as_ref(),
            NodeKind::Folder { .. } => None,
        }
    }

    pub fn title(&self) -> String {
        naming::title(&self.name)
    }

    /// Literal directory name of a static folder.
    pub fn param(&self) -> String {
        self.name.to_lowercase()
    }

    pub fn class_name(&self) -> String {
        class_name(&self.name, self.is_folder())
    }

    pub fn method_name(&self) -> String {
        naming::snake(&self.name)
    }

    pub fn parent_methods(&self) -> Vec<String> {
        parent_methods(&self.name, &self.kind)
    }
}

/// e.g. ("user", true) -> "UserCollection", ("user", false) -> "UserRecord"
pub fn class_name(name: &str, is_folder: bool) -> String {
    let suffix = if is_folder { "Collection" } else { "Record" };
    format!("{}{}", naming::title(name), suffix)
}

/// Methods a node adds to its parent collection's impl, without raw
/// identifier prefixes.
pub fn parent_methods(name: &str, kind: &NodeKind) -> Vec<String> {
    let stem = naming::snake(name);
    match kind {
        NodeKind::Folder { dynamic: false } => vec![stem],
        NodeKind::Folder { dynamic: true } => vec![format!("list_{stem}s"), stem],
        NodeKind::File { target } => {
            let mut methods = vec![
                format!("get_{stem}_record"),
                format!("save_{stem}"),
                format!("save_{stem}_binary"),
                format!("iterate_{stem}s"),
                format!("list_{stem}s"),
            ];
            if target.is_some() {
                methods.insert(0, format!("get_{stem}"));
            }
            methods
        }
    }
}

/// Arena of path nodes rooted at a single static folder.
#[derive(Debug, Clone)]
pub struct PathTree {
    nodes: Vec<Node>,
    children: HashMap<(NodeId, String), NodeId>,
}

impl PathTree {
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            nodes: vec![Node {
                name: root_name.into(),
                kind: NodeKind::Folder { dynamic: false },
                parent: None,
            }],
            children: HashMap::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.children.get(&(parent, name.to_string())).copied()
    }

    /// Direct children of `parent` in creation order.
    pub fn children(&self, parent: NodeId) -> Vec<NodeId> {
        let mut children: Vec<NodeId> = self
            .children
            .iter()
            .filter(|((owner, _), _)| *owner == parent)
            .map(|(_, id)| *id)
            .collect();
        children.sort();
        children
    }

    /// The node itself, then each ancestor up to and including the root.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: Some(id),
        }
    }

    /// Slash-joined names from the root to `id`, root included.
    pub fn full_path(&self, id: NodeId) -> String {
        let mut names: Vec<&str> = self.ancestors(id).map(|n| self.node(n).name()).collect();
        names.reverse();
        names.join("/")
    }

    /// Slash-joined names below the root, as written in the grammar.
    pub fn relative_path(&self, id: NodeId) -> String {
        let mut names: Vec<&str> = self
            .ancestors(id)
            .filter(|n| *n != self.root())
            .map(|n| self.node(n).name())
            .collect();
        names.reverse();
        names.join("/")
    }

    pub fn find_class(&self, class: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.class_name() == class)
            .map(NodeId)
    }

    pub(crate) fn push(&mut self, name: String, kind: NodeKind, parent: NodeId) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.children.insert((parent, name.clone()), id);
        self.nodes.push(Node {
            name,
            kind,
            parent: Some(parent),
        });
        id
    }
}

/// Iterator returned by [`PathTree::ancestors`].
pub struct Ancestors<'a> {
    tree: &'a PathTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> (PathTree, NodeId) {
        let mut tree = PathTree::new("data");
        let group = tree.push(
            "group".into(),
            NodeKind::Folder { dynamic: false },
            tree.root(),
        );
        let id = tree.push("id".into(), NodeKind::Folder { dynamic: true }, group);
        let target = syn::parse_str("Meta").unwrap();
        let meta = tree.push(
            "meta".into(),
            NodeKind::File {
                target: Some(target),
            },
            id,
        );
        (tree, meta)
    }

    #[test]
    fn test_derived_names() {
        let mut tree = PathTree::new("data");
        let folder = tree.push(
            "user".into(),
            NodeKind::Folder { dynamic: false },
            tree.root(),
        );
        let file = tree.push("user".into(), NodeKind::File { target: None }, folder);

        assert_eq!(tree.node(folder).class_name(), "UserCollection");
        assert_eq!(tree.node(file).class_name(), "UserRecord");
        assert_eq!(tree.node(folder).title(), "User");
        assert_eq!(tree.node(folder).param(), "user");
        assert_eq!(tree.node(tree.root()).class_name(), "DataCollection");
    }

    #[test]
    fn test_param_is_lowercased_name() {
        let mut tree = PathTree::new("data");
        let folder = tree.push(
            "UserProfiles".into(),
            NodeKind::Folder { dynamic: false },
            tree.root(),
        );
        let node = tree.node(folder);
        assert_eq!(node.param(), "userprofiles");
        assert_eq!(node.title(), "UserProfiles");
        assert_eq!(node.method_name(), "user_profiles");
    }

    #[test]
    fn test_paths_and_ancestors() {
        let (tree, meta) = chain();
        assert_eq!(tree.full_path(meta), "data/group/id/meta");
        assert_eq!(tree.relative_path(meta), "group/id/meta");
        assert_eq!(tree.full_path(tree.root()), "data");
        assert_eq!(tree.relative_path(tree.root()), "");

        let names: Vec<_> = tree
            .ancestors(meta)
            .map(|id| tree.node(id).name().to_string())
            .collect();
        assert_eq!(names, vec!["meta", "id", "group", "data"]);
    }

    #[test]
    fn test_node_attributes() {
        let (tree, meta) = chain();
        let node = tree.node(meta);
        assert!(!node.is_folder());
        assert!(!node.is_dynamic());
        assert_eq!(node.target().map(naming::path_text).as_deref(), Some("Meta"));

        let id = node.parent().unwrap();
        assert!(tree.node(id).is_folder());
        assert!(tree.node(id).is_dynamic());
        assert_eq!(tree.child(id, "meta"), Some(meta));
        assert_eq!(tree.child(id, "other"), None);
    }

    #[test]
    fn test_find_class() {
        let (tree, meta) = chain();
        assert_eq!(tree.find_class("MetaRecord"), Some(meta));
        assert_eq!(tree.find_class("DataCollection"), Some(tree.root()));
        assert_eq!(tree.find_class("MetaCollection"), None);
    }

    #[test]
    fn test_children_in_creation_order() {
        let (mut tree, meta) = chain();
        let id = tree.parent(meta).unwrap();
        let group = tree.parent(id).unwrap();
        let extra = tree.push("extra".into(), NodeKind::File { target: None }, group);

        assert_eq!(tree.children(group), vec![id, extra]);
        assert_eq!(tree.children(tree.root()), vec![group]);
        assert!(tree.children(meta).is_empty());
        assert_eq!(tree.node_count(), 5);
    }

    #[test]
    fn test_parent_methods() {
        assert_eq!(
            parent_methods("Users", &NodeKind::Folder { dynamic: false }),
            vec!["users"]
        );
        assert_eq!(
            parent_methods("Item", &NodeKind::Folder { dynamic: true }),
            vec!["list_items", "item"]
        );
        assert_eq!(
            parent_methods("item", &NodeKind::File { target: None }),
            vec![
                "get_item_record",
                "save_item",
                "save_item_binary",
                "iterate_items",
                "list_items",
            ]
        );
        let (tree, meta) = chain();
        assert_eq!(tree.node(meta).parent_methods()[0], "get_meta");
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(
            NodeKind::Folder { dynamic: true }.to_string(),
            "a dynamic folder"
        );
        let target = syn::parse_str("models::User").unwrap();
        assert_eq!(
            NodeKind::File {
                target: Some(target)
            }
            .to_string(),
            "a record of `models::User`"
        );
    }
}
