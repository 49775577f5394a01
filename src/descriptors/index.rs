use std::collections::HashMap;

use crate::error::ErrorKind;
use crate::error::IResult;
use crate::ndf::Node;
use crate::ndf::last_path_token;

/// Stable position of a descriptor inside its [`DescriptorIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DescriptorHandle(usize);

impl DescriptorHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// All named descriptors of one file category, keyed by descriptor name.
///
/// Built once when a dataset is loaded and only ever borrowed afterwards.
/// Nodes keep their file order so iteration is deterministic.
#[derive(Debug, Clone)]
pub struct DescriptorIndex {
    category: &'static str,
    nodes: Vec<Node>,
    handles: HashMap<String, DescriptorHandle>,
}

impl DescriptorIndex {
    pub fn new(category: &'static str, nodes: impl IntoIterator<Item = Node>) -> Self {
        let mut index = Self {
            category,
            nodes: Vec::new(),
            handles: HashMap::new(),
        };
        index.extend(nodes);
        index
    }

    /// Adds descriptors from another file. A later descriptor with the same
    /// name replaces the earlier lookup entry.
    pub fn extend(&mut self, nodes: impl IntoIterator<Item = Node>) {
        for node in nodes {
            let handle = DescriptorHandle(self.nodes.len());
            if let Some(name) = node.name() {
                self.handles.insert(name.to_string(), handle);
            }
            self.nodes.push(node);
        }
    }

    pub fn category(&self) -> &'static str {
        self.category
    }

    pub fn handle(&self, name: &str) -> Option<DescriptorHandle> {
        self.handles.get(name).copied()
    }

    pub fn node(&self, handle: DescriptorHandle) -> &Node {
        &self.nodes[handle.0]
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.handle(name).map(|handle| self.node(handle))
    }

    /// Resolves a descriptor path such as `$/GFX/Weapon/Ammo_X` or `~/Ammo_X`
    /// by its trailing identifier.
    pub fn resolve(&self, path: &str) -> IResult<&Node> {
        let name = last_path_token(path);
        self.get(name).ok_or_else(|| ErrorKind::UnresolvedReference {
            reference: name.to_string(),
            index: self.category,
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
