//! OpenImages label hierarchy tree and subclass expansion.
//!
//! The hierarchy document is a single nested JSON object:
//!
//! ```json
//! {"LabelName": "/m/0bl9f", "Subcategory": [{"LabelName": "/m/01x3z"}]}
//! ```
//!
//! Nodes may also carry a `Part` list (wheels of a car, and so on). Parts
//! are not subclasses, so they are not read.

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::OisampleError;
use crate::ir::LabelId;

/// A node of the label hierarchy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabelNode {
    #[serde(rename = "LabelName")]
    pub label_id: LabelId,

    #[serde(
        rename = "Subcategory",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub children: Vec<LabelNode>,
}

impl LabelNode {
    /// Creates a leaf node.
    pub fn leaf(label_id: impl Into<LabelId>) -> Self {
        Self {
            label_id: label_id.into(),
            children: Vec::new(),
        }
    }

    /// Creates a node with the given children.
    pub fn with_children(label_id: impl Into<LabelId>, children: Vec<LabelNode>) -> Self {
        Self {
            label_id: label_id.into(),
            children,
        }
    }

    /// Returns the first node, in depth-first preorder, whose id is `label_id`.
    pub fn find(&self, label_id: &str) -> Option<&LabelNode> {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.label_id.as_str() == label_id {
                return Some(node);
            }
            // Reversed so the leftmost child is visited first.
            stack.extend(node.children.iter().rev());
        }
        None
    }

    /// Returns this node's id together with the ids of all its descendants.
    pub fn subtree_ids(&self) -> HashSet<LabelId> {
        let mut ids = HashSet::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            ids.insert(node.label_id.clone());
            stack.extend(node.children.iter());
        }
        ids
    }
}

/// Expands `root_id` to itself plus every label below it in `tree`.
///
/// Returns an empty set when `root_id` does not occur anywhere in the tree;
/// callers must treat that as a missing label.
pub fn expand_subclasses(tree: &LabelNode, root_id: &LabelId) -> HashSet<LabelId> {
    tree.find(root_id.as_str())
        .map(LabelNode::subtree_ids)
        .unwrap_or_default()
}

/// Reads the label hierarchy from a JSON file.
pub fn read_hierarchy(path: &Path) -> Result<LabelNode, OisampleError> {
    let file = File::open(path).map_err(OisampleError::Io)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| OisampleError::HierarchyParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads the label hierarchy from a JSON string.
///
/// Useful for testing without file I/O.
pub fn hierarchy_from_str(json: &str) -> Result<LabelNode, OisampleError> {
    serde_json::from_str(json).map_err(|source| OisampleError::HierarchyParse {
        path: Path::new("<string>").to_path_buf(),
        source,
    })
}
