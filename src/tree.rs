//! Ordered key/string-value tree backing every configuration instance.
//!
//! Every node carries a string value (empty by default), so a node can be
//! both an intermediate and a value holder. Children keep insertion order,
//! which is what makes the serializer's depth-first walk deterministic.
//! `Tree` is `Clone`; derived instances are produced by copy-then-mutate,
//! never by mutating a shared tree.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TreeError {
    #[error("empty path")]
    EmptyPath,

    #[error("path starts at '{given}', tree is rooted at '{root}'")]
    ForeignRoot { root: String, given: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub key: String,
    pub value: String,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(key: impl Into<String>) -> Node {
        Node {
            key: key.into(),
            value: String::new(),
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Tree {
    root: Node,
}

impl Tree {
    pub fn new(root_key: impl Into<String>) -> Tree {
        Tree {
            root: Node::new(root_key),
        }
    }

    pub fn with_root(root: Node) -> Tree {
        Tree { root }
    }

    /// Navigate to the node addressed by the full segment path. The first
    /// segment must name the root.
    pub fn node_at(&self, path: &[String]) -> Option<&Node> {
        let (first, rest) = path.split_first()?;
        if *first != self.root.key {
            return None;
        }
        let mut current = &self.root;
        for segment in rest {
            current = current.children.iter().find(|child| child.key == *segment)?;
        }
        Some(current)
    }

    pub fn value_at(&self, path: &[String]) -> Option<&str> {
        self.node_at(path).map(|node| node.value.as_str())
    }

    /// Create-or-overwrite the value at `path`, creating intermediate nodes
    /// as needed. Existing values along the way are left alone.
    pub fn set_value_at(&mut self, path: &[String], value: &str) -> Result<(), TreeError> {
        let (first, rest) = path.split_first().ok_or(TreeError::EmptyPath)?;
        if *first != self.root.key {
            return Err(TreeError::ForeignRoot {
                root: self.root.key.clone(),
                given: first.clone(),
            });
        }
        let mut current = &mut self.root;
        for segment in rest {
            let index = match current
                .children
                .iter()
                .position(|child| child.key == *segment)
            {
                Some(index) => index,
                None => {
                    current.children.push(Node::new(segment.clone()));
                    current.children.len() - 1
                }
            };
            current = &mut current.children[index];
        }
        current.value = value.to_string();
        Ok(())
    }

    /// Deep-copy the subtree rooted at `path` into a new tree whose root is
    /// the addressed node. `None` if the path does not resolve.
    pub fn copy_at(&self, path: &[String]) -> Option<Tree> {
        self.node_at(path).map(|node| Tree { root: node.clone() })
    }

    pub fn set_root_key(&mut self, key: impl Into<String>) {
        self.root.key = key.into();
    }

    /// Visit every node depth-first in pre-order, passing the full segment
    /// path and the node's value. Each node is visited exactly once.
    pub fn for_each(&self, mut visit: impl FnMut(&[String], &str)) {
        let mut stack = Vec::new();
        visit_node(&self.root, &mut stack, &mut visit);
    }
}

fn visit_node(node: &Node, stack: &mut Vec<String>, visit: &mut impl FnMut(&[String], &str)) {
    stack.push(node.key.clone());
    visit(stack, &node.value);
    for child in &node.children {
        visit_node(child, stack, visit);
    }
    stack.pop();
}
