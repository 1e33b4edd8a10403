//! In-memory model of a parsed diagram dump.

use std::collections::{BTreeMap, HashMap, HashSet};

/// Variable order, in the order the names were first declared.
///
/// The index of a name is assigned on first insertion and never changes,
/// so indices are always `0..len()`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct VariableOrdering {
    names: Vec<String>,
    indices: HashMap<String, usize>,
}

impl VariableOrdering {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index of `name`, declaring it if it is new.
    pub fn insert(&mut self, name: &str) -> usize {
        if let Some(&index) = self.indices.get(name) {
            return index;
        }
        let index = self.names.len();
        self.names.push(name.to_string());
        self.indices.insert(name.to_string(), index);
        index
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.indices.get(name).copied()
    }

    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for VariableOrdering {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut ordering = VariableOrdering::new();
        for name in iter {
            ordering.insert(name.as_ref());
        }
        ordering
    }
}

/// Strips the last dot-delimited segment: `"a.b.3"` is an element of array `"a.b"`.
pub fn base_name(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((base, _)) => base,
        None => name,
    }
}

/// Base names of the variables to keep.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct VisibleSet {
    names: HashSet<String>,
}

impl VisibleSet {
    /// One base name per line; blank lines are ignored, surrounding
    /// whitespace is trimmed.
    pub fn parse(text: &str) -> Self {
        text.lines().collect()
    }

    pub fn insert(&mut self, name: &str) {
        let name = name.trim();
        if !name.is_empty() {
            self.names.insert(name.to_string());
        }
    }

    pub fn contains(&self, base: &str) -> bool {
        self.names.contains(base)
    }

    /// Whether the variable `name` is visible, i.e. its base name is in the set.
    pub fn is_visible(&self, name: &str) -> bool {
        self.contains(base_name(name))
    }

    /// Base names in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for VisibleSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = VisibleSet::default();
        for name in iter {
            set.insert(name.as_ref());
        }
        set
    }
}

/// Target of an edge, with the terminal addresses of the dump normalized.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Child {
    False,
    True,
    Node(u64),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DecisionNode {
    /// Index of the tested variable in the [`VariableOrdering`].
    pub var: usize,
    /// Target of the 1-edge.
    pub then_child: Child,
    /// Target of the 0-edge (dashed in the dump).
    pub else_child: Child,
}

/// A fully resolved diagram dump.
///
/// Every child of a decision node is either a terminal or another decision
/// node of the model. The dumping tool numbers nodes in post-order, so the
/// largest address is the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphModel {
    pub ordering: VariableOrdering,
    pub nodes: BTreeMap<u64, DecisionNode>,
    /// Address of the FALSE terminal in the dump, if declared.
    pub false_terminal: Option<u64>,
    /// Address of the TRUE terminal in the dump, if declared.
    pub true_terminal: Option<u64>,
}

impl GraphModel {
    /// Address of the root node: the largest decision node address.
    pub fn root(&self) -> Option<u64> {
        self.nodes.keys().next_back().copied()
    }

    /// The constant function of a dump without decision nodes that declares
    /// exactly one terminal.
    pub fn constant(&self) -> Option<bool> {
        if !self.nodes.is_empty() {
            return None;
        }
        match (self.false_terminal, self.true_terminal) {
            (Some(_), None) => Some(false),
            (None, Some(_)) => Some(true),
            _ => None,
        }
    }

    /// Evaluate the dumped function on a full assignment (indexed by
    /// variable order) by walking the edges from the root.
    ///
    /// Returns `None` for an empty model or when the walk does not reach a
    /// terminal.
    pub fn evaluate(&self, assignment: &[bool]) -> Option<bool> {
        if let Some(value) = self.constant() {
            return Some(value);
        }
        let mut child = Child::Node(self.root()?);
        for _ in 0..=self.nodes.len() {
            match child {
                Child::False => return Some(false),
                Child::True => return Some(true),
                Child::Node(address) => {
                    let node = self.nodes.get(&address)?;
                    child = if *assignment.get(node.var)? {
                        node.then_child
                    } else {
                        node.else_child
                    };
                }
            }
        }
        None
    }
}
