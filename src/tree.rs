//! Arena of tableau nodes.
//!
//! Nodes are addressed by `NodeId` and never removed, so ids stay valid for the lifetime of the
//! tree. Each node stores its parent and its children in decomposition order.

use crate::sentence::Sentence;
use rustc_hash::FxHashSet;
use std::fmt;
use std::ops::Index;

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NodeId(usize);

impl NodeId {
    /// First node of a tree, the root of every copy made by [`Tree::copy_from`].
    pub const ROOT: Self = Self(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// Decomposition state of a node
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Decomposition {
    /// Decomposable, not yet expanded.
    Pending,
    /// Symbol or negated symbol, never expanded.
    Primitive,
    /// Expanded at the given 1-based step.
    At(usize),
}

#[derive(Clone, Debug)]
pub struct Node {
    sentence: Sentence,
    decomposition: Decomposition,
    action_space: Vec<Sentence>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn sentence(&self) -> &Sentence {
        &self.sentence
    }

    pub fn decomposition(&self) -> Decomposition {
        self.decomposition
    }

    pub fn decomposed_at(&self) -> Option<usize> {
        match self.decomposition {
            Decomposition::At(step) => Some(step),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.decomposition == Decomposition::Pending
    }

    /// Sentences on the path to this node that are still to be decomposed below it.
    pub fn action_space(&self) -> &[Sentence] {
        &self.action_space
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Clone, Debug, Default)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Index<NodeId> for Tree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i), node))
    }

    /// Adds a node without a parent.
    pub fn add_root(&mut self, sentence: Sentence) -> NodeId {
        self.push(None, sentence)
    }

    /// Appends a new last child to `parent`.
    pub fn add_child(&mut self, parent: NodeId, sentence: Sentence) -> NodeId {
        self.push(Some(parent), sentence)
    }

    /// Simplifies and classifies the sentence, then attaches it as a new node.
    fn push(&mut self, parent: Option<NodeId>, sentence: Sentence) -> NodeId {
        let sentence = sentence.deep_simplified().clone();
        let decomposition = if sentence.is_primitive() {
            Decomposition::Primitive
        } else {
            Decomposition::Pending
        };
        let mut action_space = parent
            .map(|p| self[p].action_space.clone())
            .unwrap_or_default();
        if decomposition == Decomposition::Pending && !action_space.contains(&sentence) {
            action_space.push(sentence.clone());
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            sentence,
            decomposition,
            action_space,
            parent,
            children: vec![],
        });
        if let Some(p) = parent {
            self.nodes[p.0].children.push(id);
        }
        id
    }

    /// Grows every branch below `leaf` as a chain of new nodes and returns the number of nodes added.
    pub fn grow(&mut self, leaf: NodeId, branches: &[Vec<Sentence>]) -> usize {
        let mut added = 0;
        for branch in branches {
            let mut node = leaf;
            for p in branch {
                node = self.add_child(node, p.clone());
                added += 1;
            }
        }
        added
    }

    pub(crate) fn set_decomposed(&mut self, id: NodeId, step: usize) {
        self.nodes[id.0].decomposition = Decomposition::At(step);
    }

    pub(crate) fn remove_action(&mut self, id: NodeId, action: &Sentence) {
        self.nodes[id.0].action_space.retain(|p| p != action);
    }

    /// The node itself followed by its parent, grandparent and so on up to the root.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: Some(id),
        }
    }

    /// Depth-first pre-order over the subtree rooted at `id`.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: vec![id],
        }
    }

    /// Leaves of the subtree rooted at `id`, left to right.
    pub fn leaves(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.descendants(id).filter(|&id| self[id].is_leaf())
    }

    /// Follows `n` single-child steps from `id`.
    pub fn nth_single_child(&self, id: NodeId, n: usize) -> Option<NodeId> {
        let mut current = id;
        for _ in 0..n {
            let [child] = self[current].children.as_slice() else {
                return None;
            };
            current = *child;
        }
        Some(current)
    }

    /// Checks whether no symbol occurs both plain and negated on the path from `leaf` to the
    /// root, together with `extra`.
    pub fn is_open_with(&self, leaf: NodeId, extra: &[Sentence]) -> bool {
        let mut positive = FxHashSet::default();
        let mut negative = FxHashSet::default();
        let path = self.ancestors(leaf).map(|id| &self[id].sentence);
        for p in path.chain(extra) {
            let Some((name, polarity)) = p.literal() else {
                continue;
            };
            let contradicted = if polarity {
                positive.insert(name);
                negative.contains(name)
            } else {
                negative.insert(name);
                positive.contains(name)
            };
            if contradicted {
                return false;
            }
        }
        true
    }

    pub fn is_open(&self, leaf: NodeId) -> bool {
        self.is_open_with(leaf, &[])
    }

    /// Open leaves below `id`, treating `extra` as if it were on every path.
    pub fn open_leaves_with(&self, id: NodeId, extra: &[Sentence]) -> Vec<NodeId> {
        self.leaves(id)
            .filter(|&leaf| self.is_open_with(leaf, extra))
            .collect()
    }

    pub fn open_leaves(&self, id: NodeId) -> Vec<NodeId> {
        self.open_leaves_with(id, &[])
    }

    /// Copies the subtree rooted at `root` into a new tree whose root is `NodeId(0)`.
    ///
    /// Every node allocated after `root` must descend from it, which holds for the node that
    /// ends the trunk, so the copy is a slice clone with shifted ids.
    pub fn copy_from(&self, root: NodeId) -> Self {
        let offset = root.0;
        debug_assert!(self.nodes[offset + 1..]
            .iter()
            .all(|node| node.parent.is_some_and(|p| p.0 >= offset)));
        let nodes = self.nodes[offset..]
            .iter()
            .map(|node| Node {
                sentence: node.sentence.clone(),
                decomposition: node.decomposition,
                action_space: node.action_space.clone(),
                parent: node
                    .parent
                    .filter(|p| p.0 >= offset)
                    .map(|p| NodeId(p.0 - offset)),
                children: node.children.iter().map(|c| NodeId(c.0 - offset)).collect(),
            })
            .collect();
        Self { nodes }
    }

    /// Returns an indented text outline of the subtree rooted at `id`.
    ///
    /// Branching indents, chains do not. `[n]` marks the step a node was decomposed at, leaves
    /// end with `x` when closed and `o` when open.
    pub fn outline(&self, id: NodeId) -> Outline<'_> {
        Outline { tree: self, id }
    }
}

pub struct Ancestors<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.tree[id].parent;
        Some(id)
    }
}

pub struct Descendants<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack.extend(self.tree[id].children.iter().rev());
        Some(id)
    }
}

pub struct Outline<'a> {
    tree: &'a Tree,
    id: NodeId,
}

impl Outline<'_> {
    fn write_rec(&self, f: &mut fmt::Formatter<'_>, id: NodeId, depth: usize) -> fmt::Result {
        let node = &self.tree[id];
        write!(f, "{}{}", "  ".repeat(depth), node.sentence)?;
        if let Some(step) = node.decomposed_at() {
            write!(f, " [{step}]")?;
        }
        if node.is_leaf() {
            let mark = if self.tree.is_open(id) { 'o' } else { 'x' };
            write!(f, " {mark}")?;
        }
        writeln!(f)?;
        let depth = if node.children.len() > 1 { depth + 1 } else { depth };
        for &child in &node.children {
            self.write_rec(f, child, depth)?;
        }
        Ok(())
    }
}

impl fmt::Display for Outline<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_rec(f, self.id, 0)
    }
}
