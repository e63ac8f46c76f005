use std::collections::{HashMap, HashSet};

use crate::domain::Item;

/// A comment that has been fetched and passed the deleted/dead filter.
#[derive(Debug, Clone)]
pub struct CommentNode {
    pub item: Item,
    pub parent_id: i64,
    /// 0 for direct replies to the story.
    pub depth: usize,
    /// Replies attached so far, in arrival order.
    pub children: Vec<i64>,
    pub resolved: bool,
}

impl CommentNode {
    pub fn id(&self) -> i64 {
        self.item.id
    }
}

/// Comment forest under one story, built incrementally as replies arrive.
///
/// Nodes live in an arena keyed by item id. Each id can be claimed once per
/// tree, so a malformed graph that loops back on itself still terminates.
#[derive(Debug, Clone)]
pub struct CommentTree {
    root_id: i64,
    root_child_ids: Vec<i64>,
    nodes: HashMap<i64, CommentNode>,
    top_level: Vec<i64>,
    visited: HashSet<i64>,
    dropped: usize,
}

impl CommentTree {
    pub fn new(root_id: i64, root_child_ids: Vec<i64>) -> Self {
        let mut visited = HashSet::new();
        visited.insert(root_id);
        Self {
            root_id,
            root_child_ids,
            nodes: HashMap::new(),
            top_level: Vec::new(),
            visited,
            dropped: 0,
        }
    }

    pub fn root_id(&self) -> i64 {
        self.root_id
    }

    /// Claim `id` for this tree. Returns `false` if it was already seen.
    pub fn claim(&mut self, id: i64) -> bool {
        self.visited.insert(id)
    }

    /// Attach a resolved comment under `parent_id`.
    ///
    /// Returns `false` if the parent is not part of the tree or the id is
    /// already attached.
    pub fn insert(&mut self, parent_id: i64, depth: usize, item: Item) -> bool {
        let id = item.id;
        if self.nodes.contains_key(&id) {
            return false;
        }
        if parent_id == self.root_id {
            self.top_level.push(id);
        } else if let Some(parent) = self.nodes.get_mut(&parent_id) {
            parent.children.push(id);
        } else {
            return false;
        }

        self.nodes.insert(
            id,
            CommentNode {
                item,
                parent_id,
                depth,
                children: Vec::new(),
                resolved: true,
            },
        );
        true
    }

    pub fn record_dropped(&mut self) {
        self.dropped += 1;
    }

    /// Replies that failed to fetch or were deleted/dead. Their subtrees are
    /// never discovered and so are not counted.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn get(&self, id: i64) -> Option<&CommentNode> {
        self.nodes.get(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Direct replies to the story, in arrival order.
    pub fn top_level(&self) -> impl Iterator<Item = &CommentNode> {
        self.top_level.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Replies to `id`, in arrival order.
    pub fn children(&self, id: i64) -> impl Iterator<Item = &CommentNode> {
        self.nodes
            .get(&id)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|child| self.nodes.get(child))
    }

    /// Depth-first walk in canonical `child_ids` order, skipping replies that
    /// have not arrived (or never will).
    pub fn flatten(&self) -> Vec<&CommentNode> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(i64, i64)> = self
            .root_child_ids
            .iter()
            .rev()
            .map(|id| (*id, self.root_id))
            .collect();

        while let Some((id, parent_id)) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            // an id listed under more than one parent is only shown where it was claimed
            if node.parent_id != parent_id {
                continue;
            }
            out.push(node);
            stack.extend(node.item.child_ids.iter().rev().map(|child| (*child, id)));
        }

        out
    }
}
