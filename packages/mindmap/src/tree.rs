//! Arena-backed ordered tree.
//!
//! Nodes live in a generational arena and refer to each other through
//! [`NodeId`] handles. Cloning or dropping a tree touches a flat vector, so
//! the depth of a document never turns into call-stack depth.

use std::collections::VecDeque;
use std::ops::{Index, IndexMut};

use generational_arena::{Arena, Index as ArenaIndex};

/// Handle of a node inside a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(ArenaIndex);

#[derive(Debug, Clone)]
struct Slot<T> {
    data: T,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Ordered tree with a single root.
#[derive(Debug, Clone)]
pub struct Tree<T> {
    arena: Arena<Slot<T>>,
    root: NodeId,
}

impl<T> Tree<T> {
    /// Create a tree holding only `root`.
    pub fn new(root: T) -> Self {
        let mut arena = Arena::new();
        let root = NodeId(arena.insert(Slot {
            data: root,
            parent: None,
            children: Vec::new(),
        }));
        Self { arena, root }
    }

    /// Id of the root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// A tree always holds at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Check whether `id` still refers to a node of this tree.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id.0)
    }

    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.arena.get(id.0).map(|slot| &slot.data)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.arena.get_mut(id.0).map(|slot| &mut slot.data)
    }

    /// Children of `id` in document order. Empty for stale ids.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.arena
            .get(id.0)
            .map(|slot| slot.children.as_slice())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id.0).and_then(|slot| slot.parent)
    }

    /// Append `data` as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, data: T) -> NodeId {
        let position = self.children(parent).len();
        self.insert(parent, position, data)
    }

    /// Insert `data` as child of `parent` at `position` (clamped to the child count).
    pub fn insert(&mut self, parent: NodeId, position: usize, data: T) -> NodeId {
        let id = NodeId(self.arena.insert(Slot {
            data,
            parent: Some(parent),
            children: Vec::new(),
        }));
        if let Some(slot) = self.arena.get_mut(parent.0) {
            let position = position.min(slot.children.len());
            slot.children.insert(position, id);
        }
        id
    }

    /// Replace the child list of `id` with a permutation of itself.
    ///
    /// Lists that are not a permutation of the current children are ignored.
    pub fn set_children(&mut self, id: NodeId, children: Vec<NodeId>) {
        let Some(slot) = self.arena.get_mut(id.0) else {
            return;
        };
        let mut current = slot.children.clone();
        let mut proposed = children.clone();
        current.sort_unstable_by_key(|c| c.0.into_raw_parts());
        proposed.sort_unstable_by_key(|c| c.0.into_raw_parts());
        if current == proposed {
            slot.children = children;
        }
    }

    /// Detach `id` from its parent and free its whole subtree.
    ///
    /// Returns the payload of `id`. The root cannot be removed.
    pub fn remove(&mut self, id: NodeId) -> Option<T> {
        if id == self.root {
            return None;
        }
        let parent = self.parent(id);
        if let Some(parent_slot) = parent.and_then(|p| self.arena.get_mut(p.0)) {
            parent_slot.children.retain(|c| *c != id);
        }

        let slot = self.arena.remove(id.0)?;
        let mut pending: Vec<NodeId> = slot.children;
        while let Some(next) = pending.pop() {
            if let Some(removed) = self.arena.remove(next.0) {
                pending.extend(removed.children);
            }
        }
        Some(slot.data)
    }

    /// Maximum number of nodes on a root-to-leaf path.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut queue = VecDeque::from([(self.root, 1)]);
        while let Some((id, depth)) = queue.pop_front() {
            max_depth = max_depth.max(depth);
            for &child in self.children(id) {
                queue.push_back((child, depth + 1));
            }
        }
        max_depth
    }

    /// Children of `id` whose payload satisfies `predicate`.
    pub fn find_children(&self, id: NodeId, predicate: impl Fn(&T) -> bool) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| self.get(child).is_some_and(&predicate))
            .collect()
    }

    /// Breadth-first iterator starting at the root.
    #[must_use]
    pub fn iter(&self) -> BreadthFirst<'_, T> {
        BreadthFirst {
            tree: self,
            queue: VecDeque::from([self.root]),
        }
    }
}

impl<T: Clone> Tree<T> {
    /// Copy the subtree rooted at `source_id` of `source` under `parent`.
    ///
    /// The copy is appended after the existing children of `parent`.
    pub fn graft(&mut self, parent: NodeId, source: &Tree<T>, source_id: NodeId) -> Option<NodeId> {
        let data = source.get(source_id)?.clone();
        let top = self.append(parent, data);
        let mut queue = VecDeque::from([(source_id, top)]);
        while let Some((from, to)) = queue.pop_front() {
            for &child in source.children(from) {
                if let Some(data) = source.get(child) {
                    let copied = self.append(to, data.clone());
                    queue.push_back((child, copied));
                }
            }
        }
        Some(top)
    }
}

impl<T> Index<NodeId> for Tree<T> {
    type Output = T;

    /// # Panics
    /// Panics when `id` does not belong to this tree.
    fn index(&self, id: NodeId) -> &T {
        &self.arena[id.0].data
    }
}

impl<T> IndexMut<NodeId> for Tree<T> {
    fn index_mut(&mut self, id: NodeId) -> &mut T {
        &mut self.arena[id.0].data
    }
}

/// Breadth-first traversal over `(id, payload)` pairs.
pub struct BreadthFirst<'a, T> {
    tree: &'a Tree<T>,
    queue: VecDeque<NodeId>,
}

impl<'a, T> Iterator for BreadthFirst<'a, T> {
    type Item = (NodeId, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.queue.pop_front() {
            if let Some(data) = self.tree.get(id) {
                self.queue.extend(self.tree.children(id).iter().copied());
                return Some((id, data));
            }
        }
        None
    }
}
