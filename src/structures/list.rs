//! Doubly linked list backing the list value type.
//!
//! Nodes live in a slab addressed by index, so `prev`/`next` are plain indices instead of owning
//! pointers. Freed slots are recycled on the next insertion. A `NodeId` stays valid until its
//! node is removed; using it afterwards may address an unrelated node.
//!
//! The list does no locking of its own. Values embed it behind a mutex so that concurrent pushes
//! and pops on the same key serialize.

use bytes::Bytes;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(usize);

#[derive(Debug)]
struct Node {
    value: Bytes,
    prev: Option<usize>,
    next: Option<usize>,
}

#[derive(Debug, Default)]
pub struct LinkedList {
    nodes: Vec<Option<Node>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl LinkedList {
    pub fn new() -> LinkedList {
        LinkedList::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn head(&self) -> Option<NodeId> {
        self.head.map(NodeId)
    }

    pub fn tail(&self) -> Option<NodeId> {
        self.tail.map(NodeId)
    }

    pub fn get(&self, id: NodeId) -> Option<&Bytes> {
        self.node(id.0).map(|node| &node.value)
    }

    /// Replaces the value held by `id`, returning the previous one.
    pub fn set(&mut self, id: NodeId, value: Bytes) -> Option<Bytes> {
        self.node_mut(id.0)
            .map(|node| std::mem::replace(&mut node.value, value))
    }

    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        self.node(id.0).and_then(|node| node.next).map(NodeId)
    }

    pub fn prev(&self, id: NodeId) -> Option<NodeId> {
        self.node(id.0).and_then(|node| node.prev).map(NodeId)
    }

    pub fn push_front(&mut self, value: Bytes) -> NodeId {
        let id = self.alloc(value, None, self.head);
        match self.head {
            Some(head) => self.link_mut(head).prev = Some(id),
            None => self.tail = Some(id),
        }
        self.head = Some(id);
        self.len += 1;
        NodeId(id)
    }

    pub fn push_back(&mut self, value: Bytes) -> NodeId {
        let id = self.alloc(value, self.tail, None);
        match self.tail {
            Some(tail) => self.link_mut(tail).next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        self.len += 1;
        NodeId(id)
    }

    /// Inserts `value` right before `pivot`. Returns `None` if `pivot` is not a live node.
    pub fn insert_before(&mut self, pivot: NodeId, value: Bytes) -> Option<NodeId> {
        let prev = self.node(pivot.0)?.prev;
        let Some(prev) = prev else {
            return Some(self.push_front(value));
        };

        let id = self.alloc(value, Some(prev), Some(pivot.0));
        self.link_mut(prev).next = Some(id);
        self.link_mut(pivot.0).prev = Some(id);
        self.len += 1;
        Some(NodeId(id))
    }

    /// Inserts `value` right after `pivot`. Returns `None` if `pivot` is not a live node.
    pub fn insert_after(&mut self, pivot: NodeId, value: Bytes) -> Option<NodeId> {
        let next = self.node(pivot.0)?.next;
        let Some(next) = next else {
            return Some(self.push_back(value));
        };

        let id = self.alloc(value, Some(pivot.0), Some(next));
        self.link_mut(pivot.0).next = Some(id);
        self.link_mut(next).prev = Some(id);
        self.len += 1;
        Some(NodeId(id))
    }

    /// First node, scanning from the head, whose value equals `value`.
    pub fn find(&self, value: &[u8]) -> Option<NodeId> {
        let mut cursor = self.head;
        while let Some(id) = cursor {
            let node = self.link(id);
            if node.value == value {
                return Some(NodeId(id));
            }
            cursor = node.next;
        }
        None
    }

    /// Node at position `index`. Negative indices count from the tail, `-1` being the last node.
    /// The walk starts from whichever end is nearer.
    pub fn index(&self, index: i64) -> Option<NodeId> {
        let len = self.len as i64;
        let index = if index < 0 { len + index } else { index };
        if index < 0 || index >= len {
            return None;
        }

        let mut cursor;
        if index <= len / 2 {
            cursor = self.head?;
            for _ in 0..index {
                cursor = self.link(cursor).next?;
            }
        } else {
            cursor = self.tail?;
            for _ in 0..(len - 1 - index) {
                cursor = self.link(cursor).prev?;
            }
        }
        Some(NodeId(cursor))
    }

    /// Unlinks `id` and returns its value.
    pub fn remove(&mut self, id: NodeId) -> Option<Bytes> {
        let node = self.nodes.get_mut(id.0)?.take()?;

        match node.prev {
            Some(prev) => self.link_mut(prev).next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.link_mut(next).prev = node.prev,
            None => self.tail = node.prev,
        }

        self.free.push(id.0);
        self.len -= 1;
        Some(node.value)
    }

    pub fn pop_front(&mut self) -> Option<Bytes> {
        self.head.and_then(|id| self.remove(NodeId(id)))
    }

    pub fn pop_back(&mut self) -> Option<Bytes> {
        self.tail.and_then(|id| self.remove(NodeId(id)))
    }

    /// Moves the tail node to the head.
    pub fn rotate(&mut self) {
        if self.len < 2 {
            return;
        }
        if let Some(value) = self.pop_back() {
            self.push_front(value);
        }
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            front: self.head,
            back: self.tail,
            remaining: self.len,
        }
    }

    fn alloc(&mut self, value: Bytes, prev: Option<usize>, next: Option<usize>) -> usize {
        let node = Some(Node { value, prev, next });
        match self.free.pop() {
            Some(id) => {
                self.nodes[id] = node;
                id
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    fn node(&self, id: usize) -> Option<&Node> {
        self.nodes.get(id).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: usize) -> Option<&mut Node> {
        self.nodes.get_mut(id).and_then(Option::as_mut)
    }

    // Links stored in live nodes always point at live nodes.
    fn link(&self, id: usize) -> &Node {
        match self.node(id) {
            Some(node) => node,
            None => unreachable!("dangling list link {id}"),
        }
    }

    fn link_mut(&mut self, id: usize) -> &mut Node {
        match self.node_mut(id) {
            Some(node) => node,
            None => unreachable!("dangling list link {id}"),
        }
    }
}

impl<I: Into<Bytes>> FromIterator<I> for LinkedList {
    fn from_iter<T: IntoIterator<Item = I>>(iter: T) -> Self {
        let mut list = LinkedList::new();
        for value in iter {
            list.push_back(value.into());
        }
        list
    }
}

pub struct Iter<'a> {
    list: &'a LinkedList,
    front: Option<usize>,
    back: Option<usize>,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Bytes;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.list.link(self.front?);
        self.front = node.next;
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a> DoubleEndedIterator for Iter<'a> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.list.link(self.back?);
        self.back = node.prev;
        self.remaining -= 1;
        Some(&node.value)
    }
}

impl<'a> ExactSizeIterator for Iter<'a> {}
