//! Skip list ordered by `(score, member)` with rank bookkeeping.
//!
//! Nodes are kept in a slab and linked by index. Slot 0 is the header sentinel, which carries
//! every level. Each level link records its `span`, the number of level-0 steps it jumps over,
//! which is what turns rank lookups into a single top-down descent.
//!
//! The structure is not synchronized; the sorted-set value guards it with a mutex.

use rand::Rng;

pub const MAX_LEVEL: usize = 32;
const HEADER: usize = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, Default)]
struct Level {
    forward: Option<usize>,
    span: usize,
}

#[derive(Debug)]
struct Node {
    member: String,
    score: f64,
    backward: Option<usize>,
    levels: Vec<Level>,
}

impl Node {
    /// Whether this node sorts strictly before `(score, member)`.
    fn precedes(&self, score: f64, member: &str) -> bool {
        self.score < score || (self.score == score && self.member.as_str() < member)
    }

    fn is(&self, score: f64, member: &str) -> bool {
        self.score == score && self.member == member
    }
}

/// A score interval. Either bound may be exclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeSpec {
    pub min: f64,
    pub max: f64,
    pub min_exclusive: bool,
    pub max_exclusive: bool,
}

impl RangeSpec {
    pub fn inclusive(min: f64, max: f64) -> RangeSpec {
        RangeSpec {
            min,
            max,
            min_exclusive: false,
            max_exclusive: false,
        }
    }

    pub fn gte_min(&self, score: f64) -> bool {
        if self.min_exclusive {
            score > self.min
        } else {
            score >= self.min
        }
    }

    pub fn lte_max(&self, score: f64) -> bool {
        if self.max_exclusive {
            score < self.max
        } else {
            score <= self.max
        }
    }

    pub fn contains(&self, score: f64) -> bool {
        self.gte_min(score) && self.lte_max(score)
    }

    /// No score can ever satisfy the interval.
    pub fn is_empty(&self) -> bool {
        self.min > self.max || (self.min == self.max && (self.min_exclusive || self.max_exclusive))
    }
}

#[derive(Debug)]
pub struct SkipList {
    nodes: Vec<Option<Node>>,
    free: Vec<usize>,
    tail: Option<usize>,
    length: usize,
    level: usize,
}

impl Default for SkipList {
    fn default() -> Self {
        SkipList::new()
    }
}

impl SkipList {
    pub fn new() -> SkipList {
        let header = Node {
            member: String::new(),
            score: 0.0,
            backward: None,
            levels: vec![Level::default(); MAX_LEVEL],
        };
        SkipList {
            nodes: vec![Some(header)],
            free: Vec::new(),
            tail: None,
            length: 0,
            level: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn member(&self, id: NodeId) -> &str {
        &self.node(id.0).member
    }

    pub fn score(&self, id: NodeId) -> f64 {
        self.node(id.0).score
    }

    pub fn first(&self) -> Option<NodeId> {
        self.forward(HEADER, 0).map(NodeId)
    }

    pub fn last(&self) -> Option<NodeId> {
        self.tail.map(NodeId)
    }

    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        self.forward(id.0, 0).map(NodeId)
    }

    pub fn prev(&self, id: NodeId) -> Option<NodeId> {
        self.node(id.0).backward.map(NodeId)
    }

    /// Inserts a new element. The caller guarantees `member` is not already present.
    pub fn insert(&mut self, member: String, score: f64) -> NodeId {
        let mut update = [HEADER; MAX_LEVEL];
        let mut rank = [0usize; MAX_LEVEL];

        let mut x = HEADER;
        for i in (0..self.level).rev() {
            rank[i] = if i == self.level - 1 { 0 } else { rank[i + 1] };
            while let Some(next) = self.forward(x, i) {
                if !self.node(next).precedes(score, &member) {
                    break;
                }
                rank[i] += self.node(x).levels[i].span;
                x = next;
            }
            update[i] = x;
        }

        let level = random_level();
        if level > self.level {
            for i in self.level..level {
                rank[i] = 0;
                update[i] = HEADER;
                self.node_mut(HEADER).levels[i].span = self.length;
            }
            self.level = level;
        }

        let id = self.alloc(Node {
            member,
            score,
            backward: None,
            levels: vec![Level::default(); level],
        });

        for i in 0..level {
            let prev = self.node(update[i]).levels[i];
            let distance = rank[0] - rank[i];
            self.node_mut(id).levels[i] = Level {
                forward: prev.forward,
                span: prev.span - distance,
            };
            self.node_mut(update[i]).levels[i] = Level {
                forward: Some(id),
                span: distance + 1,
            };
        }

        // Levels above the new node now jump over one more element.
        for i in level..self.level {
            self.node_mut(update[i]).levels[i].span += 1;
        }

        self.node_mut(id).backward = (update[0] != HEADER).then_some(update[0]);
        match self.forward(id, 0) {
            Some(next) => self.node_mut(next).backward = Some(id),
            None => self.tail = Some(id),
        }

        self.length += 1;
        NodeId(id)
    }

    /// Removes the element matching both `member` and `score`. Returns whether it existed.
    pub fn delete(&mut self, member: &str, score: f64) -> bool {
        let mut update = [HEADER; MAX_LEVEL];

        let mut x = HEADER;
        for i in (0..self.level).rev() {
            while let Some(next) = self.forward(x, i) {
                if !self.node(next).precedes(score, member) {
                    break;
                }
                x = next;
            }
            update[i] = x;
        }

        match self.forward(x, 0) {
            Some(candidate) if self.node(candidate).is(score, member) => {
                self.delete_node(candidate, &update);
                true
            }
            _ => false,
        }
    }

    fn delete_node(&mut self, id: usize, update: &[usize; MAX_LEVEL]) {
        for i in 0..self.level {
            let removed = self.node(id).levels.get(i).copied();
            let prev = &mut self.node_mut(update[i]).levels[i];
            match removed {
                Some(removed) if prev.forward == Some(id) => {
                    prev.span = prev.span + removed.span - 1;
                    prev.forward = removed.forward;
                }
                _ => prev.span -= 1,
            }
        }

        let backward = self.node(id).backward;
        match self.forward(id, 0) {
            Some(next) => self.node_mut(next).backward = backward,
            None => self.tail = backward,
        }

        while self.level > 1 && self.forward(HEADER, self.level - 1).is_none() {
            self.level -= 1;
        }

        self.nodes[id] = None;
        self.free.push(id);
        self.length -= 1;
    }

    /// 1-based rank of the element, or `None` if it is not in the list.
    pub fn rank(&self, member: &str, score: f64) -> Option<usize> {
        let mut rank = 0;
        let mut x = HEADER;

        for i in (0..self.level).rev() {
            while let Some(next) = self.forward(x, i) {
                let node = self.node(next);
                if !(node.precedes(score, member) || node.is(score, member)) {
                    break;
                }
                rank += self.node(x).levels[i].span;
                x = next;
            }
            if x != HEADER && self.node(x).is(score, member) {
                return Some(rank);
            }
        }
        None
    }

    /// Element at the 1-based `rank`.
    pub fn get_by_rank(&self, rank: usize) -> Option<NodeId> {
        let mut traversed = 0;
        let mut x = HEADER;

        for i in (0..self.level).rev() {
            while let Some(next) = self.forward(x, i) {
                let span = self.node(x).levels[i].span;
                if traversed + span > rank {
                    break;
                }
                traversed += span;
                x = next;
            }
            if x != HEADER && traversed == rank {
                return Some(NodeId(x));
            }
        }
        None
    }

    /// Whether some element may fall inside `range`. Impossible intervals and intervals that
    /// miss the list's score span are rejected without a descent.
    pub fn is_in_range(&self, range: &RangeSpec) -> bool {
        if range.is_empty() {
            return false;
        }
        match (self.tail, self.forward(HEADER, 0)) {
            (Some(tail), Some(first)) => {
                range.gte_min(self.node(tail).score) && range.lte_max(self.node(first).score)
            }
            _ => false,
        }
    }

    /// Lowest element whose score lies inside `range`.
    pub fn first_in_range(&self, range: &RangeSpec) -> Option<NodeId> {
        if !self.is_in_range(range) {
            return None;
        }

        let mut x = HEADER;
        for i in (0..self.level).rev() {
            while let Some(next) = self.forward(x, i) {
                if range.gte_min(self.node(next).score) {
                    break;
                }
                x = next;
            }
        }

        let x = self.forward(x, 0)?;
        range.lte_max(self.node(x).score).then_some(NodeId(x))
    }

    /// Highest element whose score lies inside `range`.
    pub fn last_in_range(&self, range: &RangeSpec) -> Option<NodeId> {
        if !self.is_in_range(range) {
            return None;
        }

        let mut x = HEADER;
        for i in (0..self.level).rev() {
            while let Some(next) = self.forward(x, i) {
                if !range.lte_max(self.node(next).score) {
                    break;
                }
                x = next;
            }
        }

        (x != HEADER && range.gte_min(self.node(x).score)).then_some(NodeId(x))
    }

    /// Removes every element whose score lies inside `range`, returning the removed members.
    pub fn delete_range_by_score(&mut self, range: &RangeSpec) -> Vec<(String, f64)> {
        let mut removed = vec![];
        while let Some(id) = self.first_in_range(range) {
            let node = self.node(id.0);
            let (member, score) = (node.member.clone(), node.score);
            self.delete(&member, score);
            removed.push((member, score));
        }
        removed
    }

    /// Removes the elements ranked `start..=end` (1-based), returning the removed members.
    pub fn delete_range_by_rank(&mut self, start: usize, end: usize) -> Vec<(String, f64)> {
        let mut removed = vec![];
        if start == 0 || start > end {
            return removed;
        }
        for _ in start..=end {
            let Some(id) = self.get_by_rank(start) else {
                break;
            };
            let node = self.node(id.0);
            let (member, score) = (node.member.clone(), node.score);
            self.delete(&member, score);
            removed.push((member, score));
        }
        removed
    }

    /// Walks forward from `start`, yielding `(member, score)` pairs.
    pub fn iter_from(&self, start: Option<NodeId>) -> impl Iterator<Item = (&str, f64)> + '_ {
        let mut cursor = start.map(|id| id.0);
        std::iter::from_fn(move || {
            let id = cursor?;
            let node = self.node(id);
            cursor = node.levels[0].forward;
            Some((node.member.as_str(), node.score))
        })
    }

    /// Walks backward from `start`, yielding `(member, score)` pairs.
    pub fn iter_back_from(&self, start: Option<NodeId>) -> impl Iterator<Item = (&str, f64)> + '_ {
        let mut cursor = start.map(|id| id.0);
        std::iter::from_fn(move || {
            let id = cursor?;
            let node = self.node(id);
            cursor = node.backward;
            Some((node.member.as_str(), node.score))
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.iter_from(self.first())
    }

    fn forward(&self, id: usize, level: usize) -> Option<usize> {
        self.node(id).levels.get(level).and_then(|l| l.forward)
    }

    // Indices handed out by the list itself always address live nodes.
    fn node(&self, id: usize) -> &Node {
        match self.nodes.get(id) {
            Some(Some(node)) => node,
            _ => unreachable!("dangling skip list link {id}"),
        }
    }

    fn node_mut(&mut self, id: usize) -> &mut Node {
        match self.nodes.get_mut(id) {
            Some(Some(node)) => node,
            _ => unreachable!("dangling skip list link {id}"),
        }
    }

    fn alloc(&mut self, node: Node) -> usize {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id] = Some(node);
                id
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        }
    }
}

/// Level for a new node: every extra level is kept with probability 1/2.
fn random_level() -> usize {
    let mut rng = rand::thread_rng();
    let mut level = 1;
    while level < MAX_LEVEL && rng.gen_bool(0.5) {
        level += 1;
    }
    level
}
