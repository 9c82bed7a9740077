//! Sorted-set index: a skip list ordered by (score, member).

use std::sync::{Arc, RwLock};
use rand::Rng;

const SKIPLIST_MAXLEVEL: usize = 32;

pub struct SkipListNode {
    member: Option<Vec<u8>>,        // None only for the header node
    score: f64,
    forward: Vec<Option<Arc<RwLock<SkipListNode>>>>,
}

impl SkipListNode {
    fn new(level: usize, score: f64, member: Option<Vec<u8>>) -> SkipListNode {
        let mut forward: Vec<Option<Arc<RwLock<SkipListNode>>>> = Vec::with_capacity(level);
        for _ in 0..level { forward.push(None); }
        SkipListNode { member, score, forward }
    }

    /// Strictly before `(score, member)` in the (score, member lex) order.
    fn precedes(&self, score: f64, member: &[u8]) -> bool {
        match &self.member {
            Some(m) => self.score < score || (self.score == score && m.as_slice() < member),
            None => true,       // header precedes everything
        }
    }
}

pub struct SkipList {
    header: Arc<RwLock<SkipListNode>>,
    length: usize,
    level: usize,
}

impl SkipList {
    pub fn new() -> SkipList {
        SkipList {
            header: Arc::new(RwLock::new(SkipListNode::new(SKIPLIST_MAXLEVEL, 0f64, None))),
            length: 0,
            level: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.length
    }

    /// Insert a member at a random level. The caller guarantees the member
    /// is not already in the list; re-scoring goes through delete + insert
    /// so the order stays correct.
    pub fn insert(&mut self, score: f64, member: Vec<u8>) {
        let mut update: Vec<Option<Arc<RwLock<SkipListNode>>>> = Vec::with_capacity(SKIPLIST_MAXLEVEL);
        for _ in 0..SKIPLIST_MAXLEVEL { update.push(None); }

        let mut x = self.header.clone();
        for i in (0..self.level).rev() {
            loop {
                let next = x.read().unwrap().forward[i].clone();
                match next {
                    Some(n) if n.read().unwrap().precedes(score, &member) => { x = n; },
                    _ => break,
                }
            }
            update[i] = Some(x.clone());
        }

        let level = random_level();
        if level > self.level {
            for i in self.level..level {
                update[i] = Some(self.header.clone());
            }
            self.level = level;
        }

        let node = Arc::new(RwLock::new(SkipListNode::new(level, score, Some(member))));
        for i in 0..level {
            let prev = update[i].as_ref().unwrap();
            node.write().unwrap().forward[i] = prev.read().unwrap().forward[i].clone();
            prev.write().unwrap().forward[i] = Some(node.clone());
        }
        self.length += 1;
    }

    /// Unlink the node carrying exactly (score, member). Returns whether
    /// something was removed.
    pub fn delete(&mut self, score: f64, member: &[u8]) -> bool {
        let mut update: Vec<Option<Arc<RwLock<SkipListNode>>>> = Vec::with_capacity(SKIPLIST_MAXLEVEL);
        for _ in 0..SKIPLIST_MAXLEVEL { update.push(None); }

        let mut x = self.header.clone();
        for i in (0..self.level).rev() {
            loop {
                let next = x.read().unwrap().forward[i].clone();
                match next {
                    Some(n) if n.read().unwrap().precedes(score, member) => { x = n; },
                    _ => break,
                }
            }
            update[i] = Some(x.clone());
        }

        let target = x.read().unwrap().forward[0].clone();
        let target = match target {
            Some(t) => {
                let t_r = t.read().unwrap();
                if t_r.score != score || t_r.member.as_deref() != Some(member) {
                    return false;
                }
                drop(t_r);
                t
            },
            None => return false,
        };

        for i in 0..self.level {
            let prev = update[i].as_ref().unwrap();
            let points_at_target = match &prev.read().unwrap().forward[i] {
                Some(n) => Arc::ptr_eq(n, &target),
                None => false,
            };
            if points_at_target {
                let succ = target.read().unwrap().forward[i].clone();
                prev.write().unwrap().forward[i] = succ;
            }
        }

        while self.level > 1 && self.header.read().unwrap().forward[self.level - 1].is_none() {
            self.level -= 1;
        }
        self.length -= 1;
        true
    }

    /// Level-0 walk over the inclusive rank range, with the usual index
    /// folding and clamping. Returns (member, score) pairs in order.
    pub fn range(&self, start: i64, end: i64) -> Vec<(Vec<u8>, f64)> {
        let len = self.length as i64;
        let mut start = if start < 0 { len + start } else { start };
        let mut end = if end < 0 { len + end } else { end };
        if start < 0 { start = 0; }
        if end > len - 1 { end = len - 1; }
        if start > end || len == 0 {
            return Vec::new();
        }

        let mut out = Vec::with_capacity((end - start + 1) as usize);
        let mut node = self.header.read().unwrap().forward[0].clone();
        let mut pos = 0i64;
        while let Some(n) = node {
            if pos > end { break; }
            if pos >= start {
                let n_r = n.read().unwrap();
                out.push((n_r.member.clone().unwrap(), n_r.score));
            }
            node = n.read().unwrap().forward[0].clone();
            pos += 1;
        }
        out
    }

    /// Full level-0 traversal; the backbone for iteration and for the
    /// ordering checks in tests.
    pub fn entries(&self) -> Vec<(Vec<u8>, f64)> {
        self.range(0, -1)
    }
}

impl Drop for SkipList {
    /// Break the level-0 chain iteratively; higher levels are subsequences
    /// of it, so no node survives.
    fn drop(&mut self) {
        let mut node = self.header.write().unwrap().forward[0].take();
        while let Some(n) = node {
            node = n.write().unwrap().forward[0].take();
            n.write().unwrap().forward.clear();
        }
        self.header.write().unwrap().forward.clear();
    }
}

/// Geometric level draw with p = 1/2, capped at the tower height.
fn random_level() -> usize {
    let mut rng = rand::thread_rng();
    let mut level = 1;
    while level < SKIPLIST_MAXLEVEL && rng.gen_ratio(1, 2) {
        level += 1;
    }
    level
}
