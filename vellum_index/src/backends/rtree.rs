// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! R-tree backend with SAH-like splits and STR bulk loading.

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt::Debug;

use crate::backend::Backend;
use crate::types::Aabb;

/// R-tree backend.
///
/// Items live in leaves; every leaf sits at the same depth. There is no
/// in-place update: callers remove a slot and insert it again.
pub struct RTree {
    max_children: usize,
    min_children: usize,
    root: Option<NodeIdx>,
    arena: Vec<RNode>,
    free_nodes: Vec<usize>,
    slots: Vec<Option<Aabb>>,
}

#[derive(Clone, Debug)]
struct RNode {
    bbox: Aabb,
    leaf: bool,
    children: Vec<RChild>,
}

#[derive(Copy, Clone, Debug)]
enum RChild {
    Node(NodeIdx),
    Item { slot: usize, bbox: Aabb },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct NodeIdx(usize);

impl Default for RTree {
    fn default() -> Self {
        Self::with_max_children(9)
    }
}

fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

fn sort_by_axis(boxes: &mut [(Aabb, RChild)], axis: usize) {
    if axis == 0 {
        boxes.sort_by(|a, b| cmp_f64(a.0.center_x(), b.0.center_x()));
    } else {
        boxes.sort_by(|a, b| cmp_f64(a.0.center_y(), b.0.center_y()));
    }
}

fn union_all(boxes: impl Iterator<Item = Aabb>) -> Aabb {
    boxes
        .reduce(|acc, b| acc.union(&b))
        .unwrap_or(Aabb::new(0.0, 0.0, 0.0, 0.0))
}

impl RTree {
    /// Create an empty tree with the given node fan-out (clamped to at least 4).
    pub fn with_max_children(max_children: usize) -> Self {
        let max_children = max_children.max(4);
        Self {
            max_children,
            min_children: (max_children * 2 / 5).max(2),
            root: None,
            arena: Vec::new(),
            free_nodes: Vec::new(),
            slots: Vec::new(),
        }
    }

    /// Number of live items.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Whether the tree holds no items.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Depth of the tree (0 when empty, 1 for a single leaf).
    pub fn height(&self) -> usize {
        let mut depth = 0;
        let mut cur = self.root;
        while let Some(NodeIdx(i)) = cur {
            depth += 1;
            cur = self.arena[i].children.iter().find_map(|c| match c {
                RChild::Node(n) => Some(*n),
                RChild::Item { .. } => None,
            });
        }
        depth
    }

    fn child_bbox(&self, child: &RChild) -> Aabb {
        match child {
            RChild::Node(NodeIdx(i)) => self.arena[*i].bbox,
            RChild::Item { bbox, .. } => *bbox,
        }
    }

    fn alloc(&mut self, node: RNode) -> usize {
        if let Some(i) = self.free_nodes.pop() {
            self.arena[i] = node;
            i
        } else {
            self.arena.push(node);
            self.arena.len() - 1
        }
    }

    fn release(&mut self, i: usize) {
        self.arena[i].children = Vec::new();
        self.free_nodes.push(i);
    }

    fn record_slot(&mut self, slot: usize, bbox: Aabb) {
        if self.slots.len() <= slot {
            self.slots.resize_with(slot + 1, || None);
        }
        self.slots[slot] = Some(bbox);
    }

    /// STR packing: sort by x into vertical slices, sort each slice by y, then chunk.
    fn pack_level(&mut self, mut entries: Vec<(Aabb, RChild)>, leaf: bool) -> Vec<(Aabb, RChild)> {
        let n = entries.len();
        let groups = n.div_ceil(self.max_children);
        let mut slices = 1_usize;
        while slices * slices < groups {
            slices += 1;
        }
        sort_by_axis(&mut entries, 0);
        let slice_len = n.div_ceil(slices).max(1);
        let mut parents = Vec::with_capacity(groups);
        for slice in entries.chunks_mut(slice_len) {
            sort_by_axis(slice, 1);
            for chunk in slice.chunks(self.max_children) {
                let bbox = union_all(chunk.iter().map(|(b, _)| *b));
                let children = chunk.iter().map(|(_, c)| *c).collect();
                let idx = self.alloc(RNode {
                    bbox,
                    leaf,
                    children,
                });
                parents.push((bbox, RChild::Node(NodeIdx(idx))));
            }
        }
        parents
    }

    fn bulk_build(&mut self, items: &[(usize, Aabb)]) {
        let entries: Vec<(Aabb, RChild)> = items
            .iter()
            .map(|&(slot, bbox)| (bbox, RChild::Item { slot, bbox }))
            .collect();
        let mut level = self.pack_level(entries, true);
        while level.len() > 1 {
            level = self.pack_level(level, false);
        }
        self.root = level.first().and_then(|(_, c)| match c {
            RChild::Node(n) => Some(*n),
            RChild::Item { .. } => None,
        });
    }

    /// Pick the child needing the least enlargement; ties go to the smaller child.
    fn choose_child(&self, node: usize, bbox: &Aabb) -> usize {
        let mut best = 0;
        let mut best_cost = (f64::INFINITY, f64::INFINITY);
        for (i, c) in self.arena[node].children.iter().enumerate() {
            let cb = self.child_bbox(c);
            let cost = (cb.enlargement(bbox), cb.area());
            if cost.0 < best_cost.0 || (cost.0 == best_cost.0 && cost.1 < best_cost.1) {
                best_cost = cost;
                best = i;
            }
        }
        best
    }

    /// SAH-like split: for both axes, sort by centroid and choose `k` minimizing
    /// `area(LB_k) * k + area(RB_k) * (n - k)`.
    fn sah_split(&self, children: Vec<RChild>) -> (Vec<RChild>, Vec<RChild>) {
        let mut boxes: Vec<(Aabb, RChild)> =
            children.into_iter().map(|c| (self.child_bbox(&c), c)).collect();
        let n = boxes.len();
        let mut best: Option<(f64, usize, usize)> = None;
        for axis in 0..2 {
            sort_by_axis(&mut boxes, axis);
            let mut prefix = Vec::with_capacity(n);
            for (b, _) in &boxes {
                let acc = prefix.last().map_or(*b, |p: &Aabb| p.union(b));
                prefix.push(acc);
            }
            let mut suffix = vec![boxes[n - 1].0; n];
            for i in (0..n - 1).rev() {
                suffix[i] = suffix[i + 1].union(&boxes[i].0);
            }
            for k in self.min_children..=n.saturating_sub(self.min_children) {
                if k == 0 || k >= n {
                    continue;
                }
                #[allow(
                    clippy::cast_precision_loss,
                    reason = "Child counts are tiny; weights only need to be ordered."
                )]
                let cost = prefix[k - 1].area() * k as f64 + suffix[k].area() * (n - k) as f64;
                if best.is_none_or(|(c, _, _)| cost < c) {
                    best = Some((cost, axis, k));
                }
            }
        }
        let (_, axis, k) = best.unwrap_or((0.0, 0, n / 2));
        sort_by_axis(&mut boxes, axis);
        let right = boxes.split_off(k);
        (
            boxes.into_iter().map(|(_, c)| c).collect(),
            right.into_iter().map(|(_, c)| c).collect(),
        )
    }

    fn split(&mut self, node: usize) -> usize {
        let children = core::mem::take(&mut self.arena[node].children);
        let (left, right) = self.sah_split(children);
        let left_bbox = union_all(left.iter().map(|c| self.child_bbox(c)));
        let right_bbox = union_all(right.iter().map(|c| self.child_bbox(c)));
        let leaf = self.arena[node].leaf;
        self.arena[node].children = left;
        self.arena[node].bbox = left_bbox;
        self.alloc(RNode {
            bbox: right_bbox,
            leaf,
            children: right,
        })
    }

    /// Insert below `node`; returns the index of a new sibling when `node` split.
    fn insert_at(&mut self, node: usize, slot: usize, bbox: Aabb) -> Option<usize> {
        self.arena[node].bbox = self.arena[node].bbox.union(&bbox);
        if self.arena[node].leaf {
            self.arena[node].children.push(RChild::Item { slot, bbox });
        } else {
            let at = self.choose_child(node, &bbox);
            if let RChild::Node(NodeIdx(child)) = self.arena[node].children[at]
                && let Some(sibling) = self.insert_at(child, slot, bbox)
            {
                self.arena[node]
                    .children
                    .insert(at + 1, RChild::Node(NodeIdx(sibling)));
            }
        }
        (self.arena[node].children.len() > self.max_children).then(|| self.split(node))
    }

    /// Remove `slot` below `node`, dropping emptied child nodes on the way back up.
    fn remove_at(&mut self, node: usize, slot: usize, bbox: &Aabb) -> bool {
        if !self.arena[node].bbox.intersects(bbox) {
            return false;
        }
        let removed = if self.arena[node].leaf {
            let before = self.arena[node].children.len();
            self.arena[node]
                .children
                .retain(|c| !matches!(c, RChild::Item { slot: s, .. } if *s == slot));
            self.arena[node].children.len() != before
        } else {
            let mut found = None;
            for i in 0..self.arena[node].children.len() {
                if let RChild::Node(NodeIdx(child)) = self.arena[node].children[i]
                    && self.remove_at(child, slot, bbox)
                {
                    found = Some((i, child));
                    break;
                }
            }
            if let Some((i, child)) = found
                && self.arena[child].children.is_empty()
            {
                self.arena[node].children.remove(i);
                self.release(child);
            }
            found.is_some()
        };
        if removed && !self.arena[node].children.is_empty() {
            self.arena[node].bbox =
                union_all(self.arena[node].children.iter().map(|c| self.child_bbox(c)));
        }
        removed
    }

    /// Shrink the root while it is an internal node with a single child.
    fn condense_root(&mut self) {
        while let Some(NodeIdx(r)) = self.root {
            let root = &self.arena[r];
            if root.children.is_empty() {
                self.root = None;
                self.arena.clear();
                self.free_nodes.clear();
                return;
            }
            match (root.leaf, root.children.as_slice()) {
                (false, [RChild::Node(only)]) => {
                    let only = *only;
                    self.release(r);
                    self.root = Some(only);
                }
                _ => return,
            }
        }
    }

    fn collect<'a>(&'a self, query: Aabb) -> Box<dyn Iterator<Item = usize> + 'a> {
        let mut out = Vec::new();
        let Some(root) = self.root else {
            return Box::new(out.into_iter());
        };
        let mut stack = vec![root];
        while let Some(NodeIdx(i)) = stack.pop() {
            let n = &self.arena[i];
            if !n.bbox.intersects(&query) {
                continue;
            }
            for c in &n.children {
                match c {
                    RChild::Node(ci) => stack.push(*ci),
                    RChild::Item { slot, bbox } if bbox.intersects(&query) => out.push(*slot),
                    RChild::Item { .. } => {}
                }
            }
        }
        Box::new(out.into_iter())
    }
}

impl Backend for RTree {
    fn insert(&mut self, slot: usize, aabb: Aabb) {
        self.record_slot(slot, aabb);
        let Some(NodeIdx(root)) = self.root else {
            let idx = self.alloc(RNode {
                bbox: aabb,
                leaf: true,
                children: vec![RChild::Item { slot, bbox: aabb }],
            });
            self.root = Some(NodeIdx(idx));
            return;
        };
        if let Some(sibling) = self.insert_at(root, slot, aabb) {
            let bbox = self.arena[root].bbox.union(&self.arena[sibling].bbox);
            let idx = self.alloc(RNode {
                bbox,
                leaf: false,
                children: vec![RChild::Node(NodeIdx(root)), RChild::Node(NodeIdx(sibling))],
            });
            self.root = Some(NodeIdx(idx));
        }
    }

    fn load(&mut self, items: &[(usize, Aabb)]) {
        if items.is_empty() {
            return;
        }
        if self.root.is_some() || items.len() < self.min_children {
            for &(slot, aabb) in items {
                self.insert(slot, aabb);
            }
            return;
        }
        for &(slot, aabb) in items {
            self.record_slot(slot, aabb);
        }
        self.bulk_build(items);
    }

    fn remove(&mut self, slot: usize) {
        let Some(old) = self.slots.get_mut(slot).and_then(Option::take) else {
            return;
        };
        if let Some(NodeIdx(root)) = self.root {
            let _ = self.remove_at(root, slot, &old);
            self.condense_root();
        }
    }

    fn clear(&mut self) {
        self.root = None;
        self.arena.clear();
        self.free_nodes.clear();
        self.slots.clear();
    }

    fn query_point<'a>(&'a self, x: f64, y: f64) -> Box<dyn Iterator<Item = usize> + 'a> {
        self.collect(Aabb::point(x, y))
    }

    fn query_rect<'a>(&'a self, rect: Aabb) -> Box<dyn Iterator<Item = usize> + 'a> {
        self.collect(rect)
    }
}

impl Debug for RTree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RTree")
            .field("max_children", &self.max_children)
            .field("min_children", &self.min_children)
            .field("arena_nodes", &(self.arena.len() - self.free_nodes.len()))
            .field("alive", &self.len())
            .field("has_root", &self.root.is_some())
            .finish_non_exhaustive()
    }
}
