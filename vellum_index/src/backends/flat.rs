// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat vector backend with linear scans. Small and simple; good for tiny scenes.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;

use crate::backend::Backend;
use crate::types::Aabb;

/// Flat vector backend with linear scans.
#[derive(Default)]
pub struct Flat {
    slots: Vec<Option<Aabb>>,
}

impl Debug for Flat {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let alive = self.slots.iter().filter(|e| e.is_some()).count();
        f.debug_struct("Flat")
            .field("total_slots", &self.slots.len())
            .field("alive", &alive)
            .finish_non_exhaustive()
    }
}

impl Flat {
    fn scan<'a>(&'a self, keep: impl Fn(&Aabb) -> bool + 'a) -> Box<dyn Iterator<Item = usize> + 'a> {
        Box::new(
            self.slots
                .iter()
                .enumerate()
                .filter_map(move |(i, slot)| slot.as_ref().filter(|a| keep(a)).map(|_| i)),
        )
    }
}

impl Backend for Flat {
    fn insert(&mut self, slot: usize, aabb: Aabb) {
        if self.slots.len() <= slot {
            self.slots.resize_with(slot + 1, || None);
        }
        self.slots[slot] = Some(aabb);
    }

    fn remove(&mut self, slot: usize) {
        if let Some(e) = self.slots.get_mut(slot) {
            *e = None;
        }
    }

    fn clear(&mut self) {
        self.slots.clear();
    }

    fn query_point<'a>(&'a self, x: f64, y: f64) -> Box<dyn Iterator<Item = usize> + 'a> {
        self.scan(move |a| a.contains_point(x, y))
    }

    fn query_rect<'a>(&'a self, rect: Aabb) -> Box<dyn Iterator<Item = usize> + 'a> {
        self.scan(move |a| a.intersects(&rect))
    }
}
