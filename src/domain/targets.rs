// One-shot target slots shared by every player in a game.

use std::sync::atomic::{AtomicBool, Ordering};

/// Fixed-size row of targets. Each slot can be claimed once and never becomes available again.
#[derive(Debug)]
pub struct TargetPool {
    slots: Box<[AtomicBool]>,
}

impl TargetPool {
    pub fn new(len: usize) -> Self {
        Self {
            slots: (0..len).map(|_| AtomicBool::new(true)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_available(&self, index: usize) -> bool {
        self.slots
            .get(index)
            .is_some_and(|slot| slot.load(Ordering::Acquire))
    }

    /// Claims a slot. Returns true only for the caller that flipped it from available to hit;
    /// already-hit and out-of-range indices return false.
    pub fn resolve_hit(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(|slot| {
            slot.compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
        })
    }

    pub fn remaining(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.load(Ordering::Acquire))
            .count()
    }

    pub fn flags(&self) -> Vec<bool> {
        self.slots
            .iter()
            .map(|slot| slot.load(Ordering::Acquire))
            .collect()
    }
}
