//! Dirty-slot tracking over the register image.
//!
//! Each derived-state slot registers the word ranges it depends on once at
//! construction; the manager folds those into a per-word slot bitmask so that
//! marking a written offset dirty is a single OR. Draws happen every few
//! microseconds while most state groups change rarely, so per-draw recompute
//! cost has to scale with *changed* state, never total state.

use crate::regs::REGISTER_COUNT;

/// A derived-state slot. Slots start dirty (never computed).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Slot {
    Tessellation = 0,
    Rasterization = 1,
    DepthStencil = 2,
    ColorBlend = 3,
    DepthTarget = 4,
    GlobalConfig = 5,
    ColorTarget0 = 6,
    ColorTarget1 = 7,
    ColorTarget2 = 8,
    ColorTarget3 = 9,
    ColorTarget4 = 10,
    ColorTarget5 = 11,
    ColorTarget6 = 12,
    ColorTarget7 = 13,
}

impl Slot {
    pub fn color_target(index: usize) -> Slot {
        debug_assert!(index < 8);
        match index {
            0 => Slot::ColorTarget0,
            1 => Slot::ColorTarget1,
            2 => Slot::ColorTarget2,
            3 => Slot::ColorTarget3,
            4 => Slot::ColorTarget4,
            5 => Slot::ColorTarget5,
            6 => Slot::ColorTarget6,
            _ => Slot::ColorTarget7,
        }
    }

    fn bit(self) -> u16 {
        1 << (self as u8)
    }
}

const ALL_SLOTS: u16 = (1 << 14) - 1;

/// Maps written register offsets to dirty slots.
pub struct DirtyManager {
    /// Per-word bitmask of the slots bound to that register.
    bound: Box<[u16; REGISTER_COUNT]>,
    dirty: u16,
}

impl DirtyManager {
    /// All slots start dirty: nothing has been computed yet.
    pub fn new() -> Self {
        DirtyManager {
            bound: Box::new([0; REGISTER_COUNT]),
            dirty: ALL_SLOTS,
        }
    }

    /// Binds `slot` to the inclusive-exclusive word range `start..end`.
    pub fn bind(&mut self, slot: Slot, start: u32, end: u32) {
        for word in start..end {
            self.bound[word as usize] |= slot.bit();
        }
    }

    /// Binds `slot` to a single register word.
    pub fn bind_one(&mut self, slot: Slot, word: u32) {
        self.bound[word as usize] |= slot.bit();
    }

    /// Marks every slot bound to `method` dirty. O(1) regardless of slot
    /// count.
    pub fn mark_dirty(&mut self, method: u32) {
        self.dirty |= self.bound[method as usize];
    }

    pub fn is_dirty(&self, slot: Slot) -> bool {
        self.dirty & slot.bit() != 0
    }

    /// Clears `slot`'s flag and reports whether it was dirty; the caller
    /// recomputes exactly when this returns true.
    pub fn take_dirty(&mut self, slot: Slot) -> bool {
        let was = self.dirty & slot.bit() != 0;
        self.dirty &= !slot.bit();
        was
    }
}

impl Default for DirtyManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_start_dirty() {
        let manager = DirtyManager::new();
        assert!(manager.is_dirty(Slot::Rasterization));
        assert!(manager.is_dirty(Slot::ColorTarget7));
    }

    #[test]
    fn mark_dirty_hits_only_bound_slots() {
        let mut manager = DirtyManager::new();
        manager.bind(Slot::Rasterization, 0x100, 0x104);
        manager.bind_one(Slot::DepthStencil, 0x102);

        assert!(manager.take_dirty(Slot::Rasterization));
        assert!(manager.take_dirty(Slot::DepthStencil));
        assert!(manager.take_dirty(Slot::ColorBlend));

        manager.mark_dirty(0x101);
        assert!(manager.is_dirty(Slot::Rasterization));
        assert!(!manager.is_dirty(Slot::DepthStencil));
        assert!(!manager.is_dirty(Slot::ColorBlend));

        manager.mark_dirty(0x102);
        assert!(manager.is_dirty(Slot::DepthStencil));
    }

    #[test]
    fn take_dirty_clears_until_next_mark() {
        let mut manager = DirtyManager::new();
        manager.bind_one(Slot::ColorBlend, 0x4D0);

        assert!(manager.take_dirty(Slot::ColorBlend));
        assert!(!manager.take_dirty(Slot::ColorBlend));

        manager.mark_dirty(0x4D0);
        manager.mark_dirty(0x4D0);
        assert!(manager.take_dirty(Slot::ColorBlend));
        assert!(!manager.take_dirty(Slot::ColorBlend));
    }
}
