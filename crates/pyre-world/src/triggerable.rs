//! Fire pits and chests.
//!
//! A [`Triggerable`] starts either dormant or armed. Arming is one-way for
//! the duration of a run; [`Triggerable::reset`] restores the layout's
//! initial state when a level is reloaded.

use pyre_types::{TriggerableKind, TriggerableSpec};

/// Runtime state of a fire pit or chest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triggerable {
    /// Fire pit or chest.
    pub kind: TriggerableKind,
    /// Lit or opened.
    armed: bool,
    /// Pure traps never count as objectives.
    pub trap: bool,
    /// Armed state from the layout, restored by [`Self::reset`].
    initially_armed: bool,
}

impl Triggerable {
    /// Build the runtime state from a layout entry.
    pub const fn from_spec(spec: &TriggerableSpec) -> Self {
        Self {
            kind: spec.kind,
            armed: spec.armed,
            trap: spec.trap,
            initially_armed: spec.armed,
        }
    }

    /// Whether the object is lit or open.
    pub const fn is_armed(&self) -> bool {
        self.armed
    }

    /// Light or open the object. Returns `true` if it was dormant.
    pub const fn arm(&mut self) -> bool {
        if self.armed {
            return false;
        }
        self.armed = true;
        true
    }

    /// Whether this object still has to be armed to complete the level.
    pub const fn is_pending_objective(&self) -> bool {
        !self.trap && !self.armed
    }

    /// Restore the armed state from the layout.
    pub const fn reset(&mut self) {
        self.armed = self.initially_armed;
    }
}

#[cfg(test)]
mod tests {
    use pyre_types::GridPos;

    use super::*;

    fn chest() -> Triggerable {
        Triggerable::from_spec(&TriggerableSpec {
            pos: GridPos::new(1, 1),
            kind: TriggerableKind::Chest,
            armed: false,
            trap: false,
        })
    }

    #[test]
    fn arming_is_one_way() {
        let mut t = chest();
        assert!(t.is_pending_objective());
        assert!(t.arm());
        assert!(!t.arm());
        assert!(t.is_armed());
        assert!(!t.is_pending_objective());
    }

    #[test]
    fn reset_restores_layout_state() {
        let mut t = chest();
        t.arm();
        t.reset();
        assert!(!t.is_armed());
    }

    #[test]
    fn traps_are_never_objectives() {
        let t = Triggerable::from_spec(&TriggerableSpec {
            pos: GridPos::new(0, 0),
            kind: TriggerableKind::FirePit,
            armed: false,
            trap: true,
        });
        assert!(!t.is_pending_objective());
    }
}
