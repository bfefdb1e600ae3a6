//! Loop matching and branch scopes over a flat instruction list.
//!
//! Loops are resolved lazily: every time the engine reaches a `LoopEnd` it
//! scans backwards for the matching `LoopStart`. Branches are resolved with
//! a stack of [`BranchScope`] frames that remember how an `IfStart` split
//! the active priests, so the matching `EndIf` can put them back together.

use pyre_types::{AgentId, Command};

/// Find the `LoopStart` matching the `LoopEnd` at `loop_end`.
///
/// Scans backwards from `loop_end - 1`, counting intervening `LoopEnd`s as
/// nesting. Returns `None` if no unmatched `LoopStart` precedes it.
pub fn find_matching_loop_start(commands: &[Command], loop_end: usize) -> Option<usize> {
    let mut depth: usize = 0;
    let before = commands.get(..loop_end)?;
    for (index, command) in before.iter().enumerate().rev() {
        match command {
            Command::LoopEnd => depth = depth.saturating_add(1),
            Command::LoopStart => {
                if depth == 0 {
                    return Some(index);
                }
                depth = depth.saturating_sub(1);
            }
            _ => {}
        }
    }
    None
}

/// One open `IfStart` scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchScope {
    /// Index of the `IfStart` block that opened the scope.
    pub if_index: usize,
    /// Priests for which the condition held.
    pub true_group: Vec<AgentId>,
    /// Priests for which the condition did not hold.
    pub false_group: Vec<AgentId>,
    /// Living priests that had already finished and were not evaluated.
    pub parked: Vec<AgentId>,
}

impl BranchScope {
    /// Every priest the scope was opened with.
    pub fn members(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.true_group
            .iter()
            .chain(&self.false_group)
            .chain(&self.parked)
            .copied()
    }
}

/// Stack of open branch scopes, innermost last.
#[derive(Debug, Clone, Default)]
pub struct ScopeStack {
    /// Open frames.
    frames: Vec<BranchScope>,
}

impl ScopeStack {
    /// Create an empty stack.
    pub const fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Open a scope.
    pub fn push(&mut self, scope: BranchScope) {
        self.frames.push(scope);
    }

    /// The innermost open scope.
    pub fn innermost(&self) -> Option<&BranchScope> {
        self.frames.last()
    }

    /// Close the innermost scope.
    pub fn pop(&mut self) -> Option<BranchScope> {
        self.frames.pop()
    }

    /// Number of open scopes.
    pub const fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Whether no scope is open.
    pub const fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Drop every open scope.
    pub fn clear(&mut self) {
        self.frames.clear();
    }
}
