//! The instruction list a player assembles from command blocks.
//!
//! An [`InstructionList`] is edited freely between runs and frozen once a
//! run starts: the engine takes its own copy in
//! [`Session::run_sequence`](crate::session::Session::run_sequence).
//!
//! Lists load from YAML or JSON as a plain sequence of commands:
//!
//! ```yaml
//! - LoopStart
//! - Move: Up
//! - IfStart: { offset: { dx: 1, dy: 0 }, operator: Equals, target: Fire }
//! - Cast: Right
//! - EndIf
//! - LoopEnd
//! ```

use std::path::Path;

use pyre_types::Command;
use serde::{Deserialize, Serialize};

/// Errors that can occur when loading an instruction list.
#[derive(Debug, thiserror::Error)]
pub enum ProgramError {
    /// Failed to read the program file from disk.
    #[error("failed to read program file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse program YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        #[from]
        source: serde_yml::Error,
    },

    /// Failed to parse JSON content.
    #[error("failed to parse program JSON: {source}")]
    Json {
        /// The underlying JSON parse error.
        #[from]
        source: serde_json::Error,
    },
}

/// A structural problem found by [`InstructionList::validate`].
///
/// None of these stop a run; the engine treats the offending block as a
/// no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgramDiagnostic {
    /// A `LoopEnd` with no `LoopStart` before it.
    UnmatchedLoopEnd {
        /// Block index.
        index: usize,
    },
    /// A `LoopStart` that no `LoopEnd` closes.
    UnclosedLoop {
        /// Block index.
        index: usize,
    },
    /// An `Else` outside any `IfStart` scope.
    DanglingElse {
        /// Block index.
        index: usize,
    },
    /// An `EndIf` outside any `IfStart` scope.
    DanglingEndIf {
        /// Block index.
        index: usize,
    },
    /// An `IfStart` that no `EndIf` closes.
    UnclosedIf {
        /// Block index.
        index: usize,
    },
}

impl core::fmt::Display for ProgramDiagnostic {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnmatchedLoopEnd { index } => write!(f, "block {index}: loop end without loop start"),
            Self::UnclosedLoop { index } => write!(f, "block {index}: loop start is never closed"),
            Self::DanglingElse { index } => write!(f, "block {index}: else outside an if"),
            Self::DanglingEndIf { index } => write!(f, "block {index}: end if outside an if"),
            Self::UnclosedIf { index } => write!(f, "block {index}: if is never closed"),
        }
    }
}

/// Ordered command blocks. Insertion order is execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstructionList {
    /// The blocks.
    commands: Vec<Command>,
}

impl InstructionList {
    /// Create an empty list.
    pub const fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Load a list from a YAML file. JSON files are accepted too.
    ///
    /// # Errors
    ///
    /// Returns [`ProgramError::Io`] if the file cannot be read, or a parse
    /// error if the content is not a list of commands.
    pub fn from_file(path: &Path) -> Result<Self, ProgramError> {
        let contents = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&contents)
        } else {
            Self::from_yaml(&contents)
        }
    }

    /// Parse a list from YAML.
    ///
    /// # Errors
    ///
    /// Returns [`ProgramError::Yaml`] if the string is not a list of
    /// commands.
    pub fn from_yaml(yaml: &str) -> Result<Self, ProgramError> {
        // Commands with a payload are written as `Move: Up` maps, not `!Move` tags.
        let deserializer = serde_yml::Deserializer::from_str(yaml);
        Ok(serde_yml::with::singleton_map_recursive::deserialize(
            deserializer,
        )?)
    }

    /// Parse a list from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ProgramError::Json`] if the string is not a list of
    /// commands.
    pub fn from_json(json: &str) -> Result<Self, ProgramError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Number of blocks.
    pub const fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the list is empty.
    pub const fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// The block at `index`.
    pub fn get(&self, index: usize) -> Option<Command> {
        self.commands.get(index).copied()
    }

    /// All blocks in order.
    pub fn as_slice(&self) -> &[Command] {
        &self.commands
    }

    /// Append a block.
    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Insert a block at `index`, clamped to the end of the list.
    pub fn insert(&mut self, index: usize, command: Command) {
        let index = index.min(self.commands.len());
        self.commands.insert(index, command);
    }

    /// Remove and return the block at `index`.
    pub fn remove(&mut self, index: usize) -> Option<Command> {
        (index < self.commands.len()).then(|| self.commands.remove(index))
    }

    /// Remove every block.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Report structural problems without rejecting the list.
    ///
    /// Loops and branches are checked independently, each with its own
    /// nesting stack.
    pub fn validate(&self) -> Vec<ProgramDiagnostic> {
        let mut diagnostics = Vec::new();
        let mut loops = Vec::new();
        let mut ifs = Vec::new();

        for (index, command) in self.commands.iter().enumerate() {
            match command {
                Command::LoopStart => loops.push(index),
                Command::LoopEnd => {
                    if loops.pop().is_none() {
                        diagnostics.push(ProgramDiagnostic::UnmatchedLoopEnd { index });
                    }
                }
                Command::IfStart(_) => ifs.push(index),
                Command::Else => {
                    if ifs.is_empty() {
                        diagnostics.push(ProgramDiagnostic::DanglingElse { index });
                    }
                }
                Command::EndIf => {
                    if ifs.pop().is_none() {
                        diagnostics.push(ProgramDiagnostic::DanglingEndIf { index });
                    }
                }
                Command::NoOp | Command::Move(_) | Command::Cast(_) => {}
            }
        }

        diagnostics.extend(loops.into_iter().map(|index| ProgramDiagnostic::UnclosedLoop { index }));
        diagnostics.extend(ifs.into_iter().map(|index| ProgramDiagnostic::UnclosedIf { index }));
        diagnostics
    }
}

impl From<Vec<Command>> for InstructionList {
    fn from(commands: Vec<Command>) -> Self {
        Self { commands }
    }
}

impl FromIterator<Command> for InstructionList {
    fn from_iter<I: IntoIterator<Item = Command>>(iter: I) -> Self {
        Self {
            commands: iter.into_iter().collect(),
        }
    }
}
