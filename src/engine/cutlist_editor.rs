// ==========================================
// Cutlist Intake - Cutlist Editor
// ==========================================
// Scope: edits on a working cutlist with undo / redo
// Model: explicit command log (add parts / remove part / patch part)
// Rule: part ids stay unique; colliding ids are regenerated on add
// ==========================================

use crate::domain::cutlist::Cutlist;
use crate::domain::part::{generate_part_id, CutPart, PartPatch};
use crate::engine::error::{IntakeError, IntakeResult};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use tracing::debug;

/// Default number of undoable edits kept.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Append parts to a cutlist, regenerating ids that collide. Returns the final ids.
pub fn merge_parts(cutlist: &mut Cutlist, parts: Vec<CutPart>) -> Vec<String> {
    let mut taken: HashSet<String> = cutlist.parts.iter().map(|p| p.part_id.clone()).collect();
    let mut ids = Vec::with_capacity(parts.len());
    for mut part in parts {
        if part.part_id.trim().is_empty() || taken.contains(&part.part_id) {
            let previous = std::mem::replace(&mut part.part_id, generate_part_id());
            debug!(previous = %previous, part_id = %part.part_id, "part id regenerated on merge");
        }
        taken.insert(part.part_id.clone());
        ids.push(part.part_id.clone());
        cutlist.parts.push(part);
    }
    ids
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum EditCommand {
    AddParts { parts: Vec<CutPart> },
    RemovePart { part_id: String },
    UpdatePart { part_id: String, patch: PartPatch },
}

/// Applied edit with what is needed to revert it.
#[derive(Debug, Clone)]
enum AppliedEdit {
    Added { parts: Vec<CutPart> },
    Removed { index: usize, part: CutPart },
    Updated { part_id: String, patch: PartPatch, inverse: PartPatch },
}

pub struct CutlistEditor {
    cutlist: Cutlist,
    undo_stack: VecDeque<AppliedEdit>,
    redo_stack: Vec<AppliedEdit>,
    history_limit: usize,
}

impl CutlistEditor {
    pub fn new(cutlist: Cutlist) -> Self {
        Self::with_history_limit(cutlist, DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_history_limit(cutlist: Cutlist, history_limit: usize) -> Self {
        Self {
            cutlist,
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            history_limit: history_limit.max(1),
        }
    }

    pub fn cutlist(&self) -> &Cutlist {
        &self.cutlist
    }

    pub fn into_cutlist(self) -> Cutlist {
        self.cutlist
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Run a command. A new edit clears the redo stack.
    pub fn execute(&mut self, command: EditCommand) -> IntakeResult<()> {
        let applied = match command {
            EditCommand::AddParts { parts } => self.merge(parts),
            EditCommand::RemovePart { part_id } => {
                let index = self.index_of(&part_id)?;
                let part = self.cutlist.parts.remove(index);
                AppliedEdit::Removed { index, part }
            }
            EditCommand::UpdatePart { part_id, patch } => {
                let index = self.index_of(&part_id)?;
                let inverse = patch.apply(&mut self.cutlist.parts[index]);
                AppliedEdit::Updated {
                    part_id,
                    patch,
                    inverse,
                }
            }
        };
        self.push_undo(applied);
        self.redo_stack.clear();
        Ok(())
    }

    /// Add parts; returns their ids in the cutlist.
    pub fn add_parts(&mut self, parts: Vec<CutPart>) -> Vec<String> {
        let applied = self.merge(parts);
        let ids = match &applied {
            AppliedEdit::Added { parts } => parts.iter().map(|p| p.part_id.clone()).collect(),
            _ => Vec::new(),
        };
        self.push_undo(applied);
        self.redo_stack.clear();
        ids
    }

    pub fn remove_part(&mut self, part_id: &str) -> IntakeResult<()> {
        self.execute(EditCommand::RemovePart {
            part_id: part_id.to_string(),
        })
    }

    pub fn update_part(&mut self, part_id: &str, patch: PartPatch) -> IntakeResult<()> {
        self.execute(EditCommand::UpdatePart {
            part_id: part_id.to_string(),
            patch,
        })
    }

    pub fn undo(&mut self) -> IntakeResult<()> {
        let edit = self
            .undo_stack
            .pop_back()
            .ok_or(IntakeError::EmptyHistory("undo"))?;
        match &edit {
            AppliedEdit::Added { parts } => {
                let ids: HashSet<&str> = parts.iter().map(|p| p.part_id.as_str()).collect();
                self.cutlist.parts.retain(|p| !ids.contains(p.part_id.as_str()));
            }
            AppliedEdit::Removed { index, part } => {
                let at = (*index).min(self.cutlist.parts.len());
                self.cutlist.parts.insert(at, part.clone());
            }
            AppliedEdit::Updated {
                part_id, inverse, ..
            } => {
                let index = self.index_of(part_id)?;
                inverse.apply(&mut self.cutlist.parts[index]);
            }
        }
        debug!(remaining = self.undo_stack.len(), "edit undone");
        self.redo_stack.push(edit);
        Ok(())
    }

    pub fn redo(&mut self) -> IntakeResult<()> {
        let edit = self
            .redo_stack
            .pop()
            .ok_or(IntakeError::EmptyHistory("redo"))?;
        let reapplied = match edit {
            AppliedEdit::Added { parts } => {
                self.cutlist.parts.extend(parts.iter().cloned());
                AppliedEdit::Added { parts }
            }
            AppliedEdit::Removed { part, .. } => {
                let index = self.index_of(&part.part_id)?;
                let part = self.cutlist.parts.remove(index);
                AppliedEdit::Removed { index, part }
            }
            AppliedEdit::Updated { part_id, patch, .. } => {
                let index = self.index_of(&part_id)?;
                let inverse = patch.apply(&mut self.cutlist.parts[index]);
                AppliedEdit::Updated {
                    part_id,
                    patch,
                    inverse,
                }
            }
        };
        self.push_undo(reapplied);
        Ok(())
    }

    fn merge(&mut self, parts: Vec<CutPart>) -> AppliedEdit {
        let start = self.cutlist.parts.len();
        merge_parts(&mut self.cutlist, parts);
        AppliedEdit::Added {
            parts: self.cutlist.parts[start..].to_vec(),
        }
    }

    fn index_of(&self, part_id: &str) -> IntakeResult<usize> {
        self.cutlist
            .find_part(part_id)
            .ok_or_else(|| IntakeError::PartNotFound(part_id.to_string()))
    }

    fn push_undo(&mut self, edit: AppliedEdit) {
        if self.undo_stack.len() == self.history_limit {
            self.undo_stack.pop_front();
        }
        self.undo_stack.push_back(edit);
    }
}
