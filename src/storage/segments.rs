//! Segment repository for JSON storage
//!
//! Holds every expense's segment set in memory behind one RwLock and
//! persists the lot to segments.json. Every state-dependent mutation
//! (empty-check-then-insert, whole-set replace, in-place update, removal)
//! runs under a single write lock acquisition, so two concurrent mutations
//! of the same expense cannot interleave and leave an inconsistent set.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{CostsplitError, CostsplitResult};
use crate::models::{ExpenseId, Segment, SegmentId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable segment data structure (flat, creation order per expense)
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct SegmentData {
    pub segments: Vec<Segment>,
}

/// Repository for segment persistence
pub struct SegmentRepository {
    path: PathBuf,
    segments: RwLock<HashMap<ExpenseId, Vec<Segment>>>,
}

impl SegmentRepository {
    /// Create a new segment repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            segments: RwLock::new(HashMap::new()),
        }
    }

    /// Load segments from disk
    pub fn load(&self) -> CostsplitResult<()> {
        let file_data: SegmentData = read_json(&self.path)?;

        let mut segments = self.write_guard()?;
        segments.clear();

        // File order is creation order within each expense
        for segment in file_data.segments {
            segments.entry(segment.expense_id).or_default().push(segment);
        }

        Ok(())
    }

    /// Save segments to disk
    pub fn save(&self) -> CostsplitResult<()> {
        let segments = self.read_guard()?;

        let mut expense_ids: Vec<_> = segments.keys().copied().collect();
        expense_ids.sort();

        let mut flat = Vec::new();
        for expense_id in expense_ids {
            flat.extend(segments[&expense_id].iter().cloned());
        }

        write_json_atomic(&self.path, &SegmentData { segments: flat })
    }

    /// Get all segments for an expense, in creation order
    pub fn get_for_expense(&self, expense_id: ExpenseId) -> CostsplitResult<Vec<Segment>> {
        let segments = self.read_guard()?;
        Ok(segments.get(&expense_id).cloned().unwrap_or_default())
    }

    /// Get one segment of an expense
    pub fn get(
        &self,
        expense_id: ExpenseId,
        segment_id: SegmentId,
    ) -> CostsplitResult<Option<Segment>> {
        let segments = self.read_guard()?;
        Ok(segments
            .get(&expense_id)
            .and_then(|set| set.iter().find(|s| s.id == segment_id))
            .cloned())
    }

    /// Number of segments currently stored for an expense
    pub fn count_for_expense(&self, expense_id: ExpenseId) -> CostsplitResult<usize> {
        let segments = self.read_guard()?;
        Ok(segments.get(&expense_id).map_or(0, Vec::len))
    }

    /// Insert a segment set for an expense that must currently have none
    ///
    /// The emptiness check and the insert happen under one write lock.
    pub fn insert_for_empty(
        &self,
        expense_id: ExpenseId,
        new_segments: Vec<Segment>,
    ) -> CostsplitResult<()> {
        let mut segments = self.write_guard()?;

        if segments.get(&expense_id).is_some_and(|set| !set.is_empty()) {
            return Err(CostsplitError::Conflict(format!(
                "Expense {} already has segments; use replace instead",
                expense_id.short()
            )));
        }

        segments.insert(expense_id, new_segments);
        Ok(())
    }

    /// Atomically swap an expense's entire segment set, returning the old set
    pub fn replace_for_expense(
        &self,
        expense_id: ExpenseId,
        new_segments: Vec<Segment>,
    ) -> CostsplitResult<Vec<Segment>> {
        let mut segments = self.write_guard()?;
        let old = segments.insert(expense_id, new_segments).unwrap_or_default();
        Ok(old)
    }

    /// Replace one stored segment in place, matched by id
    pub fn update_in_expense(&self, updated: Segment) -> CostsplitResult<()> {
        let mut segments = self.write_guard()?;

        let set = segments
            .get_mut(&updated.expense_id)
            .ok_or_else(|| CostsplitError::segment_not_found(updated.id.short()))?;

        let slot = set
            .iter_mut()
            .find(|s| s.id == updated.id)
            .ok_or_else(|| CostsplitError::segment_not_found(updated.id.short()))?;

        *slot = updated;
        Ok(())
    }

    /// Remove one segment, returning it
    pub fn remove(
        &self,
        expense_id: ExpenseId,
        segment_id: SegmentId,
    ) -> CostsplitResult<Segment> {
        let mut segments = self.write_guard()?;

        let set = segments
            .get_mut(&expense_id)
            .ok_or_else(|| CostsplitError::segment_not_found(segment_id.short()))?;

        let pos = set
            .iter()
            .position(|s| s.id == segment_id)
            .ok_or_else(|| CostsplitError::segment_not_found(segment_id.short()))?;

        let removed = set.remove(pos);
        if set.is_empty() {
            segments.remove(&expense_id);
        }

        Ok(removed)
    }

    fn read_guard(
        &self,
    ) -> CostsplitResult<std::sync::RwLockReadGuard<'_, HashMap<ExpenseId, Vec<Segment>>>> {
        self.segments
            .read()
            .map_err(|e| CostsplitError::Transient(format!("Failed to acquire read lock: {}", e)))
    }

    fn write_guard(
        &self,
    ) -> CostsplitResult<std::sync::RwLockWriteGuard<'_, HashMap<ExpenseId, Vec<Segment>>>> {
        self.segments
            .write()
            .map_err(|e| CostsplitError::Transient(format!("Failed to acquire write lock: {}", e)))
    }
}
