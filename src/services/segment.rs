//! Segmentation engine
//!
//! Validates and persists category segment sets against a parent expense's
//! total. All set-building operations (create, create-multiple, replace)
//! enforce the reconciliation invariants before any write: categories are
//! registry-valid and unique case-insensitively, amounts are positive, no
//! amount exceeds the expense total, the amounts sum to the total within
//! one cent, and the derived percentages sum to 100.00% within 0.01 points.
//! A failed validation leaves the stored set completely untouched.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::access;
use crate::audit::{AuditEntry, EntityType};
use crate::error::{CostsplitError, CostsplitResult};
use crate::models::{
    Expense, ExpenseId, Identity, Money, Percentage, Segment, SegmentId, SegmentInput,
};
use crate::storage::Storage;

/// Largest allowed gap between the segment amounts and the expense total
pub const AMOUNT_TOLERANCE: Money = Money::from_cents(1);

/// Largest allowed gap when reconciling percentages (0.01 points)
pub const PERCENT_TOLERANCE: Percentage = Percentage::from_hundredths(1);

/// Service for segmenting expenses into category slices
pub struct SegmentationService<'a> {
    storage: &'a Storage,
}

impl<'a> SegmentationService<'a> {
    /// Create a new segmentation service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// List an expense's segments in creation order
    pub fn list_segments(
        &self,
        expense_id: ExpenseId,
        identity: &Identity,
    ) -> CostsplitResult<Vec<Segment>> {
        let expense = self.expense_for_view(expense_id, identity)?;
        self.storage.segments.get_for_expense(expense.id)
    }

    /// Create the first and only segment of an unsegmented expense
    ///
    /// The single segment must cover the full expense amount; partial first
    /// segments would leave the set unreconciled from the start.
    pub fn create_segment(
        &self,
        expense_id: ExpenseId,
        input: SegmentInput,
        identity: &Identity,
    ) -> CostsplitResult<Segment> {
        let expense = self.expense_for_modify(expense_id, identity)?;
        debug!(expense = %expense.id.short(), "creating single segment");

        if self.storage.segments.count_for_expense(expense.id)? > 0 {
            return Err(CostsplitError::Conflict(format!(
                "Expense {} already has segments; use replace instead",
                expense.id.short()
            )));
        }

        if input.amount.abs_diff(expense.amount) > AMOUNT_TOLERANCE {
            return Err(CostsplitError::Validation(format!(
                "Segment amount {} must equal the expense total {} when creating the first and only segment",
                input.amount, expense.amount
            )));
        }

        let mut validated = self.validate_proposal(&expense, std::slice::from_ref(&input))?;
        let segment = validated
            .pop()
            .ok_or_else(|| CostsplitError::Validation("At least one segment is required".into()))?;

        self.storage
            .segments
            .insert_for_empty(expense.id, vec![segment.clone()])?;
        self.storage.segments.save()?;

        self.storage.log_create(
            EntityType::Segment,
            segment.id.to_string(),
            Some(segment.category.clone()),
            &segment,
        )?;
        info!(
            segment = %segment.id.short(),
            expense = %expense.id.short(),
            category = %segment.category,
            "created segment"
        );

        Ok(segment)
    }

    /// Create a full segment set for an expense that currently has none
    pub fn create_segments(
        &self,
        expense_id: ExpenseId,
        inputs: Vec<SegmentInput>,
        identity: &Identity,
    ) -> CostsplitResult<Vec<Segment>> {
        let expense = self.expense_for_modify(expense_id, identity)?;
        debug!(expense = %expense.id.short(), count = inputs.len(), "creating segment set");

        if self.storage.segments.count_for_expense(expense.id)? > 0 {
            return Err(CostsplitError::Conflict(format!(
                "Expense {} already has segments; use replace instead",
                expense.id.short()
            )));
        }

        let segments = self.validate_proposal(&expense, &inputs)?;

        self.storage
            .segments
            .insert_for_empty(expense.id, segments.clone())?;
        self.storage.segments.save()?;

        let entries: Vec<_> = segments
            .iter()
            .map(|s| {
                AuditEntry::create(
                    EntityType::Segment,
                    s.id.to_string(),
                    Some(s.category.clone()),
                    s,
                )
            })
            .collect();
        self.storage.log_batch(&entries)?;
        info!(
            expense = %expense.id.short(),
            created = segments.len(),
            "created segment set"
        );

        Ok(segments)
    }

    /// Atomically replace an expense's entire segment set
    ///
    /// The previous set is discarded and the proposed one persisted with
    /// fresh identifiers, returned in submitted order. Any validation
    /// failure leaves the previous set in place.
    pub fn replace_segments(
        &self,
        expense_id: ExpenseId,
        inputs: Vec<SegmentInput>,
        identity: &Identity,
    ) -> CostsplitResult<Vec<Segment>> {
        let expense = self.expense_for_modify(expense_id, identity)?;
        debug!(expense = %expense.id.short(), count = inputs.len(), "replacing segment set");

        let segments = self.validate_proposal(&expense, &inputs)?;

        let old = self
            .storage
            .segments
            .replace_for_expense(expense.id, segments.clone())?;
        self.storage.segments.save()?;

        let mut entries: Vec<_> = old
            .iter()
            .map(|s| {
                AuditEntry::delete(
                    EntityType::Segment,
                    s.id.to_string(),
                    Some(s.category.clone()),
                    s,
                )
            })
            .collect();
        entries.extend(segments.iter().map(|s| {
            AuditEntry::create(
                EntityType::Segment,
                s.id.to_string(),
                Some(s.category.clone()),
                s,
            )
        }));
        self.storage.log_batch(&entries)?;
        info!(
            expense = %expense.id.short(),
            discarded = old.len(),
            created = segments.len(),
            "replaced segment set"
        );

        Ok(segments)
    }

    /// Edit the one segment of a single-segment expense in place
    ///
    /// Expenses with more than one segment must go through
    /// [`replace_segments`](Self::replace_segments): editing one slice
    /// without its siblings would break the sum-to-total invariant.
    pub fn update_segment(
        &self,
        expense_id: ExpenseId,
        segment_id: SegmentId,
        input: SegmentInput,
        identity: &Identity,
    ) -> CostsplitResult<Segment> {
        let expense = self.expense_for_modify(expense_id, identity)?;
        debug!(
            expense = %expense.id.short(),
            segment = %segment_id.short(),
            "updating segment"
        );

        let existing = self
            .storage
            .segments
            .get(expense.id, segment_id)?
            .ok_or_else(|| CostsplitError::segment_not_found(segment_id.short()))?;

        let count = self.storage.segments.count_for_expense(expense.id)?;
        if count > 1 {
            return Err(CostsplitError::Conflict(format!(
                "Expense {} has {} segments; submit the full set through replace instead of editing one",
                expense.id.short(),
                count
            )));
        }

        // The edited segment is the only one, so the whole-set pipeline
        // applies to it directly and keeps the sum invariant intact.
        let mut validated = self.validate_proposal(&expense, std::slice::from_ref(&input))?;
        let proposed = validated
            .pop()
            .ok_or_else(|| CostsplitError::Validation("At least one segment is required".into()))?;

        let before = existing.clone();
        let mut updated = existing;
        updated.apply(proposed.category, proposed.amount, proposed.percentage);

        self.storage.segments.update_in_expense(updated.clone())?;
        self.storage.segments.save()?;

        self.storage.log_update(
            EntityType::Segment,
            updated.id.to_string(),
            Some(updated.category.clone()),
            &before,
            &updated,
        )?;
        info!(
            segment = %updated.id.short(),
            expense = %expense.id.short(),
            "updated segment"
        );

        Ok(updated)
    }

    /// Delete one segment
    ///
    /// Deleting the last remaining segment is allowed; the expense reverts
    /// to unsegmented, which is a valid terminal state.
    pub fn delete_segment(
        &self,
        expense_id: ExpenseId,
        segment_id: SegmentId,
        identity: &Identity,
    ) -> CostsplitResult<()> {
        let expense = self.expense_for_modify(expense_id, identity)?;

        let removed = self.storage.segments.remove(expense.id, segment_id)?;
        self.storage.segments.save()?;

        self.storage.log_delete(
            EntityType::Segment,
            removed.id.to_string(),
            Some(removed.category.clone()),
            &removed,
        )?;
        info!(
            segment = %removed.id.short(),
            expense = %expense.id.short(),
            category = %removed.category,
            "deleted segment"
        );

        Ok(())
    }

    /// Load an expense and require view capability
    fn expense_for_view(
        &self,
        expense_id: ExpenseId,
        identity: &Identity,
    ) -> CostsplitResult<Expense> {
        let expense = self
            .storage
            .expenses
            .get(expense_id)?
            .ok_or_else(|| CostsplitError::expense_not_found(expense_id.short()))?;

        if !access::can_view_expense(identity, &expense) {
            return Err(CostsplitError::forbidden(
                "view",
                format!("expense {}", expense_id.short()),
            ));
        }

        Ok(expense)
    }

    /// Load an expense and require modify capability plus an editable status
    fn expense_for_modify(
        &self,
        expense_id: ExpenseId,
        identity: &Identity,
    ) -> CostsplitResult<Expense> {
        let expense = self
            .storage
            .expenses
            .get(expense_id)?
            .ok_or_else(|| CostsplitError::expense_not_found(expense_id.short()))?;

        if !access::can_modify_expense(identity, &expense) {
            return Err(CostsplitError::forbidden(
                "modify",
                format!("expense {}", expense_id.short()),
            ));
        }

        if !expense.status.is_editable() {
            return Err(CostsplitError::Conflict(format!(
                "Expense {} is {} and can no longer be segmented",
                expense_id.short(),
                expense.status
            )));
        }

        Ok(expense)
    }

    /// Run a proposed segment set through the full validation pipeline
    ///
    /// Returns the canonical segments (trimmed categories, derived
    /// percentages, fresh identifiers) in submitted order. Nothing is
    /// persisted here.
    fn validate_proposal(
        &self,
        expense: &Expense,
        inputs: &[SegmentInput],
    ) -> CostsplitResult<Vec<Segment>> {
        if inputs.is_empty() {
            return Err(CostsplitError::Validation(
                "At least one segment is required".into(),
            ));
        }

        let mut seen = HashSet::with_capacity(inputs.len());

        for input in inputs {
            let category = input.category.trim();

            if category.is_empty() {
                return Err(CostsplitError::Validation(
                    "Segment category cannot be empty".into(),
                ));
            }

            if !self.storage.categories.is_valid_name(category)? {
                return Err(CostsplitError::Validation(format!(
                    "Category '{}' is not an active registry category",
                    category
                )));
            }

            if !input.amount.is_positive() {
                return Err(CostsplitError::Validation(format!(
                    "Segment amount must be positive, got {}",
                    input.amount
                )));
            }

            if input.amount > expense.amount {
                return Err(CostsplitError::Validation(format!(
                    "Segment amount {} exceeds the expense total {}",
                    input.amount, expense.amount
                )));
            }

            if !seen.insert(category.to_lowercase()) {
                return Err(CostsplitError::Validation(format!(
                    "Duplicate segment category '{}'; categories must be unique within an expense",
                    category
                )));
            }
        }

        let total: Money = inputs.iter().map(|s| s.amount).sum();
        if total.abs_diff(expense.amount) > AMOUNT_TOLERANCE {
            return Err(CostsplitError::Validation(format!(
                "Segment amounts sum to {} but the expense total is {}",
                total, expense.amount
            )));
        }

        let mut segments = Vec::with_capacity(inputs.len());
        let mut total_pct = Percentage::zero();

        for input in inputs {
            let derived = Percentage::of_amount(input.amount, expense.amount);

            if let Some(supplied) = input.percentage {
                if supplied.abs_diff(derived) > PERCENT_TOLERANCE {
                    return Err(CostsplitError::Validation(format!(
                        "Supplied percentage {} for category '{}' does not match the derived {}",
                        supplied,
                        input.category.trim(),
                        derived
                    )));
                }
            }

            total_pct = total_pct + derived;
            segments.push(Segment::new(
                expense.id,
                input.category.trim(),
                input.amount,
                derived,
            ));
        }

        if total_pct.abs_diff(Percentage::HUNDRED) > PERCENT_TOLERANCE {
            return Err(CostsplitError::Validation(format!(
                "Segment percentages sum to {} but must reconcile to 100.00%",
                total_pct
            )));
        }

        Ok(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Paths;
    use crate::models::{Category, ExpenseStatus, ExpenseType, Role, UserId};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = Paths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();

        for name in ["Travel", "Meals", "Lodging", "Supplies"] {
            storage.categories.upsert(Category::new(name)).unwrap();
        }
        let mut retired = Category::new("Faxes");
        retired.deactivate();
        storage.categories.upsert(retired).unwrap();

        (temp_dir, storage)
    }

    fn add_expense(storage: &Storage, owner: UserId, total_cents: i64) -> ExpenseId {
        let expense = Expense::new(
            NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            "Acme Travel",
            Money::from_cents(total_cents),
            ExpenseType::Expense,
            owner,
        );
        let id = expense.id;
        storage.expenses.insert(expense).unwrap();
        id
    }

    fn owner() -> Identity {
        Identity::new(UserId::new(), Role::Employee)
    }

    fn input(category: &str, cents: i64) -> SegmentInput {
        SegmentInput::new(category, Money::from_cents(cents))
    }

    #[test]
    fn test_replace_valid_set() {
        let (_tmp, storage) = create_test_storage();
        let service = SegmentationService::new(&storage);
        let identity = owner();
        let expense_id = add_expense(&storage, identity.user_id, 10000);

        let segments = service
            .replace_segments(
                expense_id,
                vec![input("Travel", 6000), input("Meals", 4000)],
                &identity,
            )
            .unwrap();

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].category, "Travel");
        assert_eq!(segments[0].percentage, Percentage::from_hundredths(6000));
        assert_eq!(segments[1].category, "Meals");
        assert_eq!(segments[1].percentage, Percentage::from_hundredths(4000));

        let total_pct: Percentage = segments.iter().map(|s| s.percentage).sum();
        assert_eq!(total_pct, Percentage::HUNDRED);
    }

    #[test]
    fn test_replace_sum_mismatch_leaves_set_unchanged() {
        let (_tmp, storage) = create_test_storage();
        let service = SegmentationService::new(&storage);
        let identity = owner();
        let expense_id = add_expense(&storage, identity.user_id, 10000);

        service
            .replace_segments(
                expense_id,
                vec![input("Travel", 6000), input("Meals", 4000)],
                &identity,
            )
            .unwrap();

        // 60.00 + 30.00 = 90.00 != 100.00
        let err = service
            .replace_segments(
                expense_id,
                vec![input("Travel", 6000), input("Meals", 3000)],
                &identity,
            )
            .unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("sum to $90.00"));

        // Prior set untouched
        let stored = service.list_segments(expense_id, &identity).unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[1].amount, Money::from_cents(4000));
    }

    #[test]
    fn test_replace_within_one_cent_tolerance() {
        let (_tmp, storage) = create_test_storage();
        let service = SegmentationService::new(&storage);
        let identity = owner();
        let expense_id = add_expense(&storage, identity.user_id, 10000);

        // 33.33 * 3 = 99.99, one cent short of 100.00
        let segments = service
            .replace_segments(
                expense_id,
                vec![
                    input("Travel", 3333),
                    input("Meals", 3333),
                    input("Lodging", 3333),
                ],
                &identity,
            )
            .unwrap();

        let total_pct: Percentage = segments.iter().map(|s| s.percentage).sum();
        assert_eq!(total_pct, Percentage::from_hundredths(9999));
    }

    #[test]
    fn test_replace_rejects_duplicate_categories_case_insensitive() {
        let (_tmp, storage) = create_test_storage();
        let service = SegmentationService::new(&storage);
        let identity = owner();
        let expense_id = add_expense(&storage, identity.user_id, 10000);

        let err = service
            .replace_segments(
                expense_id,
                vec![input("Travel", 6000), input("travel", 4000)],
                &identity,
            )
            .unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("Duplicate"));
    }

    #[test]
    fn test_replace_rejects_unknown_category() {
        let (_tmp, storage) = create_test_storage();
        let service = SegmentationService::new(&storage);
        let identity = owner();
        let expense_id = add_expense(&storage, identity.user_id, 10000);

        let err = service
            .replace_segments(expense_id, vec![input("Snacks", 10000)], &identity)
            .unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("Snacks"));
    }

    #[test]
    fn test_replace_rejects_inactive_category() {
        let (_tmp, storage) = create_test_storage();
        let service = SegmentationService::new(&storage);
        let identity = owner();
        let expense_id = add_expense(&storage, identity.user_id, 10000);

        let err = service
            .replace_segments(expense_id, vec![input("Faxes", 10000)], &identity)
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_replace_rejects_empty_proposal() {
        let (_tmp, storage) = create_test_storage();
        let service = SegmentationService::new(&storage);
        let identity = owner();
        let expense_id = add_expense(&storage, identity.user_id, 10000);

        let err = service
            .replace_segments(expense_id, vec![], &identity)
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_replace_accepts_matching_supplied_percentage() {
        let (_tmp, storage) = create_test_storage();
        let service = SegmentationService::new(&storage);
        let identity = owner();
        let expense_id = add_expense(&storage, identity.user_id, 10000);

        let segments = service
            .replace_segments(
                expense_id,
                vec![
                    SegmentInput::with_percentage(
                        "Travel",
                        Money::from_cents(6000),
                        Percentage::from_hundredths(6000),
                    ),
                    input("Meals", 4000),
                ],
                &identity,
            )
            .unwrap();
        assert_eq!(segments[0].percentage, Percentage::from_hundredths(6000));
    }

    #[test]
    fn test_replace_rejects_mismatched_supplied_percentage() {
        let (_tmp, storage) = create_test_storage();
        let service = SegmentationService::new(&storage);
        let identity = owner();
        let expense_id = add_expense(&storage, identity.user_id, 10000);

        let err = service
            .replace_segments(
                expense_id,
                vec![
                    SegmentInput::with_percentage(
                        "Travel",
                        Money::from_cents(6000),
                        Percentage::from_hundredths(5000), // claims 50%, derives 60%
                    ),
                    input("Meals", 4000),
                ],
                &identity,
            )
            .unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("does not match"));
    }

    #[test]
    fn test_replace_rejects_percentage_sum_drift() {
        let (_tmp, storage) = create_test_storage();
        let service = SegmentationService::new(&storage);
        let identity = owner();
        // 7.00 split into seven equal slices: amounts reconcile exactly but
        // each slice derives 14.29%, summing to 100.03%
        let expense_id = add_expense(&storage, identity.user_id, 700);

        storage.categories.upsert(Category::new("Tolls")).unwrap();
        storage.categories.upsert(Category::new("Parking")).unwrap();
        storage.categories.upsert(Category::new("Tips")).unwrap();

        let err = service
            .replace_segments(
                expense_id,
                vec![
                    input("Travel", 100),
                    input("Meals", 100),
                    input("Lodging", 100),
                    input("Supplies", 100),
                    input("Tolls", 100),
                    input("Parking", 100),
                    input("Tips", 100),
                ],
                &identity,
            )
            .unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("100.03%"));
    }

    #[test]
    fn test_replace_is_idempotent_up_to_ids() {
        let (_tmp, storage) = create_test_storage();
        let service = SegmentationService::new(&storage);
        let identity = owner();
        let expense_id = add_expense(&storage, identity.user_id, 10000);

        let inputs = vec![input("Travel", 6000), input("Meals", 4000)];
        let first = service
            .replace_segments(expense_id, inputs.clone(), &identity)
            .unwrap();
        let second = service
            .replace_segments(expense_id, inputs, &identity)
            .unwrap();

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.category, b.category);
            assert_eq!(a.amount, b.amount);
            assert_eq!(a.percentage, b.percentage);
            assert_ne!(a.id, b.id); // fresh identifiers each replace
        }
    }

    #[test]
    fn test_list_returns_creation_order() {
        let (_tmp, storage) = create_test_storage();
        let service = SegmentationService::new(&storage);
        let identity = owner();
        let expense_id = add_expense(&storage, identity.user_id, 10000);

        service
            .replace_segments(
                expense_id,
                vec![
                    input("Meals", 4000),
                    input("Travel", 3000),
                    input("Lodging", 3000),
                ],
                &identity,
            )
            .unwrap();

        let listed = service.list_segments(expense_id, &identity).unwrap();
        let categories: Vec<_> = listed.iter().map(|s| s.category.as_str()).collect();
        assert_eq!(categories, vec!["Meals", "Travel", "Lodging"]);
    }

    #[test]
    fn test_create_single_full_amount() {
        let (_tmp, storage) = create_test_storage();
        let service = SegmentationService::new(&storage);
        let identity = owner();
        let expense_id = add_expense(&storage, identity.user_id, 10000);

        let segment = service
            .create_segment(expense_id, input("Travel", 10000), &identity)
            .unwrap();
        assert_eq!(segment.percentage, Percentage::HUNDRED);
    }

    #[test]
    fn test_create_single_partial_amount_rejected() {
        let (_tmp, storage) = create_test_storage();
        let service = SegmentationService::new(&storage);
        let identity = owner();
        let expense_id = add_expense(&storage, identity.user_id, 10000);

        let err = service
            .create_segment(expense_id, input("Travel", 6000), &identity)
            .unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("must equal the expense total"));
    }

    #[test]
    fn test_create_single_conflicts_when_segments_exist() {
        let (_tmp, storage) = create_test_storage();
        let service = SegmentationService::new(&storage);
        let identity = owner();
        let expense_id = add_expense(&storage, identity.user_id, 10000);

        service
            .create_segment(expense_id, input("Travel", 10000), &identity)
            .unwrap();
        let err = service
            .create_segment(expense_id, input("Meals", 10000), &identity)
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn test_create_multiple_then_conflict() {
        let (_tmp, storage) = create_test_storage();
        let service = SegmentationService::new(&storage);
        let identity = owner();
        let expense_id = add_expense(&storage, identity.user_id, 10000);

        let segments = service
            .create_segments(
                expense_id,
                vec![input("Travel", 7000), input("Meals", 3000)],
                &identity,
            )
            .unwrap();
        assert_eq!(segments.len(), 2);

        let err = service
            .create_segments(expense_id, vec![input("Travel", 10000)], &identity)
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn test_update_single_segment_category() {
        let (_tmp, storage) = create_test_storage();
        let service = SegmentationService::new(&storage);
        let identity = owner();
        let expense_id = add_expense(&storage, identity.user_id, 5000);

        let segment = service
            .create_segment(expense_id, input("Travel", 5000), &identity)
            .unwrap();

        let updated = service
            .update_segment(expense_id, segment.id, input("Meals", 5000), &identity)
            .unwrap();
        assert_eq!(updated.id, segment.id);
        assert_eq!(updated.category, "Meals");
        assert_eq!(updated.percentage, Percentage::HUNDRED);
    }

    #[test]
    fn test_update_rejects_amount_exceeding_total() {
        let (_tmp, storage) = create_test_storage();
        let service = SegmentationService::new(&storage);
        let identity = owner();
        let expense_id = add_expense(&storage, identity.user_id, 5000);

        let segment = service
            .create_segment(expense_id, input("Travel", 5000), &identity)
            .unwrap();

        // 75.00 against a 50.00 expense
        let err = service
            .update_segment(expense_id, segment.id, input("Travel", 7500), &identity)
            .unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("exceeds the expense total"));
    }

    #[test]
    fn test_update_rejects_non_positive_amount() {
        let (_tmp, storage) = create_test_storage();
        let service = SegmentationService::new(&storage);
        let identity = owner();
        let expense_id = add_expense(&storage, identity.user_id, 5000);

        let segment = service
            .create_segment(expense_id, input("Travel", 5000), &identity)
            .unwrap();

        let err = service
            .update_segment(expense_id, segment.id, input("Travel", 0), &identity)
            .unwrap_err();
        assert!(err.is_validation());

        let err = service
            .update_segment(expense_id, segment.id, input("Travel", -100), &identity)
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_update_conflicts_on_multi_segment_expense() {
        let (_tmp, storage) = create_test_storage();
        let service = SegmentationService::new(&storage);
        let identity = owner();
        let expense_id = add_expense(&storage, identity.user_id, 10000);

        let segments = service
            .replace_segments(
                expense_id,
                vec![input("Travel", 6000), input("Meals", 4000)],
                &identity,
            )
            .unwrap();

        let err = service
            .update_segment(
                expense_id,
                segments[0].id,
                input("Travel", 6000),
                &identity,
            )
            .unwrap_err();
        assert!(err.is_conflict());
        assert!(err.to_string().contains("replace"));
    }

    #[test]
    fn test_update_missing_segment_not_found() {
        let (_tmp, storage) = create_test_storage();
        let service = SegmentationService::new(&storage);
        let identity = owner();
        let expense_id = add_expense(&storage, identity.user_id, 10000);

        let err = service
            .update_segment(expense_id, SegmentId::new(), input("Travel", 10000), &identity)
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_delete_only_segment_leaves_expense_unsegmented() {
        let (_tmp, storage) = create_test_storage();
        let service = SegmentationService::new(&storage);
        let identity = owner();
        let expense_id = add_expense(&storage, identity.user_id, 10000);

        let segment = service
            .create_segment(expense_id, input("Travel", 10000), &identity)
            .unwrap();

        service
            .delete_segment(expense_id, segment.id, &identity)
            .unwrap();

        let listed = service.list_segments(expense_id, &identity).unwrap();
        assert!(listed.is_empty());
    }

    #[test]
    fn test_delete_one_of_many() {
        let (_tmp, storage) = create_test_storage();
        let service = SegmentationService::new(&storage);
        let identity = owner();
        let expense_id = add_expense(&storage, identity.user_id, 10000);

        let segments = service
            .replace_segments(
                expense_id,
                vec![input("Travel", 6000), input("Meals", 4000)],
                &identity,
            )
            .unwrap();

        service
            .delete_segment(expense_id, segments[0].id, &identity)
            .unwrap();

        let listed = service.list_segments(expense_id, &identity).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].category, "Meals");
    }

    #[test]
    fn test_delete_missing_segment_not_found() {
        let (_tmp, storage) = create_test_storage();
        let service = SegmentationService::new(&storage);
        let identity = owner();
        let expense_id = add_expense(&storage, identity.user_id, 10000);

        let err = service
            .delete_segment(expense_id, SegmentId::new(), &identity)
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_missing_expense_not_found() {
        let (_tmp, storage) = create_test_storage();
        let service = SegmentationService::new(&storage);
        let identity = owner();

        let err = service
            .list_segments(ExpenseId::new(), &identity)
            .unwrap_err();
        assert!(err.is_not_found());

        let err = service
            .replace_segments(ExpenseId::new(), vec![input("Travel", 100)], &identity)
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_other_employee_is_forbidden() {
        let (_tmp, storage) = create_test_storage();
        let service = SegmentationService::new(&storage);
        let identity = owner();
        let expense_id = add_expense(&storage, identity.user_id, 10000);

        let stranger = Identity::new(UserId::new(), Role::Employee);
        let err = service
            .list_segments(expense_id, &stranger)
            .unwrap_err();
        assert!(err.is_forbidden());

        let err = service
            .replace_segments(expense_id, vec![input("Travel", 10000)], &stranger)
            .unwrap_err();
        assert!(err.is_forbidden());
    }

    #[test]
    fn test_manager_views_but_cannot_modify() {
        let (_tmp, storage) = create_test_storage();
        let service = SegmentationService::new(&storage);
        let identity = owner();
        let expense_id = add_expense(&storage, identity.user_id, 10000);

        let manager = Identity::new(UserId::new(), Role::Manager);
        assert!(service.list_segments(expense_id, &manager).is_ok());

        let err = service
            .replace_segments(expense_id, vec![input("Travel", 10000)], &manager)
            .unwrap_err();
        assert!(err.is_forbidden());
    }

    #[test]
    fn test_finance_modifies_any_expense() {
        let (_tmp, storage) = create_test_storage();
        let service = SegmentationService::new(&storage);
        let identity = owner();
        let expense_id = add_expense(&storage, identity.user_id, 10000);

        let finance = Identity::new(UserId::new(), Role::Finance);
        let segments = service
            .replace_segments(expense_id, vec![input("Travel", 10000)], &finance)
            .unwrap();
        assert_eq!(segments.len(), 1);
    }

    #[test]
    fn test_locked_expense_rejects_mutation() {
        let (_tmp, storage) = create_test_storage();
        let service = SegmentationService::new(&storage);
        let identity = owner();
        let expense_id = add_expense(&storage, identity.user_id, 10000);

        let mut expense = storage.expenses.get(expense_id).unwrap().unwrap();
        expense.set_status(ExpenseStatus::Approved);
        storage.expenses.update(expense).unwrap();

        let err = service
            .replace_segments(expense_id, vec![input("Travel", 10000)], &identity)
            .unwrap_err();
        assert!(err.is_conflict());

        // Reading stays allowed on locked expenses
        assert!(service.list_segments(expense_id, &identity).is_ok());
    }

    #[test]
    fn test_failed_replace_preserves_set_across_reload() {
        let (_tmp, storage) = create_test_storage();
        let identity = owner();
        let expense_id = {
            let service = SegmentationService::new(&storage);
            let expense_id = add_expense(&storage, identity.user_id, 10000);
            service
                .replace_segments(
                    expense_id,
                    vec![input("Travel", 6000), input("Meals", 4000)],
                    &identity,
                )
                .unwrap();
            service
                .replace_segments(expense_id, vec![input("Travel", 1)], &identity)
                .unwrap_err();
            expense_id
        };

        // Reload from disk: the failed replace must not have been persisted
        storage.segments.load().unwrap();
        let service = SegmentationService::new(&storage);
        let stored = service.list_segments(expense_id, &identity).unwrap();
        assert_eq!(stored.len(), 2);
    }
}
