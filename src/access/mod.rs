//! Capability predicates
//!
//! Authorization decisions over (identity, expense) pairs. Owners can always
//! work with their own expenses; Finance and Admin can modify any expense;
//! Manager additionally gets read access to everyone's expenses for review.
//! Keeping these as predicates keeps role branching out of the services.

use tracing::debug;

use crate::models::{Expense, Identity, Role};

/// Whether the identity may view the expense and its segments
pub fn can_view_expense(identity: &Identity, expense: &Expense) -> bool {
    if expense.owner == identity.user_id {
        debug!(expense = %expense.id.short(), user = %identity.user_id.short(), "view allowed (owner)");
        return true;
    }

    let allowed = matches!(identity.role, Role::Manager | Role::Finance | Role::Admin);
    debug!(
        expense = %expense.id.short(),
        user = %identity.user_id.short(),
        role = %identity.role,
        allowed,
        "view capability check"
    );
    allowed
}

/// Whether the identity may modify the expense's segments
pub fn can_modify_expense(identity: &Identity, expense: &Expense) -> bool {
    if expense.owner == identity.user_id {
        debug!(expense = %expense.id.short(), user = %identity.user_id.short(), "modify allowed (owner)");
        return true;
    }

    let allowed = matches!(identity.role, Role::Finance | Role::Admin);
    debug!(
        expense = %expense.id.short(),
        user = %identity.user_id.short(),
        role = %identity.role,
        allowed,
        "modify capability check"
    );
    allowed
}

/// Whether the identity may change an expense's workflow status
pub fn can_review_expense(identity: &Identity) -> bool {
    matches!(identity.role, Role::Manager | Role::Finance | Role::Admin)
}

/// Whether the identity may manage the category registry
pub fn can_manage_categories(identity: &Identity) -> bool {
    matches!(identity.role, Role::Manager | Role::Finance | Role::Admin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExpenseType, Money, UserId};
    use chrono::NaiveDate;

    fn expense_owned_by(owner: UserId) -> Expense {
        Expense::new(
            NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            "Acme",
            Money::from_cents(10000),
            ExpenseType::Expense,
            owner,
        )
    }

    #[test]
    fn test_owner_can_view_and_modify() {
        let owner = UserId::new();
        let expense = expense_owned_by(owner);
        let identity = Identity::new(owner, Role::Employee);

        assert!(can_view_expense(&identity, &expense));
        assert!(can_modify_expense(&identity, &expense));
    }

    #[test]
    fn test_other_employee_denied() {
        let expense = expense_owned_by(UserId::new());
        let identity = Identity::new(UserId::new(), Role::Employee);

        assert!(!can_view_expense(&identity, &expense));
        assert!(!can_modify_expense(&identity, &expense));
    }

    #[test]
    fn test_manager_views_but_cannot_modify() {
        let expense = expense_owned_by(UserId::new());
        let identity = Identity::new(UserId::new(), Role::Manager);

        assert!(can_view_expense(&identity, &expense));
        assert!(!can_modify_expense(&identity, &expense));
    }

    #[test]
    fn test_finance_and_admin_modify_any() {
        let expense = expense_owned_by(UserId::new());

        for role in [Role::Finance, Role::Admin] {
            let identity = Identity::new(UserId::new(), role);
            assert!(can_view_expense(&identity, &expense));
            assert!(can_modify_expense(&identity, &expense));
        }
    }

    #[test]
    fn test_category_management_roles() {
        assert!(!can_manage_categories(&Identity::new(UserId::new(), Role::Employee)));
        assert!(can_manage_categories(&Identity::new(UserId::new(), Role::Manager)));
        assert!(can_manage_categories(&Identity::new(UserId::new(), Role::Finance)));
        assert!(can_manage_categories(&Identity::new(UserId::new(), Role::Admin)));
    }
}
