//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists. `*Patch` types describe partial
//! updates: `None` leaves a field untouched, and for nullable columns
//! `Some(None)` clears the stored value.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{AccountKind, BudgetPeriod, CategoryKind, Currency, Money, TransactionKind};

/// Open a new account.
#[derive(Clone, Debug)]
pub struct NewAccountCmd {
    pub user_id: Uuid,
    pub name: String,
    pub kind: AccountKind,
    pub opening_balance: Money,
    pub currency: Currency,
    pub description: Option<String>,
}

impl NewAccountCmd {
    #[must_use]
    pub fn new(user_id: Uuid, name: impl Into<String>, kind: AccountKind) -> Self {
        Self {
            user_id,
            name: name.into(),
            kind,
            opening_balance: Money::ZERO,
            currency: Currency::default(),
            description: None,
        }
    }

    #[must_use]
    pub fn opening_balance(mut self, opening_balance: Money) -> Self {
        self.opening_balance = opening_balance;
        self
    }

    #[must_use]
    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial update of account metadata. The balance is not patchable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub kind: Option<AccountKind>,
    pub description: Option<Option<String>>,
    pub is_active: Option<bool>,
}

impl AccountPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.kind.is_none()
            && self.description.is_none()
            && self.is_active.is_none()
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: AccountKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    #[must_use]
    pub fn is_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }
}

/// Post a new transaction against an account.
#[derive(Clone, Debug)]
pub struct NewTransactionCmd {
    pub user_id: Uuid,
    pub account_id: Uuid,
    pub category_id: Option<Uuid>,
    pub kind: TransactionKind,
    pub amount_minor: i64,
    pub description: String,
    pub transaction_date: NaiveDate,
    pub notes: Option<String>,
}

impl NewTransactionCmd {
    #[must_use]
    pub fn new(
        user_id: Uuid,
        account_id: Uuid,
        kind: TransactionKind,
        amount_minor: i64,
        description: impl Into<String>,
        transaction_date: NaiveDate,
    ) -> Self {
        Self {
            user_id,
            account_id,
            category_id: None,
            kind,
            amount_minor,
            description: description.into(),
            transaction_date,
            notes: None,
        }
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Partial update of a posted transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionPatch {
    pub account_id: Option<Uuid>,
    pub category_id: Option<Option<Uuid>>,
    pub kind: Option<TransactionKind>,
    pub amount_minor: Option<i64>,
    pub description: Option<String>,
    pub transaction_date: Option<NaiveDate>,
    pub notes: Option<Option<String>>,
}

impl TransactionPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.account_id.is_none()
            && self.category_id.is_none()
            && self.kind.is_none()
            && self.amount_minor.is_none()
            && self.description.is_none()
            && self.transaction_date.is_none()
            && self.notes.is_none()
    }

    #[must_use]
    pub fn account_id(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Option<Uuid>) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn amount_minor(mut self, amount_minor: i64) -> Self {
        self.amount_minor = Some(amount_minor);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn transaction_date(mut self, transaction_date: NaiveDate) -> Self {
        self.transaction_date = Some(transaction_date);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: Option<String>) -> Self {
        self.notes = Some(notes);
        self
    }
}

/// Create a user-owned category.
#[derive(Clone, Debug)]
pub struct NewCategoryCmd {
    pub user_id: Uuid,
    pub name: String,
    pub kind: CategoryKind,
    pub color: Option<String>,
    pub icon: Option<String>,
}

impl NewCategoryCmd {
    #[must_use]
    pub fn new(user_id: Uuid, name: impl Into<String>, kind: CategoryKind) -> Self {
        Self {
            user_id,
            name: name.into(),
            kind,
            color: None,
            icon: None,
        }
    }

    #[must_use]
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    #[must_use]
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub kind: Option<CategoryKind>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

impl CategoryPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.kind.is_none() && self.color.is_none() && self.icon.is_none()
    }
}

/// Create a budget on an expense category.
#[derive(Clone, Debug)]
pub struct NewBudgetCmd {
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub amount_minor: i64,
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub alert_threshold: Option<i32>,
}

impl NewBudgetCmd {
    #[must_use]
    pub fn new(
        user_id: Uuid,
        category_id: Uuid,
        amount_minor: i64,
        period: BudgetPeriod,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            user_id,
            category_id,
            amount_minor,
            period,
            start_date,
            end_date: None,
            alert_threshold: None,
        }
    }

    #[must_use]
    pub fn end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    #[must_use]
    pub fn alert_threshold(mut self, alert_threshold: i32) -> Self {
        self.alert_threshold = Some(alert_threshold);
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BudgetPatch {
    pub amount_minor: Option<i64>,
    pub period: Option<BudgetPeriod>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<Option<NaiveDate>>,
    pub alert_threshold: Option<i32>,
}

impl BudgetPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.amount_minor.is_none()
            && self.period.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.alert_threshold.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_patches_are_empty() {
        assert!(AccountPatch::default().is_empty());
        assert!(TransactionPatch::default().is_empty());
        assert!(CategoryPatch::default().is_empty());
        assert!(BudgetPatch::default().is_empty());
    }

    #[test]
    fn clearing_a_nullable_field_is_not_empty() {
        assert!(!TransactionPatch::default().notes(None).is_empty());
        assert!(!TransactionPatch::default().category_id(None).is_empty());
        assert!(!AccountPatch::default().description(None).is_empty());
    }
}
