//! Transaction primitives.
//!
//! A `Transaction` is a dated money movement against exactly one account.
//! Its effect on the account balance is its *net change*: `+amount` for
//! income, `-amount` for expense and transfer.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, Money, ResultEngine,
    util::{parse_optional_uuid, parse_uuid, stored},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
    /// Money leaving the account towards somewhere the ledger does not track.
    /// Only the source side is recorded.
    Transfer,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
        }
    }

    /// Signed effect of `amount_minor` on the account balance.
    #[must_use]
    pub fn net_change(self, amount_minor: i64) -> Money {
        match self {
            Self::Income => Money::new(amount_minor),
            Self::Expense | Self::Transfer => -Money::new(amount_minor),
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "transfer" => Ok(Self::Transfer),
            other => Err(EngineError::InvalidInput(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub account_id: Uuid,
    pub category_id: Option<Uuid>,
    pub kind: TransactionKind,
    pub amount_minor: i64,
    pub description: String,
    pub transaction_date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Signed effect of this transaction on its account.
    #[must_use]
    pub fn net_change(&self) -> Money {
        self.kind.net_change(self.amount_minor)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub account_id: String,
    pub category_id: Option<String>,
    pub kind: String,
    pub amount_minor: i64,
    pub description: String,
    pub transaction_date: Date,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Accounts,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Categories,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            user_id: ActiveValue::Set(tx.user_id.to_string()),
            account_id: ActiveValue::Set(tx.account_id.to_string()),
            category_id: ActiveValue::Set(tx.category_id.map(|id| id.to_string())),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(tx.amount_minor),
            description: ActiveValue::Set(tx.description.clone()),
            transaction_date: ActiveValue::Set(tx.transaction_date),
            notes: ActiveValue::Set(tx.notes.clone()),
            created_at: ActiveValue::Set(tx.created_at),
            updated_at: ActiveValue::Set(tx.updated_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            user_id: parse_uuid(&model.user_id, "user")?,
            account_id: parse_uuid(&model.account_id, "account")?,
            category_id: parse_optional_uuid(model.category_id.as_deref(), "category")?,
            kind: stored(TransactionKind::try_from(model.kind.as_str()), "kind")?,
            amount_minor: model.amount_minor,
            description: model.description,
            transaction_date: model.transaction_date,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn net_change_sign_follows_kind() {
        assert_eq!(TransactionKind::Income.net_change(1_200), Money::new(1_200));
        assert_eq!(TransactionKind::Expense.net_change(1_200), Money::new(-1_200));
        assert_eq!(TransactionKind::Transfer.net_change(1_200), Money::new(-1_200));
    }

    #[test]
    fn kind_parsing_is_exact() {
        assert_eq!(
            TransactionKind::try_from("transfer").unwrap(),
            TransactionKind::Transfer
        );
        assert!(TransactionKind::try_from("Income").is_err());
        assert!(TransactionKind::try_from("refund").is_err());
    }
}
