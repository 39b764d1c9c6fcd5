//! The module contains the `Account` struct and its storage model.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Currency, EngineError, Money, ResultEngine,
    util::{model_currency, parse_uuid, stored},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Checking,
    Savings,
    CreditCard,
    Cash,
    Investment,
    Other,
}

impl AccountKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Checking => "checking",
            Self::Savings => "savings",
            Self::CreditCard => "credit_card",
            Self::Cash => "cash",
            Self::Investment => "investment",
            Self::Other => "other",
        }
    }
}

impl TryFrom<&str> for AccountKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "checking" => Ok(Self::Checking),
            "savings" => Ok(Self::Savings),
            "credit_card" => Ok(Self::CreditCard),
            "cash" => Ok(Self::Cash),
            "investment" => Ok(Self::Investment),
            "other" => Ok(Self::Other),
            other => Err(EngineError::InvalidInput(format!(
                "invalid account kind: {other}"
            ))),
        }
    }
}

/// A money-holding container owned by exactly one user.
///
/// `balance_minor` is denormalized: it always equals `opening_balance_minor`
/// plus the net change of every transaction posted against the account.
/// Only the ledger writes it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub kind: AccountKind,
    pub balance_minor: i64,
    pub opening_balance_minor: i64,
    pub currency: Currency,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn new(
        user_id: Uuid,
        name: String,
        kind: AccountKind,
        opening_balance: Money,
        currency: Currency,
        description: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            kind,
            balance_minor: opening_balance.minor(),
            opening_balance_minor: opening_balance.minor(),
            currency,
            description,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn balance(&self) -> Money {
        Money::new(self.balance_minor)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub kind: String,
    pub balance_minor: i64,
    pub opening_balance_minor: i64,
    pub currency: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Account> for ActiveModel {
    fn from(value: &Account) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            user_id: ActiveValue::Set(value.user_id.to_string()),
            name: ActiveValue::Set(value.name.clone()),
            kind: ActiveValue::Set(value.kind.as_str().to_string()),
            balance_minor: ActiveValue::Set(value.balance_minor),
            opening_balance_minor: ActiveValue::Set(value.opening_balance_minor),
            currency: ActiveValue::Set(value.currency.code().to_string()),
            description: ActiveValue::Set(value.description.clone()),
            is_active: ActiveValue::Set(value.is_active),
            created_at: ActiveValue::Set(value.created_at),
            updated_at: ActiveValue::Set(value.updated_at),
        }
    }
}

impl TryFrom<Model> for Account {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "account")?,
            user_id: parse_uuid(&model.user_id, "user")?,
            name: model.name,
            kind: stored(AccountKind::try_from(model.kind.as_str()), "kind")?,
            balance_minor: model.balance_minor,
            opening_balance_minor: model.opening_balance_minor,
            currency: model_currency(&model.currency)?,
            description: model.description,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
