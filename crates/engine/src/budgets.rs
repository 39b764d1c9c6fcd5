//! Spending budgets per expense category.
//!
//! Only the limit and the period are stored; spending is derived from the
//! transactions table whenever a budget is read (see [`BudgetStatus`]).

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    util::{parse_uuid, percent_of, stored},
};

pub const DEFAULT_ALERT_THRESHOLD: i32 = 80;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetPeriod {
    Weekly,
    Monthly,
    Yearly,
}

impl BudgetPeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl TryFrom<&str> for BudgetPeriod {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(EngineError::InvalidInput(format!(
                "invalid budget period: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub amount_minor: i64,
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub alert_threshold: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A budget together with the spending derived at read time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BudgetStatus {
    pub budget: Budget,
    pub category_name: String,
    pub category_color: String,
    pub category_icon: String,
    pub spent_minor: i64,
    pub remaining_minor: i64,
    pub percentage_used: f64,
}

impl BudgetStatus {
    pub(crate) fn new(budget: Budget, category: &crate::Category, spent_minor: i64) -> Self {
        let remaining_minor = budget.amount_minor - spent_minor;
        let percentage_used = percent_of(spent_minor, budget.amount_minor);
        Self {
            budget,
            category_name: category.name.clone(),
            category_color: category.color.clone(),
            category_icon: category.icon.clone(),
            spent_minor,
            remaining_minor,
            percentage_used,
        }
    }

    /// Whether spending reached the alert threshold.
    #[must_use]
    pub fn is_alerting(&self) -> bool {
        self.percentage_used >= f64::from(self.budget.alert_threshold)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub category_id: String,
    pub amount_minor: i64,
    pub period: String,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub alert_threshold: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Categories,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Budget> for ActiveModel {
    fn from(value: &Budget) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            user_id: ActiveValue::Set(value.user_id.to_string()),
            category_id: ActiveValue::Set(value.category_id.to_string()),
            amount_minor: ActiveValue::Set(value.amount_minor),
            period: ActiveValue::Set(value.period.as_str().to_string()),
            start_date: ActiveValue::Set(value.start_date),
            end_date: ActiveValue::Set(value.end_date),
            alert_threshold: ActiveValue::Set(value.alert_threshold),
            created_at: ActiveValue::Set(value.created_at),
            updated_at: ActiveValue::Set(value.updated_at),
        }
    }
}

impl TryFrom<Model> for Budget {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "budget")?,
            user_id: parse_uuid(&model.user_id, "user")?,
            category_id: parse_uuid(&model.category_id, "category")?,
            amount_minor: model.amount_minor,
            period: stored(BudgetPeriod::try_from(model.period.as_str()), "period")?,
            start_date: model.start_date,
            end_date: model.end_date,
            alert_threshold: model.alert_threshold,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::{Category, CategoryKind};

    fn status(amount_minor: i64, spent_minor: i64, alert_threshold: i32) -> BudgetStatus {
        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4(),
            user_id: None,
            name: "Food & Dining".to_string(),
            kind: CategoryKind::Expense,
            color: "#EF4444".to_string(),
            icon: "utensils".to_string(),
            is_default: true,
            created_at: now,
        };
        let budget = Budget {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            category_id: category.id,
            amount_minor,
            period: BudgetPeriod::Monthly,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: None,
            alert_threshold,
            created_at: now,
            updated_at: now,
        };
        BudgetStatus::new(budget, &category, spent_minor)
    }

    #[test]
    fn overspent_budget_goes_negative_and_alerts() {
        let s = status(10_000, 15_000, 80);
        assert_eq!(s.remaining_minor, -5_000);
        assert_eq!(s.percentage_used, 150.0);
        assert!(s.is_alerting());
    }

    #[test]
    fn alert_fires_at_the_threshold() {
        assert!(status(10_000, 8_000, 80).is_alerting());
        assert!(!status(10_000, 7_999, 80).is_alerting());
    }
}
