use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use sea_orm::{
    ActiveValue, Condition, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, Value,
    prelude::*,
};

use crate::{
    Budget, BudgetPatch, BudgetStatus, Category, CategoryKind, EngineError, NewBudgetCmd,
    ResultEngine, TransactionKind,
    budgets::{self, DEFAULT_ALERT_THRESHOLD},
    categories,
    util::ensure_date_range,
};

use super::{Engine, ensure_positive_amount, query_sum, with_tx};

const SPENT_OPEN_SQL: &str = "SELECT SUM(amount_minor) AS sum FROM transactions \
     WHERE user_id = ? AND category_id = ? AND kind = ? AND transaction_date >= ?";

const SPENT_CLOSED_SQL: &str = "SELECT SUM(amount_minor) AS sum FROM transactions \
     WHERE user_id = ? AND category_id = ? AND kind = ? \
     AND transaction_date >= ? AND transaction_date <= ?";

fn validate_threshold(alert_threshold: i32) -> ResultEngine<()> {
    if !(0..=100).contains(&alert_threshold) {
        return Err(EngineError::InvalidInput(
            "alert_threshold must be between 0 and 100".to_string(),
        ));
    }
    Ok(())
}

fn validate_window(start_date: NaiveDate, end_date: Option<NaiveDate>) -> ResultEngine<()> {
    match end_date {
        Some(end_date) => ensure_date_range(start_date, end_date),
        None => Ok(()),
    }
}

impl Engine {
    /// Expense category visible to the user; income categories cannot carry a
    /// budget.
    async fn require_expense_category<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
        category_id: Uuid,
    ) -> ResultEngine<Category> {
        let category = Category::try_from(
            self.require_visible_category(db, user_id, category_id)
                .await?,
        )?;
        if category.kind != CategoryKind::Expense {
            return Err(EngineError::InvalidInput(
                "budgets can only be set on expense categories".to_string(),
            ));
        }
        Ok(category)
    }

    /// Rejects a window that starts while another budget on the same category
    /// is still open (`end_date` NULL or on/after `start_date`).
    async fn ensure_no_overlap<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
        category_id: Uuid,
        start_date: NaiveDate,
        exclude: Option<Uuid>,
    ) -> ResultEngine<()> {
        let mut query = budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id.to_string()))
            .filter(budgets::Column::CategoryId.eq(category_id.to_string()))
            .filter(
                Condition::any()
                    .add(budgets::Column::EndDate.is_null())
                    .add(budgets::Column::EndDate.gte(start_date)),
            );
        if let Some(id) = exclude {
            query = query.filter(budgets::Column::Id.ne(id.to_string()));
        }
        if query.one(db).await?.is_some() {
            return Err(EngineError::Conflict(
                "an active budget already exists for this category".to_string(),
            ));
        }
        Ok(())
    }

    /// Attaches the spending derived from the user's expense transactions.
    async fn budget_status<C: ConnectionTrait>(
        &self,
        db: &C,
        budget: Budget,
    ) -> ResultEngine<BudgetStatus> {
        let category = Category::try_from(
            categories::Entity::find_by_id(budget.category_id.to_string())
                .one(db)
                .await?
                .ok_or_else(|| EngineError::NotFound("category".to_string()))?,
        )?;

        let mut values: Vec<Value> = vec![
            budget.user_id.to_string().into(),
            budget.category_id.to_string().into(),
            TransactionKind::Expense.as_str().into(),
            budget.start_date.into(),
        ];
        let sql = match budget.end_date {
            Some(end_date) => {
                values.push(end_date.into());
                SPENT_CLOSED_SQL
            }
            None => SPENT_OPEN_SQL,
        };
        let spent_minor = query_sum(db, sql, values).await?;

        Ok(BudgetStatus::new(budget, &category, spent_minor))
    }

    pub async fn create_budget(&self, cmd: NewBudgetCmd) -> ResultEngine<BudgetStatus> {
        ensure_positive_amount(cmd.amount_minor)?;
        validate_window(cmd.start_date, cmd.end_date)?;
        let alert_threshold = cmd.alert_threshold.unwrap_or(DEFAULT_ALERT_THRESHOLD);
        validate_threshold(alert_threshold)?;

        with_tx!(self, |db_tx| {
            self.require_expense_category(&db_tx, cmd.user_id, cmd.category_id)
                .await?;
            self.ensure_no_overlap(&db_tx, cmd.user_id, cmd.category_id, cmd.start_date, None)
                .await?;

            let now = Utc::now();
            let budget = Budget {
                id: Uuid::new_v4(),
                user_id: cmd.user_id,
                category_id: cmd.category_id,
                amount_minor: cmd.amount_minor,
                period: cmd.period,
                start_date: cmd.start_date,
                end_date: cmd.end_date,
                alert_threshold,
                created_at: now,
                updated_at: now,
            };
            let model: budgets::ActiveModel = (&budget).into();
            model.insert(&db_tx).await?;

            self.budget_status(&db_tx, budget).await
        })
    }

    pub async fn budget(&self, user_id: Uuid, budget_id: Uuid) -> ResultEngine<BudgetStatus> {
        let model = self
            .require_budget(&self.database, user_id, budget_id)
            .await?;
        self.budget_status(&self.database, Budget::try_from(model)?)
            .await
    }

    /// Lists the user's budgets, newest first.
    pub async fn budgets(&self, user_id: Uuid) -> ResultEngine<Vec<BudgetStatus>> {
        let models = budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id.to_string()))
            .order_by_desc(budgets::Column::CreatedAt)
            .all(&self.database)
            .await?;

        let mut out = Vec::with_capacity(models.len());
        for model in models {
            out.push(
                self.budget_status(&self.database, Budget::try_from(model)?)
                    .await?,
            );
        }
        Ok(out)
    }

    /// Budgets whose spending reached their alert threshold.
    pub async fn budget_alerts(&self, user_id: Uuid) -> ResultEngine<Vec<BudgetStatus>> {
        Ok(self
            .budgets(user_id)
            .await?
            .into_iter()
            .filter(BudgetStatus::is_alerting)
            .collect())
    }

    pub async fn update_budget(
        &self,
        user_id: Uuid,
        budget_id: Uuid,
        patch: BudgetPatch,
    ) -> ResultEngine<BudgetStatus> {
        if patch.is_empty() {
            return Err(EngineError::InvalidInput("no fields to update".to_string()));
        }
        if let Some(amount_minor) = patch.amount_minor {
            ensure_positive_amount(amount_minor)?;
        }
        if let Some(alert_threshold) = patch.alert_threshold {
            validate_threshold(alert_threshold)?;
        }

        with_tx!(self, |db_tx| {
            let current = Budget::try_from(
                self.require_budget(&db_tx, user_id, budget_id).await?,
            )?;
            let start_date = patch.start_date.unwrap_or(current.start_date);
            let end_date = patch.end_date.unwrap_or(current.end_date);
            validate_window(start_date, end_date)?;
            if patch.start_date.is_some() || patch.end_date.is_some() {
                self.ensure_no_overlap(
                    &db_tx,
                    user_id,
                    current.category_id,
                    start_date,
                    Some(budget_id),
                )
                .await?;
            }

            let mut active: budgets::ActiveModel = (&current).into();
            if let Some(amount_minor) = patch.amount_minor {
                active.amount_minor = ActiveValue::Set(amount_minor);
            }
            if let Some(period) = patch.period {
                active.period = ActiveValue::Set(period.as_str().to_string());
            }
            active.start_date = ActiveValue::Set(start_date);
            active.end_date = ActiveValue::Set(end_date);
            if let Some(alert_threshold) = patch.alert_threshold {
                active.alert_threshold = ActiveValue::Set(alert_threshold);
            }
            active.updated_at = ActiveValue::Set(Utc::now());

            let updated = Budget::try_from(active.update(&db_tx).await?)?;
            self.budget_status(&db_tx, updated).await
        })
    }

    pub async fn delete_budget(&self, user_id: Uuid, budget_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_budget(&db_tx, user_id, budget_id).await?;
            budgets::Entity::delete_by_id(budget_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_a_percentage() {
        assert!(validate_threshold(0).is_ok());
        assert!(validate_threshold(100).is_ok());
        assert!(validate_threshold(101).is_err());
        assert!(validate_threshold(-1).is_err());
    }

    #[test]
    fn open_ended_window_is_valid() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(validate_window(start, None).is_ok());
        assert!(validate_window(start, NaiveDate::from_ymd_opt(2023, 12, 31)).is_err());
    }
}
