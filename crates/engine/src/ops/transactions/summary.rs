use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::{ConnectionTrait, Statement};

use crate::{
    ResultEngine, TransactionKind,
    util::{current_month_to_date, ensure_date_range},
};

use super::super::Engine;

/// Income and expense totals over an inclusive date range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_income_minor: i64,
    pub total_expense_minor: i64,
    /// Every transaction in range, transfers included.
    pub transaction_count: u64,
    pub net_minor: i64,
}

const SUMMARY_SQL: &str = "SELECT \
     COALESCE(SUM(CASE WHEN kind = ? THEN amount_minor ELSE 0 END), 0) AS income, \
     COALESCE(SUM(CASE WHEN kind = ? THEN amount_minor ELSE 0 END), 0) AS expense, \
     COUNT(*) AS count \
     FROM transactions \
     WHERE user_id = ? AND transaction_date BETWEEN ? AND ?";

impl Engine {
    /// Totals the user's income and expenses between `start` and `end`
    /// (inclusive). Missing bounds default to the current month to date.
    pub async fn transaction_summary(
        &self,
        user_id: Uuid,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> ResultEngine<TransactionSummary> {
        let (default_start, default_end) = current_month_to_date();
        let start_date = start.unwrap_or(default_start);
        let end_date = end.unwrap_or(default_end);
        ensure_date_range(start_date, end_date)?;

        let stmt = Statement::from_sql_and_values(
            self.database.get_database_backend(),
            SUMMARY_SQL,
            vec![
                TransactionKind::Income.as_str().into(),
                TransactionKind::Expense.as_str().into(),
                user_id.to_string().into(),
                start_date.into(),
                end_date.into(),
            ],
        );
        let row = self.database.query_one(stmt).await?;
        let (income, expense, count) = match row {
            Some(row) => (
                row.try_get::<i64>("", "income")?,
                row.try_get::<i64>("", "expense")?,
                row.try_get::<i64>("", "count")?,
            ),
            None => (0, 0, 0),
        };

        Ok(TransactionSummary {
            start_date,
            end_date,
            total_income_minor: income,
            total_expense_minor: expense,
            transaction_count: u64::try_from(count).unwrap_or(0),
            net_minor: income - expense,
        })
    }
}
