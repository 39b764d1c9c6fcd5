//! Read-only projections for the overview screen. Nothing here writes, so no
//! unit of work is opened.

use std::collections::HashMap;

use chrono::{Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::{ConnectionTrait, Statement};

use crate::{
    EngineError, ResultEngine, TransactionKind,
    util::{current_month_to_date, ensure_date_range, month_start, parse_uuid, percent_of},
};

use super::{Engine, TransactionDetail, TransactionListFilter, query_sum};

pub const DEFAULT_TREND_MONTHS: u32 = 6;
pub const MAX_TREND_MONTHS: u32 = 60;
pub const DEFAULT_RECENT_LIMIT: u64 = 5;

/// Headline numbers for the month containing `as_of`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub as_of: NaiveDate,
    /// Sum over active accounts.
    pub total_balance_minor: i64,
    pub total_income_minor: i64,
    pub total_expense_minor: i64,
    pub net_savings_minor: i64,
    /// Net savings change against the previous month, in percent.
    pub monthly_change: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTotals {
    /// `YYYY-MM`.
    pub month: String,
    pub income_minor: i64,
    pub expense_minor: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategorySpend {
    pub category_id: Uuid,
    pub category_name: String,
    pub category_color: String,
    pub total_minor: i64,
    /// Share of all categorized expenses in the range.
    pub percentage: f64,
}

const ACTIVE_BALANCE_SQL: &str = "SELECT SUM(balance_minor) AS sum FROM accounts \
     WHERE user_id = ? AND is_active = ?";

const MONTHLY_TREND_SQL: &str = "SELECT \
     strftime('%Y-%m', transaction_date) AS month, \
     COALESCE(SUM(CASE WHEN kind = ? THEN amount_minor ELSE 0 END), 0) AS income, \
     COALESCE(SUM(CASE WHEN kind = ? THEN amount_minor ELSE 0 END), 0) AS expense \
     FROM transactions \
     WHERE user_id = ? AND transaction_date BETWEEN ? AND ? \
     GROUP BY month \
     ORDER BY month ASC";

const EXPENSE_BY_CATEGORY_SQL: &str = "SELECT \
     c.id AS category_id, c.name AS category_name, c.color AS category_color, \
     SUM(t.amount_minor) AS total \
     FROM transactions t \
     JOIN categories c ON t.category_id = c.id \
     WHERE t.user_id = ? AND t.kind = ? AND t.transaction_date BETWEEN ? AND ? \
     GROUP BY c.id, c.name, c.color \
     ORDER BY total DESC, c.name ASC";

/// Percent change from `previous` to `current`. A month after a zero month
/// counts as +100% when it saved anything.
fn monthly_change(current: i64, previous: i64) -> f64 {
    if previous != 0 {
        percent_of(current - previous, previous.abs())
    } else if current > 0 {
        100.0
    } else {
        0.0
    }
}

/// `months` consecutive `YYYY-MM` labels ending with the month of `as_of`.
fn trend_window(as_of: NaiveDate, months: u32) -> ResultEngine<(NaiveDate, Vec<String>)> {
    if !(1..=MAX_TREND_MONTHS).contains(&months) {
        return Err(EngineError::InvalidInput(format!(
            "months must be between 1 and {MAX_TREND_MONTHS}"
        )));
    }
    let start = month_start(as_of)
        .checked_sub_months(Months::new(months - 1))
        .ok_or_else(|| EngineError::InvalidInput("months reaches before year 1".to_string()))?;

    let labels = (0..months)
        .filter_map(|offset| start.checked_add_months(Months::new(offset)))
        .map(|month| month.format("%Y-%m").to_string())
        .collect();
    Ok((start, labels))
}

impl Engine {
    /// Balance across active accounts plus this month's income, expense and
    /// net savings, compared with the previous month.
    ///
    /// `as_of` defaults to today (UTC); the month runs from its first day to
    /// `as_of`.
    pub async fn dashboard_stats(
        &self,
        user_id: Uuid,
        as_of: Option<NaiveDate>,
    ) -> ResultEngine<DashboardStats> {
        let as_of = as_of.unwrap_or_else(|| Utc::now().date_naive());
        let this_month = month_start(as_of);
        let last_month_end = this_month.pred_opt().unwrap_or(this_month);

        let total_balance_minor = query_sum(
            &self.database,
            ACTIVE_BALANCE_SQL,
            vec![user_id.to_string().into(), true.into()],
        )
        .await?;
        let current = self
            .transaction_summary(user_id, Some(this_month), Some(as_of))
            .await?;
        let previous = self
            .transaction_summary(
                user_id,
                Some(month_start(last_month_end)),
                Some(last_month_end),
            )
            .await?;

        Ok(DashboardStats {
            as_of,
            total_balance_minor,
            total_income_minor: current.total_income_minor,
            total_expense_minor: current.total_expense_minor,
            net_savings_minor: current.net_minor,
            monthly_change: monthly_change(current.net_minor, previous.net_minor),
        })
    }

    /// Income and expense per calendar month, oldest first. Months without
    /// transactions are reported with zero totals.
    pub async fn monthly_trend(
        &self,
        user_id: Uuid,
        months: Option<u32>,
        as_of: Option<NaiveDate>,
    ) -> ResultEngine<Vec<MonthlyTotals>> {
        let as_of = as_of.unwrap_or_else(|| Utc::now().date_naive());
        let (start, labels) = trend_window(as_of, months.unwrap_or(DEFAULT_TREND_MONTHS))?;

        let stmt = Statement::from_sql_and_values(
            self.database.get_database_backend(),
            MONTHLY_TREND_SQL,
            vec![
                TransactionKind::Income.as_str().into(),
                TransactionKind::Expense.as_str().into(),
                user_id.to_string().into(),
                start.into(),
                as_of.into(),
            ],
        );
        let mut totals = HashMap::new();
        for row in self.database.query_all(stmt).await? {
            let month: String = row.try_get("", "month")?;
            let income: i64 = row.try_get("", "income")?;
            let expense: i64 = row.try_get("", "expense")?;
            totals.insert(month, (income, expense));
        }

        Ok(labels
            .into_iter()
            .map(|month| {
                let (income_minor, expense_minor) =
                    totals.get(&month).copied().unwrap_or((0, 0));
                MonthlyTotals {
                    month,
                    income_minor,
                    expense_minor,
                }
            })
            .collect())
    }

    /// Expenses grouped by category, largest first. Uncategorized expenses
    /// are left out. Missing bounds default to the current month to date.
    pub async fn expense_by_category(
        &self,
        user_id: Uuid,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> ResultEngine<Vec<CategorySpend>> {
        let (default_start, default_end) = current_month_to_date();
        let start_date = start.unwrap_or(default_start);
        let end_date = end.unwrap_or(default_end);
        ensure_date_range(start_date, end_date)?;

        let stmt = Statement::from_sql_and_values(
            self.database.get_database_backend(),
            EXPENSE_BY_CATEGORY_SQL,
            vec![
                user_id.to_string().into(),
                TransactionKind::Expense.as_str().into(),
                start_date.into(),
                end_date.into(),
            ],
        );
        let rows = self.database.query_all(stmt).await?;

        let mut spends = Vec::with_capacity(rows.len());
        for row in rows {
            let category_id: String = row.try_get("", "category_id")?;
            spends.push(CategorySpend {
                category_id: parse_uuid(&category_id, "category")?,
                category_name: row.try_get("", "category_name")?,
                category_color: row.try_get("", "category_color")?,
                total_minor: row.try_get("", "total")?,
                percentage: 0.0,
            });
        }

        let grand_total: i64 = spends.iter().map(|s| s.total_minor).sum();
        for spend in &mut spends {
            spend.percentage = percent_of(spend.total_minor, grand_total);
        }
        Ok(spends)
    }

    /// The latest transactions, newest first. `limit` defaults to 5.
    pub async fn recent_transactions(
        &self,
        user_id: Uuid,
        limit: Option<u64>,
    ) -> ResultEngine<Vec<TransactionDetail>> {
        let filter = TransactionListFilter {
            limit: Some(limit.unwrap_or(DEFAULT_RECENT_LIMIT)),
            ..Default::default()
        };
        Ok(self.list_transactions(user_id, &filter).await?.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn change_against_previous_month() {
        assert_eq!(monthly_change(150, 100), 50.0);
        assert_eq!(monthly_change(50, -100), 150.0);
        assert_eq!(monthly_change(-20, 40), -150.0);
        assert_eq!(monthly_change(10, 0), 100.0);
        assert_eq!(monthly_change(-10, 0), 0.0);
    }

    #[test]
    fn trend_window_crosses_year_boundary() {
        let (start, labels) = trend_window(day(2024, 2, 17), 4).unwrap();
        assert_eq!(start, day(2023, 11, 1));
        assert_eq!(labels, ["2023-11", "2023-12", "2024-01", "2024-02"]);
    }

    #[test]
    fn trend_window_bounds_months() {
        assert!(trend_window(day(2024, 2, 17), 0).is_err());
        assert!(trend_window(day(2024, 2, 17), MAX_TREND_MONTHS + 1).is_err());
    }
}
