use sea_orm::{ConnectionTrait, DatabaseConnection, Statement, Value};

use crate::{EngineError, ResultEngine};

mod access;
mod accounts;
mod balances;
mod budgets;
mod categories;
mod dashboard;
mod transactions;
mod users;

pub use balances::BalanceAudit;
pub use dashboard::{CategorySpend, DashboardStats, MonthlyTotals};
pub use transactions::{
    TransactionDetail, TransactionListFilter, TransactionPage, TransactionSummary,
};

/// Run a block inside a DB transaction (one unit of work).
///
/// The body is an async block borrowing the transaction. `Ok` commits, `Err`
/// rolls back; if the block returns early the dropped transaction rolls back
/// as well, so the connection is always released.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result: $crate::ResultEngine<_> = async { $body }.await;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => {
                tracing::warn!("rolling back unit of work: {err}");
                if let Err(rollback_err) = $tx.rollback().await {
                    tracing::error!("rollback failed: {rollback_err}");
                }
                Err(err)
            }
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

fn ensure_positive_amount(amount_minor: i64) -> ResultEngine<()> {
    if amount_minor <= 0 {
        return Err(EngineError::InvalidInput(
            "amount_minor must be > 0".to_string(),
        ));
    }
    Ok(())
}

/// Run a parameterized `SELECT ... AS sum` and return the single integer.
async fn query_sum<C: ConnectionTrait>(
    db: &C,
    sql: &str,
    values: Vec<Value>,
) -> ResultEngine<i64> {
    let stmt = Statement::from_sql_and_values(db.get_database_backend(), sql, values);
    let row = db.query_one(stmt).await?;
    let sum = row
        .map(|r| r.try_get::<Option<i64>>("", "sum"))
        .transpose()?
        .flatten();
    Ok(sum.unwrap_or(0))
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_is_trimmed() {
        assert_eq!(
            normalize_required_text("  Groceries ", "description").unwrap(),
            "Groceries"
        );
        assert_eq!(
            normalize_required_text("   ", "description"),
            Err(EngineError::InvalidInput(
                "description must not be empty".to_string()
            ))
        );
    }

    #[test]
    fn blank_optional_text_becomes_none() {
        assert_eq!(normalize_optional_text(Some("  ")), None);
        assert_eq!(normalize_optional_text(Some(" hi ")), Some("hi".to_string()));
        assert_eq!(normalize_optional_text(None), None);
    }

    #[test]
    fn amounts_must_be_positive() {
        assert!(ensure_positive_amount(1).is_ok());
        assert!(ensure_positive_amount(0).is_err());
        assert!(ensure_positive_amount(-5).is_err());
    }
}
