use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*,
    sea_query::Expr,
};

use crate::{
    Account, EngineError, Money, ResultEngine, TransactionKind, accounts, util::corrupt_row,
};

use super::{Engine, query_sum, with_tx};

/// Stored balance of an account next to the value implied by its ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceAudit {
    pub account_id: Uuid,
    pub stored_minor: i64,
    pub expected_minor: i64,
}

impl BalanceAudit {
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.stored_minor == self.expected_minor
    }

    #[must_use]
    pub fn drift(&self) -> Money {
        Money::new(self.stored_minor - self.expected_minor)
    }
}

const NET_CHANGE_SQL: &str = "SELECT SUM(CASE WHEN kind = ? THEN amount_minor ELSE -amount_minor END) AS sum \
     FROM transactions \
     WHERE account_id = ? AND user_id = ?";

impl Engine {
    /// `balance += delta` for one account, as a single conditional `UPDATE`.
    ///
    /// Requires an open unit of work. The row is matched on both id and owner,
    /// so a foreign account yields `NotFound` and nothing is written.
    pub(super) async fn apply_balance_delta(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: Uuid,
        account_id: Uuid,
        delta: Money,
    ) -> ResultEngine<()> {
        let result = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::BalanceMinor,
                Expr::col(accounts::Column::BalanceMinor).add(delta.minor()),
            )
            .col_expr(accounts::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(accounts::Column::Id.eq(account_id.to_string()))
            .filter(accounts::Column::UserId.eq(user_id.to_string()))
            .exec(db_tx)
            .await?;

        if result.rows_affected == 0 {
            return Err(EngineError::NotFound("account".to_string()));
        }
        tracing::debug!(%account_id, delta = delta.minor(), "balance adjusted");
        Ok(())
    }

    /// Sum of the net change of every transaction posted against the account.
    async fn ledger_net_change<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
        account_id: Uuid,
    ) -> ResultEngine<Money> {
        let sum = query_sum(
            db,
            NET_CHANGE_SQL,
            vec![
                TransactionKind::Income.as_str().into(),
                account_id.to_string().into(),
                user_id.to_string().into(),
            ],
        )
        .await?;
        Ok(Money::new(sum))
    }

    /// Compares the stored balance with `opening balance + Σ net change`.
    ///
    /// Read-only; both values are read inside the same unit so they describe
    /// one snapshot.
    pub async fn verify_balance(&self, user_id: Uuid, account_id: Uuid) -> ResultEngine<BalanceAudit> {
        with_tx!(self, |db_tx| {
            let model = self.require_account(&db_tx, user_id, account_id).await?;
            let net = self.ledger_net_change(&db_tx, user_id, account_id).await?;
            let expected = Money::new(model.opening_balance_minor)
                .checked_add(net)
                .ok_or_else(|| corrupt_row(format!("balance of {account_id} overflows")))?;

            Ok(BalanceAudit {
                account_id,
                stored_minor: model.balance_minor,
                expected_minor: expected.minor(),
            })
        })
    }

    /// Rewrites the denormalized balance from the ledger.
    ///
    /// Repair path for a store that was modified outside the engine.
    pub async fn recompute_balance(&self, user_id: Uuid, account_id: Uuid) -> ResultEngine<Account> {
        with_tx!(self, |db_tx| {
            let model = self.require_account(&db_tx, user_id, account_id).await?;
            let net = self.ledger_net_change(&db_tx, user_id, account_id).await?;
            let expected = Money::new(model.opening_balance_minor)
                .checked_add(net)
                .ok_or_else(|| corrupt_row(format!("balance of {account_id} overflows")))?;

            if expected.minor() != model.balance_minor {
                tracing::warn!(
                    %account_id,
                    stored = model.balance_minor,
                    expected = expected.minor(),
                    "repairing drifted balance"
                );
            }

            let active = accounts::ActiveModel {
                id: ActiveValue::Set(model.id),
                balance_minor: ActiveValue::Set(expected.minor()),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            };
            let updated = active.update(&db_tx).await?;
            Account::try_from(updated)
        })
    }
}
