use chrono::Utc;
use uuid::Uuid;

use sea_orm::{TransactionTrait, prelude::*};

use crate::{NewTransactionCmd, ResultEngine, Transaction, transactions};

use super::super::super::{
    Engine, ensure_positive_amount, normalize_optional_text, normalize_required_text, with_tx,
};
use super::super::TransactionDetail;

impl Engine {
    /// Posts a new transaction and moves the account balance by its net
    /// change (`+amount` for income, `-amount` otherwise).
    ///
    /// The insert and the balance update commit together. If either fails
    /// neither is visible.
    pub async fn create_transaction(
        &self,
        cmd: NewTransactionCmd,
    ) -> ResultEngine<TransactionDetail> {
        ensure_positive_amount(cmd.amount_minor)?;
        let description = normalize_required_text(&cmd.description, "description")?;
        let notes = normalize_optional_text(cmd.notes.as_deref());
        let user_id = cmd.user_id;

        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, user_id, cmd.account_id)
                .await?;
            if let Some(category_id) = cmd.category_id {
                self.require_visible_category(&db_tx, user_id, category_id)
                    .await?;
            }

            let now = Utc::now();
            let tx = Transaction {
                id: Uuid::new_v4(),
                user_id,
                account_id: cmd.account_id,
                category_id: cmd.category_id,
                kind: cmd.kind,
                amount_minor: cmd.amount_minor,
                description,
                transaction_date: cmd.transaction_date,
                notes,
                created_at: now,
                updated_at: now,
            };
            let model: transactions::ActiveModel = (&tx).into();
            model.insert(&db_tx).await?;

            self.apply_balance_delta(&db_tx, user_id, tx.account_id, tx.net_change())
                .await?;

            tracing::debug!(transaction_id = %tx.id, "transaction posted");
            self.transaction_detail(&db_tx, tx).await
        })
    }
}
