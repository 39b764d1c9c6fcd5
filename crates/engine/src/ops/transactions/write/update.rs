use chrono::Utc;
use uuid::Uuid;

use sea_orm::{TransactionTrait, prelude::*};

use crate::{EngineError, ResultEngine, Transaction, TransactionPatch, transactions};

use super::super::super::{Engine, with_tx};
use super::super::TransactionDetail;
use super::super::helpers::{apply_patch, normalize_patch};

impl Engine {
    /// Updates a posted transaction.
    ///
    /// Inside one unit of work: the old net change is reverted on the old
    /// account, the patch is applied, the row is re-read and its new net
    /// change is applied on the (possibly different) account. Changing only
    /// metadata leaves the balance where it was.
    pub async fn update_transaction(
        &self,
        user_id: Uuid,
        transaction_id: Uuid,
        patch: TransactionPatch,
    ) -> ResultEngine<TransactionDetail> {
        let patch = normalize_patch(patch)?;

        // Fail fast on a missing row without opening a unit.
        self.require_transaction(&self.database, user_id, transaction_id)
            .await?;

        with_tx!(self, |db_tx| {
            // Re-read under the unit: these are the values actually reverted.
            let current = Transaction::try_from(
                self.require_transaction(&db_tx, user_id, transaction_id)
                    .await?,
            )?;

            self.apply_balance_delta(&db_tx, user_id, current.account_id, -current.net_change())
                .await?;

            if let Some(account_id) = patch.account_id {
                self.require_account(&db_tx, user_id, account_id).await?;
            }
            if let Some(Some(category_id)) = patch.category_id {
                self.require_visible_category(&db_tx, user_id, category_id)
                    .await?;
            }

            let next = apply_patch(&current, &patch, Utc::now());
            let model: transactions::ActiveModel = (&next).into();
            model.update(&db_tx).await?;

            let stored = Transaction::try_from(
                transactions::Entity::find_by_id(transaction_id.to_string())
                    .one(&db_tx)
                    .await?
                    .ok_or_else(|| EngineError::NotFound("transaction".to_string()))?,
            )?;
            self.apply_balance_delta(&db_tx, user_id, stored.account_id, stored.net_change())
                .await?;

            tracing::debug!(%transaction_id, "transaction updated");
            self.transaction_detail(&db_tx, stored).await
        })
    }
}
