use uuid::Uuid;

use sea_orm::{TransactionTrait, prelude::*};

use crate::{ResultEngine, Transaction, transactions};

use super::super::super::{Engine, with_tx};

impl Engine {
    /// Deletes a transaction and reverts its net change on the account.
    pub async fn delete_transaction(&self, user_id: Uuid, transaction_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let current = Transaction::try_from(
                self.require_transaction(&db_tx, user_id, transaction_id)
                    .await?,
            )?;

            self.apply_balance_delta(&db_tx, user_id, current.account_id, -current.net_change())
                .await?;
            transactions::Entity::delete_by_id(transaction_id.to_string())
                .exec(&db_tx)
                .await?;

            tracing::debug!(%transaction_id, "transaction deleted");
            Ok(())
        })
    }
}
