//! Transaction Poster: every write here moves the owning account balance by
//! exactly the net change it introduces or removes, inside one unit of work.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ResultEngine, Transaction};

use super::Engine;

mod helpers;
mod list;
mod summary;
mod write;

pub use list::{TransactionListFilter, TransactionPage};
pub use summary::TransactionSummary;

/// A transaction enriched with the names the UI shows next to it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDetail {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub account_name: String,
    pub category_name: Option<String>,
    pub category_color: Option<String>,
    pub category_icon: Option<String>,
}

impl Engine {
    /// Returns one transaction of the user. Pure read, no unit of work.
    pub async fn transaction(
        &self,
        user_id: Uuid,
        transaction_id: Uuid,
    ) -> ResultEngine<TransactionDetail> {
        let model = self
            .require_transaction(&self.database, user_id, transaction_id)
            .await?;
        let tx = Transaction::try_from(model)?;
        self.transaction_detail(&self.database, tx).await
    }
}
