use chrono::{DateTime, Utc};
use std::collections::HashMap;

use sea_orm::{ConnectionTrait, QueryFilter, prelude::*};

use crate::{
    EngineError, ResultEngine, Transaction, TransactionPatch, accounts, categories,
};

use super::super::{Engine, ensure_positive_amount, normalize_optional_text, normalize_required_text};
use super::TransactionDetail;

/// Validates and trims a patch before any unit of work is opened.
pub(super) fn normalize_patch(patch: TransactionPatch) -> ResultEngine<TransactionPatch> {
    if patch.is_empty() {
        return Err(EngineError::InvalidInput("no fields to update".to_string()));
    }
    if let Some(amount_minor) = patch.amount_minor {
        ensure_positive_amount(amount_minor)?;
    }
    let description = patch
        .description
        .as_deref()
        .map(|d| normalize_required_text(d, "description"))
        .transpose()?;
    let notes = patch
        .notes
        .as_ref()
        .map(|notes| normalize_optional_text(notes.as_deref()));

    Ok(TransactionPatch {
        description,
        notes,
        ..patch
    })
}

/// Returns `current` with the present patch fields applied.
pub(super) fn apply_patch(
    current: &Transaction,
    patch: &TransactionPatch,
    now: DateTime<Utc>,
) -> Transaction {
    let mut next = current.clone();
    if let Some(account_id) = patch.account_id {
        next.account_id = account_id;
    }
    if let Some(category_id) = patch.category_id {
        next.category_id = category_id;
    }
    if let Some(kind) = patch.kind {
        next.kind = kind;
    }
    if let Some(amount_minor) = patch.amount_minor {
        next.amount_minor = amount_minor;
    }
    if let Some(description) = &patch.description {
        next.description = description.clone();
    }
    if let Some(transaction_date) = patch.transaction_date {
        next.transaction_date = transaction_date;
    }
    if let Some(notes) = &patch.notes {
        next.notes = notes.clone();
    }
    next.updated_at = now;
    next
}

impl Engine {
    pub(super) async fn transaction_detail<C: ConnectionTrait>(
        &self,
        db: &C,
        tx: Transaction,
    ) -> ResultEngine<TransactionDetail> {
        let mut details = self.transaction_details(db, vec![tx]).await?;
        details
            .pop()
            .ok_or_else(|| EngineError::NotFound("transaction".to_string()))
    }

    /// Attaches account and category names with one query per table.
    pub(super) async fn transaction_details<C: ConnectionTrait>(
        &self,
        db: &C,
        txs: Vec<Transaction>,
    ) -> ResultEngine<Vec<TransactionDetail>> {
        if txs.is_empty() {
            return Ok(Vec::new());
        }
        let account_ids: Vec<String> = txs.iter().map(|tx| tx.account_id.to_string()).collect();
        let category_ids: Vec<String> = txs
            .iter()
            .filter_map(|tx| tx.category_id.map(|id| id.to_string()))
            .collect();

        let account_names: HashMap<String, String> = accounts::Entity::find()
            .filter(accounts::Column::Id.is_in(account_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|model| (model.id, model.name))
            .collect();

        let categories: HashMap<String, categories::Model> = if category_ids.is_empty() {
            HashMap::new()
        } else {
            categories::Entity::find()
                .filter(categories::Column::Id.is_in(category_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|model| (model.id.clone(), model))
                .collect()
        };

        let details = txs
            .into_iter()
            .map(|tx| {
                let account_name = account_names
                    .get(&tx.account_id.to_string())
                    .cloned()
                    .unwrap_or_default();
                let category = tx
                    .category_id
                    .and_then(|id| categories.get(&id.to_string()));
                TransactionDetail {
                    account_name,
                    category_name: category.map(|c| c.name.clone()),
                    category_color: category.map(|c| c.color.clone()),
                    category_icon: category.map(|c| c.icon.clone()),
                    transaction: tx,
                }
            })
            .collect();
        Ok(details)
    }
}
