use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::{Condition, PaginatorTrait, QueryFilter, QueryOrder, prelude::*};

use crate::{EngineError, ResultEngine, Transaction, TransactionKind, transactions};

use super::super::Engine;
use super::TransactionDetail;

pub const DEFAULT_PAGE_LIMIT: u64 = 20;
pub const MAX_PAGE_LIMIT: u64 = 100;

/// Filters for listing transactions. Every bound is inclusive.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionListFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub account_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub kind: Option<TransactionKind>,
    pub min_amount_minor: Option<i64>,
    pub max_amount_minor: Option<i64>,
    /// 1-based page number (default 1).
    pub page: Option<u64>,
    /// Page size, `1..=100` (default 20).
    pub limit: Option<u64>,
}

impl TransactionListFilter {
    fn page(&self) -> u64 {
        self.page.unwrap_or(1)
    }

    fn limit(&self) -> u64 {
        self.limit.unwrap_or(DEFAULT_PAGE_LIMIT)
    }
}

/// One page of transactions plus the total number of matches.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionPage {
    pub items: Vec<TransactionDetail>,
    pub page: u64,
    pub limit: u64,
    pub total: u64,
}

impl TransactionPage {
    #[must_use]
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.limit.max(1))
    }
}

fn validate_list_filter(filter: &TransactionListFilter) -> ResultEngine<()> {
    if let (Some(start), Some(end)) = (filter.start_date, filter.end_date)
        && start > end
    {
        return Err(EngineError::InvalidInput(
            "invalid range: start_date must be <= end_date".to_string(),
        ));
    }
    if let (Some(min), Some(max)) = (filter.min_amount_minor, filter.max_amount_minor)
        && min > max
    {
        return Err(EngineError::InvalidInput(
            "invalid range: min_amount must be <= max_amount".to_string(),
        ));
    }
    if filter.page() == 0 {
        return Err(EngineError::InvalidInput("page must be >= 1".to_string()));
    }
    if !(1..=MAX_PAGE_LIMIT).contains(&filter.limit()) {
        return Err(EngineError::InvalidInput(format!(
            "limit must be between 1 and {MAX_PAGE_LIMIT}"
        )));
    }
    Ok(())
}

trait ApplyTxFilters: QueryFilter + Sized {
    fn apply_tx_filters(self, filter: &TransactionListFilter) -> Self;
}

impl<T> ApplyTxFilters for T
where
    T: QueryFilter + Sized,
{
    fn apply_tx_filters(self, filter: &TransactionListFilter) -> Self {
        let mut cond = Condition::all();
        if let Some(start) = filter.start_date {
            cond = cond.add(transactions::Column::TransactionDate.gte(start));
        }
        if let Some(end) = filter.end_date {
            cond = cond.add(transactions::Column::TransactionDate.lte(end));
        }
        if let Some(account_id) = filter.account_id {
            cond = cond.add(transactions::Column::AccountId.eq(account_id.to_string()));
        }
        if let Some(category_id) = filter.category_id {
            cond = cond.add(transactions::Column::CategoryId.eq(category_id.to_string()));
        }
        if let Some(kind) = filter.kind {
            cond = cond.add(transactions::Column::Kind.eq(kind.as_str()));
        }
        if let Some(min) = filter.min_amount_minor {
            cond = cond.add(transactions::Column::AmountMinor.gte(min));
        }
        if let Some(max) = filter.max_amount_minor {
            cond = cond.add(transactions::Column::AmountMinor.lte(max));
        }
        self.filter(cond)
    }
}

impl Engine {
    /// Lists the user's transactions, newest first
    /// (`transaction_date DESC, created_at DESC`).
    pub async fn list_transactions(
        &self,
        user_id: Uuid,
        filter: &TransactionListFilter,
    ) -> ResultEngine<TransactionPage> {
        validate_list_filter(filter)?;
        let page = filter.page();
        let limit = filter.limit();

        let paginator = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id.to_string()))
            .apply_tx_filters(filter)
            .order_by_desc(transactions::Column::TransactionDate)
            .order_by_desc(transactions::Column::CreatedAt)
            .paginate(&self.database, limit);

        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page - 1).await?;
        let txs = models
            .into_iter()
            .map(Transaction::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;
        let items = self.transaction_details(&self.database, txs).await?;

        Ok(TransactionPage {
            items,
            page,
            limit,
            total,
        })
    }
}
