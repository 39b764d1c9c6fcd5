use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Gbp,
    Cad,
    Aud,
    Chf,
}

/// Keeps "field absent" (`None`) apart from "field set to null" (`Some(None)`).
fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub mod envelope {
    use super::*;

    /// Body of every successful response.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ApiResponse<T> {
        pub success: bool,
        pub message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub data: Option<T>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub meta: Option<PageMeta>,
    }

    impl<T> ApiResponse<T> {
        pub fn ok(message: impl Into<String>, data: T) -> Self {
            Self {
                success: true,
                message: message.into(),
                data: Some(data),
                meta: None,
            }
        }

        pub fn page(message: impl Into<String>, data: T, meta: PageMeta) -> Self {
            Self {
                meta: Some(meta),
                ..Self::ok(message, data)
            }
        }
    }

    impl ApiResponse<()> {
        pub fn message(message: impl Into<String>) -> Self {
            Self {
                success: true,
                message: message.into(),
                data: None,
                meta: None,
            }
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct PageMeta {
        pub page: u64,
        pub limit: u64,
        pub total: u64,
        pub total_pages: u64,
    }

    /// Body of every failed response.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ErrorResponse {
        pub success: bool,
        pub message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub errors: Option<Vec<FieldError>>,
    }

    impl ErrorResponse {
        pub fn new(message: impl Into<String>) -> Self {
            Self {
                success: false,
                message: message.into(),
                errors: None,
            }
        }

        pub fn with_errors(message: impl Into<String>, errors: Vec<FieldError>) -> Self {
            Self {
                errors: Some(errors),
                ..Self::new(message)
            }
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct FieldError {
        pub field: String,
        pub message: String,
    }
}

pub mod account {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum AccountKind {
        Checking,
        Savings,
        CreditCard,
        Cash,
        Investment,
        Other,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountNew {
        pub name: String,
        #[serde(rename = "type")]
        pub kind: AccountKind,
        /// Starting balance; defaults to 0.
        pub opening_balance_minor: Option<i64>,
        pub currency: Option<Currency>,
        pub description: Option<String>,
    }

    /// Partial update. There is no balance field: balances only move through
    /// transactions.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AccountUpdate {
        pub name: Option<String>,
        #[serde(rename = "type")]
        pub kind: Option<AccountKind>,
        #[serde(default, deserialize_with = "nullable")]
        pub description: Option<Option<String>>,
        pub is_active: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub id: Uuid,
        pub name: String,
        #[serde(rename = "type")]
        pub kind: AccountKind,
        pub balance_minor: i64,
        pub opening_balance_minor: i64,
        pub currency: Currency,
        pub description: Option<String>,
        pub is_active: bool,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceAuditView {
        pub account_id: Uuid,
        pub stored_minor: i64,
        pub expected_minor: i64,
        pub drift_minor: i64,
        pub consistent: bool,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        Income,
        Expense,
        Transfer,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub account_id: Uuid,
        pub category_id: Option<Uuid>,
        #[serde(rename = "type")]
        pub kind: TransactionKind,
        /// Must be > 0. The type defines the sign applied to the balance.
        pub amount_minor: i64,
        pub description: String,
        /// `YYYY-MM-DD`.
        pub transaction_date: NaiveDate,
        pub notes: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionUpdate {
        pub account_id: Option<Uuid>,
        #[serde(default, deserialize_with = "nullable")]
        pub category_id: Option<Option<Uuid>>,
        #[serde(rename = "type")]
        pub kind: Option<TransactionKind>,
        pub amount_minor: Option<i64>,
        pub description: Option<String>,
        pub transaction_date: Option<NaiveDate>,
        #[serde(default, deserialize_with = "nullable")]
        pub notes: Option<Option<String>>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionListQuery {
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
        pub account_id: Option<Uuid>,
        pub category_id: Option<Uuid>,
        #[serde(rename = "type")]
        pub kind: Option<TransactionKind>,
        pub min_amount_minor: Option<i64>,
        pub max_amount_minor: Option<i64>,
        pub page: Option<u64>,
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub account_id: Uuid,
        pub account_name: String,
        pub category_id: Option<Uuid>,
        pub category_name: Option<String>,
        pub category_color: Option<String>,
        pub category_icon: Option<String>,
        #[serde(rename = "type")]
        pub kind: TransactionKind,
        pub amount_minor: i64,
        pub description: String,
        pub transaction_date: NaiveDate,
        pub notes: Option<String>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SummaryQuery {
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SummaryView {
        pub start_date: NaiveDate,
        pub end_date: NaiveDate,
        pub total_income_minor: i64,
        pub total_expense_minor: i64,
        pub net_minor: i64,
        pub transaction_count: u64,
    }
}

pub mod category {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum CategoryKind {
        Income,
        Expense,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
        #[serde(rename = "type")]
        pub kind: CategoryKind,
        /// `#RGB` or `#RRGGBB`.
        pub color: Option<String>,
        pub icon: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryUpdate {
        pub name: Option<String>,
        #[serde(rename = "type")]
        pub kind: Option<CategoryKind>,
        pub color: Option<String>,
        pub icon: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryListQuery {
        #[serde(rename = "type")]
        pub kind: Option<CategoryKind>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
        #[serde(rename = "type")]
        pub kind: CategoryKind,
        pub color: String,
        pub icon: String,
        pub is_default: bool,
        pub created_at: DateTime<Utc>,
    }
}

pub mod budget {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum BudgetPeriod {
        Weekly,
        Monthly,
        Yearly,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetNew {
        pub category_id: Uuid,
        pub amount_minor: i64,
        pub period: BudgetPeriod,
        pub start_date: NaiveDate,
        pub end_date: Option<NaiveDate>,
        /// Percentage in `0..=100`; defaults to 80.
        pub alert_threshold: Option<i32>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BudgetUpdate {
        pub amount_minor: Option<i64>,
        pub period: Option<BudgetPeriod>,
        pub start_date: Option<NaiveDate>,
        #[serde(default, deserialize_with = "nullable")]
        pub end_date: Option<Option<NaiveDate>>,
        pub alert_threshold: Option<i32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetView {
        pub id: Uuid,
        pub category_id: Uuid,
        pub category_name: String,
        pub category_color: String,
        pub category_icon: String,
        pub amount_minor: i64,
        pub period: BudgetPeriod,
        pub start_date: NaiveDate,
        pub end_date: Option<NaiveDate>,
        pub alert_threshold: i32,
        pub spent_minor: i64,
        pub remaining_minor: i64,
        pub percentage_used: f64,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod dashboard {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct StatsQuery {
        /// Defaults to today.
        pub as_of: Option<NaiveDate>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TrendQuery {
        /// `1..=60`, defaults to 6.
        pub months: Option<u32>,
        pub as_of: Option<NaiveDate>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct RecentQuery {
        /// `1..=100`, defaults to 5.
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StatsView {
        pub as_of: NaiveDate,
        pub total_balance_minor: i64,
        pub total_income_minor: i64,
        pub total_expense_minor: i64,
        pub net_savings_minor: i64,
        pub monthly_change: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthlyTotalsView {
        pub month: String,
        pub income_minor: i64,
        pub expense_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategorySpendView {
        pub category_id: Uuid,
        pub category_name: String,
        pub category_color: String,
        pub total_minor: i64,
        pub percentage: f64,
    }
}
