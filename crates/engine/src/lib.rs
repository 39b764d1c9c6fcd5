//! Bookkeeping engine: accounts with consistent balances, and the
//! transactions posted against them.
//!
//! Every write runs inside one database transaction (a *unit of work*): a
//! posted transaction and the balance change it causes are committed together
//! or not at all. All operations are scoped by the caller's user id; records
//! of other users behave as if they did not exist.

pub use accounts::{Account, AccountKind};
pub use budgets::{Budget, BudgetPeriod, BudgetStatus};
pub use categories::{Category, CategoryKind};
pub use commands::{
    AccountPatch, BudgetPatch, CategoryPatch, NewAccountCmd, NewBudgetCmd, NewCategoryCmd,
    NewTransactionCmd, TransactionPatch,
};
pub use currency::Currency;
pub use error::{EngineError, ErrorKind};
pub use money::Money;
pub use ops::{
    BalanceAudit, CategorySpend, DashboardStats, Engine, EngineBuilder, MonthlyTotals,
    TransactionDetail, TransactionListFilter, TransactionPage, TransactionSummary,
};
pub use transactions::{Transaction, TransactionKind};
pub use users::User;

mod accounts;
mod budgets;
mod categories;
mod commands;
mod currency;
mod error;
mod money;
mod ops;
mod transactions;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
