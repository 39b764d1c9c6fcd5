use chrono::NaiveDate;
use sea_orm::Database;
use uuid::Uuid;

use engine::{
    AccountKind, AccountPatch, Engine, EngineError, Money, NewAccountCmd, NewTransactionCmd,
    TransactionKind,
};
use migration::MigratorTrait;

struct Fixture {
    engine: Engine,
    user: Uuid,
    account: Uuid,
    food: Uuid,
    transport: Uuid,
}

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, d).unwrap()
}

async fn default_category(engine: &Engine, user: Uuid, name: &str) -> Uuid {
    engine
        .categories(user, None)
        .await
        .unwrap()
        .into_iter()
        .find(|c| c.name == name)
        .unwrap()
        .id
}

async fn post(
    engine: &Engine,
    user: Uuid,
    account: Uuid,
    kind: TransactionKind,
    amount: i64,
    on: NaiveDate,
    category: Option<Uuid>,
) {
    let mut cmd = NewTransactionCmd::new(user, account, kind, amount, "Entry", on);
    if let Some(category) = category {
        cmd = cmd.category_id(category);
    }
    engine.create_transaction(cmd).await.unwrap();
}

/// February nets 20.00; March (to the 15th) nets 15.00 with two categorized
/// expenses, one uncategorized expense and a transfer.
async fn fixture() -> Fixture {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    let user = engine
        .create_user("alice@example.com", "Alice")
        .await
        .unwrap()
        .id;
    let account = engine
        .create_account(
            NewAccountCmd::new(user, "Checking", AccountKind::Checking)
                .opening_balance(Money::new(10_000)),
        )
        .await
        .unwrap()
        .id;
    let dormant = engine
        .create_account(
            NewAccountCmd::new(user, "Old savings", AccountKind::Savings)
                .opening_balance(Money::new(5_000)),
        )
        .await
        .unwrap()
        .id;
    engine
        .update_account(
            user,
            dormant,
            AccountPatch {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let food = default_category(&engine, user, "Food & Dining").await;
    let transport = default_category(&engine, user, "Transportation").await;

    use TransactionKind::{Expense, Income, Transfer};
    post(&engine, user, account, Income, 3_000, date(2, 5), None).await;
    post(&engine, user, account, Expense, 1_000, date(2, 9), Some(food)).await;
    post(&engine, user, account, Income, 5_000, date(3, 1), None).await;
    post(&engine, user, account, Expense, 2_000, date(3, 2), Some(food)).await;
    post(&engine, user, account, Expense, 1_000, date(3, 3), Some(transport)).await;
    post(&engine, user, account, Expense, 500, date(3, 4), None).await;
    post(&engine, user, account, Transfer, 700, date(3, 5), None).await;

    Fixture {
        engine,
        user,
        account,
        food,
        transport,
    }
}

#[tokio::test]
async fn stats_compare_with_previous_month() {
    let f = fixture().await;

    let stats = f
        .engine
        .dashboard_stats(f.user, Some(date(3, 15)))
        .await
        .unwrap();

    // 10_000 + 3_000 - 1_000 + 5_000 - 2_000 - 1_000 - 500 - 700; the
    // inactive account is left out.
    assert_eq!(stats.total_balance_minor, 12_800);
    assert_eq!(stats.total_income_minor, 5_000);
    assert_eq!(stats.total_expense_minor, 3_500);
    assert_eq!(stats.net_savings_minor, 1_500);
    assert_eq!(stats.monthly_change, -25.0);
}

#[tokio::test]
async fn trend_fills_empty_months() {
    let f = fixture().await;

    let trend = f
        .engine
        .monthly_trend(f.user, Some(3), Some(date(3, 15)))
        .await
        .unwrap();

    let rows: Vec<(&str, i64, i64)> = trend
        .iter()
        .map(|m| (m.month.as_str(), m.income_minor, m.expense_minor))
        .collect();
    assert_eq!(
        rows,
        [
            ("2024-01", 0, 0),
            ("2024-02", 3_000, 1_000),
            ("2024-03", 5_000, 3_500),
        ]
    );

    assert!(matches!(
        f.engine.monthly_trend(f.user, Some(0), None).await,
        Err(EngineError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn expenses_split_by_category() {
    let f = fixture().await;

    let split = f
        .engine
        .expense_by_category(f.user, Some(date(3, 1)), Some(date(3, 31)))
        .await
        .unwrap();

    assert_eq!(split.len(), 2);
    assert_eq!(split[0].category_id, f.food);
    assert_eq!(split[0].total_minor, 2_000);
    assert_eq!(split[0].percentage, 66.66);
    assert_eq!(split[1].category_id, f.transport);
    assert_eq!(split[1].total_minor, 1_000);
    assert_eq!(split[1].percentage, 33.33);

    assert!(matches!(
        f.engine
            .expense_by_category(f.user, Some(date(3, 31)), Some(date(3, 1)))
            .await,
        Err(EngineError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn recent_transactions_are_newest_first() {
    let f = fixture().await;

    let recent = f.engine.recent_transactions(f.user, Some(2)).await.unwrap();
    let dates: Vec<NaiveDate> = recent
        .iter()
        .map(|d| d.transaction.transaction_date)
        .collect();
    assert_eq!(dates, [date(3, 5), date(3, 4)]);
    assert_eq!(recent[0].account_name, "Checking");

    assert_eq!(
        f.engine.recent_transactions(f.user, None).await.unwrap().len(),
        5
    );
}

#[tokio::test]
async fn other_users_do_not_leak_into_projections() {
    let f = fixture().await;
    let bob = f
        .engine
        .create_user("bob@example.com", "Bob")
        .await
        .unwrap()
        .id;
    let bobs = f
        .engine
        .create_account(NewAccountCmd::new(bob, "Wallet", AccountKind::Cash))
        .await
        .unwrap()
        .id;
    post(
        &f.engine,
        bob,
        bobs,
        TransactionKind::Expense,
        9_000,
        date(3, 10),
        Some(f.food),
    )
    .await;

    let stats = f
        .engine
        .dashboard_stats(f.user, Some(date(3, 15)))
        .await
        .unwrap();
    assert_eq!(stats.total_expense_minor, 3_500);

    let split = f
        .engine
        .expense_by_category(f.user, Some(date(3, 1)), Some(date(3, 31)))
        .await
        .unwrap();
    assert_eq!(split[0].total_minor, 2_000);

    let recent = f.engine.recent_transactions(f.user, Some(100)).await.unwrap();
    assert!(recent.iter().all(|d| d.transaction.account_id == f.account));
}
