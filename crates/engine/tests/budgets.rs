use chrono::NaiveDate;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

use engine::{
    AccountKind, BudgetPatch, BudgetPeriod, CategoryKind, CategoryPatch, Engine, EngineError,
    NewAccountCmd, NewBudgetCmd, NewCategoryCmd, NewTransactionCmd, TransactionKind,
};
use migration::MigratorTrait;

struct Fixture {
    engine: Engine,
    _db: DatabaseConnection,
    user: Uuid,
    account: Uuid,
}

async fn fixture() -> Fixture {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    let user = engine
        .create_user("alice@example.com", "Alice")
        .await
        .unwrap()
        .id;
    let account = engine
        .create_account(NewAccountCmd::new(user, "Checking", AccountKind::Checking))
        .await
        .unwrap()
        .id;
    Fixture {
        engine,
        _db: db,
        user,
        account,
    }
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

async fn spend(f: &Fixture, category: Uuid, amount: i64, on: NaiveDate) {
    f.engine
        .create_transaction(
            NewTransactionCmd::new(
                f.user,
                f.account,
                TransactionKind::Expense,
                amount,
                "Spend",
                on,
            )
            .category_id(category),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn defaults_are_shared_and_read_only() {
    let f = fixture().await;

    let all = f.engine.categories(f.user, None).await.unwrap();
    assert_eq!(all.len(), 11);
    assert!(all.iter().all(|c| c.is_default && c.user_id.is_none()));

    let income = f
        .engine
        .categories(f.user, Some(CategoryKind::Income))
        .await
        .unwrap();
    assert_eq!(income.len(), 4);

    let salary = default_category(&f.engine, f.user, "Salary").await;
    let patch = CategoryPatch {
        name: Some("Wages".to_string()),
        ..Default::default()
    };
    assert!(matches!(
        f.engine.update_category(f.user, salary, patch).await,
        Err(EngineError::NotFound(_))
    ));
    assert!(matches!(
        f.engine.delete_category(f.user, salary).await,
        Err(EngineError::NotFound(_))
    ));
}

#[tokio::test]
async fn own_categories_sort_after_defaults() {
    let f = fixture().await;

    let pets = f
        .engine
        .create_category(
            NewCategoryCmd::new(f.user, "Pets", CategoryKind::Expense).color("#abc"),
        )
        .await
        .unwrap();
    assert_eq!(pets.icon, "default");
    assert!(!pets.is_default);

    let all = f.engine.categories(f.user, None).await.unwrap();
    assert_eq!(all.last().map(|c| c.id), Some(pets.id));

    let renamed = f
        .engine
        .update_category(
            f.user,
            pets.id,
            CategoryPatch {
                name: Some("Animals".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Animals");
    assert_eq!(renamed.color, "#abc");

    assert!(matches!(
        f.engine
            .create_category(
                NewCategoryCmd::new(f.user, "Bad", CategoryKind::Expense).color("red")
            )
            .await,
        Err(EngineError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn deleting_a_category_detaches_transactions() {
    let f = fixture().await;
    let pets = f
        .engine
        .create_category(NewCategoryCmd::new(f.user, "Pets", CategoryKind::Expense))
        .await
        .unwrap();
    spend(&f, pets.id, 4_000, date(3, 1)).await;
    f.engine
        .create_budget(NewBudgetCmd::new(
            f.user,
            pets.id,
            10_000,
            BudgetPeriod::Monthly,
            date(3, 1),
        ))
        .await
        .unwrap();

    f.engine.delete_category(f.user, pets.id).await.unwrap();

    let page = f
        .engine
        .list_transactions(f.user, &Default::default())
        .await
        .unwrap();
    assert_eq!(page.items[0].transaction.category_id, None);
    assert_eq!(page.items[0].category_name, None);
    assert!(f.engine.budgets(f.user).await.unwrap().is_empty());

    let account = f.engine.account(f.user, f.account).await.unwrap();
    assert_eq!(account.balance_minor, -4_000);
}

#[tokio::test]
async fn budget_tracks_spending_in_window() {
    let f = fixture().await;
    let food = default_category(&f.engine, f.user, "Food & Dining").await;

    let status = f
        .engine
        .create_budget(
            NewBudgetCmd::new(f.user, food, 10_000, BudgetPeriod::Monthly, date(3, 1))
                .end_date(date(3, 31)),
        )
        .await
        .unwrap();
    assert_eq!(status.spent_minor, 0);
    assert_eq!(status.budget.alert_threshold, 80);
    assert_eq!(status.category_name, "Food & Dining");

    spend(&f, food, 5_000, date(3, 5)).await;
    spend(&f, food, 3_500, date(3, 20)).await;
    spend(&f, food, 9_999, date(4, 1)).await;

    let status = f.engine.budget(f.user, status.budget.id).await.unwrap();
    assert_eq!(status.spent_minor, 8_500);
    assert_eq!(status.remaining_minor, 1_500);
    assert!((status.percentage_used - 85.0).abs() < f64::EPSILON);

    let alerts = f.engine.budget_alerts(f.user).await.unwrap();
    assert_eq!(alerts.len(), 1);

    let status = f
        .engine
        .update_budget(
            f.user,
            status.budget.id,
            BudgetPatch {
                amount_minor: Some(20_000),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(status.remaining_minor, 11_500);
    assert!(f.engine.budget_alerts(f.user).await.unwrap().is_empty());
}

#[tokio::test]
async fn budget_rules() {
    let f = fixture().await;
    let food = default_category(&f.engine, f.user, "Food & Dining").await;
    let salary = default_category(&f.engine, f.user, "Salary").await;

    assert!(matches!(
        f.engine
            .create_budget(NewBudgetCmd::new(
                f.user,
                salary,
                10_000,
                BudgetPeriod::Monthly,
                date(1, 1)
            ))
            .await,
        Err(EngineError::InvalidInput(_))
    ));

    let open = f
        .engine
        .create_budget(NewBudgetCmd::new(
            f.user,
            food,
            10_000,
            BudgetPeriod::Yearly,
            date(1, 1),
        ))
        .await
        .unwrap();

    assert!(matches!(
        f.engine
            .create_budget(NewBudgetCmd::new(
                f.user,
                food,
                5_000,
                BudgetPeriod::Monthly,
                date(6, 1)
            ))
            .await,
        Err(EngineError::Conflict(_))
    ));

    // Closing the first window makes room for a later one.
    f.engine
        .update_budget(
            f.user,
            open.budget.id,
            BudgetPatch {
                end_date: Some(Some(date(5, 31))),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    f.engine
        .create_budget(NewBudgetCmd::new(
            f.user,
            food,
            5_000,
            BudgetPeriod::Monthly,
            date(6, 1),
        ))
        .await
        .unwrap();

    assert!(matches!(
        f.engine
            .create_budget(
                NewBudgetCmd::new(f.user, salary, 1, BudgetPeriod::Weekly, date(1, 1))
                    .alert_threshold(120)
            )
            .await,
        Err(EngineError::InvalidInput(_))
    ));

    f.engine.delete_budget(f.user, open.budget.id).await.unwrap();
    assert!(matches!(
        f.engine.budget(f.user, open.budget.id).await,
        Err(EngineError::NotFound(_))
    ));
}

#[tokio::test]
async fn budgeted_category_cannot_turn_into_income() {
    let f = fixture().await;
    let pets = f
        .engine
        .create_category(NewCategoryCmd::new(f.user, "Pets", CategoryKind::Expense))
        .await
        .unwrap();
    let budget = f
        .engine
        .create_budget(NewBudgetCmd::new(
            f.user,
            pets.id,
            3_000,
            BudgetPeriod::Monthly,
            date(1, 1),
        ))
        .await
        .unwrap();

    let to_income = CategoryPatch {
        kind: Some(CategoryKind::Income),
        ..Default::default()
    };
    assert!(matches!(
        f.engine
            .update_category(f.user, pets.id, to_income.clone())
            .await,
        Err(EngineError::Conflict(_))
    ));
    assert_eq!(
        f.engine.category(f.user, pets.id).await.unwrap().kind,
        CategoryKind::Expense
    );

    f.engine
        .delete_budget(f.user, budget.budget.id)
        .await
        .unwrap();
    let updated = f
        .engine
        .update_category(f.user, pets.id, to_income)
        .await
        .unwrap();
    assert_eq!(updated.kind, CategoryKind::Income);
}
