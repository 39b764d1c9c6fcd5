use chrono::{NaiveDate, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use engine::{
    AccountKind, AccountPatch, Currency, Engine, EngineError, ErrorKind, Money, NewAccountCmd,
    NewTransactionCmd, TransactionKind,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection, Uuid) {
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
        .unwrap();
    (engine, db, user.id)
}

fn march(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

#[tokio::test]
async fn opening_balance_is_the_starting_balance() {
    let (engine, _db, user) = engine_with_db().await;

    let account = engine
        .create_account(
            NewAccountCmd::new(user, "  Wallet  ", AccountKind::Cash)
                .opening_balance(Money::new(12_345))
                .currency(Currency::Eur),
        )
        .await
        .unwrap();

    assert_eq!(account.name, "Wallet");
    assert_eq!(account.balance_minor, 12_345);
    assert_eq!(account.opening_balance_minor, 12_345);
    assert_eq!(account.currency, Currency::Eur);
    assert!(account.is_active);

    let audit = engine.verify_balance(user, account.id).await.unwrap();
    assert!(audit.is_consistent());
    assert_eq!(audit.expected_minor, 12_345);
}

#[tokio::test]
async fn create_account_requires_known_user_and_name() {
    let (engine, _db, user) = engine_with_db().await;

    assert!(matches!(
        engine
            .create_account(NewAccountCmd::new(user, "   ", AccountKind::Checking))
            .await,
        Err(EngineError::InvalidInput(_))
    ));
    assert!(matches!(
        engine
            .create_account(NewAccountCmd::new(
                Uuid::new_v4(),
                "Ghost",
                AccountKind::Checking
            ))
            .await,
        Err(EngineError::NotFound(_))
    ));
}

#[tokio::test]
async fn accounts_are_scoped_to_their_owner() {
    let (engine, _db, alice) = engine_with_db().await;
    let bob = engine.create_user("bob@example.com", "Bob").await.unwrap().id;

    let account = engine
        .create_account(NewAccountCmd::new(alice, "Checking", AccountKind::Checking))
        .await
        .unwrap();

    assert_eq!(engine.accounts(alice).await.unwrap().len(), 1);
    assert!(engine.accounts(bob).await.unwrap().is_empty());
    assert_eq!(
        engine.account(bob, account.id).await,
        Err(EngineError::NotFound("account".to_string()))
    );
    assert!(matches!(
        engine
            .update_account(bob, account.id, AccountPatch::default().name("Mine"))
            .await,
        Err(EngineError::NotFound(_))
    ));
    assert!(matches!(
        engine.verify_balance(bob, account.id).await,
        Err(EngineError::NotFound(_))
    ));
}

#[tokio::test]
async fn update_touches_metadata_only() {
    let (engine, _db, user) = engine_with_db().await;
    let account = engine
        .create_account(
            NewAccountCmd::new(user, "Checking", AccountKind::Checking)
                .opening_balance(Money::new(1_000))
                .description("main"),
        )
        .await
        .unwrap();

    let updated = engine
        .update_account(
            user,
            account.id,
            AccountPatch::default()
                .name("Daily")
                .description(None)
                .is_active(false),
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Daily");
    assert_eq!(updated.description, None);
    assert!(!updated.is_active);
    assert_eq!(updated.balance_minor, 1_000);

    assert_eq!(
        engine
            .update_account(user, account.id, AccountPatch::default())
            .await,
        Err(EngineError::InvalidInput("no fields to update".to_string()))
    );
}

#[tokio::test]
async fn account_with_history_cannot_be_deleted() {
    let (engine, _db, user) = engine_with_db().await;
    let account = engine
        .create_account(NewAccountCmd::new(user, "Checking", AccountKind::Checking))
        .await
        .unwrap();
    let tx = engine
        .create_transaction(NewTransactionCmd::new(
            user,
            account.id,
            TransactionKind::Expense,
            500,
            "Snack",
            march(1),
        ))
        .await
        .unwrap();

    assert!(matches!(
        engine.delete_account(user, account.id).await,
        Err(EngineError::Conflict(_))
    ));

    engine
        .delete_transaction(user, tx.transaction.id)
        .await
        .unwrap();
    engine.delete_account(user, account.id).await.unwrap();
    assert!(matches!(
        engine.account(user, account.id).await,
        Err(EngineError::NotFound(_))
    ));
}

#[tokio::test]
async fn recompute_repairs_external_drift() {
    let (engine, db, user) = engine_with_db().await;
    let account = engine
        .create_account(
            NewAccountCmd::new(user, "Checking", AccountKind::Checking)
                .opening_balance(Money::new(10_000)),
        )
        .await
        .unwrap();
    engine
        .create_transaction(NewTransactionCmd::new(
            user,
            account.id,
            TransactionKind::Expense,
            2_500,
            "Fuel",
            march(2),
        ))
        .await
        .unwrap();

    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "UPDATE accounts SET balance_minor = ?, updated_at = ? WHERE id = ?",
        vec![1.into(), Utc::now().into(), account.id.to_string().into()],
    ))
    .await
    .unwrap();

    let audit = engine.verify_balance(user, account.id).await.unwrap();
    assert!(!audit.is_consistent());
    assert_eq!(audit.expected_minor, 7_500);
    assert_eq!(audit.drift(), Money::new(1 - 7_500));

    let repaired = engine.recompute_balance(user, account.id).await.unwrap();
    assert_eq!(repaired.balance_minor, 7_500);
    assert!(engine
        .verify_balance(user, account.id)
        .await
        .unwrap()
        .is_consistent());
}

#[tokio::test]
async fn user_emails_are_unique() {
    let (engine, _db, _user) = engine_with_db().await;

    assert!(matches!(
        engine.create_user("ALICE@example.com", "Other").await,
        Err(EngineError::Conflict(_))
    ));
    assert!(matches!(
        engine.create_user("not-an-email", "Other").await,
        Err(EngineError::InvalidInput(_))
    ));
    assert_eq!(engine.users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn unreadable_stored_rows_are_internal_errors() {
    let (engine, db, user) = engine_with_db().await;
    let account = engine
        .create_account(NewAccountCmd::new(user, "Savings", AccountKind::Savings))
        .await
        .unwrap();
    engine
        .create_transaction(NewTransactionCmd::new(
            user,
            account.id,
            TransactionKind::Income,
            100,
            "Interest",
            march(1),
        ))
        .await
        .unwrap();

    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "UPDATE accounts SET opening_balance_minor = ? WHERE id = ?",
        vec![i64::MAX.into(), account.id.to_string().into()],
    ))
    .await
    .unwrap();
    let err = engine.verify_balance(user, account.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);

    let spare = engine
        .create_account(NewAccountCmd::new(user, "Spare", AccountKind::Other))
        .await
        .unwrap();
    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "UPDATE accounts SET id = ? WHERE id = ?",
        vec!["garbage".into(), spare.id.to_string().into()],
    ))
    .await
    .unwrap();
    let err = engine.accounts(user).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
}
