use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::{AccountKind, Currency, Engine, Money, NewAccountCmd};
use migration::MigratorTrait;
use sea_orm::Database;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "tally_admin")]
#[command(about = "Admin utilities for Tally (bootstrap users/accounts, balance repair)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:./tally.db?mode=rwc")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Account(Account),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
    List,
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    name: String,
}

#[derive(Args, Debug)]
struct Account {
    #[command(subcommand)]
    command: AccountCommand,
}

#[derive(Subcommand, Debug)]
enum AccountCommand {
    Create(AccountCreateArgs),
    /// Compare stored balances with their transaction history.
    Verify(AccountUserArgs),
    /// Rewrite a drifted balance from its transaction history.
    Recompute(AccountTargetArgs),
}

#[derive(Args, Debug)]
struct AccountCreateArgs {
    #[arg(long)]
    user: Uuid,
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "checking", value_parser = parse_kind)]
    kind: AccountKind,
    /// Opening balance, e.g. `1250.00`.
    #[arg(long, default_value = "0", value_parser = parse_money)]
    opening_balance: Money,
    #[arg(long, default_value = "USD", value_parser = parse_currency)]
    currency: Currency,
}

#[derive(Args, Debug)]
struct AccountUserArgs {
    #[arg(long)]
    user: Uuid,
}

#[derive(Args, Debug)]
struct AccountTargetArgs {
    #[arg(long)]
    user: Uuid,
    #[arg(long)]
    account: Uuid,
}

fn parse_kind(raw: &str) -> Result<AccountKind, String> {
    AccountKind::try_from(raw).map_err(|err| err.to_string())
}

fn parse_money(raw: &str) -> Result<Money, String> {
    raw.parse().map_err(|err: engine::EngineError| err.to_string())
}

fn parse_currency(raw: &str) -> Result<Currency, String> {
    Currency::try_from(raw).map_err(|err| err.to_string())
}

async fn connect_engine(database_url: &str) -> Result<Engine, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(Engine::builder().database(db).build().await?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let engine = connect_engine(&cli.database_url).await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let user = engine.create_user(&args.email, &args.name).await?;
            println!("created user: {} ({})", user.email, user.id);
        }
        Command::User(User {
            command: UserCommand::List,
        }) => {
            for user in engine.users().await? {
                println!("{}\t{}\t{}", user.id, user.email, user.display_name);
            }
        }
        Command::Account(Account {
            command: AccountCommand::Create(args),
        }) => {
            let account = engine
                .create_account(
                    NewAccountCmd::new(args.user, args.name, args.kind)
                        .opening_balance(args.opening_balance)
                        .currency(args.currency),
                )
                .await?;
            println!("created account: {} ({})", account.name, account.id);
        }
        Command::Account(Account {
            command: AccountCommand::Verify(args),
        }) => {
            let mut drifted = 0;
            for account in engine.accounts(args.user).await? {
                let audit = engine.verify_balance(args.user, account.id).await?;
                let status = if audit.is_consistent() {
                    "ok".to_string()
                } else {
                    drifted += 1;
                    format!("drift {}", audit.drift())
                };
                println!(
                    "{}\t{}\t{} {}\t{status}",
                    account.id,
                    account.name,
                    account.balance(),
                    account.currency
                );
            }
            if drifted > 0 {
                eprintln!("{drifted} account(s) drifted; run `account recompute`");
                std::process::exit(1);
            }
        }
        Command::Account(Account {
            command: AccountCommand::Recompute(args),
        }) => {
            let account = engine.recompute_balance(args.user, args.account).await?;
            println!(
                "recomputed balance: {} {} ({})",
                account.balance(),
                account.currency,
                account.id
            );
        }
    }

    Ok(())
}
