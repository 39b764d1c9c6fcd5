use chrono::Utc;
use sea_orm::ConnectionTrait;
use sea_orm_migration::prelude::*;
use uuid::Uuid;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    UserId,
    Name,
    Kind,
    Color,
    Icon,
    IsDefault,
    CreatedAt,
}

/// `(name, kind, color, icon)` of every shared category.
const DEFAULTS: [(&str, &str, &str, &str); 11] = [
    ("Salary", "income", "#10B981", "briefcase"),
    ("Freelance", "income", "#06B6D4", "laptop"),
    ("Investments", "income", "#8B5CF6", "trending-up"),
    ("Other Income", "income", "#6366F1", "plus-circle"),
    ("Food & Dining", "expense", "#EF4444", "utensils"),
    ("Transportation", "expense", "#F59E0B", "car"),
    ("Shopping", "expense", "#EC4899", "shopping-bag"),
    ("Bills & Utilities", "expense", "#64748B", "file-text"),
    ("Entertainment", "expense", "#A855F7", "film"),
    ("Healthcare", "expense", "#14B8A6", "heart"),
    ("Other Expense", "expense", "#6B7280", "more-horizontal"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let backend = db.get_database_backend();
        let now = Utc::now();

        for (name, kind, color, icon) in DEFAULTS {
            let stmt = Query::insert()
                .into_table(Categories::Table)
                .columns([
                    Categories::Id,
                    Categories::UserId,
                    Categories::Name,
                    Categories::Kind,
                    Categories::Color,
                    Categories::Icon,
                    Categories::IsDefault,
                    Categories::CreatedAt,
                ])
                .values_panic([
                    Uuid::new_v4().to_string().into(),
                    Option::<String>::None.into(),
                    name.into(),
                    kind.into(),
                    color.into(),
                    icon.into(),
                    true.into(),
                    now.into(),
                ])
                .to_owned();

            db.execute(backend.build(&stmt)).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let backend = db.get_database_backend();
        let stmt = Query::delete()
            .from_table(Categories::Table)
            .and_where(Expr::col(Categories::IsDefault).eq(true))
            .to_owned();
        db.execute(backend.build(&stmt)).await?;
        Ok(())
    }
}
