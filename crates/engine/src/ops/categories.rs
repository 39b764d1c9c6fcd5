use chrono::Utc;
use uuid::Uuid;

use sea_orm::{
    ActiveValue, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{
    Category, CategoryKind, CategoryPatch, EngineError, NewCategoryCmd, ResultEngine,
    budgets,
    categories::{self, DEFAULT_COLOR, DEFAULT_ICON},
};

use super::{Engine, access::visible_categories, normalize_required_text, with_tx};

/// Accepts `#RGB` or `#RRGGBB`.
fn normalize_color(value: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    let valid = trimmed
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()));
    if !valid {
        return Err(EngineError::InvalidInput(format!("invalid color: {trimmed}")));
    }
    Ok(trimmed.to_string())
}

impl Engine {
    /// Lists the user's categories and the shared defaults, defaults first,
    /// then by name.
    pub async fn categories(
        &self,
        user_id: Uuid,
        kind: Option<CategoryKind>,
    ) -> ResultEngine<Vec<Category>> {
        let mut query = categories::Entity::find().filter(visible_categories(user_id));
        if let Some(kind) = kind {
            query = query.filter(categories::Column::Kind.eq(kind.as_str()));
        }
        query
            .order_by_desc(categories::Column::IsDefault)
            .order_by_asc(categories::Column::Name)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Category::try_from)
            .collect()
    }

    pub async fn category(&self, user_id: Uuid, category_id: Uuid) -> ResultEngine<Category> {
        let model = self
            .require_visible_category(&self.database, user_id, category_id)
            .await?;
        Category::try_from(model)
    }

    pub async fn create_category(&self, cmd: NewCategoryCmd) -> ResultEngine<Category> {
        let name = normalize_required_text(&cmd.name, "category name")?;
        let color = match cmd.color.as_deref() {
            Some(color) => normalize_color(color)?,
            None => DEFAULT_COLOR.to_string(),
        };
        let icon = cmd
            .icon
            .as_deref()
            .map(|icon| normalize_required_text(icon, "icon"))
            .transpose()?
            .unwrap_or_else(|| DEFAULT_ICON.to_string());

        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, cmd.user_id).await?;

            let category = Category {
                id: Uuid::new_v4(),
                user_id: Some(cmd.user_id),
                name,
                kind: cmd.kind,
                color,
                icon,
                is_default: false,
                created_at: Utc::now(),
            };
            let model: categories::ActiveModel = (&category).into();
            model.insert(&db_tx).await?;
            Ok(category)
        })
    }

    /// Updates one of the user's own categories. Defaults are read-only and
    /// reported as `NotFound`.
    ///
    /// A category with budgets cannot become an income category.
    pub async fn update_category(
        &self,
        user_id: Uuid,
        category_id: Uuid,
        patch: CategoryPatch,
    ) -> ResultEngine<Category> {
        if patch.is_empty() {
            return Err(EngineError::InvalidInput("no fields to update".to_string()));
        }
        let name = patch
            .name
            .as_deref()
            .map(|name| normalize_required_text(name, "category name"))
            .transpose()?;
        let color = patch.color.as_deref().map(normalize_color).transpose()?;
        let icon = patch
            .icon
            .as_deref()
            .map(|icon| normalize_required_text(icon, "icon"))
            .transpose()?;

        with_tx!(self, |db_tx| {
            let model = self
                .require_owned_category(&db_tx, user_id, category_id)
                .await?;
            if patch.kind == Some(CategoryKind::Income)
                && model.kind != CategoryKind::Income.as_str()
            {
                let budgeted = budgets::Entity::find()
                    .filter(budgets::Column::CategoryId.eq(category_id.to_string()))
                    .count(&db_tx)
                    .await?;
                if budgeted > 0 {
                    return Err(EngineError::Conflict(format!(
                        "category has {budgeted} budget(s); only expense categories can carry one"
                    )));
                }
            }
            let mut active: categories::ActiveModel = model.into();
            if let Some(name) = name {
                active.name = ActiveValue::Set(name);
            }
            if let Some(kind) = patch.kind {
                active.kind = ActiveValue::Set(kind.as_str().to_string());
            }
            if let Some(color) = color {
                active.color = ActiveValue::Set(color);
            }
            if let Some(icon) = icon {
                active.icon = ActiveValue::Set(icon);
            }
            let updated = active.update(&db_tx).await?;
            Category::try_from(updated)
        })
    }

    /// Deletes one of the user's own categories.
    ///
    /// Referencing transactions keep their amounts and lose the category;
    /// budgets on it are removed by the schema.
    pub async fn delete_category(&self, user_id: Uuid, category_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_owned_category(&db_tx, user_id, category_id)
                .await?;
            categories::Entity::delete_by_id(category_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}
