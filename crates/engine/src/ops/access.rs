use sea_orm::{Condition, ConnectionTrait, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, accounts, budgets, categories, transactions, users};

use super::Engine;

/// Generates a `require_*` lookup that only matches rows owned by `user_id`.
///
/// A row owned by somebody else is indistinguishable from a missing one.
macro_rules! impl_owned_lookup {
    ($require_fn:ident, $entity:path, $model:path, $user_col:expr, $label:literal) => {
        pub(super) async fn $require_fn<C: ConnectionTrait>(
            &self,
            db: &C,
            user_id: Uuid,
            target_id: Uuid,
        ) -> ResultEngine<$model> {
            <$entity>::find_by_id(target_id.to_string())
                .filter($user_col.eq(user_id.to_string()))
                .one(db)
                .await?
                .ok_or_else(|| EngineError::NotFound($label.to_string()))
        }
    };
}

impl Engine {
    impl_owned_lookup!(
        require_account,
        accounts::Entity,
        accounts::Model,
        accounts::Column::UserId,
        "account"
    );

    impl_owned_lookup!(
        require_transaction,
        transactions::Entity,
        transactions::Model,
        transactions::Column::UserId,
        "transaction"
    );

    impl_owned_lookup!(
        require_budget,
        budgets::Entity,
        budgets::Model,
        budgets::Column::UserId,
        "budget"
    );

    /// A category the user may reference: their own or a shared default.
    pub(super) async fn require_visible_category<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
        category_id: Uuid,
    ) -> ResultEngine<categories::Model> {
        categories::Entity::find_by_id(category_id.to_string())
            .filter(visible_categories(user_id))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("category".to_string()))
    }

    /// A category the user may modify: their own, never a default.
    pub(super) async fn require_owned_category<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
        category_id: Uuid,
    ) -> ResultEngine<categories::Model> {
        categories::Entity::find_by_id(category_id.to_string())
            .filter(categories::Column::UserId.eq(user_id.to_string()))
            .filter(categories::Column::IsDefault.eq(false))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("category".to_string()))
    }

    pub(super) async fn require_user<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("user".to_string()))
    }
}

/// `user_id = ? OR is_default = true`
pub(super) fn visible_categories(user_id: Uuid) -> Condition {
    Condition::any()
        .add(categories::Column::UserId.eq(user_id.to_string()))
        .add(categories::Column::IsDefault.eq(true))
}
