use chrono::Utc;
use uuid::Uuid;

use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{EngineError, ResultEngine, User, users};

use super::{Engine, normalize_required_text, with_tx};

impl Engine {
    /// Registers a user. Emails are unique, compared case-insensitively.
    pub async fn create_user(&self, email: &str, display_name: &str) -> ResultEngine<User> {
        let email = normalize_required_text(email, "email")?.to_lowercase();
        if !email.contains('@') {
            return Err(EngineError::InvalidInput(format!("invalid email: {email}")));
        }
        let display_name = normalize_required_text(display_name, "display name")?;

        with_tx!(self, |db_tx| {
            let exists = users::Entity::find()
                .filter(users::Column::Email.eq(email.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::Conflict(format!("email {email} already registered")));
            }

            let user = User {
                id: Uuid::new_v4(),
                email,
                display_name,
                created_at: Utc::now(),
            };
            let model: users::ActiveModel = (&user).into();
            model.insert(&db_tx).await?;
            Ok(user)
        })
    }

    pub async fn user(&self, user_id: Uuid) -> ResultEngine<User> {
        let model = self.require_user(&self.database, user_id).await?;
        User::try_from(model)
    }

    pub async fn users(&self) -> ResultEngine<Vec<User>> {
        users::Entity::find()
            .order_by_asc(users::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(User::try_from)
            .collect()
    }
}
