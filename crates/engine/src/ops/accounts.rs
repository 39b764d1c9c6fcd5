use chrono::Utc;
use uuid::Uuid;

use sea_orm::{ActiveValue, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{Account, AccountPatch, EngineError, NewAccountCmd, ResultEngine, accounts, transactions};

use super::{Engine, normalize_optional_text, normalize_required_text, with_tx};

impl Engine {
    /// Opens a new account for `cmd.user_id`.
    ///
    /// The opening balance becomes both the current balance and the baseline
    /// used by [`Engine::verify_balance`].
    pub async fn create_account(&self, cmd: NewAccountCmd) -> ResultEngine<Account> {
        let name = normalize_required_text(&cmd.name, "account name")?;
        let description = normalize_optional_text(cmd.description.as_deref());
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, cmd.user_id).await?;

            let account = Account::new(
                cmd.user_id,
                name,
                cmd.kind,
                cmd.opening_balance,
                cmd.currency,
                description,
            );
            let model: accounts::ActiveModel = (&account).into();
            model.insert(&db_tx).await?;

            tracing::debug!(account_id = %account.id, "account created");
            Ok(account)
        })
    }

    /// Lists the user's accounts, active ones first, newest first.
    pub async fn accounts(&self, user_id: Uuid) -> ResultEngine<Vec<Account>> {
        let models = accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(user_id.to_string()))
            .order_by_desc(accounts::Column::IsActive)
            .order_by_desc(accounts::Column::CreatedAt)
            .all(&self.database)
            .await?;
        models.into_iter().map(Account::try_from).collect()
    }

    /// Return an account snapshot from DB.
    pub async fn account(&self, user_id: Uuid, account_id: Uuid) -> ResultEngine<Account> {
        let model = self
            .require_account(&self.database, user_id, account_id)
            .await?;
        Account::try_from(model)
    }

    /// Updates account metadata. The balance is owned by the ledger and cannot
    /// be patched here.
    pub async fn update_account(
        &self,
        user_id: Uuid,
        account_id: Uuid,
        patch: AccountPatch,
    ) -> ResultEngine<Account> {
        if patch.is_empty() {
            return Err(EngineError::InvalidInput("no fields to update".to_string()));
        }
        let name = patch
            .name
            .as_deref()
            .map(|name| normalize_required_text(name, "account name"))
            .transpose()?;

        with_tx!(self, |db_tx| {
            let model = self.require_account(&db_tx, user_id, account_id).await?;

            let mut active: accounts::ActiveModel = model.into();
            if let Some(name) = name {
                active.name = ActiveValue::Set(name);
            }
            if let Some(kind) = patch.kind {
                active.kind = ActiveValue::Set(kind.as_str().to_string());
            }
            if let Some(description) = &patch.description {
                active.description = ActiveValue::Set(normalize_optional_text(description.as_deref()));
            }
            if let Some(is_active) = patch.is_active {
                active.is_active = ActiveValue::Set(is_active);
            }
            active.updated_at = ActiveValue::Set(Utc::now());

            let updated = active.update(&db_tx).await?;
            Account::try_from(updated)
        })
    }

    /// Deletes an account that no transaction references.
    pub async fn delete_account(&self, user_id: Uuid, account_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, user_id, account_id).await?;

            let dependents = transactions::Entity::find()
                .filter(transactions::Column::AccountId.eq(account_id.to_string()))
                .count(&db_tx)
                .await?;
            if dependents > 0 {
                return Err(EngineError::Conflict(format!(
                    "account has {dependents} transaction(s); delete them first"
                )));
            }

            accounts::Entity::delete_by_id(account_id.to_string())
                .exec(&db_tx)
                .await?;
            tracing::debug!(%account_id, "account deleted");
            Ok(())
        })
    }
}
