use sea_orm::TransactionTrait;

use crate::{
    EngineError, ResultEngine, User,
    storage::Storage,
    users,
    util::{
        hash_password, normalize_display, normalize_email, validate_email, validate_name,
        validate_password,
    },
};

use super::{Engine, with_tx};

impl Engine {
    /// Register a new, unverified user.
    pub async fn signup(&self, name: &str, email: &str, password: &str) -> ResultEngine<User> {
        let name = normalize_display(name).unwrap_or_default();
        let email = normalize_email(email);
        validate_name(&name)?;
        validate_email(&email)?;
        validate_password(password)?;

        with_tx!(self, |db_tx| {
            let storage = Storage::new(&db_tx);
            if storage.find_user_by_email(&email).await?.is_some() {
                return Err(EngineError::ExistingKey(email));
            }
            let model = storage
                .create_user(users::ActiveModel::signup(
                    name,
                    email,
                    hash_password(password),
                ))
                .await?;

            tracing::info!(user_id = %model.id, "user signed up");
            Ok(User::from(model))
        })
    }

    /// Check the credentials and return the user.
    pub async fn login(&self, email: &str, password: &str) -> ResultEngine<User> {
        let storage = Storage::new(&self.database);
        let model = storage
            .fetch_user_by_email(&normalize_email(email))
            .await?;
        if model.password != hash_password(password) {
            return Err(EngineError::Validation("invalid password".to_string()));
        }
        Ok(User::from(model))
    }

    pub async fn user(&self, user_id: &str) -> ResultEngine<User> {
        Storage::new(&self.database)
            .fetch_user_by_id(user_id)
            .await
            .map(User::from)
    }

    pub async fn user_by_email(&self, email: &str) -> ResultEngine<User> {
        Storage::new(&self.database)
            .fetch_user_by_email(&normalize_email(email))
            .await
            .map(User::from)
    }

    /// Befriend the user registered with `friend_email`. Friendship is mutual.
    pub async fn add_friend(&self, user_id: &str, friend_email: &str) -> ResultEngine<User> {
        let friend_email = normalize_email(friend_email);
        with_tx!(self, |db_tx| {
            let storage = Storage::new(&db_tx);
            storage.fetch_user_by_id(user_id).await?;
            let friend = storage.fetch_user_by_email(&friend_email).await?;
            if friend.id == user_id {
                return Err(EngineError::Validation(
                    "user cannot befriend themselves".to_string(),
                ));
            }
            if storage.are_friends(user_id, &friend.id).await? {
                return Err(EngineError::ExistingKey(friend_email));
            }
            storage.add_friendship(user_id, &friend.id).await?;

            tracing::info!(user_id, friend_id = %friend.id, "friend added");
            Ok(User::from(friend))
        })
    }

    pub async fn friends(&self, user_id: &str) -> ResultEngine<Vec<User>> {
        let storage = Storage::new(&self.database);
        storage.fetch_user_by_id(user_id).await?;
        storage.fetch_friends(user_id).await
    }
}
