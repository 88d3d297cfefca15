use chrono::{ DateTime, Utc };
use sea_orm::{ ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set };
use uuid::Uuid;

use crate::db::entity::{ session, user, Session, User };
use crate::error::Result;

pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create_user(&self, email: String, password_hash: String) -> Result<user::Model> {
        let model = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email),
            password_hash: Set(password_hash),
            created_at: Set(Utc::now()),
        };

        let user = User::insert(model).exec_with_returning(&self.db).await?;
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>> {
        let user = User::find().filter(user::Column::Email.eq(email)).one(&self.db).await?;
        Ok(user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<user::Model>> {
        let user = User::find_by_id(id).one(&self.db).await?;
        Ok(user)
    }

    pub async fn create_session(
        &self,
        user_id: Uuid,
        token_hash: String,
        expires_at: DateTime<Utc>
    ) -> Result<session::Model> {
        let model = session::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            token_hash: Set(token_hash),
            expires_at: Set(expires_at),
            created_at: Set(Utc::now()),
        };

        let session = Session::insert(model).exec_with_returning(&self.db).await?;
        Ok(session)
    }

    pub async fn find_session(&self, token_hash: &str) -> Result<Option<session::Model>> {
        let session = Session::find()
            .filter(session::Column::TokenHash.eq(token_hash))
            .one(&self.db).await?;
        Ok(session)
    }

    pub async fn delete_session(&self, token_hash: &str) -> Result<()> {
        Session::delete_many()
            .filter(session::Column::TokenHash.eq(token_hash))
            .exec(&self.db).await?;
        Ok(())
    }

    pub async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = Session::delete_many()
            .filter(session::Column::ExpiresAt.lt(now))
            .exec(&self.db).await?;
        Ok(result.rows_affected)
    }
}
