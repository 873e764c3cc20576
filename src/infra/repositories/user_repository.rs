//! User repository: the persistence interface consumed by the services.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, Statement,
};

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::domain::{DeletedUser, NewUser, User, UserPatch};
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// Absence is reported as `Ok(None)`; only genuine failures are errors.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>>;

    /// Find user by email address
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Insert a new user
    async fn create(&self, user: NewUser) -> AppResult<User>;

    /// Apply a patch in one statement; `None` when no row has this id
    async fn update(&self, id: i32, patch: UserPatch) -> AppResult<Option<User>>;

    /// Delete in one statement; `None` when no row has this id
    async fn delete(&self, id: i32) -> AppResult<Option<DeletedUser>>;

    /// List all users
    async fn list(&self) -> AppResult<Vec<User>>;
}

/// SeaORM-backed implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;

        Ok(result.map(User::from))
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let now = Utc::now();
        let active_model = ActiveModel {
            name: Set(new_user.name),
            email: Set(new_user.email),
            password: Set(new_user.password_hash),
            role: Set(new_user.role.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active_model.insert(&self.db).await?;
        tracing::info!("User {} created successfully", model.email);
        Ok(User::from(model))
    }

    async fn update(&self, id: i32, patch: UserPatch) -> AppResult<Option<User>> {
        // updated_at is always set, so the SET clause is never empty
        let mut active = ActiveModel {
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(email) = patch.email {
            active.email = Set(email);
        }
        if let Some(role) = patch.role {
            active.role = Set(role.to_string());
        }
        if let Some(hash) = patch.password_hash {
            active.password = Set(hash);
        }

        let updated = UserEntity::update_many()
            .set(active)
            .filter(user::Column::Id.eq(id))
            .exec_with_returning(&self.db)
            .await?
            .pop();

        if let Some(model) = &updated {
            tracing::info!("User {} updated successfully", model.email);
        }
        Ok(updated.map(User::from))
    }

    async fn delete(&self, id: i32) -> AppResult<Option<DeletedUser>> {
        let statement = Statement::from_sql_and_values(
            self.db.get_database_backend(),
            r#"DELETE FROM "users" WHERE "id" = $1 RETURNING *"#,
            [id.into()],
        );

        let deleted = UserEntity::find()
            .from_raw_sql(statement)
            .one(&self.db)
            .await?;

        if let Some(model) = &deleted {
            tracing::info!("User {} deleted successfully", model.email);
        }
        Ok(deleted.map(DeletedUser::from))
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .order_by_asc(user::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(User::from).collect())
    }
}
