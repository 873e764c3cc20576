//! Create-admin command - the only way to mint an admin without an existing one.

use std::sync::Arc;

use validator::ValidateEmail;

use crate::cli::args::CreateAdminArgs;
use crate::config::Config;
use crate::domain::UserRole;
use crate::errors::{AppError, AppResult};
use crate::infra::{Database, UserStore};
use crate::services::{AuthService, Authenticator};

/// Execute the create-admin command
pub async fn execute(args: CreateAdminArgs, config: Config) -> AppResult<()> {
    if !args.email.validate_email() {
        return Err(AppError::invalid_field("email", "Invalid email format"));
    }

    let db = Database::connect(&config).await?;
    let auth = Authenticator::new(Arc::new(UserStore::new(db.get_connection())), config);

    let admin = auth
        .register(args.name, args.email, args.password, UserRole::Admin)
        .await?;

    tracing::info!("Admin {} created with id {}", admin.email, admin.id);
    Ok(())
}
