//! Database operations for user accounts.

use chrono::Utc;
use sea_orm::*;
use uuid::Uuid;

use crate::entity::user::{self, Entity as User};
use crate::error::AppResult;
use crate::models::Role;

pub async fn insert(
    db: &DatabaseConnection,
    email: &str,
    first_name: &str,
    last_name: &str,
    role: Role,
    rut: Option<&str>,
) -> AppResult<user::Model> {
    let now = Utc::now();

    let model = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        first_name: Set(first_name.to_string()),
        last_name: Set(last_name.to_string()),
        role: Set(role.as_str().to_string()),
        rut: Set(rut.map(|r| r.to_string())),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let result = model.insert(db).await?;
    Ok(result)
}

pub async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> AppResult<Option<user::Model>> {
    let result = User::find_by_id(id).one(db).await?;
    Ok(result)
}

pub async fn find_by_email(db: &DatabaseConnection, email: &str) -> AppResult<Option<user::Model>> {
    let result = User::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?;
    Ok(result)
}
