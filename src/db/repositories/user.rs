use crate::entities::{prelude::*, users};
use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tracing::info;

use super::Page;

/// Repository for account operations
pub struct UserRepository {
    conn: DatabaseConnection,
}

/// Fields a user update may touch. `None` leaves the column alone.
#[derive(Debug, Default, Clone)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<String>,
}

impl UserRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<users::Model>> {
        Ok(Users::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<users::Model>> {
        Ok(Users::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await?)
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<users::Model>> {
        Ok(Users::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await?)
    }

    pub async fn create(
        &self,
        username: &str,
        email: &str,
        changes: UserChanges,
        now: &str,
    ) -> Result<users::Model> {
        let active_model = users::ActiveModel {
            username: Set(username.to_string()),
            email: Set(email.to_string()),
            first_name: Set(changes.first_name),
            last_name: Set(changes.last_name),
            bio: Set(changes.bio),
            role: Set(changes.role.unwrap_or_else(|| "user".to_string())),
            is_superuser: Set(false),
            code_epoch: Set(0),
            date_joined: Set(now.to_string()),
            ..Default::default()
        };

        let model = active_model.insert(&self.conn).await?;
        info!("Created user {} ({})", model.username, model.id);
        Ok(model)
    }

    /// Lists users ordered by username. `search` matches a substring of the
    /// username, case-insensitively for ASCII input.
    pub async fn list(
        &self,
        search: Option<&str>,
        page: Page,
    ) -> Result<(u64, Vec<users::Model>)> {
        let mut query = Users::find();
        if let Some(term) = search {
            query = query.filter(users::Column::Username.contains(term));
        }

        let count = query.clone().count(&self.conn).await?;
        let rows = query
            .order_by_asc(users::Column::Username)
            .limit(page.limit)
            .offset(page.offset)
            .all(&self.conn)
            .await?;

        Ok((count, rows))
    }

    pub async fn update(&self, id: i32, changes: UserChanges) -> Result<Option<users::Model>> {
        let Some(existing) = Users::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = existing.into();
        if let Some(username) = changes.username {
            active.username = Set(username);
        }
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(first_name) = changes.first_name {
            active.first_name = Set(Some(first_name));
        }
        if let Some(last_name) = changes.last_name {
            active.last_name = Set(Some(last_name));
        }
        if let Some(bio) = changes.bio {
            active.bio = Set(Some(bio));
        }
        if let Some(role) = changes.role {
            active.role = Set(role);
        }

        Ok(Some(active.update(&self.conn).await?))
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Users::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    /// Invalidates any outstanding confirmation code for the user.
    pub async fn bump_code_epoch(&self, id: i32) -> Result<()> {
        Users::update_many()
            .col_expr(
                users::Column::CodeEpoch,
                sea_orm::sea_query::Expr::col(users::Column::CodeEpoch).add(1),
            )
            .filter(users::Column::Id.eq(id))
            .exec(&self.conn)
            .await?;
        Ok(())
    }
}
