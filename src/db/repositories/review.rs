use crate::entities::{prelude::*, reviews, users};
use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use super::Page;

/// Repository for review operations
pub struct ReviewRepository {
    conn: DatabaseConnection,
}

impl ReviewRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Reviews for a title, newest first, each paired with its author.
    pub async fn list_for_title(
        &self,
        title_id: i32,
        page: Page,
    ) -> Result<(u64, Vec<(reviews::Model, Option<users::Model>)>)> {
        let query = Reviews::find().filter(reviews::Column::TitleId.eq(title_id));

        let count = query.clone().count(&self.conn).await?;
        let rows = query
            .find_also_related(Users)
            .order_by_desc(reviews::Column::PubDate)
            .order_by_desc(reviews::Column::Id)
            .limit(page.limit)
            .offset(page.offset)
            .all(&self.conn)
            .await?;

        Ok((count, rows))
    }

    pub async fn get(
        &self,
        title_id: i32,
        review_id: i32,
    ) -> Result<Option<(reviews::Model, Option<users::Model>)>> {
        Ok(Reviews::find_by_id(review_id)
            .filter(reviews::Column::TitleId.eq(title_id))
            .find_also_related(Users)
            .one(&self.conn)
            .await?)
    }

    pub async fn find_by_title_and_author(
        &self,
        title_id: i32,
        author_id: i32,
    ) -> Result<Option<reviews::Model>> {
        Ok(Reviews::find()
            .filter(reviews::Column::TitleId.eq(title_id))
            .filter(reviews::Column::AuthorId.eq(author_id))
            .one(&self.conn)
            .await?)
    }

    pub async fn create(
        &self,
        title_id: i32,
        author_id: i32,
        text: &str,
        score: i32,
        now: &str,
    ) -> Result<reviews::Model> {
        let active_model = reviews::ActiveModel {
            title_id: Set(title_id),
            author_id: Set(author_id),
            text: Set(text.to_string()),
            score: Set(score),
            pub_date: Set(now.to_string()),
            ..Default::default()
        };
        Ok(active_model.insert(&self.conn).await?)
    }

    pub async fn update(
        &self,
        review: reviews::Model,
        text: Option<String>,
        score: Option<i32>,
    ) -> Result<reviews::Model> {
        let mut active: reviews::ActiveModel = review.into();
        if let Some(text) = text {
            active.text = Set(text);
        }
        if let Some(score) = score {
            active.score = Set(score);
        }
        Ok(active.update(&self.conn).await?)
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Reviews::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }
}
