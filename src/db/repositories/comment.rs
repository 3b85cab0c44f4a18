use crate::entities::{comments, prelude::*, users};
use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use super::Page;

/// Repository for review-comment operations
pub struct CommentRepository {
    conn: DatabaseConnection,
}

impl CommentRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Comments under a review, newest first, each paired with its author.
    pub async fn list_for_review(
        &self,
        review_id: i32,
        page: Page,
    ) -> Result<(u64, Vec<(comments::Model, Option<users::Model>)>)> {
        let query = Comments::find().filter(comments::Column::ReviewId.eq(review_id));

        let count = query.clone().count(&self.conn).await?;
        let rows = query
            .find_also_related(Users)
            .order_by_desc(comments::Column::PubDate)
            .order_by_desc(comments::Column::Id)
            .limit(page.limit)
            .offset(page.offset)
            .all(&self.conn)
            .await?;

        Ok((count, rows))
    }

    pub async fn get(
        &self,
        review_id: i32,
        comment_id: i32,
    ) -> Result<Option<(comments::Model, Option<users::Model>)>> {
        Ok(Comments::find_by_id(comment_id)
            .filter(comments::Column::ReviewId.eq(review_id))
            .find_also_related(Users)
            .one(&self.conn)
            .await?)
    }

    pub async fn create(
        &self,
        review_id: i32,
        author_id: i32,
        text: &str,
        now: &str,
    ) -> Result<comments::Model> {
        let active_model = comments::ActiveModel {
            review_id: Set(review_id),
            author_id: Set(author_id),
            text: Set(text.to_string()),
            pub_date: Set(now.to_string()),
            ..Default::default()
        };
        Ok(active_model.insert(&self.conn).await?)
    }

    pub async fn update(&self, comment: comments::Model, text: String) -> Result<comments::Model> {
        let mut active: comments::ActiveModel = comment.into();
        active.text = Set(text);
        Ok(active.update(&self.conn).await?)
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Comments::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }
}
