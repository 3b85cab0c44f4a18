use crate::entities::{categories, genres, prelude::*};
use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use super::Page;

/// Repository for category operations
pub struct CategoryRepository {
    conn: DatabaseConnection,
}

impl CategoryRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(
        &self,
        search: Option<&str>,
        page: Page,
    ) -> Result<(u64, Vec<categories::Model>)> {
        let mut query = Categories::find();
        if let Some(term) = search {
            query = query.filter(categories::Column::Name.contains(term));
        }

        let count = query.clone().count(&self.conn).await?;
        let rows = query
            .order_by_asc(categories::Column::Name)
            .limit(page.limit)
            .offset(page.offset)
            .all(&self.conn)
            .await?;

        Ok((count, rows))
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<categories::Model>> {
        Ok(Categories::find()
            .filter(categories::Column::Slug.eq(slug))
            .one(&self.conn)
            .await?)
    }

    pub async fn create(&self, name: &str, slug: &str) -> Result<categories::Model> {
        let active_model = categories::ActiveModel {
            name: Set(name.to_string()),
            slug: Set(slug.to_string()),
            ..Default::default()
        };
        Ok(active_model.insert(&self.conn).await?)
    }

    pub async fn delete_by_slug(&self, slug: &str) -> Result<bool> {
        let result = Categories::delete_many()
            .filter(categories::Column::Slug.eq(slug))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }
}

/// Repository for genre operations
pub struct GenreRepository {
    conn: DatabaseConnection,
}

impl GenreRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(
        &self,
        search: Option<&str>,
        page: Page,
    ) -> Result<(u64, Vec<genres::Model>)> {
        let mut query = Genres::find();
        if let Some(term) = search {
            query = query.filter(genres::Column::Name.contains(term));
        }

        let count = query.clone().count(&self.conn).await?;
        let rows = query
            .order_by_asc(genres::Column::Name)
            .limit(page.limit)
            .offset(page.offset)
            .all(&self.conn)
            .await?;

        Ok((count, rows))
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<genres::Model>> {
        Ok(Genres::find()
            .filter(genres::Column::Slug.eq(slug))
            .one(&self.conn)
            .await?)
    }

    /// Resolves a set of slugs, preserving the requested order. Slugs that
    /// match nothing are simply absent from the result.
    pub async fn get_by_slugs(&self, slugs: &[String]) -> Result<Vec<genres::Model>> {
        if slugs.is_empty() {
            return Ok(Vec::new());
        }

        let rows = Genres::find()
            .filter(genres::Column::Slug.is_in(slugs.iter().cloned()))
            .all(&self.conn)
            .await?;

        let mut ordered = Vec::with_capacity(rows.len());
        for slug in slugs {
            if let Some(row) = rows.iter().find(|g| &g.slug == slug) {
                ordered.push(row.clone());
            }
        }
        Ok(ordered)
    }

    pub async fn create(&self, name: &str, slug: &str) -> Result<genres::Model> {
        let active_model = genres::ActiveModel {
            name: Set(name.to_string()),
            slug: Set(slug.to_string()),
            ..Default::default()
        };
        Ok(active_model.insert(&self.conn).await?)
    }

    pub async fn delete_by_slug(&self, slug: &str) -> Result<bool> {
        let result = Genres::delete_many()
            .filter(genres::Column::Slug.eq(slug))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
