use std::collections::HashMap;

use crate::entities::{categories, genre_titles, genres, prelude::*, reviews, titles};
use anyhow::Result;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, LoaderTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use super::Page;

/// Repository for title operations
pub struct TitleRepository {
    conn: DatabaseConnection,
}

/// Optional narrowing applied to the title list.
#[derive(Debug, Default, Clone)]
pub struct TitleFilters {
    /// Category slug.
    pub category: Option<String>,
    /// Genre slug.
    pub genre: Option<String>,
    /// Substring of the title name.
    pub name: Option<String>,
    pub year: Option<i32>,
}

/// Fields a title update may touch. `None` leaves the column alone.
#[derive(Debug, Default, Clone)]
pub struct TitleChanges {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub category_id: Option<i32>,
    pub genre_ids: Option<Vec<i32>>,
}

/// A title together with its read-side expansions.
#[derive(Debug, Clone)]
pub struct TitleRow {
    pub title: titles::Model,
    pub category: Option<categories::Model>,
    pub genres: Vec<genres::Model>,
    /// Mean review score, absent when the title has no reviews.
    pub rating: Option<f64>,
}

#[derive(Debug, FromQueryResult)]
struct RatingRow {
    title_id: i32,
    rating: Option<f64>,
}

impl TitleRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self, filters: &TitleFilters, page: Page) -> Result<(u64, Vec<TitleRow>)> {
        let mut query = Titles::find();

        if let Some(slug) = &filters.category {
            let Some(category) = Categories::find()
                .filter(categories::Column::Slug.eq(slug))
                .one(&self.conn)
                .await?
            else {
                return Ok((0, Vec::new()));
            };
            query = query.filter(titles::Column::CategoryId.eq(category.id));
        }

        if let Some(slug) = &filters.genre {
            let Some(genre) = Genres::find()
                .filter(genres::Column::Slug.eq(slug))
                .one(&self.conn)
                .await?
            else {
                return Ok((0, Vec::new()));
            };
            let title_ids: Vec<i32> = GenreTitles::find()
                .filter(genre_titles::Column::GenreId.eq(genre.id))
                .all(&self.conn)
                .await?
                .into_iter()
                .map(|link| link.title_id)
                .collect();
            query = query.filter(titles::Column::Id.is_in(title_ids));
        }

        if let Some(name) = &filters.name {
            query = query.filter(titles::Column::Name.contains(name));
        }

        if let Some(year) = filters.year {
            query = query.filter(titles::Column::Year.eq(year));
        }

        let count = query.clone().count(&self.conn).await?;
        let rows = query
            .order_by_asc(titles::Column::Id)
            .limit(page.limit)
            .offset(page.offset)
            .all(&self.conn)
            .await?;

        Ok((count, self.hydrate(rows).await?))
    }

    pub async fn get(&self, id: i32) -> Result<Option<TitleRow>> {
        let Some(title) = Titles::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };
        Ok(self.hydrate(vec![title]).await?.into_iter().next())
    }

    pub async fn create(
        &self,
        name: &str,
        year: i32,
        description: Option<&str>,
        category_id: Option<i32>,
        genre_ids: &[i32],
    ) -> Result<TitleRow> {
        let active_model = titles::ActiveModel {
            name: Set(name.to_string()),
            year: Set(year),
            description: Set(description.map(ToString::to_string)),
            category_id: Set(category_id),
            ..Default::default()
        };
        let title = active_model.insert(&self.conn).await?;

        self.replace_genre_links(title.id, genre_ids).await?;

        self.hydrate(vec![title])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("inserted title missing on readback"))
    }

    pub async fn update(&self, id: i32, changes: TitleChanges) -> Result<Option<TitleRow>> {
        let Some(existing) = Titles::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut active: titles::ActiveModel = existing.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(year) = changes.year {
            active.year = Set(year);
        }
        if let Some(description) = changes.description {
            active.description = Set(Some(description));
        }
        if let Some(category_id) = changes.category_id {
            active.category_id = Set(Some(category_id));
        }
        let title = active.update(&self.conn).await?;

        if let Some(genre_ids) = changes.genre_ids {
            self.replace_genre_links(title.id, &genre_ids).await?;
        }

        Ok(self.hydrate(vec![title]).await?.into_iter().next())
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Titles::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    async fn replace_genre_links(&self, title_id: i32, genre_ids: &[i32]) -> Result<()> {
        GenreTitles::delete_many()
            .filter(genre_titles::Column::TitleId.eq(title_id))
            .exec(&self.conn)
            .await?;

        if genre_ids.is_empty() {
            return Ok(());
        }

        let links = genre_ids.iter().map(|genre_id| genre_titles::ActiveModel {
            title_id: Set(title_id),
            genre_id: Set(*genre_id),
            ..Default::default()
        });
        GenreTitles::insert_many(links).exec(&self.conn).await?;
        Ok(())
    }

    /// Attaches categories, genres, and the review-score average to a batch
    /// of titles without per-row queries.
    async fn hydrate(&self, rows: Vec<titles::Model>) -> Result<Vec<TitleRow>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let categories = rows.load_one(Categories, &self.conn).await?;
        let genres = rows
            .load_many_to_many(Genres, GenreTitles, &self.conn)
            .await?;

        let ids: Vec<i32> = rows.iter().map(|t| t.id).collect();
        let ratings = self.ratings_for(&ids).await?;

        Ok(rows
            .into_iter()
            .zip(categories)
            .zip(genres)
            .map(|((title, category), genres)| {
                let rating = ratings.get(&title.id).copied().flatten();
                TitleRow {
                    title,
                    category,
                    genres,
                    rating,
                }
            })
            .collect())
    }

    async fn ratings_for(&self, title_ids: &[i32]) -> Result<HashMap<i32, Option<f64>>> {
        let rows = Reviews::find()
            .select_only()
            .column(reviews::Column::TitleId)
            .column_as(
                Expr::expr(Func::avg(Expr::col(reviews::Column::Score))),
                "rating",
            )
            .filter(reviews::Column::TitleId.is_in(title_ids.iter().copied()))
            .group_by(reviews::Column::TitleId)
            .into_model::<RatingRow>()
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(|r| (r.title_id, r.rating)).collect())
    }
}
