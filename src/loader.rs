//! Bulk CSV import.
//!
//! Seeds the database from a directory of CSV exports (users, categories,
//! genres, titles, genre links, reviews, comments). Row ids are preserved so
//! cross-file references keep pointing at the right rows.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use sea_orm::{EntityTrait, Set};
use serde::Deserialize;
use tracing::{info, warn};

use crate::db::Store;
use crate::entities::{categories, comments, genre_titles, genres, prelude::*, reviews, titles, users};

const INSERT_CHUNK: usize = 500;

#[derive(Debug, Deserialize)]
pub struct UserRecord {
    pub id: i32,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SlugRecord {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Deserialize)]
pub struct TitleRecord {
    pub id: i32,
    pub name: String,
    pub year: i32,
    /// Category id column, named `category` in the export.
    #[serde(default)]
    pub category: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct GenreTitleRecord {
    pub id: i32,
    pub title_id: i32,
    pub genre_id: i32,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRecord {
    pub id: i32,
    pub title_id: i32,
    pub text: String,
    /// Author id column, named `author` in the export.
    pub author: i32,
    pub score: i32,
    pub pub_date: String,
}

#[derive(Debug, Deserialize)]
pub struct CommentRecord {
    pub id: i32,
    pub review_id: i32,
    pub text: String,
    pub author: i32,
    pub pub_date: String,
}

/// How many rows each table received.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub users: usize,
    pub categories: usize,
    pub genres: usize,
    pub titles: usize,
    pub genre_links: usize,
    pub reviews: usize,
    pub comments: usize,
}

fn parse_csv<R: Read, T: for<'de> Deserialize<'de>>(reader: R) -> Result<Vec<T>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for record in rdr.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}

fn read_csv<T: for<'de> Deserialize<'de>>(dir: &Path, file: &str) -> Result<Option<Vec<T>>> {
    let path = dir.join(file);
    if !path.exists() {
        warn!("Skipping {}: file not found", path.display());
        return Ok(None);
    }
    let reader = std::fs::File::open(&path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let rows = parse_csv(reader).with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Some(rows))
}

pub struct Loader {
    store: Store,
}

impl Loader {
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Imports every recognized CSV file found in `dir`. Referenced tables
    /// load before referencing ones, so foreign keys resolve.
    pub async fn load_dir(&self, dir: &Path) -> Result<LoadReport> {
        let mut report = LoadReport::default();

        if let Some(rows) = read_csv::<UserRecord>(dir, "users.csv")? {
            report.users = self.insert_users(rows).await?;
        }
        if let Some(rows) = read_csv::<SlugRecord>(dir, "category.csv")? {
            report.categories = self.insert_categories(rows).await?;
        }
        if let Some(rows) = read_csv::<SlugRecord>(dir, "genre.csv")? {
            report.genres = self.insert_genres(rows).await?;
        }
        if let Some(rows) = read_csv::<TitleRecord>(dir, "titles.csv")? {
            report.titles = self.insert_titles(rows).await?;
        }
        if let Some(rows) = read_csv::<GenreTitleRecord>(dir, "genre_title.csv")? {
            report.genre_links = self.insert_genre_links(rows).await?;
        }
        if let Some(rows) = read_csv::<ReviewRecord>(dir, "review.csv")? {
            report.reviews = self.insert_reviews(rows).await?;
        }
        if let Some(rows) = read_csv::<CommentRecord>(dir, "comments.csv")? {
            report.comments = self.insert_comments(rows).await?;
        }

        info!(
            "Import complete: {} users, {} categories, {} genres, {} titles, {} genre links, {} reviews, {} comments",
            report.users,
            report.categories,
            report.genres,
            report.titles,
            report.genre_links,
            report.reviews,
            report.comments
        );
        Ok(report)
    }

    async fn insert_users(&self, rows: Vec<UserRecord>) -> Result<usize> {
        let now = chrono::Utc::now().to_rfc3339();
        let count = rows.len();
        let models: Vec<_> = rows
            .into_iter()
            .map(|r| users::ActiveModel {
                id: Set(r.id),
                username: Set(r.username),
                email: Set(r.email),
                first_name: Set(r.first_name.filter(|s| !s.is_empty())),
                last_name: Set(r.last_name.filter(|s| !s.is_empty())),
                bio: Set(r.bio.filter(|s| !s.is_empty())),
                role: Set(r
                    .role
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| "user".to_string())),
                is_superuser: Set(false),
                code_epoch: Set(0),
                date_joined: Set(now.clone()),
            })
            .collect();
        for chunk in models.chunks(INSERT_CHUNK) {
            Users::insert_many(chunk.to_vec())
                .exec(&self.store.conn)
                .await?;
        }
        Ok(count)
    }

    async fn insert_categories(&self, rows: Vec<SlugRecord>) -> Result<usize> {
        let count = rows.len();
        let models: Vec<_> = rows
            .into_iter()
            .map(|r| categories::ActiveModel {
                id: Set(r.id),
                name: Set(r.name),
                slug: Set(r.slug),
            })
            .collect();
        for chunk in models.chunks(INSERT_CHUNK) {
            Categories::insert_many(chunk.to_vec())
                .exec(&self.store.conn)
                .await?;
        }
        Ok(count)
    }

    async fn insert_genres(&self, rows: Vec<SlugRecord>) -> Result<usize> {
        let count = rows.len();
        let models: Vec<_> = rows
            .into_iter()
            .map(|r| genres::ActiveModel {
                id: Set(r.id),
                name: Set(r.name),
                slug: Set(r.slug),
            })
            .collect();
        for chunk in models.chunks(INSERT_CHUNK) {
            Genres::insert_many(chunk.to_vec())
                .exec(&self.store.conn)
                .await?;
        }
        Ok(count)
    }

    async fn insert_titles(&self, rows: Vec<TitleRecord>) -> Result<usize> {
        let count = rows.len();
        let models: Vec<_> = rows
            .into_iter()
            .map(|r| titles::ActiveModel {
                id: Set(r.id),
                name: Set(r.name),
                description: Set(None),
                year: Set(r.year),
                category_id: Set(r.category),
            })
            .collect();
        for chunk in models.chunks(INSERT_CHUNK) {
            Titles::insert_many(chunk.to_vec())
                .exec(&self.store.conn)
                .await?;
        }
        Ok(count)
    }

    async fn insert_genre_links(&self, rows: Vec<GenreTitleRecord>) -> Result<usize> {
        let count = rows.len();
        let models: Vec<_> = rows
            .into_iter()
            .map(|r| genre_titles::ActiveModel {
                id: Set(r.id),
                title_id: Set(r.title_id),
                genre_id: Set(r.genre_id),
            })
            .collect();
        for chunk in models.chunks(INSERT_CHUNK) {
            GenreTitles::insert_many(chunk.to_vec())
                .exec(&self.store.conn)
                .await?;
        }
        Ok(count)
    }

    async fn insert_reviews(&self, rows: Vec<ReviewRecord>) -> Result<usize> {
        let count = rows.len();
        let models: Vec<_> = rows
            .into_iter()
            .map(|r| reviews::ActiveModel {
                id: Set(r.id),
                title_id: Set(r.title_id),
                author_id: Set(r.author),
                text: Set(r.text),
                score: Set(r.score),
                pub_date: Set(r.pub_date),
            })
            .collect();
        for chunk in models.chunks(INSERT_CHUNK) {
            Reviews::insert_many(chunk.to_vec())
                .exec(&self.store.conn)
                .await?;
        }
        Ok(count)
    }

    async fn insert_comments(&self, rows: Vec<CommentRecord>) -> Result<usize> {
        let count = rows.len();
        let models: Vec<_> = rows
            .into_iter()
            .map(|r| comments::ActiveModel {
                id: Set(r.id),
                review_id: Set(r.review_id),
                author_id: Set(r.author),
                text: Set(r.text),
                pub_date: Set(r.pub_date),
            })
            .collect();
        for chunk in models.chunks(INSERT_CHUNK) {
            Comments::insert_many(chunk.to_vec())
                .exec(&self.store.conn)
                .await?;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_users_csv() {
        let data = "id,username,email,role,bio,first_name,last_name\n\
                    1,marmot,marmot@example.com,user,,Marmo,T\n\
                    2,modo,modo@example.com,moderator,Reads a lot,,\n";
        let rows: Vec<UserRecord> = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].username, "marmot");
        assert_eq!(rows[1].role.as_deref(), Some("moderator"));
    }

    #[test]
    fn test_parse_titles_csv_with_category_remap() {
        let data = "id,name,year,category\n\
                    5,Dune,2021,2\n";
        let rows: Vec<TitleRecord> = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(rows[0].category, Some(2));
        assert_eq!(rows[0].year, 2021);
    }

    #[test]
    fn test_parse_reviews_csv_with_author_remap() {
        let data = "id,title_id,text,author,score,pub_date\n\
                    9,5,Great read,1,8,2019-09-24T21:08:21.567Z\n";
        let rows: Vec<ReviewRecord> = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(rows[0].author, 1);
        assert_eq!(rows[0].score, 8);
    }

    #[test]
    fn test_parse_rejects_malformed_rows() {
        let data = "id,name,year,category\nnot-a-number,Dune,2021,2\n";
        assert!(parse_csv::<_, TitleRecord>(data.as_bytes()).is_err());
    }
}
