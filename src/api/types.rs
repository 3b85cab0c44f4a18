use serde::{Deserialize, Serialize};

use crate::db::{Page, TitleRow};
use crate::entities::{categories, comments, genres, reviews, users};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// A window of a larger list, with the total row count.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub count: u64,
    pub results: Vec<T>,
}

/// Common `?limit=&offset=` query parameters for list endpoints.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

const MAX_PAGE_LIMIT: u64 = 100;

impl PageQuery {
    #[must_use]
    pub fn page(&self) -> Page {
        let default = Page::default();
        Page {
            limit: self.limit.unwrap_or(default.limit).min(MAX_PAGE_LIMIT),
            offset: self.offset.unwrap_or(0),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: String,
}

impl From<users::Model> for UserDto {
    fn from(user: users::Model) -> Self {
        Self {
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            bio: user.bio,
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryDto {
    pub name: String,
    pub slug: String,
}

impl From<categories::Model> for CategoryDto {
    fn from(category: categories::Model) -> Self {
        Self {
            name: category.name,
            slug: category.slug,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GenreDto {
    pub name: String,
    pub slug: String,
}

impl From<genres::Model> for GenreDto {
    fn from(genre: genres::Model) -> Self {
        Self {
            name: genre.name,
            slug: genre.slug,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TitleDto {
    pub id: i32,
    pub name: String,
    pub year: i32,
    /// Mean review score; null until the first review lands.
    pub rating: Option<f64>,
    pub description: Option<String>,
    pub genres: Vec<GenreDto>,
    pub category: Option<CategoryDto>,
}

impl From<TitleRow> for TitleDto {
    fn from(row: TitleRow) -> Self {
        Self {
            id: row.title.id,
            name: row.title.name,
            year: row.title.year,
            rating: row.rating,
            description: row.title.description,
            genres: row.genres.into_iter().map(GenreDto::from).collect(),
            category: row.category.map(CategoryDto::from),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReviewDto {
    pub id: i32,
    pub text: String,
    pub author: String,
    pub score: i32,
    pub pub_date: String,
}

impl ReviewDto {
    #[must_use]
    pub fn new(review: reviews::Model, author: Option<users::Model>) -> Self {
        Self {
            id: review.id,
            text: review.text,
            author: author.map_or_else(|| "unknown".to_string(), |u| u.username),
            score: review.score,
            pub_date: review.pub_date,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentDto {
    pub id: i32,
    pub text: String,
    pub author: String,
    pub pub_date: String,
}

impl CommentDto {
    #[must_use]
    pub fn new(comment: comments::Model, author: Option<users::Model>) -> Self {
        Self {
            id: comment.id,
            text: comment.text,
            author: author.map_or_else(|| "unknown".to_string(), |u| u.username),
            pub_date: comment.pub_date,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SignupDto {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct TokenDto {
    pub token: String,
}
