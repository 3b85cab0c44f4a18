use anyhow::Result;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::Page;
pub use repositories::catalog::{CategoryRepository, GenreRepository};
pub use repositories::comment::CommentRepository;
pub use repositories::review::ReviewRepository;
pub use repositories::title::{TitleChanges, TitleFilters, TitleRepository, TitleRow};
pub use repositories::user::{UserChanges, UserRepository};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.conn.clone())
    }

    pub fn categories(&self) -> CategoryRepository {
        CategoryRepository::new(self.conn.clone())
    }

    pub fn genres(&self) -> GenreRepository {
        GenreRepository::new(self.conn.clone())
    }

    pub fn titles(&self) -> TitleRepository {
        TitleRepository::new(self.conn.clone())
    }

    pub fn reviews(&self) -> ReviewRepository {
        ReviewRepository::new(self.conn.clone())
    }

    pub fn comments(&self) -> CommentRepository {
        CommentRepository::new(self.conn.clone())
    }
}
