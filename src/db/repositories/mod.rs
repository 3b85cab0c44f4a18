pub mod catalog;
pub mod comment;
pub mod review;
pub mod title;
pub mod user;

/// Limit/offset window applied to list queries.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub limit: u64,
    pub offset: u64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: 10,
            offset: 0,
        }
    }
}
