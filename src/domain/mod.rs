pub mod roles;

pub use roles::{Action, Requester, Role, admin_only, admin_or_read_only, author_or_staff_or_read_only};
