//! Listing Module
//!
//! Pagination over listing endpoints and traversal of nested groups.

pub mod paginator;
pub mod walker;

pub use paginator::{Paginator, SERVER_PAGE_CAP};
pub use walker::{GroupTreeWalker, GroupVisit};
