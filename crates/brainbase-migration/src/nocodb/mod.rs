//! NocoDB destination side

pub mod client;
pub mod models;

pub use client::{NocoDbClient, NocoRecord};
pub use models::{ListResponse, NocoColumn, NocoProject, NocoTable, PageInfo};
