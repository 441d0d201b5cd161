pub mod catalog;
pub mod client;

pub use catalog::{AppCatalog, AppEntry};
pub use client::{ClientInfo, WorkspaceRef};
