pub mod access;
pub mod core;
pub mod delete;
pub mod get;
pub mod save;

pub use core::ResourceStore;
