//! Application services layer.

pub mod chrome;
pub mod error;
pub mod followers;
pub mod posts;
pub mod profile;
pub mod repos;
pub mod session;
