//! Data models for Libris

pub mod book;
pub mod token;
pub mod user;

// Re-export commonly used types
pub use book::Book;
pub use token::RefreshToken;
pub use user::{Permission, Role, User};
