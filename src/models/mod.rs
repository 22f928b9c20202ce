//! Core data models for the portfolio gallery.
//!
//! These entities represent images and their comment threads. They map
//! cleanly to database tables via `sqlx::FromRow` and serialize naturally
//! as camelCase JSON via `serde`.

pub mod comment;
pub mod image;
