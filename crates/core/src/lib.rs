//! Domain logic shared by every service: the data model, the credential
//! vault, the display-config merge/validation rules, and the boat-name
//! parser. No I/O lives here beyond what `sqlx::FromRow`/`sqlx::Type`
//! require for the models to map onto rows.

pub mod boat_name;
pub mod config;
pub mod error;
pub mod merge;
pub mod models;
pub mod security;
pub mod types;

pub use error::{TokenError, ValidationError, VaultError};
