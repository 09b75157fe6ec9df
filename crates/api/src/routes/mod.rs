//! API route modules. Public routes only need the resolved club; admin
//! routes additionally sit behind `middleware::auth::require_admin` (wired
//! up in `lib.rs`, not here).

pub mod admin_credentials;
pub mod admin_display;
pub mod admin_login;
pub mod admin_status;
pub mod admin_sync;
pub mod bookings;
pub mod boats;
pub mod config;
pub mod health;
