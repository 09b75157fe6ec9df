//! Process bootstrap shared by every binary: env loading, tracing setup,
//! and database pool construction.

pub mod bootstrap;
