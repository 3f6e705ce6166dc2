//! Outbound adapters implementing the driven domain ports.
//!
//! - **persistence**: PostgreSQL via Diesel.
//! - **memory**: process-local tables for tests and database-less dev runs.
//!
//! Adapters translate between storage representations and domain values and
//! contain no business rules.

pub mod memory;
pub mod persistence;
