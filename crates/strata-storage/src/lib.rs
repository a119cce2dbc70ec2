// SPDX-FileCopyrightText: 2026 Strata Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for storage resources.
//!
//! WAL-mode SQLite with embedded refinery migrations. All statements run on
//! the single `tokio-rusqlite` background connection held by [`Database`].

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteStorage;
pub use database::Database;
