// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Read-only database access for the clasp claims synchronizer.
//!
//! This crate owns the SQLite pool and the single query the tool performs.
//! It exposes [`UserStore`] as the seam the sync core consumes, with
//! [`UserRecordRepository`] as the production implementation.

pub mod error;
pub mod pool;
pub mod users;

pub use error::{DbError, Result};
pub use pool::create_pool;
pub use sqlx::sqlite::SqlitePool;
pub use users::{UserRecord, UserRecordRepository, UserStore};
