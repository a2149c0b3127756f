// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the sync core.
//!
//! Only setup-level failures surface here. Per-row claims failures are
//! recovered inside the pass and land in the run report instead.

use thiserror::Error;

use clasp_db::DbError;

#[derive(Debug, Error)]
pub enum SyncError {
	#[error("failed to fetch user records: {0}")]
	Db(#[from] DbError),
}

pub type Result<T> = std::result::Result<T, SyncError>;
