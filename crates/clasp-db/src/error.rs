// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for database access.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
	#[error("database error: {0}")]
	Sqlx(#[from] sqlx::Error),

	/// The `roles` column did not hold a JSON string array. Raised as an
	/// error for the whole fetch rather than skipping the row, so a bad row
	/// can never silently reduce the number of sync attempts.
	#[error("user {user_id} has an undecodable roles column: {source}")]
	InvalidRoles {
		user_id: String,
		#[source]
		source: serde_json::Error,
	},
}

pub type Result<T> = std::result::Result<T, DbError>;
