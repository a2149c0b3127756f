// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Database configuration section.

use serde::Deserialize;

use crate::error::{ConfigError, Result};
use crate::layer::merge_option;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 2;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Finalized database settings.
///
/// The synchronizer only ever reads from the users table, so the pool it
/// builds from these settings is opened read-only.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
	/// Connection string, e.g. `sqlite:/var/lib/app/users.db`.
	pub url: String,
	pub max_connections: u32,
	pub connect_timeout_secs: u64,
}

/// Mergeable layer for the `[database]` section.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfigLayer {
	pub url: Option<String>,
	pub max_connections: Option<u32>,
	pub connect_timeout_secs: Option<u64>,
}

impl DatabaseConfigLayer {
	pub fn merge(&mut self, other: DatabaseConfigLayer) {
		merge_option(&mut self.url, other.url);
		merge_option(&mut self.max_connections, other.max_connections);
		merge_option(&mut self.connect_timeout_secs, other.connect_timeout_secs);
	}

	pub fn finalize(self) -> Result<DatabaseConfig> {
		let url = self.url.ok_or_else(|| ConfigError::MissingValue {
			key: "database.url".to_string(),
		})?;
		if url.trim().is_empty() {
			return Err(ConfigError::InvalidValue {
				key: "database.url".to_string(),
				message: "must not be empty".to_string(),
			});
		}
		Ok(DatabaseConfig {
			url,
			max_connections: self.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS),
			connect_timeout_secs: self
				.connect_timeout_secs
				.unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
		})
	}
}
