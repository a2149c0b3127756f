// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite pool construction.

use std::str::FromStr;
use std::time::Duration;

use clasp_config::DatabaseConfig;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::debug;

use crate::error::Result;

/// Opens a read-only pool for the users database.
///
/// The synchronizer never writes to the source table, so the connection is
/// opened read-only at the driver level. Connecting is eager: a bad path or
/// unreachable database fails here, before any identity-provider traffic.
pub async fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool> {
	let options = SqliteConnectOptions::from_str(&config.url)?.read_only(true);

	let pool = SqlitePoolOptions::new()
		.max_connections(config.max_connections)
		.acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
		.connect_with(options)
		.await?;

	debug!(url = %config.url, max_connections = config.max_connections, "database pool ready");
	Ok(pool)
}
