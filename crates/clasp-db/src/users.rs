// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User record access.
//!
//! One query, read-only: `SELECT id, roles, current_role FROM users`. The
//! `roles` column holds a JSON array of role identifiers as TEXT and is
//! decoded into `Vec<String>` here, so consumers never see raw column data.

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use tracing::debug;

use crate::error::{DbError, Result};

/// One row of the users table, held only for the duration of a sync pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
	/// Identity-provider subject identifier.
	pub id: String,
	pub roles: Vec<String>,
	pub current_role: String,
}

/// Read access to user records.
#[async_trait]
pub trait UserStore: Send + Sync {
	/// Fetches every user row, in whatever order the store returns them.
	async fn fetch_all(&self) -> Result<Vec<UserRecord>>;
}

/// SQLite-backed [`UserStore`].
pub struct UserRecordRepository {
	pool: SqlitePool,
}

impl UserRecordRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}
}

#[async_trait]
impl UserStore for UserRecordRepository {
	#[tracing::instrument(skip(self))]
	async fn fetch_all(&self) -> Result<Vec<UserRecord>> {
		let rows = sqlx::query("SELECT id, roles, current_role FROM users")
			.fetch_all(&self.pool)
			.await?;

		let mut records = Vec::with_capacity(rows.len());
		for row in &rows {
			records.push(row_to_user(row)?);
		}

		debug!(count = records.len(), "fetched user records");
		Ok(records)
	}
}

fn row_to_user(row: &SqliteRow) -> Result<UserRecord> {
	let id: String = row.try_get("id")?;
	let roles_raw: String = row.try_get("roles")?;
	let roles: Vec<String> =
		serde_json::from_str(&roles_raw).map_err(|source| DbError::InvalidRoles {
			user_id: id.clone(),
			source,
		})?;
	let current_role: String = row.try_get("current_role")?;

	Ok(UserRecord {
		id,
		roles,
		current_role,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	async fn setup_db() -> SqlitePool {
		let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
		sqlx::query(
			"CREATE TABLE users (id TEXT PRIMARY KEY, roles TEXT NOT NULL, current_role TEXT NOT NULL)",
		)
		.execute(&pool)
		.await
		.unwrap();
		pool
	}

	async fn insert_user(pool: &SqlitePool, id: &str, roles: &str, current_role: &str) {
		sqlx::query("INSERT INTO users (id, roles, current_role) VALUES (?, ?, ?)")
			.bind(id)
			.bind(roles)
			.bind(current_role)
			.execute(pool)
			.await
			.unwrap();
	}

	#[tokio::test]
	async fn fetch_all_decodes_rows() {
		let pool = setup_db().await;
		insert_user(&pool, "u1", r#"["admin","editor"]"#, "admin").await;
		insert_user(&pool, "u2", r#"["viewer"]"#, "viewer").await;

		let repo = UserRecordRepository::new(pool);
		let records = repo.fetch_all().await.unwrap();

		assert_eq!(records.len(), 2);
		let u1 = records.iter().find(|r| r.id == "u1").unwrap();
		assert_eq!(u1.roles, vec!["admin", "editor"]);
		assert_eq!(u1.current_role, "admin");
		let u2 = records.iter().find(|r| r.id == "u2").unwrap();
		assert_eq!(u2.roles, vec!["viewer"]);
	}

	#[tokio::test]
	async fn fetch_all_empty_table_returns_empty_vec() {
		let pool = setup_db().await;
		let repo = UserRecordRepository::new(pool);
		assert!(repo.fetch_all().await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn fetch_all_handles_empty_roles_array() {
		let pool = setup_db().await;
		insert_user(&pool, "u1", "[]", "viewer").await;

		let repo = UserRecordRepository::new(pool);
		let records = repo.fetch_all().await.unwrap();
		assert!(records[0].roles.is_empty());
	}

	#[tokio::test]
	async fn fetch_all_rejects_undecodable_roles() {
		let pool = setup_db().await;
		insert_user(&pool, "u1", r#"["admin"]"#, "admin").await;
		insert_user(&pool, "u2", "not-json", "viewer").await;

		let repo = UserRecordRepository::new(pool);
		let err = repo.fetch_all().await.unwrap_err();
		assert!(matches!(err, DbError::InvalidRoles { user_id, .. } if user_id == "u2"));
	}

	#[tokio::test]
	async fn fetch_all_rejects_non_array_roles() {
		let pool = setup_db().await;
		insert_user(&pool, "u1", r#"{"role":"admin"}"#, "admin").await;

		let repo = UserRecordRepository::new(pool);
		assert!(matches!(
			repo.fetch_all().await.unwrap_err(),
			DbError::InvalidRoles { .. }
		));
	}

	#[tokio::test]
	async fn fetch_all_fails_when_table_missing() {
		let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
		let repo = UserRecordRepository::new(pool);
		assert!(matches!(
			repo.fetch_all().await.unwrap_err(),
			DbError::Sqlx(_)
		));
	}
}
