// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Run reports.
//!
//! Every pass ends in a [`SyncReport`], whether or not individual rows
//! failed. The binary decides the process exit code from it, so a partial
//! failure can never pass silently.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One claims-set attempt that was rejected by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFailure {
	pub subject_id: String,
	pub message: String,
}

/// Summary of one sync pass.
#[derive(Debug, Clone)]
pub struct SyncReport {
	pub run_id: Uuid,
	pub started_at: DateTime<Utc>,
	pub finished_at: DateTime<Utc>,
	/// Rows returned by the query; every one results in exactly one attempt.
	pub attempted: usize,
	pub updated: usize,
	pub failures: Vec<SyncFailure>,
}

impl SyncReport {
	pub fn failed(&self) -> usize {
		self.failures.len()
	}

	/// True when every attempted row was updated.
	pub fn is_clean(&self) -> bool {
		self.failures.is_empty()
	}

	pub fn duration(&self) -> chrono::Duration {
		self.finished_at - self.started_at
	}
}
