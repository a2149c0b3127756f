// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The sequential sync pass.
//!
//! One pass fetches every user row, then walks the rows in the order the
//! store returned them, awaiting one claims-set call per row. A rejected
//! call is logged and recorded; it never stops the loop. Only the fetch
//! itself can abort a pass.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use clasp_db::UserStore;
use clasp_idp::{ClaimsStore, CustomClaims};

use crate::error::Result;
use crate::report::{SyncFailure, SyncReport};

/// Drives one claims sync pass. Both collaborators are injected; the
/// synchronizer performs no discovery of its own.
pub struct ClaimsSynchronizer {
	users: Arc<dyn UserStore>,
	claims: Arc<dyn ClaimsStore>,
}

impl ClaimsSynchronizer {
	pub fn new(users: Arc<dyn UserStore>, claims: Arc<dyn ClaimsStore>) -> Self {
		Self { users, claims }
	}

	/// Runs one pass and returns its report.
	///
	/// Returns `Err` only for setup-level failures (the fetch); per-row
	/// rejections are recorded in the report's `failures`.
	pub async fn run(&self) -> Result<SyncReport> {
		let run_id = Uuid::new_v4();
		let started_at = Utc::now();
		info!(run_id = %run_id, "starting claims sync pass");

		let records = self.users.fetch_all().await?;
		info!(run_id = %run_id, count = records.len(), "fetched user records");

		let attempted = records.len();
		let mut updated = 0usize;
		let mut failures = Vec::new();

		for record in &records {
			let claims = CustomClaims {
				roles: record.roles.clone(),
				current_role: record.current_role.clone(),
			};
			match self.claims.set_custom_claims(&record.id, &claims).await {
				Ok(()) => {
					updated += 1;
					info!(user_id = %record.id, "Updated claims for {}", record.id);
				}
				Err(e) => {
					warn!(user_id = %record.id, error = %e, "Failed to update claims for {}: {}", record.id, e);
					failures.push(SyncFailure {
						subject_id: record.id.clone(),
						message: e.to_string(),
					});
				}
			}
		}

		let report = SyncReport {
			run_id,
			started_at,
			finished_at: Utc::now(),
			attempted,
			updated,
			failures,
		};
		info!(
			run_id = %run_id,
			attempted = report.attempted,
			updated = report.updated,
			failed = report.failed(),
			duration_ms = report.duration().num_milliseconds(),
			"All user claims updated."
		);
		Ok(report)
	}
}
