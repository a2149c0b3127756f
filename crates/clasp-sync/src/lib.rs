// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Sync core for the clasp claims synchronizer.
//!
//! [`ClaimsSynchronizer`] runs the single pass the tool exists for: fetch
//! every user row, push each row's roles into the identity provider's custom
//! claims, and account for every row in a [`SyncReport`]. Control flow is
//! strictly linear; there is no retry, no backoff, and no change detection.

pub mod error;
pub mod report;
pub mod synchronizer;

pub use error::{Result, SyncError};
pub use report::{SyncFailure, SyncReport};
pub use synchronizer::ClaimsSynchronizer;
