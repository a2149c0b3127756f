// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections, one module per top-level TOML table.

pub mod database;
pub mod idp;
pub mod logging;
pub mod sync;
