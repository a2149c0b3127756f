// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! clasp binary: one-shot claims synchronization pass.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clasp_config::{Config, IdpConfig, LogFormat, LoggingConfig, SecretString};
use clasp_db::{SqlitePool, UserRecordRepository, UserStore};
use clasp_idp::{ClaimsStore, HttpClaimsClient, IdpClientConfig};
use clasp_sync::{ClaimsSynchronizer, SyncReport};

mod version;

/// clasp - synchronize database role assignments into identity provider
/// custom claims.
#[derive(Parser, Debug)]
#[command(
	name = "clasp",
	about = "Synchronize user roles into identity provider custom claims",
	version
)]
struct Args {
	/// Path to the config file (defaults to /etc/clasp/clasp.toml when present)
	#[arg(long, value_name = "PATH")]
	config: Option<PathBuf>,

	/// Exit with status 2 when any user's claims update fails
	#[arg(long)]
	strict: bool,

	/// Fetch and report rows without calling the identity provider
	#[arg(long)]
	dry_run: bool,

	/// Subcommands for clasp (e.g., `version`)
	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version and build information
	Version,
}

#[tokio::main]
async fn main() -> ExitCode {
	let args = Args::parse();

	// Handle subcommands that should not run a pass
	if let Some(Command::Version) = args.command {
		println!("{}", version::format_version_info());
		return ExitCode::SUCCESS;
	}

	// Load .env file if present
	dotenvy::dotenv().ok();

	// Configuration failures happen before the subscriber exists, so they
	// go straight to stderr.
	let config = match resolve_config(&args) {
		Ok(config) => config,
		Err(e) => {
			eprintln!("clasp: {e}");
			return ExitCode::from(1);
		}
	};

	init_tracing(&config.logging);

	match run(&args, config).await {
		Ok(code) => code,
		Err(e) => {
			let chain = format!("{e:#}");
			tracing::error!(error = %chain, "sync pass aborted");
			ExitCode::from(1)
		}
	}
}

fn resolve_config(args: &Args) -> clasp_config::Result<Config> {
	match &args.config {
		Some(path) => clasp_config::load_config_with_file(path.clone()),
		None => clasp_config::load_config(),
	}
}

fn init_tracing(config: &LoggingConfig) {
	let filter = tracing_subscriber::EnvFilter::try_from_env("CLASP_LOG")
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.level));

	let registry = tracing_subscriber::registry().with(filter);
	match config.format {
		LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
		LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
	}
}

async fn run(args: &Args, config: Config) -> anyhow::Result<ExitCode> {
	let build = version::BuildInfo::current();
	info!(
		version = build.version,
		database = %config.database.url,
		idp = %config.idp.base_url,
		credential = %config.idp.credential,
		"starting clasp"
	);

	// Resolve the credential before touching the database, so a bad token
	// file fails the run without ever opening a session.
	let token = config
		.idp
		.credential
		.resolve()
		.context("failed to resolve identity provider credential")?;

	let claims = claims_store(args.dry_run, &config.idp, token);

	let pool = clasp_db::create_pool(&config.database)
		.await
		.context("failed to open users database")?;
	let users: Arc<dyn UserStore> = Arc::new(UserRecordRepository::new(pool.clone()));

	let strict = args.strict || config.sync.fail_on_partial;
	run_and_release(pool, users, claims, strict).await
}

/// Picks the claims store for this run. A dry run selects none, so the HTTP
/// client is never even constructed on that path.
fn claims_store(
	dry_run: bool,
	idp: &IdpConfig,
	token: SecretString,
) -> Option<Arc<dyn ClaimsStore>> {
	if dry_run {
		return None;
	}
	Some(Arc::new(HttpClaimsClient::new(IdpClientConfig {
		base_url: idp.base_url.clone(),
		token,
		timeout: Duration::from_secs(idp.timeout_secs),
	})))
}

/// Runs the chosen pass and releases the session on every path out of it,
/// including a failed fetch.
async fn run_and_release(
	pool: SqlitePool,
	users: Arc<dyn UserStore>,
	claims: Option<Arc<dyn ClaimsStore>>,
	strict: bool,
) -> anyhow::Result<ExitCode> {
	let result = match claims {
		Some(claims) => sync_pass(users, claims, strict).await,
		None => dry_run_pass(users).await,
	};

	pool.close().await;
	debug!("database pool closed");

	result
}

async fn sync_pass(
	users: Arc<dyn UserStore>,
	claims: Arc<dyn ClaimsStore>,
	strict: bool,
) -> anyhow::Result<ExitCode> {
	let synchronizer = ClaimsSynchronizer::new(users, claims);
	let report = synchronizer.run().await?;

	let status = exit_status(&report, strict);
	if status != 0 {
		warn!(
			failed = report.failed(),
			"strict mode: {} user(s) failed, exiting non-zero",
			report.failed()
		);
	}
	Ok(ExitCode::from(status))
}

async fn dry_run_pass(users: Arc<dyn UserStore>) -> anyhow::Result<ExitCode> {
	let records = users.fetch_all().await?;
	for record in &records {
		info!(
			user_id = %record.id,
			roles = ?record.roles,
			current_role = %record.current_role,
			"would update claims for {}",
			record.id
		);
	}
	info!(count = records.len(), "dry run complete, no claims written");
	Ok(ExitCode::SUCCESS)
}

/// Maps a completed pass to the process exit status. A pass that finished
/// with per-user failures still exits 0 unless strict mode is on; setup
/// failures never reach here.
fn exit_status(report: &SyncReport, strict: bool) -> u8 {
	if strict && !report.is_clean() {
		2
	} else {
		0
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use chrono::Utc;
	use clasp_config::CredentialSource;
	use clasp_sync::SyncFailure;
	use uuid::Uuid;

	fn idp_config() -> IdpConfig {
		IdpConfig {
			base_url: "https://idp.example.com".to_string(),
			credential: CredentialSource::Token(SecretString::new("tok_admin")),
			timeout_secs: 5,
		}
	}

	async fn seeded_pool(rows: &[(&str, &str, &str)]) -> SqlitePool {
		let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
		sqlx::query(
			"CREATE TABLE users (id TEXT PRIMARY KEY, roles TEXT NOT NULL, current_role TEXT NOT NULL)",
		)
		.execute(&pool)
		.await
		.unwrap();
		for (id, roles, current_role) in rows {
			sqlx::query("INSERT INTO users (id, roles, current_role) VALUES (?, ?, ?)")
				.bind(id)
				.bind(roles)
				.bind(current_role)
				.execute(&pool)
				.await
				.unwrap();
		}
		pool
	}

	fn repository(pool: &SqlitePool) -> Arc<dyn UserStore> {
		Arc::new(UserRecordRepository::new(pool.clone()))
	}

	fn report(failed: usize) -> SyncReport {
		let now = Utc::now();
		SyncReport {
			run_id: Uuid::new_v4(),
			started_at: now,
			finished_at: now,
			attempted: 2,
			updated: 2 - failed,
			failures: (0..failed)
				.map(|i| SyncFailure {
					subject_id: format!("u{i}"),
					message: "quota exceeded".to_string(),
				})
				.collect(),
		}
	}

	#[test]
	fn clean_pass_exits_zero() {
		assert_eq!(exit_status(&report(0), false), 0);
		assert_eq!(exit_status(&report(0), true), 0);
	}

	#[test]
	fn dirty_pass_exits_zero_by_default() {
		assert_eq!(exit_status(&report(1), false), 0);
	}

	#[test]
	fn dirty_pass_exits_two_in_strict_mode() {
		assert_eq!(exit_status(&report(1), true), 2);
	}

	#[test]
	fn args_parse_flags() {
		let args = Args::parse_from(["clasp", "--strict", "--dry-run", "--config", "/tmp/clasp.toml"]);
		assert!(args.strict);
		assert!(args.dry_run);
		assert_eq!(
			args.config.as_deref(),
			Some(std::path::Path::new("/tmp/clasp.toml"))
		);
		assert!(args.command.is_none());
	}

	#[test]
	fn args_default_to_plain_run() {
		let args = Args::parse_from(["clasp"]);
		assert!(!args.strict);
		assert!(!args.dry_run);
		assert!(args.config.is_none());
	}

	#[test]
	fn version_subcommand_parses() {
		let args = Args::parse_from(["clasp", "version"]);
		assert!(matches!(args.command, Some(Command::Version)));
	}

	#[test]
	fn dry_run_selects_no_claims_store() {
		let claims = claims_store(true, &idp_config(), SecretString::new("tok_admin"));
		assert!(claims.is_none());
	}

	#[test]
	fn normal_run_selects_the_http_client() {
		let claims = claims_store(false, &idp_config(), SecretString::new("tok_admin"));
		assert!(claims.is_some());
	}

	#[tokio::test]
	async fn dry_run_pass_reads_rows_and_succeeds() {
		let pool = seeded_pool(&[
			("u1", r#"["admin"]"#, "admin"),
			("u2", r#"["viewer"]"#, "viewer"),
		])
		.await;

		assert!(dry_run_pass(repository(&pool)).await.is_ok());
		pool.close().await;
	}

	#[tokio::test]
	async fn pool_is_released_after_a_clean_dry_run() {
		let pool = seeded_pool(&[]).await;

		let result = run_and_release(pool.clone(), repository(&pool), None, false).await;

		assert!(result.is_ok());
		assert!(pool.is_closed());
	}

	#[tokio::test]
	async fn pool_is_released_when_the_fetch_fails() {
		// No users table, so the fetch aborts the pass.
		let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();

		let result = run_and_release(pool.clone(), repository(&pool), None, false).await;

		assert!(result.is_err());
		assert!(pool.is_closed());
	}

	#[tokio::test]
	async fn pool_is_released_after_a_sync_pass() {
		let pool = seeded_pool(&[]).await;
		let claims: Arc<dyn ClaimsStore> = Arc::new(HttpClaimsClient::new(IdpClientConfig {
			base_url: "http://127.0.0.1:9".to_string(),
			token: SecretString::new("tok_admin"),
			timeout: Duration::from_secs(1),
		}));

		let result = run_and_release(pool.clone(), repository(&pool), Some(claims), false).await;

		assert!(result.is_ok());
		assert!(pool.is_closed());
	}
}
