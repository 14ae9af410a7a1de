// crates/lt_cli/src/args.rs
//
// Offline CLI argument surface: clap types, seed parsing, local-path checks
// and path normalization.
//
// Rules:
// - No networked paths (reject any scheme:// like http/https/file)
// - --applicants and --shows are required and must exist; --params likewise when given
// - --vacancy may point at a missing file (treated as an empty list downstream)
// - Seed: u64 decimal or 0x-hex up to 16 nybbles
// - --validate-only loads and validates without allocating or writing

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use thiserror::Error;

/// Parsed CLI arguments (raw).
#[derive(Debug, Parser, Clone)]
#[command(
    name = "lt",
    version,
    disable_help_subcommand = true,
    about = "Offline, deterministic seat lottery"
)]
pub struct Args {
    // --- Inputs ---
    /// Parameter JSON (max_orders, enable_vacancy, seed, strict_preferences).
    #[arg(long)]
    pub params: Option<PathBuf>,
    /// Applicants CSV: id, then ranked show ids.
    #[arg(long)]
    pub applicants: PathBuf,
    /// Shows CSV: id,slot,play,capacity.
    #[arg(long)]
    pub shows: PathBuf,
    /// Opt-in backfill list CSV (header `id`). A missing file counts as empty.
    #[arg(long)]
    pub vacancy: Option<PathBuf>,

    // --- Overrides ---
    /// Seed override. Accepts decimal u64 or 0x-hex (≤16 hex digits).
    #[arg(long, value_parser = parse_seed)]
    pub seed: Option<u64>,
    /// Preference-list length override (>= 1).
    #[arg(long)]
    pub max_orders: Option<u32>,
    /// Run the backfill pass over leftover seats.
    #[arg(long)]
    pub enable_vacancy: bool,
    /// Treat preference ids naming no show as fatal.
    #[arg(long)]
    pub strict_preferences: bool,
    /// Run timestamp (RFC3339). Defaults to now; fixing it makes run ids reproducible.
    #[arg(long)]
    pub timestamp: Option<String>,

    // --- Output & rendering ---
    /// Output directory (created if missing).
    #[arg(long, default_value = ".")]
    pub out: PathBuf,
    /// Report renderer(s) to emit (json, html). Omit to skip rendering.
    #[arg(long, value_parser = ["json", "html"], num_args = 1..=2)]
    pub render: Vec<String>,

    // --- Control ---
    /// Load and validate inputs only; write nothing.
    #[arg(long)]
    pub validate_only: bool,
    /// Only warnings and errors on stderr.
    #[arg(long)]
    pub quiet: bool,
    /// Log filter when RUST_LOG is unset (e.g. `debug`, `lt_algo=debug`).
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Args {
    /// `--log-level`, else `warn` when quiet, else `info`.
    pub fn effective_log_level(&self) -> String {
        match &self.log_level {
            Some(l) => l.clone(),
            None if self.quiet => "warn".to_string(),
            None => "info".to_string(),
        }
    }
}

/// Errors surfaced by argument validation. Messages stay short and stable for scripts.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("path must be local file (no scheme): {0}")]
    NonLocalPath(String),
    #[error("file not found: {0}")]
    NotFound(String),
}

/// Seed parser: decimal u64 or 0x-hex (1..=16 nybbles).
pub fn parse_seed(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty seed".into());
    }
    if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if rest.is_empty() || rest.len() > 16 || !rest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err("hex seed must be 1..16 hex digits".into());
        }
        u64::from_str_radix(rest, 16).map_err(|_| "hex seed out of range".into())
    } else {
        s.parse::<u64>().map_err(|_| "decimal seed must be a valid u64".into())
    }
}

/// Entry point used by main.rs.
pub fn parse_and_validate() -> Result<Args, CliError> {
    validate_args(Args::parse())
}

pub fn validate_args(mut args: Args) -> Result<Args, CliError> {
    for p in iter_all_paths(&args) {
        ensure_local_path(p)?;
    }

    ensure_local_exists(&args.applicants, "--applicants")?;
    ensure_local_exists(&args.shows, "--shows")?;
    if let Some(p) = &args.params {
        ensure_local_exists(p, "--params")?;
    }

    args.applicants = normalize_path(&args.applicants);
    args.shows = normalize_path(&args.shows);
    args.params = args.params.take().map(|p| normalize_path(&p));
    args.vacancy = args.vacancy.take().map(|p| normalize_path(&p));
    args.out = normalize_path(&args.out);
    Ok(args)
}

#[inline]
fn has_scheme(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    lower.contains("://") || lower.starts_with("http:") || lower.starts_with("https:") || lower.starts_with("file:")
}

#[inline]
fn ensure_local_path(p: &Path) -> Result<(), CliError> {
    if let Some(s) = p.to_str() {
        if has_scheme(s) {
            return Err(CliError::NonLocalPath(s.to_string()));
        }
    }
    Ok(())
}

fn iter_all_paths(args: &Args) -> impl Iterator<Item = &Path> {
    [
        args.params.as_deref(),
        Some(args.applicants.as_path()),
        Some(args.shows.as_path()),
        args.vacancy.as_deref(),
        Some(args.out.as_path()),
    ]
    .into_iter()
    .flatten()
}

fn ensure_local_exists(p: &Path, label: &'static str) -> Result<(), CliError> {
    let meta = fs::metadata(p).map_err(|_| CliError::NotFound(format!("{label} {}", p.display())))?;
    if !meta.is_file() {
        return Err(CliError::NotFound(format!("{label} {}", p.display())));
    }
    Ok(())
}

/// Best-effort absolute path; falls back to CWD-relative when canonicalize fails.
fn normalize_path(p: &Path) -> PathBuf {
    fs::canonicalize(p).unwrap_or_else(|_| {
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join(p)
        }
    })
}
