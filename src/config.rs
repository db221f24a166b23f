use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde::Deserialize;

use crate::contract::DEFAULT_SOROBAN_RPC_URL;
use crate::horizon::DEFAULT_HORIZON_URL;
use crate::i18n::{normalize_lang, Lang};
use crate::theme::Theme;

/// stellarx - Stellar network explorer
///
/// Terminal explorer for Horizon accounts, assets, pools, order books and
/// Soroban contracts.
/// Configuration priority: CLI args > Environment variables > Config file >
/// Stored preference > Defaults
#[derive(Parser, Debug, Default)]
#[command(name = "stellarx")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Stellar network explorer", long_about = None)]
pub struct CliArgs {
    /// Route to open, e.g. /account/G... or stellarx://asset/USDC-G...
    pub route: Option<String>,

    /// Horizon server URL
    #[arg(long, env = "HORIZON_URL")]
    pub horizon_url: Option<String>,

    /// Soroban JSON-RPC endpoint URL
    #[arg(long, env = "SOROBAN_RPC_URL")]
    pub soroban_rpc_url: Option<String>,

    /// HTTP request timeout in milliseconds (1000-60000)
    #[arg(long, env = "HTTP_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Retry attempts for transient HTTP failures (0-10)
    #[arg(long, env = "HTTP_RETRIES")]
    pub retries: Option<u32>,

    /// Path to the SQLite preferences database
    #[arg(long, env = "STELLARX_DB_PATH")]
    pub db_path: Option<String>,

    /// Interface language (en, ru, es)
    #[arg(long, env = "STELLARX_LANG")]
    pub lang: Option<String>,

    /// Color theme (nord, dos-blue, amber-crt, green-phosphor)
    #[arg(long, env = "STELLARX_THEME")]
    pub theme: Option<String>,

    /// Render the route once to stdout and exit
    #[arg(long)]
    pub print: bool,

    /// Log file used while the terminal UI is running
    #[arg(long, env = "STELLARX_LOG_FILE")]
    pub log_file: Option<String>,

    /// TOML config file
    #[arg(long, env = "STELLARX_CONFIG")]
    pub config: Option<String>,
}

/// Optional TOML file; every key mirrors a CLI flag.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub horizon_url: Option<String>,
    pub soroban_rpc_url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub retries: Option<u32>,
    pub db_path: Option<String>,
    pub lang: Option<String>,
    pub theme: Option<String>,
    pub log_file: Option<String>,
}

impl FileConfig {
    pub fn parse(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("invalid config file")
    }

    pub fn load(path: Option<&str>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(FileConfig::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {path}"))?;
        Self::parse(&raw)
    }
}

/// Values read back from the preferences table.
#[derive(Debug, Default)]
pub struct Stored {
    pub horizon_url: Option<String>,
    pub lang: Option<Lang>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UrlOrigin {
    Explicit,
    Stored,
    Default,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub route: Option<String>,
    pub horizon_url: String,
    pub horizon_origin: UrlOrigin,
    pub soroban_rpc_url: String,
    pub timeout_ms: u64,
    pub retries: u8,
    pub db_path: String,
    pub lang: Lang,
    pub theme: Theme,
    pub print: bool,
    pub log_file: String,
}

pub const DEFAULT_DB_PATH: &str = "./stellarx.db";
pub const DEFAULT_LOG_FILE: &str = "./stellarx.log";

/// Validate that a value is within a given range (inclusive)
fn validate_in_range<T>(val: T, min: T, max: T, name: &str) -> Result<T>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if val < min || val > max {
        Err(anyhow!("{name} must be in range [{min}, {max}], got {val}"))
    } else {
        Ok(val)
    }
}

/// Validate URL format (basic check)
pub fn validate_url(url: &str, name: &str) -> Result<()> {
    if url.trim().is_empty() {
        return Err(anyhow!("{name} cannot be empty"));
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(anyhow!("{name} must start with http:// or https://"))
    }
}

fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Where the preferences database lives, needed before the rest resolves.
pub fn db_path(args: &CliArgs, file: &FileConfig) -> String {
    args.db_path
        .clone()
        .or_else(|| file.db_path.clone())
        .unwrap_or_else(|| DEFAULT_DB_PATH.to_string())
}

/// Merge CLI/env, the config file and stored preferences.
pub fn resolve(args: CliArgs, file: FileConfig, stored: Stored) -> Result<Config> {
    let db_path = db_path(&args, &file);

    let (horizon_url, horizon_origin) = match args.horizon_url.or(file.horizon_url) {
        Some(u) => (u, UrlOrigin::Explicit),
        None => match stored.horizon_url {
            Some(u) => (u, UrlOrigin::Stored),
            None => (DEFAULT_HORIZON_URL.to_string(), UrlOrigin::Default),
        },
    };
    validate_url(&horizon_url, "HORIZON_URL")?;

    let soroban_rpc_url = args
        .soroban_rpc_url
        .or(file.soroban_rpc_url)
        .unwrap_or_else(|| DEFAULT_SOROBAN_RPC_URL.to_string());
    validate_url(&soroban_rpc_url, "SOROBAN_RPC_URL")?;

    let timeout_ms = args.timeout_ms.or(file.timeout_ms).unwrap_or(15000);
    let timeout_ms = validate_in_range(timeout_ms, 1000, 60000, "HTTP_TIMEOUT_MS")?;

    let retries = args.retries.or(file.retries).unwrap_or(2);
    let retries = validate_in_range(retries, 0, 10, "HTTP_RETRIES")? as u8;

    let lang = match args.lang.or(file.lang) {
        Some(raw) => normalize_lang(&raw).ok_or_else(|| {
            anyhow!("Invalid language '{raw}'. Valid options: en, ru, es")
        })?,
        None => stored.lang.unwrap_or(Lang::En),
    };

    let theme = match args.theme.or(file.theme) {
        Some(raw) => Theme::parse(&raw).map_err(|e| anyhow!(e))?,
        None => Theme::default(),
    };

    Ok(Config {
        route: args.route,
        horizon_url: normalize_url(&horizon_url),
        horizon_origin,
        soroban_rpc_url: normalize_url(&soroban_rpc_url),
        timeout_ms,
        retries,
        db_path,
        lang,
        theme,
        print: args.print,
        log_file: args
            .log_file
            .or(file.log_file)
            .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string()),
    })
}

/// Parse the command line and read the config file.
pub fn load_args() -> Result<(CliArgs, FileConfig)> {
    let args = CliArgs::parse();
    let file = FileConfig::load(args.config.as_deref())?;
    Ok((args, file))
}

impl Config {
    pub fn print_summary(&self) {
        eprintln!("stellarx configuration:");
        eprintln!("  Horizon: {} ({:?})", self.horizon_url, self.horizon_origin);
        eprintln!("  Soroban RPC: {}", self.soroban_rpc_url);
        eprintln!("  Timeout: {}ms", self.timeout_ms);
        eprintln!("  Retries: {}", self.retries);
        eprintln!("  Database: {}", self.db_path);
        eprintln!("  Language: {}", self.lang.code());
        eprintln!("  Theme: {}", self.theme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(argv: &[&str]) -> CliArgs {
        let mut full = vec!["stellarx"];
        full.extend_from_slice(argv);
        CliArgs::try_parse_from(full).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cfg = resolve(CliArgs::default(), FileConfig::default(), Stored::default()).unwrap();
        assert_eq!(cfg.horizon_url, DEFAULT_HORIZON_URL);
        assert_eq!(cfg.horizon_origin, UrlOrigin::Default);
        assert_eq!(cfg.timeout_ms, 15000);
        assert_eq!(cfg.retries, 2);
        assert_eq!(cfg.db_path, DEFAULT_DB_PATH);
        assert_eq!(cfg.lang, Lang::En);
        assert_eq!(cfg.theme, Theme::Nord);
        assert!(!cfg.print);
    }

    #[test]
    fn test_priority_cli_over_file_over_stored() {
        let file = FileConfig::parse(
            "horizon_url = \"https://file.example\"\ntimeout_ms = 5000\nlang = \"es\"\n",
        )
        .unwrap();
        let stored = Stored {
            horizon_url: Some("https://stored.example".into()),
            lang: Some(Lang::Ru),
        };
        let cfg = resolve(args(&["--horizon-url", "https://cli.example/"]), file, stored).unwrap();
        assert_eq!(cfg.horizon_url, "https://cli.example");
        assert_eq!(cfg.horizon_origin, UrlOrigin::Explicit);
        assert_eq!(cfg.timeout_ms, 5000);
        assert_eq!(cfg.lang, Lang::Es);

        let stored = Stored {
            horizon_url: Some("https://stored.example".into()),
            lang: Some(Lang::Ru),
        };
        let cfg = resolve(CliArgs::default(), FileConfig::default(), stored).unwrap();
        assert_eq!(cfg.horizon_url, "https://stored.example");
        assert_eq!(cfg.horizon_origin, UrlOrigin::Stored);
        assert_eq!(cfg.lang, Lang::Ru);
    }

    #[test]
    fn test_validation() {
        let bad = resolve(args(&["--timeout-ms", "10"]), FileConfig::default(), Stored::default());
        assert!(bad.is_err());
        let bad = resolve(args(&["--retries", "11"]), FileConfig::default(), Stored::default());
        assert!(bad.is_err());
        let bad = resolve(args(&["--horizon-url", "ftp://x"]), FileConfig::default(), Stored::default());
        assert!(bad.is_err());
        let bad = resolve(args(&["--lang", "de"]), FileConfig::default(), Stored::default());
        assert!(bad.is_err());
        assert!(FileConfig::parse("timeout_ms = \"x\"").is_err());
        let bad = resolve(args(&["--theme", "plaid"]), FileConfig::default(), Stored::default());
        assert!(bad.is_err());
    }

    #[test]
    fn test_route_and_print() {
        let cfg = resolve(
            args(&["--print", "/ledger/5"]),
            FileConfig::default(),
            Stored::default(),
        )
        .unwrap();
        assert!(cfg.print);
        assert_eq!(cfg.route.as_deref(), Some("/ledger/5"));
    }
}
