//! Command-line interface parsing for uexbot
//!
//! Global options mirror the bot's environment configuration (every one can
//! come from an environment variable or `.env`), and each subcommand maps to
//! one chat command. `complete` prints the autocomplete choices a chat
//! platform would show for a field.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use thiserror::Error;

use crate::commands::Invocation;
use crate::data::UEX_BASE_URL;

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// The locale code is empty or not alphanumeric
    #[error("Invalid locale: '{0}'. Expected a short code such as uk or en")]
    InvalidLocale(String),

    /// The base URL is not an http(s) URL
    #[error("Invalid base URL: '{0}'. Expected http:// or https://")]
    InvalidBaseUrl(String),

    /// No data directory was given and none could be derived
    #[error("Cannot determine a data directory; set UEXBOT_DATA_DIR")]
    NoDataDir,
}

/// uexbot - Star Citizen trading data from the UEX API
#[derive(Parser, Debug)]
#[command(name = "uexbot")]
#[command(about = "Star Citizen trading data: commodities, prices, routes, fuel and categories")]
#[command(version)]
pub struct Cli {
    /// Bearer token for the UEX API
    #[arg(long, global = true, env = "UEX_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// UEX API base URL
    #[arg(long, global = true, env = "UEX_BASE_URL", default_value = UEX_BASE_URL)]
    pub base_url: String,

    /// Language used when a server has not chosen one
    #[arg(long, global = true, env = "DEFAULT_LOCALE", default_value = "uk")]
    pub locale: String,

    /// Whether replies are private by default (1/true/yes/y/on)
    #[arg(long, global = true, env = "DEFAULT_EPHEMERAL", default_value = "1")]
    pub ephemeral: String,

    /// Directory holding `cache/` and `lang_prefs.json`
    #[arg(long, global = true, env = "UEXBOT_DATA_DIR", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Directory of `<lang>.json` locale files overriding the built-in ones
    #[arg(long, global = true, env = "UEXBOT_LOCALES_DIR", value_name = "DIR")]
    pub locales_dir: Option<PathBuf>,

    /// User running the command
    #[arg(long, global = true, default_value_t = 0)]
    pub user_id: u64,

    /// Server the command runs in; omit for direct messages
    #[arg(long, global = true)]
    pub guild_id: Option<u64>,

    /// Print the first page instead of opening the pager
    #[arg(long, global = true)]
    pub plain: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// One chat command
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show a category by id or name
    Category { query: String },

    /// List the items of a category
    ItemsByCategory { category: String },

    /// Commodity prices across terminals
    Price {
        commodity: String,
        #[arg(long)]
        terminal: Option<String>,
    },

    /// Recent price history of a commodity
    PriceHistory {
        commodity: String,
        #[arg(long)]
        terminal: Option<String>,
    },

    /// Trade routes for a commodity
    Route {
        commodity: String,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        #[arg(long)]
        scu: Option<u32>,
    },

    /// Buy/sell locations and the most profitable route
    Trade {
        commodity: String,
        /// Ship whose cargo capacity sets the SCU
        #[arg(long)]
        ship: Option<String>,
        #[arg(long)]
        scu: Option<u32>,
        /// Locations per list (3..30)
        #[arg(long)]
        top: Option<usize>,
    },

    /// Fuel prices
    Fuel {
        #[arg(long)]
        commodity: Option<String>,
        #[arg(long)]
        terminal: Option<String>,
    },

    /// Commodity alerts
    Alerts { commodity: Option<String> },

    /// Server language
    Lang {
        #[command(subcommand)]
        action: LangCli,
    },

    /// Game version, cache age and uptime
    About,

    /// Autocomplete choices for a command field
    Complete {
        #[arg(value_enum)]
        field: CompleteField,
        #[arg(default_value = "")]
        query: String,
    },

    /// Prefetch reference lists into the disk cache
    Warm,
}

/// `lang` subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum LangCli {
    /// Set the server language
    Set { code: String },
    /// Show the server language
    Show,
    /// Re-read locale files
    Reload,
}

/// Fields with autocomplete
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompleteField {
    Category,
    Commodity,
    Terminal,
    Ship,
    FuelCommodity,
    FuelTerminal,
}

/// Runtime configuration derived from CLI arguments and environment
#[derive(Debug, Clone)]
pub struct Config {
    pub token: Option<String>,
    pub base_url: String,
    pub default_locale: String,
    pub default_ephemeral: bool,
    pub data_dir: PathBuf,
    pub locales_dir: Option<PathBuf>,
    pub invocation: Invocation,
    pub plain: bool,
}

/// Whether an environment-style flag is set.
///
/// # Arguments
/// * `value` - Raw flag text such as `1`, `yes` or `off`
///
/// # Returns
/// * `true` for `1`, `true`, `yes`, `y`, `on` (any case), `false` otherwise
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

/// Validates a locale code.
///
/// # Returns
/// * `Ok(code)` trimmed and lowercased
/// * `Err(CliError::InvalidLocale)` when empty or not made of letters, digits, `-` or `_`
pub fn parse_locale(value: &str) -> Result<String, CliError> {
    let code = value.trim().to_lowercase();
    let valid = !code.is_empty()
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(code)
    } else {
        Err(CliError::InvalidLocale(value.to_string()))
    }
}

/// Default data directory from the platform's conventions
fn default_data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "uexbot").map(|dirs| dirs.data_dir().to_path_buf())
}

impl Config {
    /// Creates a Config from parsed CLI arguments.
    ///
    /// # Arguments
    /// * `cli` - The parsed CLI struct
    ///
    /// # Returns
    /// * `Ok(Config)` with validated settings
    /// * `Err(CliError)` if the locale or base URL is invalid, or no data directory is available
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let default_locale = parse_locale(&cli.locale)?;

        let base_url = cli.base_url.trim().to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(CliError::InvalidBaseUrl(cli.base_url.clone()));
        }

        let data_dir = match &cli.data_dir {
            Some(dir) => dir.clone(),
            None => default_data_dir().ok_or(CliError::NoDataDir)?,
        };

        Ok(Config {
            token: cli.token.clone().filter(|t| !t.trim().is_empty()),
            base_url,
            default_locale,
            default_ephemeral: parse_flag(&cli.ephemeral),
            data_dir,
            locales_dir: cli.locales_dir.clone(),
            invocation: Invocation {
                user_id: cli.user_id,
                guild_id: cli.guild_id,
            },
            plain: cli.plain,
        })
    }

    /// Disk cache directory
    pub fn cache_dir(&self) -> PathBuf {
        self.data_dir.join("cache")
    }

    /// Guild language preferences file
    pub fn prefs_path(&self) -> PathBuf {
        self.data_dir.join("lang_prefs.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["uexbot", "--data-dir", "/tmp/uexbot-test"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn test_parse_flag_truthy_values() {
        for value in ["1", "true", "TRUE", "yes", "y", "On", " on "] {
            assert!(parse_flag(value), "{} should be truthy", value);
        }
        for value in ["0", "false", "no", "off", "", "2"] {
            assert!(!parse_flag(value), "{} should be falsy", value);
        }
    }

    #[test]
    fn test_parse_locale() {
        assert_eq!(parse_locale(" UK ").unwrap(), "uk");
        assert_eq!(parse_locale("pt-br").unwrap(), "pt-br");
        let err = parse_locale("").unwrap_err();
        assert!(err.to_string().contains("Invalid locale"));
        assert!(parse_locale("u k").is_err());
    }

    #[test]
    fn test_cli_parse_price_with_terminal() {
        let cli = parse(&["price", "gold", "--terminal", "TDD"]);
        assert_eq!(
            cli.command,
            Command::Price {
                commodity: "gold".to_string(),
                terminal: Some("TDD".to_string())
            }
        );
    }

    #[test]
    fn test_cli_parse_global_options_after_subcommand() {
        let cli = parse(&["lang", "show", "--guild-id", "55", "--user-id", "9"]);
        assert_eq!(cli.guild_id, Some(55));
        assert_eq!(cli.user_id, 9);
        assert_eq!(
            cli.command,
            Command::Lang {
                action: LangCli::Show
            }
        );
    }

    #[test]
    fn test_cli_parse_complete_defaults_to_empty_query() {
        let cli = parse(&["complete", "fuel-terminal"]);
        assert_eq!(
            cli.command,
            Command::Complete {
                field: CompleteField::FuelTerminal,
                query: String::new()
            }
        );
    }

    #[test]
    fn test_config_from_cli() {
        let cli = parse(&[
            "--locale",
            "EN",
            "--ephemeral",
            "no",
            "--guild-id",
            "3",
            "about",
        ]);
        let config = Config::from_cli(&cli).unwrap();
        assert_eq!(config.default_locale, "en");
        assert!(!config.default_ephemeral);
        assert_eq!(config.invocation.guild_id, Some(3));
        assert_eq!(config.cache_dir(), PathBuf::from("/tmp/uexbot-test/cache"));
        assert_eq!(
            config.prefs_path(),
            PathBuf::from("/tmp/uexbot-test/lang_prefs.json")
        );
    }

    #[test]
    fn test_config_rejects_bad_base_url() {
        let cli = parse(&["--base-url", "ftp://example.com", "about"]);
        let err = Config::from_cli(&cli).unwrap_err();
        assert!(matches!(err, CliError::InvalidBaseUrl(_)));
    }
}
