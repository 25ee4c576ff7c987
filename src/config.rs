/*!
 * Configuration handling for CodeForias
 */

use std::path::PathBuf;

use clap::Parser;
use clap_complete::Shell;
use url::Url;

use crate::decoder::{DecodePolicy, DEFAULT_MAX_LOSS_RATIO};
use crate::ensure;
use crate::error::Result;
use crate::github::DEFAULT_API_URL;

/// Command-line arguments for CodeForias
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "codeforias",
    version = env!("CARGO_PKG_VERSION"),
    about = "Export a GitHub repository into a single text document",
    long_about = "Walks a GitHub repository through the REST contents API and writes every file's path and text content into one timestamped text file."
)]
pub struct Args {
    /// Repository URL, e.g. https://github.com/owner/repo
    #[clap(required_unless_present = "generate")]
    pub repo_url: Option<String>,

    /// Access token; anonymous access when absent
    #[clap(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Directory the output document is written to
    #[clap(long, default_value = ".")]
    pub output_dir: String,

    /// Base URL of the GitHub REST API
    #[clap(long, default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Branch, tag or commit to export (default: the repository's default branch)
    #[clap(long = "ref")]
    pub git_ref: Option<String>,

    /// Skip the content of files larger than this many bytes
    #[clap(long, value_name = "BYTES")]
    pub max_file_size: Option<u64>,

    /// Treat files that lose too many bytes during text decoding as failures
    #[clap(long)]
    pub strict_decode: bool,

    /// Share of dropped bytes tolerated with --strict-decode
    #[clap(long, default_value_t = DEFAULT_MAX_LOSS_RATIO)]
    pub max_loss_ratio: f64,

    /// Increase diagnostic logging (-v debug, -vv trace)
    #[clap(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Repository URL as entered
    pub repo_url: String,

    /// Access token, if any
    pub token: Option<String>,

    /// Output directory
    pub output_dir: PathBuf,

    /// Base URL of the REST API
    pub api_url: String,

    /// Git ref to read from
    pub git_ref: Option<String>,

    /// Files above this size are listed without content
    pub max_file_size: Option<u64>,

    /// How undecodable text is handled
    pub decode_policy: DecodePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repo_url: String::new(),
            token: None,
            output_dir: PathBuf::from("."),
            api_url: DEFAULT_API_URL.to_string(),
            git_ref: None,
            max_file_size: None,
            decode_policy: DecodePolicy::default(),
        }
    }
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args(args: Args) -> Self {
        let decode_policy = if args.strict_decode {
            DecodePolicy::Strict {
                max_loss_ratio: args.max_loss_ratio,
            }
        } else {
            DecodePolicy::Lossy
        };

        Self {
            repo_url: args.repo_url.unwrap_or_default().trim().to_string(),
            token: non_blank(args.token),
            output_dir: PathBuf::from(args.output_dir),
            api_url: args.api_url,
            git_ref: non_blank(args.git_ref),
            max_file_size: args.max_file_size,
            decode_policy,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.repo_url.is_empty(), Config, "Repository URL is required");

        ensure!(
            self.output_dir.is_dir(),
            Config,
            "Output directory not found: {}",
            self.output_dir.display()
        );

        let api_ok = Url::parse(&self.api_url)
            .map(|url| matches!(url.scheme(), "http" | "https"))
            .unwrap_or(false);
        ensure!(api_ok, Config, "API URL must be an http(s) URL: {}", self.api_url);

        if let DecodePolicy::Strict { max_loss_ratio } = self.decode_policy {
            ensure!(
                (0.0..=1.0).contains(&max_loss_ratio),
                Config,
                "--max-loss-ratio must be between 0 and 1, got {}",
                max_loss_ratio
            );
        }

        Ok(())
    }
}

/// Drop values that are empty once trimmed
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
