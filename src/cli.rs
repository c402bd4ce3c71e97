// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes. The token can come from the environment so it
// never has to appear in shell history.
// =============================================================================

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "repo-harvest",
    version,
    about = "Fetch every file of a GitHub repository through the contents API",
    long_about = "repo-harvest walks a GitHub repository through the REST contents API, \
                  flattens it into path -> text, and caches listings and file bodies \
                  so repeated fetches stay inside the rate limit."
)]
pub struct Cli {
    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch all files of a repository
    ///
    /// Example: repo-harvest fetch https://github.com/rust-lang/log
    Fetch {
        /// GitHub repository URL (e.g., https://github.com/user/repo.git)
        repo_url: String,

        /// Print the full path -> content map as JSON instead of a file list
        #[arg(long)]
        json: bool,

        /// Only accept https://github.com/<owner>/<repo>.git
        #[arg(long)]
        strict: bool,

        /// GitHub API token (bearer)
        #[arg(long, env = "GITHUB_API_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Base URL of the GitHub REST API
        #[arg(long, default_value = repo_harvest::github::DEFAULT_API_BASE)]
        api_base: String,

        /// Directory listings (and file fetches per listing) in flight at once
        #[arg(long, default_value_t = 8)]
        concurrency: usize,

        /// Seconds to keep cached listings and file bodies (0 = forever)
        #[arg(long, default_value_t = 300)]
        cache_ttl: u64,

        /// Fail instead of waiting when the rate limit is exhausted
        #[arg(long)]
        fail_on_throttle: bool,

        /// Fetch the repository this many times (later runs hit the cache)
        #[arg(long, default_value_t = 1)]
        repeat: usize,
    },
}
