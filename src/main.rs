// src/main.rs
// =============================================================================
// Entry point of the repo-harvest CLI.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (stderr, RUST_LOG aware)
// 3. Build a RepoHarvester and fetch the repository
// 4. Print the file list or the full map as JSON
// 5. Exit with proper code (0 = success, 2 = error)
// =============================================================================

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use repo_harvest::{FileMap, HarvestConfig, RepoHarvester, RepositoryRef, ThrottlePolicy};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    let exit_code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("repo_harvest=info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Fetch {
            repo_url,
            json,
            strict,
            token,
            api_base,
            concurrency,
            cache_ttl,
            fail_on_throttle,
            repeat,
        } => {
            if strict {
                RepositoryRef::parse_strict(&repo_url)?;
            }

            let ttl = (cache_ttl > 0).then(|| Duration::from_secs(cache_ttl));
            let throttle = if fail_on_throttle {
                ThrottlePolicy::Fail
            } else {
                ThrottlePolicy::Suspend
            };
            let config = HarvestConfig::default()
                .with_api_base(api_base)
                .with_token(token)
                .with_max_concurrency(concurrency)
                .with_cache_ttl(ttl, ttl)
                .with_throttle(throttle);

            let harvester = RepoHarvester::new(config).context("failed to set up the harvester")?;

            let mut files = FileMap::new();
            for _ in 0..repeat.max(1) {
                files = harvester
                    .fetch_repository_files(&repo_url)
                    .await
                    .with_context(|| format!("failed to fetch {}", repo_url))?;
            }

            print_files(&files, json)
        }
    }
}

fn print_files(files: &FileMap, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(files)?);
        return Ok(());
    }

    println!("{:<70} {:>10}", "PATH", "BYTES");
    println!("{}", "=".repeat(81));
    for (path, content) in files {
        println!("{:<70} {:>10}", path, content.len());
    }
    println!();
    println!("📄 {} file(s)", files.len());
    Ok(())
}
