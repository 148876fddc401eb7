//! `cdesk config` - local client settings
//!
//! These never touch the network and are not behind the login guard.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::output::print_structured;
use crate::cli::GlobalOpts;
use crate::core::{Config, QueryCache};

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective settings
    Show,

    /// Set the API base URL (including the /api prefix); cached responses of
    /// another server are dropped
    SetUrl { url: String },

    /// Set the page size of list commands
    SetPerPage { per_page: u32 },

    /// Seconds a cached response stays fresh (0 keeps it until invalidated)
    SetCacheTtl { seconds: u64 },

    /// Request timeout in seconds (0 restores the transport default)
    SetTimeout { seconds: u64 },

    /// Print the data directory
    Path,
}

pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    let mut config = Config::load();
    match cmd {
        ConfigCommands::Show => {
            if print_structured(&config, global.output)? {
                return Ok(());
            }
            println!("{}: {}", style("api_url").bold(), config.api_url);
            println!("{}: {}", style("per_page").bold(), config.per_page);
            println!("{}: {}s", style("cache_ttl").bold(), config.cache_ttl_secs);
            match config.timeout_secs {
                Some(secs) => println!("{}: {}s", style("timeout").bold(), secs),
                None => println!("{}: default", style("timeout").bold()),
            }
            return Ok(());
        }
        ConfigCommands::Path => {
            println!("{}", config.home_dir().into_diagnostic()?.display());
            return Ok(());
        }
        ConfigCommands::SetUrl { url } => {
            config.set_api_url(&url).into_diagnostic()?;
            let cache_path = config.cache_path().into_diagnostic()?;
            if cache_path.exists() {
                QueryCache::open_for(&cache_path, &config.api_url).into_diagnostic()?;
            }
        }
        ConfigCommands::SetPerPage { per_page } => {
            if per_page == 0 {
                return Err(miette::miette!("page size must be at least 1"));
            }
            config.per_page = per_page;
        }
        ConfigCommands::SetCacheTtl { seconds } => config.cache_ttl_secs = seconds,
        ConfigCommands::SetTimeout { seconds } => {
            config.timeout_secs = (seconds > 0).then_some(seconds);
        }
    }

    let path = config.save().into_diagnostic()?;
    if !global.quiet {
        println!("{} Saved {}", style("✓").green(), style(path.display()).dim());
    }
    Ok(())
}
