//! Process configuration.
//!
//! Every setting can come from a command line flag or an environment
//! variable; flags win.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Deployment environment. Only affects the default log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Environment {
    Local,
    Dev,
    Prod,
}

/// PR reviewer assignment service
#[derive(Parser, Debug, Clone)]
#[command(name = "pr-reviewer")]
#[command(about = "Assigns and reassigns pull request reviewers within teams", long_about = None)]
pub struct Config {
    /// Port to listen on
    #[arg(long, env = "PR_REVIEWER_PORT", default_value_t = 8080)]
    pub port: u16,

    /// SQLite database file
    #[arg(long, env = "PR_REVIEWER_DATABASE", default_value = "pr-reviewer.db")]
    pub database: PathBuf,

    /// Deployment environment
    #[arg(long = "env", env = "PR_REVIEWER_ENV", value_enum, default_value = "prod")]
    pub environment: Environment,

    /// Explicit log filter, e.g. "pr_reviewer_lib=debug,tower_http=info"
    #[arg(long, env = "PR_REVIEWER_LOG")]
    pub log_filter: Option<String>,

    /// Keep all state in memory instead of SQLite
    #[arg(long)]
    pub in_memory: bool,
}

impl Config {
    /// The log filter to install: the explicit one if set, otherwise a
    /// level derived from the environment.
    pub fn log_filter(&self) -> String {
        if let Some(filter) = &self.log_filter {
            return filter.clone();
        }
        match self.environment {
            Environment::Local | Environment::Dev => "debug".to_string(),
            Environment::Prod => "info".to_string(),
        }
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}
