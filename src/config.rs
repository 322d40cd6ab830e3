//! Command-line configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::constants::DEFAULT_API_BASE;
use crate::storage::FileStore;

#[derive(Parser, Debug)]
#[command(
    name = "shopchat",
    version = env!("CARGO_PKG_VERSION"),
    about = "Floating SmartShop shopping assistant for the terminal"
)]
pub struct Cli {
    /// Base URL of the SmartShop REST API.
    #[arg(long, env = "SHOPCHAT_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Directory holding the persisted session and widget layout.
    #[arg(long, env = "SHOPCHAT_DATA_DIR", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Append logs to this file. Without it, logs are discarded.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Log filter directive, e.g. `debug` or `shopchat=debug,reqwest=warn`.
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// UI redraw interval in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 16)]
    pub tick_ms: u64,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open the interactive assistant (default).
    Run,
    /// Sign in and remember the session.
    Login {
        username: String,
        #[arg(long, env = "SHOPCHAT_PASSWORD")]
        password: String,
    },
    /// Create an account, then sign in with it.
    Register {
        username: String,
        email: String,
        #[arg(long, env = "SHOPCHAT_PASSWORD")]
        password: String,
    },
    /// Forget the stored session and widget layout.
    Logout,
    /// Print the identity the assistant will see.
    Whoami,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(FileStore::default_dir)
    }

    pub fn store(&self) -> FileStore {
        FileStore::in_dir(self.data_dir())
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}
