use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::Platform;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_ASSET_URL: &str = "http://localhost:5000";

/// Command-line and environment configuration of the `foodreel` client.
#[derive(Debug, Parser)]
#[command(name = "foodreel", about = "Food reel cart and engagement client", long_about = None)]
pub struct Config {
    /// Backend REST API base URL
    #[arg(long, env = "FOODREEL_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Base URL that relative media paths are served from
    #[arg(long, env = "FOODREEL_ASSET_URL", default_value = DEFAULT_ASSET_URL)]
    pub asset_url: String,

    /// Directory for the cart snapshot and recent searches
    #[arg(long, env = "FOODREEL_STORAGE_DIR", default_value = ".foodreel")]
    pub storage_dir: PathBuf,

    /// Bearer token sent with every request
    #[arg(long, env = "FOODREEL_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Signed-in user id; likes, saves and follows need one
    #[arg(long, env = "FOODREEL_USER_ID")]
    pub user_id: Option<String>,

    /// Display name attached to comments
    #[arg(long, env = "FOODREEL_USER_NAME")]
    pub user_name: Option<String>,

    /// Channel capacity of every service
    #[arg(long, default_value_t = 32)]
    pub buffer: usize,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the cart
    Cart,
    /// Add a reel's dish to the cart (or bump its quantity)
    Add(LineArgs),
    Increase(LineArgs),
    /// Lower a line's quantity; never below one
    Decrease(LineArgs),
    Remove(LineArgs),
    /// Empty the local cart
    Clear,
    /// Cart grouped by restaurant with checkout links
    Checkout {
        /// Use the server's grouping instead of the local one
        #[arg(long)]
        server: bool,
    },
    /// Price comparison across platforms for every cart item
    Compare,
    Like { reel: String },
    Save { reel: String },
    Follow {
        restaurant: String,
        /// Backend says the user already follows it (used when the feed does not list it)
        #[arg(long)]
        following: bool,
    },
    /// Recent searches
    #[command(subcommand)]
    Recent(RecentCommand),
}

#[derive(Debug, Args)]
pub struct LineArgs {
    pub reel: String,

    #[arg(long, default_value = "ZOMATO", value_parser = parse_platform)]
    pub platform: Platform,
}

#[derive(Debug, Subcommand)]
pub enum RecentCommand {
    List,
    Add { id: String, food_name: String },
    Remove { id: String },
    Clear,
}

fn parse_platform(raw: &str) -> Result<Platform, String> {
    if raw.trim().is_empty() {
        return Err("platform must not be empty".to_string());
    }
    Ok(Platform::from(raw))
}

impl Config {
    /// Resolves a media path against the asset base. Absolute URLs pass through.
    pub fn asset_url(&self, path: &str) -> String {
        asset_url(&self.asset_url, path)
    }
}

fn asset_url(base: &str, path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    if path.starts_with("http") {
        return path.to_string();
    }
    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}
