use clap::Parser;
use color_eyre::{eyre, Result};
use std::env;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tuithread::app::App;
use tuithread::config::{BackendConfig, Config};
use tuithread::utils::{get_config_dir, initialize_panic_handler};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
/// TUI client for posting threads.
struct Args {
    /// Path to the configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Account id to post as.
    #[arg(short, long)]
    account: Option<String>,
    /// Community to post in.
    #[arg(long)]
    community: Option<String>,
    /// Threads server endpoint. Without one, threads are stored locally.
    #[arg(short, long)]
    endpoint: Option<String>,
    /// Write logs to this file (enable with RUST_LOG).
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn config_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.config {
            Ok(path.clone())
        } else {
            Self::default_config_path()
        }
    }
    fn default_config_path() -> Result<PathBuf> {
        let config_dir = get_config_dir()?;
        fs::create_dir_all(&config_dir)?;
        Ok(config_dir.join("tuithread.config.toml"))
    }
}

fn init_logger(log_file: Option<&Path>) -> Result<()> {
    let mut builder = env_logger::Builder::from_default_env();
    if env::var("RUST_LOG").is_err() {
        builder.filter_level(log::LevelFilter::Off);
    }
    if let Some(path) = log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config_path = args.config_path()?;
    let mut config = if config_path.exists() {
        toml::from_str(&fs::read_to_string(&config_path)?)?
    } else {
        Config::default()
    };
    config.set_default_keybindings();
    if let Some(account) = args.account {
        config.account.id = account;
    }
    if let Some(community) = args.community {
        config.account.community = Some(community);
    }
    if let Some(endpoint) = args.endpoint {
        let token = match config.backend {
            BackendConfig::Http { token, .. } => token,
            BackendConfig::Local { .. } => None,
        };
        config.backend = BackendConfig::Http { endpoint, token };
    }
    if args.log_file.is_some() {
        config.log_file = args.log_file;
    }
    if config.account.id.is_empty() {
        return Err(eyre::eyre!(
            "no account configured: pass --account or set [account] id in {}",
            config_path.display()
        ));
    }

    init_logger(config.log_file.as_deref())?;

    initialize_panic_handler()?;

    App::new(config)?.run().await
}
