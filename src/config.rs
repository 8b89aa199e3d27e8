use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use serde::Deserialize;

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_BIND_PORT: u16 = 8001;
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

#[derive(Parser)]
#[command(name = "sketchd", version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the configuration file
    #[arg(long = "config", short = 'c')]
    pub config_path: Option<PathBuf>,

    /// Address to listen on, overriding the configuration file
    #[arg(long = "bind-address")]
    pub bind_address: Option<String>,

    /// Port to listen on, overriding the configuration file
    #[arg(long = "bind-port", short = 'p')]
    pub bind_port: Option<u16>,
}

impl CliArgs {
    /// Load the configuration file if given and apply command line overrides
    pub fn to_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config_path {
            Some(path) => {
                let file = std::fs::File::open(path)
                    .with_context(|| format!("cannot open config {}", path.display()))?;
                let reader = std::io::BufReader::new(file);
                serde_json::from_reader(reader)
                    .with_context(|| format!("invalid config {}", path.display()))?
            }
            None => Config::default(),
        };

        if let Some(address) = &self.bind_address {
            config.server.bind_address = Some(address.clone());
        }
        if let Some(port) = self.bind_port {
            config.server.bind_port = Some(port);
        }
        Ok(config)
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub toolchain: ToolchainConfig,
}

#[derive(Deserialize, Debug, Default)]
pub struct ServerConfig {
    pub bind_address: Option<String>,
    pub bind_port: Option<u16>,
}

#[derive(Deserialize, Debug, Default, Clone)]
pub struct ToolchainConfig {
    /// Defaults to `arduino-cli` with the platform executable suffix
    pub binary_name: Option<String>,
    /// Directory whose `tools/` may hold a bundled toolchain;
    /// defaults to the directory of the running executable
    pub install_dir: Option<PathBuf>,
    /// Parent of the per-request workspaces; defaults to the system temp dir
    pub staging_dir: Option<PathBuf>,
    /// 0 disables the deadline
    pub timeout_secs: Option<u64>,
}
