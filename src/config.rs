//! Runtime configuration for the `sentiment-analyzer` server.
//!
//! Every setting has a default, so the binary runs with no flags. Flags win
//! over environment variables.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use clap::Parser;

use crate::models::{DEFAULT_MODEL_REPO, DEFAULT_TOKENIZER_REPO};
use crate::sentiment::DeviceRequest;

/// Port the UI listens on unless told otherwise.
pub const DEFAULT_PORT: u16 = 8501;

/// Interactive sentiment analysis demo.
#[derive(Debug, Clone, Parser)]
#[command(name = "sentiment-analyzer", version, about)]
pub struct AppConfig {
    /// Address to bind the UI server to.
    #[arg(long, env = "SENTIMENT_HOST", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub host: IpAddr,

    /// Port to bind the UI server to.
    #[arg(long, env = "SENTIMENT_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    #[command(flatten)]
    pub model: ModelConfig,
}

/// Which classifier to load and where to run it.
#[derive(Debug, Clone, PartialEq, Eq, clap::Args)]
pub struct ModelConfig {
    /// Hugging Face repository of the sentiment checkpoint.
    #[arg(long = "model", env = "SENTIMENT_MODEL", default_value = DEFAULT_MODEL_REPO)]
    pub model_repo: String,

    /// Repository to take tokenizer.json from when the checkpoint has none.
    #[arg(long = "tokenizer", env = "SENTIMENT_TOKENIZER", default_value = DEFAULT_TOKENIZER_REPO)]
    pub tokenizer_repo: String,

    /// Inference device: cpu, cuda[:N] or metal[:N].
    #[arg(long, env = "SENTIMENT_DEVICE", default_value = "cpu", value_parser = parse_device)]
    pub device: DeviceRequest,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_repo: DEFAULT_MODEL_REPO.to_string(),
            tokenizer_repo: DEFAULT_TOKENIZER_REPO.to_string(),
            device: DeviceRequest::Cpu,
        }
    }
}

fn parse_device(raw: &str) -> Result<DeviceRequest, String> {
    raw.parse::<DeviceRequest>().map_err(|e| e.to_string())
}

impl AppConfig {
    /// Socket address the server binds.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
