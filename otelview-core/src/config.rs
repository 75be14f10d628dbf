use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::history::DEFAULT_CAPACITY;

pub const DEFAULT_HTTP_PORT: i64 = 4318;
pub const DEFAULT_GRPC_PORT: i64 = 4317;
pub const DEFAULT_STREAM_PORT: i64 = 4319;

/// One transport listener. A port of 0 counts as disabled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BindingConfig {
    pub enabled: bool,
    pub port: i64,
}

impl BindingConfig {
    /// The port to listen on, `None` when the binding is off.
    pub fn active_port(&self) -> Option<u16> {
        if !self.is_active() {
            return None;
        }
        u16::try_from(self.port).ok()
    }

    fn is_active(&self) -> bool {
        self.enabled && self.port != 0
    }
}

/// Viewer configuration, from an optional YAML file plus command-line
/// overrides.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ViewerConfig {
    /// History buffer size.
    pub capacity: usize,
    /// Initial filter text.
    pub filter: String,
    /// Bound of the queue between ingest and the dashboard.
    pub channel_capacity: usize,
    /// OTLP/JSON over HTTP.
    pub http_enabled: bool,
    pub http_port: i64,
    /// OTLP over gRPC.
    pub grpc_enabled: bool,
    pub grpc_port: i64,
    /// Newline-delimited OTLP/JSON over TCP, off unless asked for.
    pub stream_enabled: bool,
    pub stream_port: i64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            filter: String::new(),
            channel_capacity: 64,
            http_enabled: true,
            http_port: DEFAULT_HTTP_PORT,
            grpc_enabled: true,
            grpc_port: DEFAULT_GRPC_PORT,
            stream_enabled: false,
            stream_port: DEFAULT_STREAM_PORT,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("every listener is disabled")]
    NoBindings,
    #[error("invalid port number {port} for the {binding} listener")]
    InvalidPort { binding: &'static str, port: i64 },
    #[error("{field} must be greater than zero")]
    ZeroCapacity { field: &'static str },
}

impl ViewerConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: ViewerConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn http(&self) -> BindingConfig {
        BindingConfig {
            enabled: self.http_enabled,
            port: self.http_port,
        }
    }

    pub fn grpc(&self) -> BindingConfig {
        BindingConfig {
            enabled: self.grpc_enabled,
            port: self.grpc_port,
        }
    }

    pub fn stream(&self) -> BindingConfig {
        BindingConfig {
            enabled: self.stream_enabled,
            port: self.stream_port,
        }
    }

    /// Refuse configurations that cannot start: no listener at all, a port
    /// outside 1..=65535, or an empty history/queue.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bindings = [
            ("http", self.http()),
            ("grpc", self.grpc()),
            ("stream", self.stream()),
        ];
        if !bindings.iter().any(|(_, cfg)| cfg.is_active()) {
            return Err(ConfigError::NoBindings);
        }
        for (binding, cfg) in bindings {
            if cfg.is_active() && u16::try_from(cfg.port).is_err() {
                return Err(ConfigError::InvalidPort {
                    binding,
                    port: cfg.port,
                });
            }
        }
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity { field: "capacity" });
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::ZeroCapacity {
                field: "channel_capacity",
            });
        }
        Ok(())
    }
}
