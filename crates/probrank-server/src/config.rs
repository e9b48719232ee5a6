//! Server configuration

use crate::cli::Cli;
use probrank_core::LabelTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Model artifact path
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Display labels by class index
    #[serde(default)]
    pub labels: LabelsSpec,

    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest accepted request body
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl ServerConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: &str, cli: &Cli) -> anyhow::Result<Self> {
        // Try to load from file, or use defaults
        let mut config = if Path::new(config_path).exists() {
            let content = std::fs::read_to_string(config_path)?;
            serde_yaml::from_str(&content)?
        } else {
            Self::default()
        };

        // Apply CLI overrides
        if let Some(model) = &cli.model {
            config.model_path = model.clone();
        }

        if let Some(listen) = &cli.listen {
            config.listen = listen.clone();
        }

        if let Some(port) = cli.port {
            config.port = port;
        }

        Ok(config)
    }

    /// Build the validated label table
    pub fn label_table(&self) -> probrank_core::Result<LabelTable> {
        self.labels.to_label_table()
    }

    /// Address to bind
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.listen, self.port).parse()?)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            labels: LabelsSpec::default(),
            listen: default_listen(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// Label table as written in configuration: either a list in class-index
/// order or an explicit index → label map.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelsSpec {
    /// `labels: [X, Y]`
    List(Vec<String>),
    /// `labels: {0: X, 1: Y}`
    Indexed(BTreeMap<usize, String>),
}

impl LabelsSpec {
    /// Validate into a label table
    pub fn to_label_table(&self) -> probrank_core::Result<LabelTable> {
        match self {
            Self::List(labels) => LabelTable::new(labels.iter().cloned()),
            Self::Indexed(map) => {
                LabelTable::from_indexed(map.iter().map(|(i, label)| (*i, label.clone())))
            }
        }
    }
}

impl Default for LabelsSpec {
    fn default() -> Self {
        Self::List(LabelTable::default().labels().to_vec())
    }
}

fn default_model_path() -> PathBuf {
    PathBuf::from("./models/calibrated_rf_model.json")
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}
