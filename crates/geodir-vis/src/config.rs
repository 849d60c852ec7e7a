//! Server configuration.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;

use geodir_search::palette::parse_overrides;
use geodir_search::RecordSchema;

use crate::error::{Error, Result};

/// Map server configuration.
#[derive(Debug, Clone)]
pub struct VisConfig {
    /// Address to listen on
    pub addr: SocketAddr,
    /// JSON file with the record rows
    pub records_path: PathBuf,
    /// Column layout of the rows
    pub schema: RecordSchema,
    /// Zoom level of the first placement pass
    pub initial_zoom: f64,
    /// Per-category marker colours
    pub color_overrides: HashMap<String, String>,
}

impl Default for VisConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            records_path: PathBuf::from("./records.json"),
            schema: RecordSchema::People,
            initial_zoom: 6.0,
            color_overrides: HashMap::new(),
        }
    }
}

impl VisConfig {
    /// Load configuration from `GEODIR_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup("GEODIR_ADDR") {
            config.addr = addr
                .parse()
                .map_err(|_| Error::Config(format!("invalid GEODIR_ADDR: {}", addr)))?;
        }

        if let Some(path) = lookup("GEODIR_RECORDS") {
            config.records_path = PathBuf::from(path);
        }

        if let Some(schema) = lookup("GEODIR_SCHEMA") {
            config.schema = schema
                .parse()
                .map_err(|_| Error::Config(format!("invalid GEODIR_SCHEMA: {}", schema)))?;
        }

        if let Some(zoom) = lookup("GEODIR_ZOOM") {
            config.initial_zoom = zoom
                .parse::<f64>()
                .ok()
                .filter(|z| z.is_finite())
                .ok_or_else(|| Error::Config(format!("invalid GEODIR_ZOOM: {}", zoom)))?;
        }

        if let Some(colors) = lookup("GEODIR_COLORS") {
            config.color_overrides = parse_overrides(&colors);
        }

        Ok(config)
    }
}
