//! Geodir Map Visualization
//!
//! Keeps a map's markers in step with the directory filters.
//!
//! # Architecture
//!
//! - **Controller**: filter and zoom triggers, placement recompute
//! - **Events**: marker show/hide events and the in-memory marker board
//! - **REST API**: search, category toggles, zoom, record cards
//! - **WebSocket**: the same commands over a single connection
//!
//! # Usage
//!
//! ```ignore
//! let report = load_file("records.json", RecordSchema::People)?;
//! let config = VisConfig::from_env()?;
//!
//! let server = VisServer::from_config(report.into_store(), &config);
//! server.serve(config.addr).await?;
//! ```

mod config;
mod controller;
mod error;
mod events;
mod server;

pub use config::VisConfig;
pub use controller::{LayoutSummary, MarkerSink, VisibilityController};
pub use error::{Error, Result};
pub use events::{MapSnapshot, MarkerBoard, MarkerEvent, MarkerState};
pub use server::{MapController, VisServer};
