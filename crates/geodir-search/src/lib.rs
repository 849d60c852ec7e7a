//! Geodir Search
//!
//! Records, categories and the search/filter engine behind the directory map.
//!
//! # Architecture
//!
//! - **Normalize**: diacritic and case insensitive tokenization
//! - **Store**: ordered, immutable records with stable ids
//! - **Filter**: category gate plus AND-semantics token search
//! - **Ingest**: spreadsheet rows to validated records
//! - **Palette**: marker colour per category
//! - **Skills**: thematics/competences split of a skills cell
//!
//! # Example
//!
//! ```
//! use geodir_search::{filter, FilterState, Record, RecordFields, RecordStore};
//! use geodir_layout::LatLon;
//!
//! let store = RecordStore::new(vec![Record::new(
//!     RecordFields {
//!         name: "Jean Dupont".to_string(),
//!         organization: "Epicure ing".to_string(),
//!         ..Default::default()
//!     },
//!     LatLon::new(47.2184, -1.5536),
//! )]);
//!
//! let mut state = FilterState::new(store.categories().to_vec());
//! state.set_query("jean épic");
//! assert_eq!(filter(&store, &state).len(), 1);
//! ```

pub mod error;
pub mod filter;
pub mod ingest;
pub mod normalize;
pub mod palette;
pub mod record;
pub mod skills;
pub mod store;

pub use error::{Error, Result};
pub use filter::{filter, matches, FilterState, ToggleMode};
pub use ingest::{ingest_json, ingest_rows, load_file, IngestReport, RecordSchema, RejectReason};
pub use normalize::{normalize, tokenize};
pub use palette::CategoryPalette;
pub use record::{Category, Record, RecordFields, RecordId, SearchFields};
pub use skills::SkillSet;
pub use store::RecordStore;
