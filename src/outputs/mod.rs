//! Output generation for ranked results.
//!
//! # Submodules
//!
//! - [`csv`]: Writes the results table and its impact-tagged analysis
//! - [`json`]: Writes the run as a dated JSON edition
//! - [`summary`]: Renders top results and distributions for the console
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── climate_news_20250701-093000.csv
//! └── analyzed_climate_news_20250701-093000.csv
//!
//! json_output_dir/
//! └── 2025-07-01/
//!     └── morning.json
//! ```

pub mod csv;
pub mod json;
pub mod summary;
