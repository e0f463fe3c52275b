//! JSON edition output.
//!
//! # Output Structure
//!
//! Files are organized by date with edition names:
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     ├── morning.json
//!     ├── afternoon.json
//!     └── evening.json
//! ```
//!
//! A later run in the same edition overwrites the earlier file.

use crate::models::Edition;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Write an [`Edition`] to `{json_output_dir}/{date}/{time_of_day}.json`.
///
/// Creates the date directory when missing and returns the written path.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_edition(
    edition: &Edition,
    json_output_dir: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(edition)?;

    let full_json_dir = Path::new(json_output_dir).join(&edition.local_date);
    info!(full_json_dir = %full_json_dir.display(), "Ensuring JSON directory exists");
    if let Err(e) = fs::create_dir_all(&full_json_dir).await {
        error!(full_json_dir = %full_json_dir.display(), error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let output_json_filename = full_json_dir.join(format!("{}.json", edition.time_of_day));
    fs::write(&output_json_filename, json).await?;
    info!(path = %output_json_filename.display(), articles = edition.articles.len(), "Wrote JSON edition");

    Ok(output_json_filename)
}
