//! JSON snapshot output.
//!
//! Every ingest run writes exactly one file into the output directory:
//! ```text
//! out_dir/
//! ├── news-dach-20250506T000000Z.json
//! ├── news-dach-20250506T060000Z.json
//! └── news-dach-20250506T120000Z.json
//! ```
//!
//! The write is not atomic. A process killed mid-write can leave a truncated
//! file behind.

use crate::error::PersistError;
use crate::models::{IngestReport, Snapshot};
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write a [`Snapshot`] into `out_dir`, creating the directory if needed.
///
/// Non-ASCII characters are written literally as UTF-8.
///
/// # Returns
///
/// The number of items written and the path of the new file.
#[instrument(level = "info", skip_all, fields(out_dir = %out_dir.display(), region = %snapshot.region))]
pub async fn write_snapshot(
    snapshot: &Snapshot,
    out_dir: &Path,
) -> Result<IngestReport, PersistError> {
    if let Err(source) = fs::create_dir_all(out_dir).await {
        error!(error = %source, "Failed to create output dir");
        return Err(PersistError::CreateDir {
            path: out_dir.to_path_buf(),
            source,
        });
    }

    let json = serde_json::to_vec(snapshot)?;
    let path = out_dir.join(snapshot.file_name());

    fs::write(&path, json)
        .await
        .map_err(|source| PersistError::Write {
            path: path.clone(),
            source,
        })?;
    info!(path = %path.display(), items = snapshot.items.len(), "Wrote snapshot");

    Ok(IngestReport {
        item_count: snapshot.items.len(),
        saved_path: path,
    })
}
