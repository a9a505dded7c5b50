use bincode::{deserialize_from, serialize_into};
use chrono::Utc;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::table::UnifiedTable;

/// On-disk form of a loaded table
#[derive(Serialize, Deserialize)]
struct Snapshot {
    saved_at: i64,
    table: UnifiedTable,
}

/// Write the merged table as gzip-compressed bincode so the next start can
/// skip CSV parsing.
pub fn save_table(table: &UnifiedTable, path: impl AsRef<Path>) -> std::io::Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut writer = std::io::BufWriter::new(encoder);

    let snapshot = Snapshot {
        saved_at: Utc::now().timestamp(),
        table: table.clone(),
    };
    serialize_into(&mut writer, &snapshot)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    writer
        .into_inner()
        .map_err(|e| e.into_error())?
        .finish()?
        .flush()?;

    info!("saved {} rows to {}", table.len(), path.display());
    Ok(())
}

/// Read a table written by [`save_table`].
pub fn load_table(path: impl AsRef<Path>) -> std::io::Result<UnifiedTable> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let decoder = GzDecoder::new(file);
    let mut reader = std::io::BufReader::new(decoder);

    let snapshot: Snapshot = deserialize_from(&mut reader)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    info!(
        "restored {} rows from {} (saved at {})",
        snapshot.table.len(),
        path.display(),
        snapshot.saved_at
    );
    Ok(snapshot.table)
}
