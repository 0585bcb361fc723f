//! Comma-separated files with a header row

use crate::Result;
use anyhow::Context;
use csv_async::{AsyncReaderBuilder, AsyncWriterBuilder};
use futures::TryStreamExt;
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};

/// Record type stored as one line of a CSV file
pub trait Row: Serialize + DeserializeOwned + 'static {
    /// Header row, in the order fields are serialized
    const COLUMNS: &'static [&'static str];
}

/// Load all rows of a CSV file
pub async fn load<T: Row>(path: &Path) -> Result<Vec<T>> {
    let context = || format!("reading {}", path.display());
    let file = File::open(path).await.with_context(context)?;
    AsyncReaderBuilder::new()
        .has_headers(true)
        .create_deserializer(file)
        .into_deserialize::<T>()
        .try_collect()
        .await
        .with_context(context)
}

/// Save rows into a CSV file, replacing any previous version
///
/// Rows are first written to a temporary file next to the destination, which
/// is then renamed, so readers never see a partially written file.
pub async fn save<T: Row>(path: &Path, rows: &[T]) -> Result<()> {
    let context = || format!("writing {}", path.display());
    let partial_path = partial_path(path).with_context(context)?;
    write_rows(&partial_path, rows).await.with_context(context)?;
    fs::rename(&partial_path, path).await.with_context(context)
}

/// Location of the temporary file used while saving `path`
fn partial_path(path: &Path) -> Option<PathBuf> {
    let mut name = path.file_name()?.to_owned();
    name.push(".part");
    Some(path.with_file_name(name))
}

/// Write rows into a new file and make sure they reach storage
///
/// The header row is always written, even if there are no rows.
async fn write_rows<T: Row>(path: &Path, rows: &[T]) -> Result<()> {
    let mut file = File::create(path).await?;
    if rows.is_empty() {
        // The serializer only emits headers along with the first row
        let mut writer = AsyncWriterBuilder::new().create_writer(&mut file);
        writer.write_record(T::COLUMNS).await?;
        writer.flush().await?;
    } else {
        let mut writer = AsyncWriterBuilder::new()
            .has_headers(true)
            .create_serializer(&mut file);
        for row in rows {
            writer.serialize(row).await?;
        }
        writer.flush().await?;
    }
    file.sync_all().await?;
    Ok(())
}
