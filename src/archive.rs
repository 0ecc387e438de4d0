//! Packaging of output folders into zip archives

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Component, Path};
use tempfile::TempPath;
use tokio::task::spawn_blocking;
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// A zip archive written to a temporary file
///
/// The file is removed when this value (or the [`TempPath`] taken out of it)
/// is dropped.
#[derive(Debug)]
pub struct BuiltArchive {
    /// Location of the archive
    pub path: TempPath,
    /// Entry names in the order they were written
    pub entries: Vec<String>,
}

/// Zip every regular file below `dir`
///
/// Entry names are relative to `dir` with `/` separators, so the folder's own
/// name never appears in them. Symlinks are not followed. Fails with
/// `NotFound` when `dir` is missing or not a directory.
pub async fn build_archive(dir: &Path) -> Result<BuiltArchive> {
    let dir = dir.to_path_buf();
    spawn_blocking(move || build_archive_blocking(&dir))
        .await
        .map_err(|e| Error::Archive(format!("archive task panicked: {}", e)))?
}

fn build_archive_blocking(dir: &Path) -> Result<BuiltArchive> {
    if !dir.is_dir() {
        return Err(Error::NotFound("Folder not found".into()));
    }

    let (file, path) = tempfile::Builder::new()
        .prefix("media-dl-")
        .suffix(".zip")
        .tempfile()?
        .into_parts();

    let mut writer = ZipWriter::new(BufWriter::new(file));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut entries = Vec::new();

    for entry in WalkDir::new(dir).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(dir)
            .map_err(|e| Error::Archive(e.to_string()))?;
        let name = entry_name(relative);

        writer
            .start_file(name.as_str(), options)
            .map_err(|e| Error::Archive(e.to_string()))?;
        let mut source = BufReader::new(File::open(entry.path())?);
        std::io::copy(&mut source, &mut writer)?;

        tracing::trace!(entry = %name, "added archive entry");
        entries.push(name);
    }

    writer.finish().map_err(|e| Error::Archive(e.to_string()))?;

    tracing::debug!(
        folder = %dir.display(),
        entries = entries.len(),
        "built archive"
    );

    Ok(BuiltArchive { path, entries })
}

fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
