//! Listing, serving, archiving and clearing the download root.

use crate::archive;
use crate::error::{Error, Result};
use crate::types::{Event, OutputEntry, OutputKind};
use axum::body::Bytes;
use futures::{Stream, StreamExt};
use std::io::ErrorKind;
use std::path::Path;
use tempfile::TempPath;
use tokio::io::AsyncReadExt;
use tokio_util::io::ReaderStream;

use super::MediaDownloader;

/// An open file ready to be handed to a client
///
/// Contents are read lazily, so large media files are never held in memory
/// as a whole. A temporary archive backing the file is deleted once the
/// value (or the stream made from it) is dropped.
#[derive(Debug)]
pub struct OutputFile {
    /// Suggested download name
    pub name: String,
    /// Size in bytes
    pub len: u64,
    file: tokio::fs::File,
    temp: Option<TempPath>,
}

impl OutputFile {
    /// Chunked stream of the contents
    pub fn into_stream(self) -> impl Stream<Item = std::io::Result<Bytes>> + Send + 'static {
        let temp = self.temp;
        ReaderStream::new(self.file).map(move |chunk| {
            let _backing = &temp;
            chunk
        })
    }

    /// Read the whole file into memory
    pub async fn into_bytes(self) -> Result<Vec<u8>> {
        let OutputFile { mut file, temp, len, .. } = self;
        let mut bytes = Vec::with_capacity(usize::try_from(len).unwrap_or_default());
        file.read_to_end(&mut bytes).await?;
        drop(file);
        if let Some(temp) = temp {
            temp.close()?;
        }
        Ok(bytes)
    }
}

impl MediaDownloader {
    /// Items directly under the download root, sorted by name
    ///
    /// A missing root is reported as an empty listing. Folders carry the
    /// number of regular files directly inside them, files their size.
    pub async fn list_outputs(&self) -> Result<Vec<OutputEntry>> {
        let root = self.paths.root().to_path_buf();
        tokio::task::spawn_blocking(move || list_outputs_blocking(&root))
            .await
            .map_err(|e| Error::Io(std::io::Error::other(format!("listing task failed: {}", e))))?
    }

    /// Read a file directly under the download root
    ///
    /// The name is sanitized before lookup, so separators and `..` cannot
    /// reach outside the root.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] ("File not found") if there is no such regular file.
    pub async fn fetch_file(&self, name: &str) -> Result<OutputFile> {
        let path = self.paths.resolve_within(name, "File")?;
        if !path.is_file() {
            return Err(Error::NotFound("File not found".into()));
        }

        let file = tokio::fs::File::open(&path).await?;
        let len = file.metadata().await?.len();
        tracing::debug!(file = %path.display(), size = len, "serving output file");

        Ok(OutputFile {
            name: file_name(&path),
            len,
            file,
            temp: None,
        })
    }

    /// Zip a folder directly under the download root
    ///
    /// The archive is named after the sanitized folder name with a `.zip`
    /// extension. Its temporary file lives as long as the returned value.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] ("Folder not found") if there is no such folder,
    /// [`Error::Archive`] or [`Error::Io`] if packaging fails.
    pub async fn fetch_folder_archive(&self, name: &str) -> Result<OutputFile> {
        let path = self.paths.resolve_within(name, "Folder")?;
        if !path.is_dir() {
            return Err(Error::NotFound("Folder not found".into()));
        }

        let built = archive::build_archive(&path).await?;
        tracing::info!(
            folder = %path.display(),
            entries = built.entries.len(),
            "archived output folder"
        );

        let file = tokio::fs::File::open(&built.path).await?;
        let len = file.metadata().await?.len();

        Ok(OutputFile {
            name: format!("{}.zip", file_name(&path)),
            len,
            file,
            temp: Some(built.path),
        })
    }

    /// Delete everything under the download root and recreate it empty
    pub async fn clear_all(&self) -> Result<()> {
        let root = self.paths.root();
        match tokio::fs::remove_dir_all(root).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                tracing::error!(root = %root.display(), error = %e, "failed to clear downloads");
                return Err(e.into());
            }
        }
        tokio::fs::create_dir_all(root).await?;

        tracing::info!(root = %root.display(), "download directory cleared");
        self.emit_event(Event::OutputsCleared);
        Ok(())
    }
}

fn list_outputs_blocking(root: &Path) -> Result<Vec<OutputEntry>> {
    let dir = match std::fs::read_dir(root) {
        Ok(dir) => dir,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut entries = Vec::new();
    for item in dir {
        let item = item?;
        let name = item.file_name().to_string_lossy().into_owned();
        let file_type = item.file_type()?;

        if file_type.is_dir() {
            entries.push(OutputEntry {
                name,
                kind: OutputKind::Folder,
                size: None,
                file_count: Some(count_files(&item.path())),
            });
        } else if file_type.is_file() {
            entries.push(OutputEntry {
                name,
                kind: OutputKind::File,
                size: Some(item.metadata()?.len()),
                file_count: None,
            });
        }
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Regular files directly inside `dir`; unreadable folders count as empty
fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .map(|items| {
            items
                .filter_map(|item| item.ok())
                .filter(|item| item.file_type().is_ok_and(|t| t.is_file()))
                .count()
        })
        .unwrap_or(0)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
