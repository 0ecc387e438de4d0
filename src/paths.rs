//! Output directory allocation and file name sanitization

use crate::error::{Error, Result};
use crate::platform::Platform;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

/// Characters that are never allowed in a sanitized name
const FORBIDDEN: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Maximum number of suffixes tried when a job folder name is taken
const MAX_SUFFIX_ATTEMPTS: u32 = 9999;

/// Make a user-supplied name safe to use as a single path component
///
/// Forbidden characters (`<>:"/\|?*` and control characters) become `_`,
/// surrounding whitespace is trimmed and the result is cut to `max_len`
/// characters. A name made only of dots (`.`, `..`) has its dots replaced so it
/// can never address the current or parent directory.
///
/// The function is idempotent.
///
/// # Examples
///
/// ```
/// use media_dl::paths::sanitize;
///
/// assert_eq!(sanitize("../etc/passwd", 100), ".._etc_passwd");
/// assert_eq!(sanitize("  a:b  ", 100), "a_b");
/// assert_eq!(sanitize("..", 100), "__");
/// ```
pub fn sanitize(name: &str, max_len: usize) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if FORBIDDEN.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    let truncated: String = replaced.trim().chars().take(max_len).collect();
    let trimmed = truncated.trim_end();

    if !trimmed.is_empty() && trimmed.chars().all(|c| c == '.') {
        return "_".repeat(trimmed.chars().count());
    }
    trimmed.to_string()
}

/// Owns the download root and hands out job folders below it
#[derive(Clone, Debug)]
pub struct PathManager {
    root: PathBuf,
    max_filename_length: usize,
}

impl PathManager {
    /// Create a manager for `root`; nothing is touched on disk
    pub fn new(root: impl Into<PathBuf>, max_filename_length: usize) -> Self {
        Self {
            root: root.into(),
            max_filename_length,
        }
    }

    /// The download root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Sanitize with the configured length limit
    pub fn sanitize(&self, name: &str) -> String {
        sanitize(name, self.max_filename_length)
    }

    /// Allocate `{base}/{platform}_{yyyyMMdd_HHmmss}` for a new job
    pub fn allocate(&self, base: &Path, platform: Platform) -> Result<PathBuf> {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
        self.allocate_at(base, platform, &stamp)
    }

    /// Allocate a job folder for an explicit timestamp string
    ///
    /// The folder is created with an exclusive `create_dir`, so an existing
    /// directory is never reused. If `{platform}_{stamp}` is taken, `_1`, `_2`,
    /// ... are appended until a free name is found.
    pub fn allocate_at(&self, base: &Path, platform: Platform, stamp: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(base)?;

        let stem = format!("{}_{}", platform.as_str(), stamp);
        for attempt in 0..=MAX_SUFFIX_ATTEMPTS {
            let name = if attempt == 0 {
                stem.clone()
            } else {
                format!("{}_{}", stem, attempt)
            };
            let candidate = base.join(name);

            match std::fs::create_dir(&candidate) {
                Ok(()) => {
                    tracing::debug!(folder = %candidate.display(), "allocated job folder");
                    return Ok(candidate);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(Error::Io(std::io::Error::new(
            ErrorKind::AlreadyExists,
            format!(
                "could not find a free folder name for {} after {} attempts",
                stem, MAX_SUFFIX_ATTEMPTS
            ),
        )))
    }

    /// Base directory for a request's optional `custom_path`
    ///
    /// Blank or missing paths mean the download root. Relative paths are joined
    /// onto the root and may only contain normal components. Absolute paths
    /// are accepted only when `allow_absolute` is set.
    pub fn resolve_base(&self, custom: Option<&str>, allow_absolute: bool) -> Result<PathBuf> {
        let Some(custom) = custom.map(str::trim).filter(|c| !c.is_empty()) else {
            return Ok(self.root.clone());
        };

        let path = Path::new(custom);
        if path.is_absolute() {
            if allow_absolute {
                return Ok(path.to_path_buf());
            }
            return Err(Error::Validation(
                "custom_path must be relative to the download directory".into(),
            ));
        }

        if path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(Error::Validation(format!(
                "custom_path may not leave the download directory: {}",
                custom
            )));
        }

        Ok(self.root.join(path))
    }

    /// Resolve a user-supplied name to an existing entry directly under the root
    ///
    /// The name is sanitized first. The resolved path is canonicalized and must
    /// still lie inside the canonical root, which also rules out symlinks that
    /// point elsewhere. Anything missing or escaping is `NotFound`, labelled
    /// with `what` ("File", "Folder").
    pub fn resolve_within(&self, name: &str, what: &str) -> Result<PathBuf> {
        let not_found = || Error::NotFound(format!("{} not found", what));

        let safe = self.sanitize(name);
        if safe.is_empty() {
            return Err(not_found());
        }

        let root = self.root.canonicalize().map_err(|_| not_found())?;
        let candidate = root.join(&safe).canonicalize().map_err(|_| not_found())?;

        if candidate.parent() != Some(root.as_path()) {
            tracing::warn!(
                requested = name,
                resolved = %candidate.display(),
                "rejected path outside the download root"
            );
            return Err(not_found());
        }

        Ok(candidate)
    }
}
