// src/mirror.rs
// =============================================================================
// The mirror writer.
//
// Two path-mapping modes:
// - replicate: reproduce the site's path structure under the target
//   directory, with a trailing '/' on a URL implying index.html;
// - copy: flatten everything into the target directory by basename.
//
// write_once() never overwrites an existing file, so an interrupted mirror
// can be resumed without re-downloading, and the whole content is handed to
// a single write call so a file never exists in a truncated state.
// =============================================================================

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::urls::{clean_url, host_prefix};

/// Append the implied index.html to directory URLs.
fn with_index_html(url: &str) -> String {
    if url.ends_with('/') {
        format!("{}index.html", url)
    } else {
        url.to_string()
    }
}

/// The local path a URL replicates to: the URL with the run's root prefix
/// stripped, rooted under `dir`.
///
/// URLs outside the root prefix (external links that passed the filters)
/// fall back to their own path component so they still land inside `dir`.
pub fn replicate_path(url: &str, root_url: &str, dir: &Path) -> PathBuf {
    let url = with_index_html(url);

    let relative = match url.strip_prefix(root_url) {
        Some(stripped) => stripped.to_string(),
        None => match host_prefix(&url) {
            Some(prefix) => url[prefix.len()..].to_string(),
            None => url.clone(),
        },
    };
    let relative = if relative.starts_with('/') {
        relative
    } else {
        format!("/{}", relative)
    };

    PathBuf::from(clean_url(&format!("{}{}", dir.display(), relative)))
}

/// The local path a URL copies to: just its basename under `dir`.
pub fn copy_path(url: &str, dir: &Path) -> PathBuf {
    let url = with_index_html(url);
    let basename = url.rsplit('/').next().unwrap_or(&url);
    dir.join(basename)
}

/// Persist `bytes` at `path` unless a file is already there
/// (first-writer-wins). Parent directories are created as needed. Returns
/// whether the file was written.
pub fn write_once(path: &Path, bytes: &[u8]) -> io::Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;
    Ok(true)
}
