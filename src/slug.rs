//! Filesystem-safe names derived from URLs.
//!
//! Hostname and path are flattened into one token where every character outside
//! `[A-Za-z0-9]` becomes `-`. The mapping is lossy: `/a.b/c` and `/a/b/c` share a slug.

use url::Url;

const SEPARATOR: char = '-';
const DEFAULT_EXTENSION: &str = ".html";
const DIR_SUFFIX: &str = "_files";

fn slugify(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { SEPARATOR })
        .collect()
}

fn host_and_path(host: &str, path: &str) -> String {
    // Only a root path ("/" or "") collapses to the bare hostname; "/blog/" keeps its slash.
    if path.is_empty() || path == "/" {
        return host.to_string();
    }
    format!("{}{}", host, path)
}

/// Extension of the last path segment including the dot, e.g. `.css`.
///
/// Dotfiles (`/.env`) and trailing dots (`/file.`) carry no extension, and neither does
/// anything that would not survive as a filename suffix on its own.
fn path_extension(path: &str) -> Option<&str> {
    let segment = path.rsplit('/').next().unwrap_or("");
    let dot = segment.rfind('.')?;
    if dot == 0 {
        return None;
    }
    let extension = &segment[dot..];
    if extension.len() > 1 && extension[1..].chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(extension)
    } else {
        None
    }
}

/// Slug of hostname + path, e.g. `https://example.com/a/b.css` -> `example-com-a-b-css`.
pub fn slugify_url(url: &Url) -> String {
    slugify(&host_and_path(url.host_str().unwrap_or(""), url.path()))
}

/// Local file name for a URL: slug of hostname + path without extension, then the
/// original extension, or `.html` when the path has none.
pub fn slugify_file_name(url: &Url) -> String {
    let path = url.path();
    match path_extension(path) {
        Some(extension) => {
            let stem = &path[..path.len() - extension.len()];
            let base = slugify(&host_and_path(url.host_str().unwrap_or(""), stem));
            format!("{}{}", base, extension)
        }
        None => format!("{}{}", slugify_url(url), DEFAULT_EXTENSION),
    }
}

/// Directory holding a page's assets: the full slug (extension included) plus `_files`.
pub fn slugify_dir_name(url: &Url) -> String {
    format!("{}{}", slugify_url(url), DIR_SUFFIX)
}
