// src/urls.rs
// =============================================================================
// URL canonicalization.
//
// Every URL that enters the walker goes through clean_url() first. The
// cleaned string is used both for display and as the deduplication key, so
// two references to the same location must clean to the same string:
//   http://a.com//b///c      -> http://a.com/b/c
//   http://a.com/b/./../c    -> http://a.com/c
//
// The scheme, host and query string are never rewritten beyond dropping the
// query for dedup purposes; only the path slashes and dot segments are
// normalized.
// =============================================================================

/// Canonicalize a URL string.
///
/// Strips any `?...` query suffix, collapses runs of `/` in the path
/// (preserving the `scheme://` marker), and fully resolves `.` and `..`
/// segments, clamping at the root instead of erroring when `..` would pop
/// past it. A trailing `/` survives cleaning so directory URLs stay
/// distinguishable from files.
///
/// Pure and total: never fails, and cleaning an already-clean URL returns
/// the same string.
pub fn clean_url(url: &str) -> String {
    let path = url.split('?').next().unwrap_or(url);

    if let Some(pos) = path.find("://") {
        // Keep "scheme:/" as-is and normalize the rest, which starts with
        // the second slash of the marker.
        let (prefix, rest) = path.split_at(pos + 2);
        format!("{}{}", prefix, resolve_segments(rest))
    } else if path.starts_with('/') {
        resolve_segments(path)
    } else {
        // Anchor a relative path temporarily so segment resolution works,
        // then drop the anchor again.
        let resolved = resolve_segments(&format!("/{}", path));
        resolved[1..].to_string()
    }
}

/// Resolve the segments of an absolute path: drop empty (doubled-slash) and
/// `.` segments, pop one segment per `..` without going past the root.
fn resolve_segments(path: &str) -> String {
    let trailing_slash = path.len() > 1 && path.ends_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    let mut resolved = String::from("/");
    resolved.push_str(&segments.join("/"));
    if trailing_slash && !segments.is_empty() {
        resolved.push('/');
    }
    resolved
}

/// The scheme-and-host prefix of a URL: everything up to (excluding) the
/// first `/` after the `://` marker, or the first `/` when there is no
/// scheme. Returns `None` for URLs with no path separator at all.
pub fn host_prefix(url: &str) -> Option<&str> {
    let pos = match url.find("://") {
        Some(marker) => url[marker + 3..].find('/').map(|p| marker + 3 + p),
        None => url.find('/'),
    };
    pos.map(|p| &url[..p])
}

/// Join two path components with exactly one `/` between them, regardless
/// of whether either side already ends or begins with one.
pub fn path_join(part_a: &str, part_b: &str) -> String {
    match (part_a.ends_with('/'), part_b.starts_with('/')) {
        (true, true) => format!("{}{}", part_a, &part_b[1..]),
        (false, false) => format!("{}/{}", part_a, part_b),
        _ => format!("{}{}", part_a, part_b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_doubled_slashes() {
        assert_eq!(clean_url("http://a.com//b///c"), "http://a.com/b/c");
    }

    #[test]
    fn test_clean_is_idempotent() {
        for input in [
            "http://a.com//b///c",
            "https://a.com/b/../c/./d",
            "/a//b/../c",
            "a/b//c",
            "http://a.com/dir/",
        ] {
            let once = clean_url(input);
            assert_eq!(clean_url(&once), once, "not idempotent for {}", input);
        }
    }

    #[test]
    fn test_resolves_dot_segments() {
        assert_eq!(clean_url("http://a.com/b/./c"), "http://a.com/b/c");
        assert_eq!(clean_url("http://a.com/b/../c"), "http://a.com/c");
        assert_eq!(clean_url("/a/b/c/d/../e//f/g"), "/a/b/c/e/f/g");
    }

    #[test]
    fn test_dotdot_clamps_at_root() {
        assert_eq!(clean_url("/../../x"), "/x");
        assert_eq!(clean_url("http://a.com/../../.."), "http://");
    }

    #[test]
    fn test_strips_query_string() {
        assert_eq!(clean_url("http://a.com/b?x=1&y=2"), "http://a.com/b");
    }

    #[test]
    fn test_preserves_trailing_slash() {
        assert_eq!(clean_url("http://a.com/dir/"), "http://a.com/dir/");
        assert_eq!(clean_url("http://a.com/dir//"), "http://a.com/dir/");
    }

    #[test]
    fn test_relative_path_stays_relative() {
        assert_eq!(clean_url("a/b//c//d/../e"), "a/b/c/e");
    }

    #[test]
    fn test_host_prefix() {
        assert_eq!(host_prefix("http://a.com/x/y"), Some("http://a.com"));
        assert_eq!(host_prefix("a.com/x/y"), Some("a.com"));
        assert_eq!(host_prefix("http://a.com"), None);
    }

    #[test]
    fn test_path_join_single_separator() {
        assert_eq!(path_join("a/", "/b"), "a/b");
        assert_eq!(path_join("a/", "b"), "a/b");
        assert_eq!(path_join("a", "/b"), "a/b");
        assert_eq!(path_join("a", "b"), "a/b");
    }
}
