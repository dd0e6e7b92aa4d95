//! Resolution of media paths against the configured backend origin.
//!
//! The backend is inconsistent about how it references media: payloads can
//! carry absolute URLs, origin-relative paths with or without a leading
//! slash, bare file names, or even URLs pointing at a development host.
//! Everything is normalized here so display code only ever sees full URLs.

use std::sync::LazyLock;

use regex::Regex;

// Matches the path following the port of a development URL such as
// "http://localhost:8000/media/x.jpg".
static DEV_HOST_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":\d+(/.+)").expect("invalid dev host regex"));

/// Resolves relative media paths against a fixed backend origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaResolver {
    origin: String,
}

impl MediaResolver {
    /// Creates a resolver for the given origin, e.g. `https://backend.example`.
    /// A trailing slash on the origin is ignored.
    pub fn new(origin: &str) -> Self {
        Self {
            origin: origin.trim_end_matches('/').to_string(),
        }
    }

    /// Resolves a media path to a full URL.
    ///
    /// - An empty path stays empty; the caller renders a placeholder.
    /// - URLs pointing at a development host are rewritten to the origin,
    ///   keeping the path after the port.
    /// - Absolute URLs pass through unchanged.
    /// - Relative paths are joined to the origin with exactly one slash;
    ///   paths that do not name a known prefix are assumed to live under
    ///   `/media/`.
    pub fn resolve(&self, path: &str) -> String {
        if path.is_empty() {
            return String::new();
        }

        if path.contains("localhost") || path.contains("127.0.0.1") {
            if let Some(captures) = DEV_HOST_PATH.captures(path) {
                return format!("{}{}", self.origin, &captures[1]);
            }
        }

        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        if let Some(stripped) = path.strip_prefix('/') {
            return format!("{}/{}", self.origin, stripped);
        }

        if path.starts_with("media/") {
            return format!("{}/{}", self.origin, path);
        }

        format!("{}/media/{}", self.origin, path)
    }
}
