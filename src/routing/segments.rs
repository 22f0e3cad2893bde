//! Request path decomposition.
//!
//! # Responsibilities
//! - Strip leading/trailing separators
//! - Split the remaining path into non-empty segments
//!
//! # Design Decisions
//! - Borrowed slices, no allocation beyond the segment vector
//! - Empty components (`//`) are dropped, so `/workouts//1` is two segments
//! - Percent-decoding is left to the resource operation

/// Path separator.
pub const SEPARATOR: char = '/';

/// The path with leading and trailing separators removed.
pub fn normalize(path: &str) -> &str {
    path.trim_matches(SEPARATOR)
}

/// Split a request path into its ordered, non-empty segments.
///
/// An empty path, or one made only of separators, yields zero segments.
pub fn segments(path: &str) -> Vec<&str> {
    normalize(path)
        .split(SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .collect()
}
