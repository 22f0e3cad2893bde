//! Path pattern matching logic.
//!
//! # Responsibilities
//! - Parse declared path patterns (`/workouts/{id}/likes`) into segments
//! - Match request segments against a pattern (exact length, literal equality)
//! - Capture variable segments as path parameters
//! - Detect overlapping patterns at table construction
//!
//! # Design Decisions
//! - Literal matching is case-sensitive
//! - Segment count must match exactly (no trailing wildcard)
//! - Variable segments accept any non-empty string; identifier validation
//!   belongs to the resource operation
//! - No regex to guarantee O(n) matching

use std::fmt;

use super::RouteTableError;

/// One segment of a declared path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSegment {
    /// Must equal the request segment exactly.
    Literal(&'static str),
    /// Captures the request segment under the given name.
    Param(&'static str),
}

impl PatternSegment {
    fn parse(raw: &'static str) -> Self {
        match raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(name) => PatternSegment::Param(name),
            None => PatternSegment::Literal(raw),
        }
    }

    fn is_literal(&self) -> bool {
        matches!(self, PatternSegment::Literal(_))
    }
}

/// A parsed, immutable path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    source: &'static str,
    segments: Vec<PatternSegment>,
}

impl PathPattern {
    /// Parse a pattern such as `/workouts/{id}/images/{imageId}`.
    ///
    /// The first segment must be a literal; it names the resource family.
    pub fn parse(source: &'static str) -> Result<Self, RouteTableError> {
        let segments: Vec<PatternSegment> = source
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .map(PatternSegment::parse)
            .collect();

        match segments.first() {
            None => return Err(RouteTableError::EmptyPattern),
            Some(PatternSegment::Param(_)) => {
                return Err(RouteTableError::VariableFamily(source));
            }
            Some(PatternSegment::Literal(_)) => {}
        }

        for segment in &segments {
            if let PatternSegment::Param(name) = segment {
                if name.is_empty() {
                    return Err(RouteTableError::UnnamedParam(source));
                }
            }
        }

        Ok(Self { source, segments })
    }

    /// The family name (first literal segment).
    pub fn family(&self) -> &'static str {
        match self.segments.first() {
            Some(PatternSegment::Literal(name)) => *name,
            // parse() rejects patterns without a leading literal
            _ => "",
        }
    }

    /// Number of segments a request path must have to match.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false for a parsed pattern; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// True when the pattern has no variable segments.
    pub fn is_exact(&self) -> bool {
        self.segments.iter().all(PatternSegment::is_literal)
    }

    /// The declared pattern text.
    pub fn as_str(&self) -> &'static str {
        self.source
    }

    /// Match request segments, capturing variables on success.
    pub fn match_segments(&self, request: &[&str]) -> Option<PathParams> {
        if request.len() != self.segments.len() {
            return None;
        }

        let mut params = PathParams::default();
        for (pattern, actual) in self.segments.iter().zip(request) {
            match pattern {
                PatternSegment::Literal(expected) => {
                    if expected != actual {
                        return None;
                    }
                }
                PatternSegment::Param(name) => params.push(*name, actual),
            }
        }
        Some(params)
    }

    /// Whether some request path could match both patterns.
    pub fn overlaps(&self, other: &PathPattern) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|pair| match pair {
                    (PatternSegment::Literal(a), PatternSegment::Literal(b)) => a == b,
                    _ => true,
                })
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.source)
    }
}

/// Variable segments captured from a matched path, in path order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    values: Vec<(&'static str, String)>,
}

impl PathParams {
    fn push(&mut self, name: &'static str, value: &str) {
        self.values.push((name, value.to_string()));
    }

    /// Look up a captured segment by its declared name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Iterate `(name, value)` pairs in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.values.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pattern() {
        let pattern = PathPattern::parse("/workouts/{id}/images/{imageId}").unwrap();
        assert_eq!(pattern.family(), "workouts");
        assert_eq!(pattern.len(), 4);
        assert!(!pattern.is_exact());
        assert!(PathPattern::parse("/auth/login").unwrap().is_exact());
    }

    #[test]
    fn test_parse_rejects_bad_patterns() {
        assert_eq!(PathPattern::parse("/"), Err(RouteTableError::EmptyPattern));
        assert_eq!(
            PathPattern::parse("/{id}/likes"),
            Err(RouteTableError::VariableFamily("/{id}/likes"))
        );
        assert_eq!(
            PathPattern::parse("/workouts/{}"),
            Err(RouteTableError::UnnamedParam("/workouts/{}"))
        );
    }

    #[test]
    fn test_match_captures_params() {
        let pattern = PathPattern::parse("/workouts/{id}/images/{imageId}").unwrap();
        let params = pattern
            .match_segments(&["workouts", "w-1", "images", "i-9"])
            .unwrap();
        assert_eq!(params.get("id"), Some("w-1"));
        assert_eq!(params.get("imageId"), Some("i-9"));
        assert_eq!(params.get("missing"), None);
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_match_requires_exact_length() {
        let pattern = PathPattern::parse("/workouts/{id}").unwrap();
        assert!(pattern.match_segments(&["workouts"]).is_none());
        assert!(pattern.match_segments(&["workouts", "1", "likes"]).is_none());
        assert!(pattern.match_segments(&["workouts", "1"]).is_some());
    }

    #[test]
    fn test_match_literals_case_sensitive() {
        let pattern = PathPattern::parse("/workouts/{id}/likes").unwrap();
        assert!(pattern.match_segments(&["workouts", "1", "Likes"]).is_none());
        assert!(pattern.match_segments(&["Workouts", "1", "likes"]).is_none());
    }

    #[test]
    fn test_overlaps() {
        let a = PathPattern::parse("/users/{id}/followers").unwrap();
        let b = PathPattern::parse("/users/{id}/following").unwrap();
        let c = PathPattern::parse("/users/{userId}/{relation}").unwrap();
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(b.overlaps(&c));
        assert!(!a.overlaps(&PathPattern::parse("/users/{id}").unwrap()));
    }
}
