//! Ant-style path patterns.
//!
//! `**` matches zero or more path segments, `*` matches any run of characters
//! inside one segment and `?` matches exactly one character. Empty segments are
//! ignored on both sides, so `/a//b` and `/a/b` are the same path. A trailing
//! slash must agree between pattern and path unless the pattern ends in `**`.

use std::cmp::{Ordering, Reverse};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Matches one segment exactly
    Literal(String),
    /// Matches one segment containing `*` or `?` wildcards
    Glob(String),
    /// `**`
    AnyDepth,
}

impl Segment {
    fn parse(raw: &str) -> Self {
        if raw == "**" {
            Segment::AnyDepth
        } else if raw.contains(['*', '?']) {
            Segment::Glob(raw.to_string())
        } else {
            Segment::Literal(raw.to_string())
        }
    }

    fn matches(&self, segment: &str) -> bool {
        match self {
            Segment::Literal(literal) => literal == segment,
            Segment::Glob(glob) => glob_match(glob.as_bytes(), segment.as_bytes()),
            Segment::AnyDepth => true,
        }
    }
}

/// A compiled path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Compile a pattern such as `/api/v1/employee/**`.
    pub fn new(raw: &str) -> Self {
        let mut segments: Vec<Segment> = Vec::new();
        for part in raw.split('/').filter(|s| !s.is_empty()) {
            let segment = Segment::parse(part);
            // Adjacent `**` are equivalent to one.
            if segment == Segment::AnyDepth && segments.last() == Some(&Segment::AnyDepth) {
                continue;
            }
            segments.push(segment);
        }

        Self {
            raw: raw.to_string(),
            segments,
        }
    }

    /// The pattern as written in configuration.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Check whether a request path matches this pattern.
    pub fn matches(&self, path: &str) -> bool {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if !match_segments(&self.segments, &parts) {
            return false;
        }

        self.segments.last() == Some(&Segment::AnyDepth)
            || self.raw.ends_with('/') == path.ends_with('/')
    }

    fn count(&self, predicate: impl Fn(&Segment) -> bool) -> usize {
        self.segments.iter().filter(|s| predicate(s)).count()
    }

    /// Ordering used to pick between several matching patterns: the most
    /// specific pattern sorts first.
    pub fn specificity_cmp(&self, other: &Self) -> Ordering {
        let key = |p: &Self| {
            (
                Reverse(p.count(|s| matches!(s, Segment::Literal(_)))),
                p.count(|s| matches!(s, Segment::AnyDepth)),
                p.count(|s| matches!(s, Segment::Glob(_))),
                Reverse(p.raw.len()),
            )
        };
        key(self)
            .cmp(&key(other))
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn match_segments(pattern: &[Segment], path: &[&str]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((Segment::AnyDepth, rest)) => {
            (0..=path.len()).any(|skip| match_segments(rest, &path[skip..]))
        }
        Some((segment, rest)) => match path.split_first() {
            Some((head, tail)) => segment.matches(head) && match_segments(rest, tail),
            None => false,
        },
    }
}

/// Single-segment glob match with `*` and `?`.
fn glob_match(pattern: &[u8], text: &[u8]) -> bool {
    let (mut p, mut t) = (0, 0);
    let mut star: Option<usize> = None;
    let mut star_t = 0;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == b'?' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if p < pattern.len() && pattern[p] == b'*' {
            star = Some(p);
            star_t = t;
            p += 1;
        } else if let Some(star_p) = star {
            p = star_p + 1;
            star_t += 1;
            t = star_t;
        } else {
            return false;
        }
    }

    while p < pattern.len() && pattern[p] == b'*' {
        p += 1;
    }
    p == pattern.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_depth_matches_prefix_and_descendants() {
        let pattern = PathPattern::new("/api/v1/employee/**");
        assert!(pattern.matches("/api/v1/employee"));
        assert!(pattern.matches("/api/v1/employee/"));
        assert!(pattern.matches("/api/v1/employee/test-id"));
        assert!(pattern.matches("/api/v1/employee/search/bob"));
        assert!(!pattern.matches("/api/v1/employees"));
        assert!(!pattern.matches("/api/v1/other-endpoint"));
        assert!(!pattern.matches("/api/v1"));
    }

    #[test]
    fn test_single_star_is_one_segment() {
        let pattern = PathPattern::new("/api/*/employee");
        assert!(pattern.matches("/api/v1/employee"));
        assert!(pattern.matches("/api/v2/employee"));
        assert!(!pattern.matches("/api/employee"));
        assert!(!pattern.matches("/api/v1/x/employee"));
    }

    #[test]
    fn test_any_depth_in_the_middle() {
        let pattern = PathPattern::new("/api/**/status");
        assert!(pattern.matches("/api/status"));
        assert!(pattern.matches("/api/v1/admin/status"));
        assert!(!pattern.matches("/api/v1/admin/stats"));
    }

    #[test]
    fn test_glob_within_segment() {
        let pattern = PathPattern::new("/files/*.json");
        assert!(pattern.matches("/files/a.json"));
        assert!(pattern.matches("/files/.json"));
        assert!(!pattern.matches("/files/a.yaml"));
        assert!(!pattern.matches("/files/dir/a.json"));

        let pattern = PathPattern::new("/v?/items");
        assert!(pattern.matches("/v1/items"));
        assert!(!pattern.matches("/v10/items"));
    }

    #[test]
    fn test_literal_pattern() {
        let pattern = PathPattern::new("/health");
        assert!(pattern.matches("/health"));
        assert!(pattern.matches("//health"));
        assert!(!pattern.matches("/health/live"));
        assert!(!pattern.matches("/"));
    }

    #[test]
    fn test_trailing_slash_must_agree() {
        let pattern = PathPattern::new("/health");
        assert!(!pattern.matches("/health/"));

        let pattern = PathPattern::new("/health/");
        assert!(pattern.matches("/health/"));
        assert!(!pattern.matches("/health"));

        let pattern = PathPattern::new("/api/*");
        assert!(pattern.matches("/api/v1"));
        assert!(!pattern.matches("/api/v1/"));

        let pattern = PathPattern::new("/api/**");
        assert!(pattern.matches("/api/v1/"));
        assert!(pattern.matches("/api/"));
    }

    #[test]
    fn test_catch_all() {
        let pattern = PathPattern::new("/**");
        assert!(pattern.matches("/"));
        assert!(pattern.matches("/anything/at/all"));
    }

    #[test]
    fn test_specificity_order() {
        let mut patterns: Vec<PathPattern> = ["/**", "/api/**", "/api/v1/employee/**", "/api/*/employee/**"]
            .iter()
            .map(|p| PathPattern::new(p))
            .collect();
        patterns.sort_by(|a, b| a.specificity_cmp(b));

        let order: Vec<&str> = patterns.iter().map(|p| p.as_str()).collect();
        assert_eq!(
            order,
            vec!["/api/v1/employee/**", "/api/*/employee/**", "/api/**", "/**"]
        );
    }
}
