//! URL include/exclude rules for crawl control.
//!
//! A pattern is classified once when loaded: plain strings become
//! substring tests, strings containing `*` or `?` compile to an anchored
//! glob. Rules are collected into an include set (whitelist, optional)
//! and an exclude set (blacklist), with exclusion always winning so a
//! URL explicitly blocked is never crawled even if also whitelisted.
//!
//! # Example
//!
//! ```rust
//! use webtome_core::pattern::CrawlRules;
//!
//! let rules = CrawlRules::new(vec!["*/docs/*"], vec!["*login*"]);
//! assert!(rules.is_allowed("https://example.com/docs/intro"));
//! assert!(!rules.is_allowed("https://example.com/docs/login"));
//! ```

use std::fs;
use std::path::Path;

use regex::Regex;

use crate::{Result, WebtomeError};

/// A single URL pattern, classified at load time.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// No wildcards: case-sensitive substring containment against the raw URL.
    Substring(String),
    /// Wildcard pattern compiled to an anchored regex: `*` matches any
    /// run of characters, `?` matches exactly one.
    Glob(Regex),
}

impl Pattern {
    /// Classifies and compiles a raw pattern string.
    pub fn new(raw: &str) -> Self {
        if raw.contains('*') || raw.contains('?') {
            Self::Glob(compile_glob(raw))
        } else {
            Self::Substring(raw.to_string())
        }
    }

    /// Tests a URL against this pattern.
    ///
    /// Substring patterns match anywhere in the URL; glob patterns are
    /// anchored to the whole URL. Matching is case-sensitive and applies
    /// to the raw URL string, never a normalized or decoded form.
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Substring(needle) => url.contains(needle.as_str()),
            Self::Glob(re) => re.is_match(url),
        }
    }
}

/// Translates a glob into an anchored regex.
///
/// Everything except `*` and `?` is escaped literally, so URL
/// metacharacters like `.` never widen the match.
fn compile_glob(pattern: &str) -> Regex {
    let mut source = String::with_capacity(pattern.len() + 8);
    source.push('^');
    for ch in pattern.chars() {
        match ch {
            '*' => source.push_str(".*"),
            '?' => source.push('.'),
            _ => source.push_str(&regex::escape(&ch.to_string())),
        }
    }
    source.push('$');

    // Escaped literals plus `.*`/`.` always form a valid expression.
    Regex::new(&source).unwrap_or_else(|_| Regex::new("^$").unwrap())
}

/// Ordered include and exclude rule sets for one crawl.
///
/// Loaded once before the crawl starts and immutable afterwards.
#[derive(Debug, Clone, Default)]
pub struct CrawlRules {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl CrawlRules {
    /// Builds rules from raw pattern strings.
    pub fn new<I, S>(include: I, exclude: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            include: include.into_iter().map(|p| Pattern::new(p.as_ref())).collect(),
            exclude: exclude.into_iter().map(|p| Pattern::new(p.as_ref())).collect(),
        }
    }

    /// Builds rules from command-line patterns plus optional pattern files.
    ///
    /// Pattern files are UTF-8 text with one pattern per line; blank
    /// lines and lines starting with `#` are ignored.
    pub fn load(
        include: &[String], include_file: Option<&Path>, exclude: &[String], exclude_file: Option<&Path>,
    ) -> Result<Self> {
        let mut include: Vec<String> = include.to_vec();
        if let Some(path) = include_file {
            include.extend(read_pattern_file(path)?);
        }

        let mut exclude: Vec<String> = exclude.to_vec();
        if let Some(path) = exclude_file {
            exclude.extend(read_pattern_file(path)?);
        }

        Ok(Self::new(include, exclude))
    }

    /// True when no include and no exclude rules are present.
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    /// Number of include rules.
    pub fn include_count(&self) -> usize {
        self.include.len()
    }

    /// Number of exclude rules.
    pub fn exclude_count(&self) -> usize {
        self.exclude.len()
    }

    /// Decides whether a URL may be crawled.
    ///
    /// Any exclude match rejects, regardless of include rules. With a
    /// non-empty include set, at least one include rule must match.
    /// With no include rules, everything not excluded is allowed.
    pub fn is_allowed(&self, url: &str) -> bool {
        if self.exclude.iter().any(|p| p.matches(url)) {
            return false;
        }
        if self.include.is_empty() {
            return true;
        }
        self.include.iter().any(|p| p.matches(url))
    }
}

/// Reads a pattern file, skipping blank lines and `#` comments.
fn read_pattern_file(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(WebtomeError::FileNotFound(path.to_path_buf()));
    }
    let contents = fs::read_to_string(path)?;

    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    #[rstest]
    #[case("https://a.com/x", "x", true)]
    #[case("https://a.com/x", "y", false)]
    #[case("https://a.com/x", "*", true)]
    #[case("https://a.com/x/y", "*/x/*", true)]
    #[case("https://a.com/xy", "*/x/*", false)]
    #[case("https://a.com/page1", "*/page?", true)]
    #[case("https://a.com/page12", "*/page?", false)]
    #[case("https://a.com/X", "x", false)]
    fn test_pattern_matching(#[case] url: &str, #[case] pattern: &str, #[case] expected: bool) {
        assert_eq!(Pattern::new(pattern).matches(url), expected);
    }

    #[test]
    fn test_glob_dot_is_literal() {
        // A dot in the pattern must not act as a regex wildcard.
        let pattern = Pattern::new("*.example.com/*");
        assert!(pattern.matches("https://www.example.com/page"));
        assert!(!pattern.matches("https://wwwXexampleYcom/page"));
    }

    #[test]
    fn test_wildcard_matches_any_url() {
        let pattern = Pattern::new("*");
        assert!(pattern.matches("https://anything.example/whatsoever"));
        assert!(pattern.matches("x"));
    }

    #[test]
    fn test_exclusion_wins_over_inclusion() {
        let rules = CrawlRules::new(vec!["*chapter*"], vec!["*chapter-13*"]);
        assert!(rules.is_allowed("https://a.com/chapter-1"));
        assert!(!rules.is_allowed("https://a.com/chapter-13"));
    }

    #[test]
    fn test_include_set_acts_as_whitelist() {
        let rules = CrawlRules::new(vec!["*/docs/*"], Vec::<&str>::new());
        assert!(rules.is_allowed("https://a.com/docs/intro"));
        assert!(!rules.is_allowed("https://a.com/blog/post"));
    }

    #[test]
    fn test_no_rules_allows_everything() {
        let rules = CrawlRules::default();
        assert!(rules.is_empty());
        assert!(rules.is_allowed("https://a.com/anything"));
    }

    #[test]
    fn test_exclude_without_includes() {
        let rules = CrawlRules::new(Vec::<&str>::new(), vec!["*login*"]);
        assert!(!rules.is_allowed("https://a.com/login"));
        assert!(rules.is_allowed("https://a.com/chapter-2"));
    }

    #[test]
    fn test_load_pattern_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# blocked sections").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "*login*").unwrap();
        writeln!(file, "/admin").unwrap();

        let rules = CrawlRules::load(&[], None, &[], Some(file.path())).unwrap();
        assert_eq!(rules.exclude_count(), 2);
        assert!(!rules.is_allowed("https://a.com/login"));
        assert!(!rules.is_allowed("https://a.com/admin/panel"));
        assert!(rules.is_allowed("https://a.com/post"));
    }

    #[test]
    fn test_load_missing_pattern_file() {
        let result = CrawlRules::load(&[], Some(Path::new("/nonexistent/patterns.txt")), &[], None);
        assert!(matches!(result, Err(WebtomeError::FileNotFound(_))));
    }
}
