use std::fmt;

/// Selection rule applied to every enumerated file.
///
/// Despite the names, both variants test for the pattern anywhere in the
/// full path string: case-sensitive, no wildcards, no anchoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchRule {
    Prefix(String),
    Extension(String),
}

impl MatchRule {
    pub fn pattern(&self) -> &str {
        match self {
            MatchRule::Prefix(pattern) | MatchRule::Extension(pattern) => pattern,
        }
    }

    /// A rule with an empty pattern is disabled
    pub fn is_active(&self) -> bool {
        !self.pattern().is_empty()
    }

    /// Pure function
    pub fn matches(&self, path: &str) -> bool {
        self.is_active() && path.contains(self.pattern())
    }
}

impl fmt::Display for MatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchRule::Prefix(pattern) => write!(f, "prefix {:?}", pattern),
            MatchRule::Extension(pattern) => write!(f, "extension {:?}", pattern),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_matches_anywhere_in_path() {
        let rule = MatchRule::Prefix("abc".to_string());
        assert!(rule.matches("/data/in/abc_report.txt"));
        assert!(rule.matches("/data/in/report_abc.txt"));
        assert!(rule.matches("/abc/nested/file.bin"));
        assert!(!rule.matches("/data/in/report_ab.txt"));
    }

    #[test]
    fn test_extension_is_not_anchored_to_the_end() {
        let rule = MatchRule::Extension(".txt".to_string());
        assert!(rule.matches("/data/in/notes.txt"));
        assert!(rule.matches("/data/in/notes.txt.bak"));
        assert!(rule.matches("/data/.txt-archive/image.png"));
        assert!(!rule.matches("/data/in/notes.md"));
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let rule = MatchRule::Extension(".TXT".to_string());
        assert!(!rule.matches("/data/in/notes.txt"));
    }

    #[test]
    fn test_pattern_is_literal() {
        let rule = MatchRule::Prefix("a.c".to_string());
        assert!(!rule.matches("/data/abc"));
        assert!(rule.matches("/data/a.c"));

        let rule = MatchRule::Extension("*.txt".to_string());
        assert!(!rule.matches("/data/notes.txt"));
    }

    #[test]
    fn test_inactive_rule_never_matches() {
        let rule = MatchRule::Prefix(String::new());
        assert!(!rule.is_active());
        assert!(!rule.matches("/anything"));
    }

    #[test]
    fn test_substring_property_over_all_slices() {
        let path = "/srv/in/2024/report_abc.txt";
        for start in 0..path.len() {
            for end in start + 1..=path.len() {
                let rule = MatchRule::Prefix(path[start..end].to_string());
                assert!(rule.matches(path), "{:?} should match", &path[start..end]);
            }
        }
        assert!(!MatchRule::Prefix("report_abd".to_string()).matches(path));
    }
}
