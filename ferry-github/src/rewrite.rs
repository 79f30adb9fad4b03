//! Cross-reference rewriting
//!
//! Finds `#123` and `.../issues/123` references in free text and points them
//! at the issue's new home. This is a pattern match over plain text, not a
//! markdown parser: references inside code blocks are rewritten too.
//!
//! A reference is in scope when its marker is a bare `#` or the marker text
//! contains the source repository name. The name test is a substring test,
//! so a URL into another repository whose name contains the source name is
//! also treated as in scope.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::mapping::IdentifierMapping;

/// A reference marker followed by an issue number
const REFERENCE_PATTERN: &str = r"(\s#|\S+/issues/)(\d+)";

fn reference_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(REFERENCE_PATTERN).expect("reference pattern is valid"))
}

/// What to do with an in-scope reference that has no mapping entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmappedPolicy {
    /// Replace with a link into the source repository
    RedirectToSource,
    /// Leave the text as written
    Keep,
}

/// Rewrites references using one mapping
#[derive(Debug, Clone)]
pub struct ReferenceRewriter<'a> {
    mapping: &'a IdentifierMapping,
    source_marker: String,
    source_issues_url: String,
    target_issues_url: String,
    unmapped: UnmappedPolicy,
}

impl<'a> ReferenceRewriter<'a> {
    /// `source_marker` is the token that identifies the source repository in
    /// URL references (its name). The two URLs are browser URLs of the issue
    /// lists, without a trailing slash.
    pub fn new(
        mapping: &'a IdentifierMapping,
        source_marker: impl Into<String>,
        source_issues_url: impl Into<String>,
        target_issues_url: impl Into<String>,
        unmapped: UnmappedPolicy,
    ) -> Self {
        Self {
            mapping,
            source_marker: source_marker.into(),
            source_issues_url: source_issues_url.into().trim_end_matches('/').to_string(),
            target_issues_url: target_issues_url.into().trim_end_matches('/').to_string(),
            unmapped,
        }
    }

    /// Rewrite every in-scope reference in one pass
    ///
    /// `current` is the source number of the issue the text belongs to;
    /// references to it are left alone since they normally come from the
    /// provenance footer added during the copy.
    pub fn rewrite(&self, text: &str, current: Option<u64>) -> String {
        reference_regex()
            .replace_all(text, |caps: &Captures<'_>| self.replacement(caps, current))
            .into_owned()
    }

    /// Like [`rewrite`](Self::rewrite), `None` when nothing changed
    pub fn rewrite_changed(&self, text: &str, current: Option<u64>) -> Option<String> {
        let rewritten = self.rewrite(text, current);
        (rewritten != text).then_some(rewritten)
    }

    fn replacement(&self, caps: &Captures<'_>, current: Option<u64>) -> String {
        let whole = &caps[0];
        let marker = &caps[1];

        if !self.in_scope(marker) {
            return whole.to_string();
        }

        // Digits too long for u64 cannot name an issue
        let Ok(number) = caps[2].parse::<u64>() else {
            return whole.to_string();
        };

        if current == Some(number) {
            return whole.to_string();
        }

        let url = match (self.mapping.get(number), self.unmapped) {
            (Some(target), _) => format!("{}/{}", self.target_issues_url, target),
            (None, UnmappedPolicy::RedirectToSource) => {
                format!("{}/{}", self.source_issues_url, number)
            }
            (None, UnmappedPolicy::Keep) => return whole.to_string(),
        };

        // Keep the whitespace that introduced a bare `#` reference
        match marker.strip_suffix('#') {
            Some(lead) if marker.trim() == "#" => format!("{}{}", lead, url),
            _ => url,
        }
    }

    fn in_scope(&self, marker: &str) -> bool {
        if marker.trim() == "#" {
            return true;
        }
        // Links already pointing at the target stay put, even when the
        // target's URL contains the source name
        let target_prefix = marker
            .strip_suffix('/')
            .is_some_and(|m| m.ends_with(self.target_issues_url.as_str()));
        !target_prefix
            && !self.source_marker.is_empty()
            && marker.contains(self.source_marker.as_str())
    }
}

/// Every issue number referenced in `text`, in scope or not, in order
pub fn referenced_numbers(text: &str) -> Vec<u64> {
    reference_regex()
        .captures_iter(text)
        .filter_map(|caps| caps[2].parse().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "https://github.com/acme/old/issues";
    const TARGET: &str = "https://github.com/acme/new/issues";

    fn mapping(pairs: &[(u64, u64)]) -> IdentifierMapping {
        let mut mapping = IdentifierMapping::new();
        for (s, t) in pairs {
            mapping.record(*s, *t);
        }
        mapping
    }

    fn rewriter(mapping: &IdentifierMapping, policy: UnmappedPolicy) -> ReferenceRewriter<'_> {
        ReferenceRewriter::new(mapping, "old", SOURCE, TARGET, policy)
    }

    #[test]
    fn test_mapped_and_excluded_references() {
        let mapping = mapping(&[(5, 9), (42, 10)]);
        let rewriter = rewriter(&mapping, UnmappedPolicy::RedirectToSource);

        let body = "Blocked by #17 and fixed together with #5.";
        assert_eq!(
            rewriter.rewrite(body, Some(42)),
            "Blocked by https://github.com/acme/old/issues/17 and fixed together with https://github.com/acme/new/issues/9."
        );
    }

    #[test]
    fn test_self_reference_is_left_alone() {
        let mapping = mapping(&[(42, 10)]);
        let rewriter = rewriter(&mapping, UnmappedPolicy::RedirectToSource);

        let body = "text\n\n_Original issue: https://github.com/acme/old/issues/42_";
        assert_eq!(rewriter.rewrite(body, Some(42)), body);
        // Without a current issue the same footer is rewritten
        assert_eq!(
            rewriter.rewrite(body, None),
            "text\n\n_Original issue: https://github.com/acme/new/issues/10_"
        );
    }

    #[test]
    fn test_url_reference_to_source_repo() {
        let mapping = mapping(&[(5, 9)]);
        let rewriter = rewriter(&mapping, UnmappedPolicy::RedirectToSource);

        assert_eq!(
            rewriter.rewrite("see https://github.com/acme/old/issues/5 please", None),
            "see https://github.com/acme/new/issues/9 please"
        );
    }

    #[test]
    fn test_other_repository_is_out_of_scope() {
        let mapping = mapping(&[(5, 9)]);
        let rewriter = rewriter(&mapping, UnmappedPolicy::RedirectToSource);

        let body = "upstream https://github.com/rust-lang/rust/issues/5";
        assert_eq!(rewriter.rewrite(body, None), body);
    }

    #[test]
    fn test_repository_name_substring_is_in_scope() {
        // "golden" contains "old"; the name test is a plain substring test
        let mapping = mapping(&[(5, 9)]);
        let rewriter = rewriter(&mapping, UnmappedPolicy::RedirectToSource);

        assert_eq!(
            rewriter.rewrite("https://github.com/acme/golden/issues/5", None),
            "https://github.com/acme/new/issues/9"
        );
    }

    #[test]
    fn test_hash_needs_leading_whitespace() {
        let mapping = mapping(&[(5, 9)]);
        let rewriter = rewriter(&mapping, UnmappedPolicy::RedirectToSource);

        assert_eq!(rewriter.rewrite("#5 at start", None), "#5 at start");
        assert_eq!(rewriter.rewrite("color:#5", None), "color:#5");
        assert_eq!(
            rewriter.rewrite("line\n#5", None),
            "line\nhttps://github.com/acme/new/issues/9"
        );
    }

    #[test]
    fn test_code_blocks_are_not_special() {
        let mapping = mapping(&[(5, 9)]);
        let rewriter = rewriter(&mapping, UnmappedPolicy::RedirectToSource);

        assert_eq!(
            rewriter.rewrite("```\nlet x = #5;\n```", None),
            "```\nlet x = https://github.com/acme/new/issues/9;\n```"
        );
    }

    #[test]
    fn test_repeated_references_all_rewritten() {
        let mapping = mapping(&[(5, 9), (6, 1)]);
        let rewriter = rewriter(&mapping, UnmappedPolicy::RedirectToSource);

        assert_eq!(
            rewriter.rewrite("a #5 b #6 c #5", None),
            "a https://github.com/acme/new/issues/9 b https://github.com/acme/new/issues/1 c https://github.com/acme/new/issues/9"
        );
    }

    #[test]
    fn test_no_references_is_unchanged() {
        let mapping = mapping(&[(5, 9)]);
        let rewriter = rewriter(&mapping, UnmappedPolicy::RedirectToSource);

        let body = "Nothing to see here, issue five is fine.";
        assert_eq!(rewriter.rewrite(body, Some(1)), body);
        assert_eq!(rewriter.rewrite_changed(body, Some(1)), None);
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let mapping = mapping(&[(5, 9), (42, 10)]);
        let rewriter = rewriter(&mapping, UnmappedPolicy::RedirectToSource);

        let body = "See #5, #17 and https://github.com/acme/old/issues/5.\n\n_Original issue: https://github.com/acme/old/issues/42_";
        let once = rewriter.rewrite(body, Some(42));
        let twice = rewriter.rewrite(&once, Some(42));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_same_repository_name_in_both_orgs() {
        let mapping = mapping(&[(5, 9), (9, 2)]);
        let rewriter = ReferenceRewriter::new(
            &mapping,
            "widgets",
            "https://github.com/acme/widgets/issues",
            "https://github.com/newco/widgets/issues",
            UnmappedPolicy::RedirectToSource,
        );

        let once = rewriter.rewrite("see #5 and #17", None);
        assert_eq!(
            once,
            "see https://github.com/newco/widgets/issues/9 and https://github.com/acme/widgets/issues/17"
        );
        assert_eq!(rewriter.rewrite(&once, None), once);

        // Source links are still rewritten
        assert_eq!(
            rewriter.rewrite("(https://github.com/acme/widgets/issues/9)", None),
            "(https://github.com/newco/widgets/issues/2)"
        );
    }

    #[test]
    fn test_keep_policy_leaves_unmapped() {
        let mapping = mapping(&[(5, 9)]);
        let rewriter = rewriter(&mapping, UnmappedPolicy::Keep);

        assert_eq!(
            rewriter.rewrite("see #5 and #17", None),
            "see https://github.com/acme/new/issues/9 and #17"
        );
    }

    #[test]
    fn test_huge_number_is_ignored() {
        let mapping = mapping(&[]);
        let rewriter = rewriter(&mapping, UnmappedPolicy::RedirectToSource);

        let body = "id #99999999999999999999999";
        assert_eq!(rewriter.rewrite(body, None), body);
    }

    #[test]
    fn test_referenced_numbers() {
        assert_eq!(
            referenced_numbers("a #1 b https://x/y/issues/22 #c"),
            vec![1, 22]
        );
    }
}
