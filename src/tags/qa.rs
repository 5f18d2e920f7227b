//! Placeholder QA for translated text.
//!
//! Compares the placeholders of a translation against its source so a
//! reviewer can be warned about lost, invented or broken markup before the
//! document is exported. Issues never block export; restoration handles
//! whatever the translation contains.
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::placeholder::{Placeholder, placeholders};

/// How serious a placeholder issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Type of placeholder issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagIssueKind {
    /// A source placeholder is absent (or appears fewer times) in the target
    Missing,
    /// The target has a placeholder the source does not
    Unexpected,
    /// A placeholder appears more often in the target than in the source
    Duplicated,
    /// Placeholders shared by both texts appear in a different order
    OutOfOrder,
    /// A paired placeholder is not properly opened, closed or nested
    Unbalanced,
}

impl TagIssueKind {
    /// Severity attached to this kind of issue.
    pub fn severity(self) -> Severity {
        match self {
            TagIssueKind::Duplicated | TagIssueKind::OutOfOrder => Severity::Warning,
            TagIssueKind::Missing | TagIssueKind::Unexpected | TagIssueKind::Unbalanced => {
                Severity::Error
            },
        }
    }
}

/// A single placeholder issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagIssue {
    pub severity: Severity,
    pub kind: TagIssueKind,
    /// The placeholder as written, e.g. `{/2}`
    pub placeholder: String,
    pub message: String,
}

impl TagIssue {
    fn new(kind: TagIssueKind, placeholder: &str, message: String) -> Self {
        Self {
            severity: kind.severity(),
            kind,
            placeholder: placeholder.to_string(),
            message,
        }
    }
}

/// Check whether any issue is an error.
pub fn has_errors(issues: &[TagIssue]) -> bool {
    issues.iter().any(|i| i.severity == Severity::Error)
}

/// Compare the placeholders of a target text against its source text.
///
/// # Examples
///
/// ```rust
/// use longan::tags::qa::{compare_tags, TagIssueKind};
///
/// let issues = compare_tags("Open {1}file{/1}{2/}", "Ouvrir {1}fichier");
/// let kinds: Vec<_> = issues.iter().map(|i| i.kind).collect();
/// assert!(kinds.contains(&TagIssueKind::Missing));
/// assert!(kinds.contains(&TagIssueKind::Unbalanced));
/// ```
pub fn compare_tags(source: &str, target: &str) -> Vec<TagIssue> {
    let src = placeholders(source);
    let tgt = placeholders(target);
    let mut issues = Vec::new();

    let src_counts = count(&src);
    let tgt_counts = count(&tgt);

    for raw in distinct(&src) {
        let expected = src_counts.get(raw).copied().unwrap_or(0);
        let found = tgt_counts.get(raw).copied().unwrap_or(0);
        if found < expected {
            issues.push(TagIssue::new(
                TagIssueKind::Missing,
                raw,
                format!(
                    "{} appears {} time(s) in the source but {} in the target",
                    raw, expected, found
                ),
            ));
        } else if found > expected {
            issues.push(TagIssue::new(
                TagIssueKind::Duplicated,
                raw,
                format!(
                    "{} appears {} time(s) in the target but {} in the source",
                    raw, found, expected
                ),
            ));
        }
    }

    for raw in distinct(&tgt) {
        if !src_counts.contains_key(raw) {
            issues.push(TagIssue::new(
                TagIssueKind::Unexpected,
                raw,
                format!("{} does not appear in the source", raw),
            ));
        }
    }

    let src_order: Vec<&str> = distinct(&src)
        .into_iter()
        .filter(|raw| tgt_counts.contains_key(raw))
        .collect();
    let tgt_order: Vec<&str> = distinct(&tgt)
        .into_iter()
        .filter(|raw| src_counts.contains_key(raw))
        .collect();
    if let Some((expected, found)) = src_order.iter().zip(&tgt_order).find(|(a, b)| a != b) {
        issues.push(TagIssue::new(
            TagIssueKind::OutOfOrder,
            found,
            format!("{} found where {} was expected", found, expected),
        ));
    }

    check_balance(&tgt, &mut issues);

    if !issues.is_empty() {
        log::debug!("placeholder check found {} issue(s)", issues.len());
    }
    issues
}

fn check_balance(tokens: &[(Placeholder, &str)], issues: &mut Vec<TagIssue>) {
    let mut open: Vec<(usize, &str)> = Vec::new();

    for &(ph, raw) in tokens {
        match ph {
            Placeholder::Open(n) => open.push((n, raw)),
            Placeholder::Close(n) => match open.iter().rposition(|(m, _)| *m == n) {
                Some(pos) if pos + 1 == open.len() => {
                    open.pop();
                },
                Some(pos) => {
                    let (_, inner) = open[open.len() - 1];
                    issues.push(TagIssue::new(
                        TagIssueKind::Unbalanced,
                        raw,
                        format!("{} closes before {} is closed", raw, inner),
                    ));
                    open.remove(pos);
                },
                None => issues.push(TagIssue::new(
                    TagIssueKind::Unbalanced,
                    raw,
                    format!("{} has no opening placeholder", raw),
                )),
            },
            Placeholder::Standalone(_) => {},
        }
    }

    for (_, raw) in open {
        issues.push(TagIssue::new(
            TagIssueKind::Unbalanced,
            raw,
            format!("{} is never closed", raw),
        ));
    }
}

fn count<'a>(tokens: &[(Placeholder, &'a str)]) -> HashMap<&'a str, usize> {
    let mut counts = HashMap::new();
    for &(_, raw) in tokens {
        *counts.entry(raw).or_insert(0) += 1;
    }
    counts
}

fn distinct<'a>(tokens: &[(Placeholder, &'a str)]) -> Vec<&'a str> {
    let mut seen = Vec::new();
    for &(_, raw) in tokens {
        if !seen.contains(&raw) {
            seen.push(raw);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(issues: &[TagIssue]) -> Vec<TagIssueKind> {
        issues.iter().map(|i| i.kind).collect()
    }

    #[test]
    fn test_clean_translation() {
        let issues = compare_tags("Save {1}now{/1} {2/}", "Enregistrer {1}maintenant{/1} {2/}");
        assert!(issues.is_empty());
        assert!(!has_errors(&issues));
    }

    #[test]
    fn test_missing_and_unexpected() {
        let issues = compare_tags("a {1/} b {2/}", "a {1/} b {3/}");
        assert_eq!(kinds(&issues), [TagIssueKind::Missing, TagIssueKind::Unexpected]);
        assert_eq!(issues[0].placeholder, "{2/}");
        assert_eq!(issues[1].placeholder, "{3/}");
        assert!(has_errors(&issues));
    }

    #[test]
    fn test_duplicated_is_warning() {
        let issues = compare_tags("a {1/}", "{1/} a {1/}");
        assert_eq!(kinds(&issues), [TagIssueKind::Duplicated]);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert!(!has_errors(&issues));
    }

    #[test]
    fn test_out_of_order() {
        let issues = compare_tags("{1/} then {2/}", "{2/} puis {1/}");
        assert_eq!(kinds(&issues), [TagIssueKind::OutOfOrder]);
        assert_eq!(issues[0].placeholder, "{2/}");
    }

    #[test]
    fn test_unbalanced() {
        let issues = compare_tags("{1}a{2}b{/2}{/1}", "{1}a{2}b{/1}{/2}");
        assert!(kinds(&issues).contains(&TagIssueKind::Unbalanced));

        let issues = compare_tags("{1}a{/1}", "{/1}a{1}");
        assert_eq!(
            issues.iter().filter(|i| i.kind == TagIssueKind::Unbalanced).count(),
            2
        );
    }
}
