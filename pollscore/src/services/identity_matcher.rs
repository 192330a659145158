//! Matching response emails to roster identifiers
//!
//! A roster identifier `id` owns the course email `{id}{domain}`. Response
//! emails are lower-cased, excluded when ignored, rewritten through aliases and
//! then looked up among course emails; comparison is case-insensitive while
//! reported identifiers keep the roster's spelling.

use pollscore_common::PollConfig;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{info, warn};

/// Result of matching response emails against roster identifiers
#[derive(Debug, Clone, Default)]
pub struct IdentityMatch {
    matches: BTreeMap<String, String>,
    unmatched_emails: BTreeSet<String>,
    unmatched_ids: BTreeSet<String>,
}

impl IdentityMatch {
    /// Response email → roster identifier
    pub fn matches(&self) -> &BTreeMap<String, String> {
        &self.matches
    }

    pub fn get(&self, email: &str) -> Option<&str> {
        self.matches.get(email).map(String::as_str)
    }

    /// Response emails matching no roster identifier, ignored emails excluded
    pub fn unmatched_emails(&self) -> &BTreeSet<String> {
        &self.unmatched_emails
    }

    /// Roster identifiers matched by no response, ignored identifiers excluded
    pub fn unmatched_ids(&self) -> &BTreeSet<String> {
        &self.unmatched_ids
    }

    pub fn matched_ids(&self) -> BTreeSet<&str> {
        self.matches.values().map(String::as_str).collect()
    }
}

pub struct IdentityMatcher {
    domain: String,
    aliases: BTreeMap<String, String>,
    ignore_responses: BTreeSet<String>,
    ignore_roster: BTreeSet<String>,
}

impl IdentityMatcher {
    /// `aliases` map lower-cased response emails to full course emails
    pub fn new(
        domain: impl Into<String>,
        aliases: BTreeMap<String, String>,
        ignore_responses: BTreeSet<String>,
        ignore_roster: BTreeSet<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            aliases,
            ignore_responses,
            ignore_roster,
        }
    }

    pub fn from_config(config: &PollConfig) -> Self {
        Self::new(
            config.domain.clone(),
            config.aliases.clone(),
            config.ignore_responses.clone(),
            config.ignore_roster.clone(),
        )
    }

    pub fn match_identities<'a>(
        &self,
        emails: impl IntoIterator<Item = &'a str>,
        roster_ids: &BTreeSet<String>,
    ) -> IdentityMatch {
        let course_emails: HashMap<String, &String> = roster_ids
            .iter()
            .filter(|id| !self.ignore_roster.contains(id.as_str()))
            .map(|id| (format!("{}{}", id, self.domain).to_lowercase(), id))
            .collect();

        let mut result = IdentityMatch::default();
        for email in emails {
            let lowered = email.to_lowercase();
            if self.ignore_responses.contains(&lowered) {
                continue;
            }
            let resolved = match self.aliases.get(&lowered) {
                Some(target) => target.to_lowercase(),
                None => lowered,
            };
            match course_emails.get(&resolved) {
                Some(id) => {
                    result.matches.insert(email.to_string(), (*id).clone());
                }
                None => {
                    result.unmatched_emails.insert(email.to_string());
                }
            }
        }

        let matched: BTreeSet<&str> = result.matches.values().map(String::as_str).collect();
        result.unmatched_ids = roster_ids
            .iter()
            .filter(|id| !matched.contains(id.as_str()) && !self.ignore_roster.contains(id.as_str()))
            .cloned()
            .collect();

        report(&result);
        result
    }
}

fn report(result: &IdentityMatch) {
    match result.unmatched_emails.len() {
        0 => {}
        1 => warn!(
            "1 response email not found in roster: {}",
            joined(&result.unmatched_emails)
        ),
        n => warn!(
            "{} response emails not found in roster: {}",
            n,
            joined(&result.unmatched_emails)
        ),
    }
    match result.unmatched_ids.len() {
        0 => {}
        1 => info!(
            "1 roster entry without poll responses: {}",
            joined(&result.unmatched_ids)
        ),
        n => info!(
            "{} roster entries without poll responses: {}",
            n,
            joined(&result.unmatched_ids)
        ),
    }
}

fn joined(items: &BTreeSet<String>) -> String {
    items.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn matcher() -> IdentityMatcher {
        let mut aliases = BTreeMap::new();
        aliases.insert("a.person@gmail.com".to_string(), "abc123@example.edu".to_string());
        IdentityMatcher::new(
            "@example.edu",
            aliases,
            set(&["ta@example.edu"]),
            set(&["ta001"]),
        )
    }

    #[test]
    fn test_direct_alias_and_case_insensitive_matches() {
        let result = matcher().match_identities(
            ["jd001@example.edu", "A.Person@Gmail.com", "RR002@Example.EDU"],
            &set(&["jd001", "abc123", "rr002", "zz999"]),
        );

        assert_eq!(result.get("jd001@example.edu"), Some("jd001"));
        assert_eq!(result.get("A.Person@Gmail.com"), Some("abc123"));
        assert_eq!(result.get("RR002@Example.EDU"), Some("rr002"));
        assert!(result.unmatched_emails().is_empty());
        assert_eq!(result.unmatched_ids(), &set(&["zz999"]));
    }

    #[test]
    fn test_repeated_matching_is_stable() {
        let roster = set(&["jd001", "abc123", "rr002", "zz999"]);
        let emails = [
            "RR002@Example.EDU",
            "stranger@gmail.com",
            "jd001@example.edu",
            "A.Person@Gmail.com",
            "Jd001@example.edu",
        ];
        let matcher = matcher();

        let first = matcher.match_identities(emails, &roster);
        let second = matcher.match_identities(emails, &roster);
        let mut reversed = emails;
        reversed.reverse();
        let third = matcher.match_identities(reversed, &roster);

        for other in [&second, &third] {
            assert_eq!(first.matches(), other.matches());
            assert_eq!(first.unmatched_emails(), other.unmatched_emails());
            assert_eq!(first.unmatched_ids(), other.unmatched_ids());
        }
        assert_eq!(first.get("Jd001@example.edu"), Some("jd001"));
    }

    #[test]
    fn test_ignored_emails_and_ids_unreported() {
        let result = matcher().match_identities(
            ["ta@example.edu", "stranger@gmail.com", "ta001@example.edu"],
            &set(&["ta001", "jd001"]),
        );

        assert!(result.matches().is_empty());
        assert_eq!(
            result.unmatched_emails(),
            &set(&["stranger@gmail.com", "ta001@example.edu"])
        );
        assert_eq!(result.unmatched_ids(), &set(&["jd001"]));
    }

    #[test]
    fn test_roster_spelling_preserved() {
        let result = IdentityMatcher::new("@example.edu", BTreeMap::new(), BTreeSet::new(), BTreeSet::new())
            .match_identities(["jd001@example.edu"], &set(&["JD001"]));
        assert_eq!(result.get("jd001@example.edu"), Some("JD001"));
    }

    #[test]
    fn test_matches_and_unmatched_partition_inputs() {
        let emails = ["a@example.edu", "b@example.edu", "c@other.org", "ta@example.edu"];
        let result = matcher().match_identities(emails, &set(&["a", "b"]));

        for email in emails {
            let matched = result.get(email).is_some();
            let unmatched = result.unmatched_emails().contains(email);
            let ignored = email == "ta@example.edu";
            assert_eq!(
                [matched, unmatched, ignored].iter().filter(|&&b| b).count(),
                1,
                "{} must fall in exactly one category",
                email
            );
        }
    }
}
