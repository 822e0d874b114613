//! Participant identity canonicalisation.
//!
//! Attendance exports list the same person under slightly different
//! addresses (`Bob@Corp.com`, `bob@corp.com`, `bob@mail.corp.com`). Within a
//! single session those are collapsed into one canonical, lower-cased email
//! before the session is merged into the attendance matrix.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How two addresses in the same session are judged to be the same person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DedupPolicy {
    /// Addresses sharing a local-part (text before `@`) are one person.
    /// The lexicographically first address wins.
    #[default]
    LocalPart,
    /// Only identical canonical addresses collapse.
    Exact,
    /// Substring search of the local-part in the rendered list of accepted
    /// addresses. Kept for reproducing older reports: it drops any address
    /// whose local-part happens to occur inside an accepted one, e.g.
    /// `lice@x.com` after `alice@x.com`, or `x@y.com` after `ann@x.com`.
    Legacy,
}

impl DedupPolicy {
    pub const VARIANTS: [&'static str; 3] = ["local-part", "exact", "legacy"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LocalPart => "local-part",
            Self::Exact => "exact",
            Self::Legacy => "legacy",
        }
    }
}

impl fmt::Display for DedupPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DedupPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local-part" | "local_part" | "localpart" => Ok(Self::LocalPart),
            "exact" => Ok(Self::Exact),
            "legacy" => Ok(Self::Legacy),
            other => Err(format!("Unknown dedup policy: {}", other)),
        }
    }
}

/// Lower-case and trim a raw address.
pub fn canonicalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// The part of an address before the first `@` (the whole string if none).
pub fn local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

/// Canonicalise, sort and deduplicate the addresses seen in one session.
///
/// Empty strings are dropped. The result is sorted ascending.
///
/// ```
/// use attendance_core::identity::{normalize_emails, DedupPolicy};
///
/// let emails = normalize_emails(["Bob@Y.com", "bob@x.com", "al@x.com"], DedupPolicy::LocalPart);
/// assert_eq!(emails, vec!["al@x.com", "bob@x.com"]);
/// ```
pub fn normalize_emails<I, S>(raw: I, policy: DedupPolicy) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut sorted: Vec<String> = raw
        .into_iter()
        .map(|e| canonicalize_email(e.as_ref()))
        .filter(|e| !e.is_empty())
        .collect();
    sorted.sort();

    match policy {
        DedupPolicy::LocalPart => {
            let mut seen: HashSet<String> = HashSet::new();
            sorted
                .into_iter()
                .filter(|email| seen.insert(local_part(email).to_string()))
                .collect()
        }
        DedupPolicy::Exact => {
            sorted.dedup();
            sorted
        }
        DedupPolicy::Legacy => dedup_by_rendered_list(sorted),
    }
}

/// Accept an address unless its local-part occurs anywhere in the rendered
/// accepted list `['a@x.com', 'b@x.com']`.
fn dedup_by_rendered_list(sorted: Vec<String>) -> Vec<String> {
    let mut accepted: Vec<String> = Vec::new();
    for email in sorted {
        let rendered = render_list(&accepted);
        if rendered.contains(local_part(&email)) {
            continue;
        }
        accepted.push(email);
    }
    accepted
}

fn render_list(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|i| format!("'{}'", i)).collect();
    format!("[{}]", quoted.join(", "))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
