//! Match classification.
//!
//! Every source funnels its extracted matches through [`classify_matches`],
//! so the verdict rules are identical everywhere. Sources differ only in how
//! they acquire matches and in their inactive-status vocabulary.

use crate::types::{Availability, Clarity, EntityMatch};

/// Advisory appended when every exact match is inactive.
pub const INACTIVE_ADVISORY: &str =
    " All exact matches are inactive. The name may be available, but verify with an attorney.";

/// Outcome of classifying matches against a searched name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Verdict
    pub availability: Availability,
    /// Clarity of the structural signal
    pub clarity: Clarity,
    /// Matches to keep as `raw_matches` (exact ones when taken)
    pub matches: Vec<EntityMatch>,
    /// Names of non-exact matches
    pub similar_names: Vec<String>,
    /// Human-readable summary
    pub notes: String,
}

impl Classification {
    /// Definitive "nothing found" outcome with a custom note.
    #[must_use]
    pub fn available(notes: impl Into<String>) -> Self {
        Self {
            availability: Availability::Available,
            clarity: Clarity::Clear,
            matches: Vec::new(),
            similar_names: Vec::new(),
            notes: notes.into(),
        }
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Classify `matches` against `searched_name`.
///
/// An exact match is one whose trimmed, uppercased name equals the trimmed,
/// uppercased searched name. Inactive exact matches leave the verdict at
/// `taken` and only add [`INACTIVE_ADVISORY`] to the notes.
#[must_use]
pub fn classify_matches(
    searched_name: &str,
    matches: Vec<EntityMatch>,
    inactive_statuses: &[String],
) -> Classification {
    if matches.is_empty() {
        return Classification::available("No matching entities found.");
    }

    let target = normalize(searched_name);
    let (exact, others): (Vec<EntityMatch>, Vec<EntityMatch>) = matches
        .into_iter()
        .partition(|m| normalize(&m.name) == target);

    if exact.is_empty() {
        let similar_names = others.iter().map(|m| m.name.clone()).collect::<Vec<_>>();
        let notes = format!(
            "{} similar entity name(s) found. No exact match.",
            similar_names.len()
        );
        return Classification {
            availability: Availability::Similar,
            clarity: Clarity::Inferred,
            matches: others,
            similar_names,
            notes,
        };
    }

    let mut notes = format!("Exact match found: '{}'", exact[0].name);
    if !exact[0].status.is_empty() {
        notes.push_str(&format!(" (status: {})", exact[0].status));
    }
    notes.push('.');

    let all_inactive = exact.iter().all(|m| {
        let status = m.status.trim().to_lowercase();
        inactive_statuses.iter().any(|s| s.to_lowercase() == status)
    });
    if all_inactive {
        notes.push_str(INACTIVE_ADVISORY);
    }

    Classification {
        availability: Availability::Taken,
        clarity: Clarity::Clear,
        matches: exact,
        similar_names: others.into_iter().map(|m| m.name).collect(),
        notes,
    }
}
