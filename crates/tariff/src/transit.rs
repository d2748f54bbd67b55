//! Transit surcharges: an ordered list of substring rules.
//!
//! The match key is `normalize(region + " " + subregion)`. Rules are tried
//! top to bottom and the first rule whose pattern occurs in the key wins.
//! No match means no surcharge.
//!
//! Declared order is the only tie-break. A more specific pattern (one that
//! contains a broader pattern, e.g. `KEPULAUAN SERIBU UTARA` vs
//! `KEPULAUAN SERIBU`) must be listed before the broader one, otherwise it is
//! unreachable. [`audit_rule_order`] finds such pairs when a catalog is
//! loaded; it never runs during fee resolution.

use serde::{Deserialize, Serialize};

use crate::normalize::{normalize, normalize_opt};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitRule {
    pub pattern: String,
    pub fee: f64,
}

/// Ordered transit rules. Position in the list is the rule's priority.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransitFeeResolver {
    rules: Vec<TransitRule>,
}

impl TransitFeeResolver {
    pub fn new(rules: Vec<TransitRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|r| TransitRule {
                pattern: normalize(&r.pattern),
                fee: r.fee,
            })
            .collect();
        Self { rules }
    }

    pub fn rules(&self) -> &[TransitRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Surcharge for a destination; 0 when no rule matches.
    pub fn resolve(&self, region: &str, subregion: Option<&str>) -> f64 {
        self.matching_rule(region, subregion)
            .map(|(_, rule)| rule.fee)
            .unwrap_or(0.0)
    }

    /// The winning rule and its position, if any.
    pub fn matching_rule(
        &self,
        region: &str,
        subregion: Option<&str>,
    ) -> Option<(usize, &TransitRule)> {
        let key = match_key(region, subregion);
        self.rules
            .iter()
            .enumerate()
            .find(|(_, rule)| !rule.pattern.is_empty() && key.contains(rule.pattern.as_str()))
    }

    pub(crate) fn normalize_in_place(&mut self) {
        for rule in &mut self.rules {
            rule.pattern = normalize(&rule.pattern);
        }
    }
}

fn match_key(region: &str, subregion: Option<&str>) -> String {
    match normalize_opt(subregion) {
        Some(sub) => format!("{} {}", normalize(region), sub),
        None => normalize(region),
    }
}

// ---------------------------------------------------------------------------
// Order audit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// Same pattern listed twice; the second is dead.
    Duplicate,
    /// Earlier pattern is a substring of the later one, so the later,
    /// more specific rule can never win.
    Shadowed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleOrderConflict {
    pub kind: ConflictKind,
    pub earlier_index: usize,
    pub earlier_pattern: String,
    pub later_index: usize,
    pub later_pattern: String,
}

impl std::fmt::Display for RuleOrderConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            ConflictKind::Duplicate => write!(
                f,
                "transit rule #{} '{}' duplicates rule #{}",
                self.later_index, self.later_pattern, self.earlier_index
            ),
            ConflictKind::Shadowed => write!(
                f,
                "transit rule #{} '{}' is unreachable: rule #{} '{}' matches first",
                self.later_index, self.later_pattern, self.earlier_index, self.earlier_pattern
            ),
        }
    }
}

/// Every pair of rules where declared order hides a later rule.
pub fn audit_rule_order(rules: &[TransitRule]) -> Vec<RuleOrderConflict> {
    let mut conflicts = Vec::new();
    for (i, earlier) in rules.iter().enumerate() {
        for (j, later) in rules.iter().enumerate().skip(i + 1) {
            let kind = if earlier.pattern == later.pattern {
                ConflictKind::Duplicate
            } else if later.pattern.contains(earlier.pattern.as_str()) {
                ConflictKind::Shadowed
            } else {
                continue;
            };
            conflicts.push(RuleOrderConflict {
                kind,
                earlier_index: i,
                earlier_pattern: earlier.pattern.clone(),
                later_index: j,
                later_pattern: later.pattern.clone(),
            });
        }
    }
    conflicts
}
