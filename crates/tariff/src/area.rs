use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::normalize::{normalize, normalize_opt};

/// Coarse settlement/routing tag for a destination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaCode {
    Known(String),
    Unclassified,
}

impl AreaCode {
    pub fn as_known(&self) -> Option<&str> {
        match self {
            Self::Known(code) => Some(code),
            Self::Unclassified => None,
        }
    }

    pub fn is_classified(&self) -> bool {
        matches!(self, Self::Known(_))
    }
}

impl std::fmt::Display for AreaCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Known(code) => f.write_str(code),
            Self::Unclassified => f.write_str("unclassified"),
        }
    }
}

/// Normalized subregion-or-region name → area code.
///
/// Lookup tries the subregion first, then falls back to the region. Both
/// live filtering and batch reconciliation call [`classify`](Self::classify);
/// there is no second normalization path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaCodeClassifier {
    /// Declared codes, in reporting order.
    #[serde(default)]
    pub known: Vec<String>,
    #[serde(default)]
    pub map: BTreeMap<String, String>,
}

impl AreaCodeClassifier {
    pub fn new(known: Vec<String>, map: BTreeMap<String, String>) -> Self {
        let mut classifier = Self { known, map };
        if let Err(msg) = classifier.normalize_in_place() {
            log::warn!("{msg}");
        }
        classifier
    }

    pub fn classify(&self, region: &str, subregion: Option<&str>) -> AreaCode {
        let by_subregion = normalize_opt(subregion).and_then(|sub| self.map.get(&sub));
        let hit = by_subregion.or_else(|| {
            let region = normalize(region);
            if region.is_empty() {
                None
            } else {
                self.map.get(&region)
            }
        });
        match hit {
            Some(code) => AreaCode::Known(code.clone()),
            None => AreaCode::Unclassified,
        }
    }

    pub fn known_codes(&self) -> &[String] {
        &self.known
    }

    /// Normalizes names and codes in place. Distinct names that collapse
    /// onto one key must agree on the code; the first disagreement is
    /// returned as a message and the later entry wins.
    pub(crate) fn normalize_in_place(&mut self) -> Result<(), String> {
        let mut merged: BTreeMap<String, (String, String)> = BTreeMap::new();
        let mut conflict = None;
        for (name, code) in std::mem::take(&mut self.map) {
            let key = normalize(&name);
            let code = code.trim().to_string();
            match merged.get_mut(&key) {
                Some((first, existing)) => {
                    if *existing != code && conflict.is_none() {
                        conflict = Some(format!(
                            "area names '{first}' and '{name}' both normalize to '{key}' with different codes"
                        ));
                    }
                    *existing = code;
                }
                None => {
                    merged.insert(key, (name, code));
                }
            }
        }
        self.map = merged.into_iter().map(|(key, (_, code))| (key, code)).collect();
        for code in &mut self.known {
            *code = code.trim().to_string();
        }
        conflict.map_or(Ok(()), Err)
    }
}
