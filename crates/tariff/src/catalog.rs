use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::area::AreaCodeClassifier;
use crate::error::TariffError;
use crate::normalize::normalize;
use crate::price::PriceResolver;
use crate::transit::{audit_rule_order, RuleOrderConflict, TransitFeeResolver};

const BUILTIN_CATALOG: &str = include_str!("../catalogs/default.toml");

// ---------------------------------------------------------------------------
// Top-level book
// ---------------------------------------------------------------------------

/// Every branch's tariff configuration, versioned as one document.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TariffBook {
    #[serde(default)]
    pub name: Option<String>,
    pub version: u32,
    pub branches: BTreeMap<String, BranchCatalog>,
}

// ---------------------------------------------------------------------------
// Branch
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BranchCatalog {
    pub shape: CatalogShape,
    pub zones: Vec<ZoneEntry>,
    #[serde(default)]
    pub transit: TransitFeeResolver,
    #[serde(default)]
    pub area_codes: AreaCodeClassifier,
}

/// How a branch keys its prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogShape {
    /// region → price
    Flat,
    /// region → {subregions, price}
    Tiered,
}

impl std::fmt::Display for CatalogShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Flat => write!(f, "flat"),
            Self::Tiered => write!(f, "tiered"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ZoneEntry {
    pub region: String,
    #[serde(default)]
    pub subregions: Vec<String>,
    /// Base price per weight unit.
    pub price: f64,
}

impl BranchCatalog {
    pub fn prices(&self) -> PriceResolver<'_> {
        PriceResolver::new(self)
    }

    pub fn transit(&self) -> &TransitFeeResolver {
        &self.transit
    }

    pub fn classifier(&self) -> &AreaCodeClassifier {
        &self.area_codes
    }

    /// Every (region, subregion) pair the catalog prices. Flat catalogs
    /// yield `None` subregions.
    pub fn destinations(&self) -> Vec<(String, Option<String>)> {
        let mut out = Vec::new();
        for zone in &self.zones {
            match self.shape {
                CatalogShape::Flat => out.push((zone.region.clone(), None)),
                CatalogShape::Tiered => {
                    for sub in &zone.subregions {
                        out.push((zone.region.clone(), Some(sub.clone())));
                    }
                }
            }
        }
        out
    }

    fn normalize_in_place(&mut self, branch: &str) -> Result<(), TariffError> {
        for zone in &mut self.zones {
            zone.region = normalize(&zone.region);
            for sub in &mut zone.subregions {
                *sub = normalize(sub);
            }
        }
        self.transit.normalize_in_place();
        self.area_codes
            .normalize_in_place()
            .map_err(|msg| TariffError::ConfigValidation(format!("branch '{branch}': {msg}")))
    }

    fn validate(&self, branch: &str) -> Result<(), TariffError> {
        let invalid = |msg: String| TariffError::ConfigValidation(format!("branch '{branch}': {msg}"));

        if self.zones.is_empty() {
            return Err(invalid("no zones declared".into()));
        }

        let mut flat_regions = BTreeSet::new();
        let mut tiered_pairs = BTreeSet::new();
        for zone in &self.zones {
            if zone.region.is_empty() {
                return Err(invalid("zone with empty region name".into()));
            }
            if !zone.price.is_finite() || zone.price <= 0.0 {
                return Err(invalid(format!(
                    "region '{}': price must be positive, got {}",
                    zone.region, zone.price
                )));
            }
            match self.shape {
                CatalogShape::Flat => {
                    if !zone.subregions.is_empty() {
                        return Err(invalid(format!(
                            "region '{}': flat catalog cannot declare subregions",
                            zone.region
                        )));
                    }
                    if !flat_regions.insert(zone.region.as_str()) {
                        return Err(invalid(format!("region '{}' declared twice", zone.region)));
                    }
                }
                CatalogShape::Tiered => {
                    if zone.subregions.is_empty() {
                        return Err(invalid(format!(
                            "region '{}': tiered catalog zone needs at least one subregion",
                            zone.region
                        )));
                    }
                    for sub in &zone.subregions {
                        if sub.is_empty() {
                            return Err(invalid(format!(
                                "region '{}': empty subregion name",
                                zone.region
                            )));
                        }
                        if !tiered_pairs.insert((zone.region.as_str(), sub.as_str())) {
                            return Err(invalid(format!(
                                "subregion '{sub}' declared twice under region '{}'",
                                zone.region
                            )));
                        }
                    }
                }
            }
        }

        for (i, rule) in self.transit.rules().iter().enumerate() {
            if rule.pattern.is_empty() {
                return Err(invalid(format!("transit rule #{i} has an empty pattern")));
            }
            if !rule.fee.is_finite() || rule.fee < 0.0 {
                return Err(invalid(format!(
                    "transit rule #{i} '{}': fee must be non-negative, got {}",
                    rule.pattern, rule.fee
                )));
            }
        }
        if let Some(conflict) = audit_rule_order(self.transit.rules()).into_iter().next() {
            return Err(TariffError::RuleOrderConflict {
                branch: branch.to_string(),
                conflict,
            });
        }

        let known: BTreeSet<&str> = self.area_codes.known.iter().map(String::as_str).collect();
        if known.len() != self.area_codes.known.len() {
            return Err(invalid("area code declared twice in `known`".into()));
        }
        for (name, code) in &self.area_codes.map {
            if !known.contains(code.as_str()) {
                return Err(invalid(format!(
                    "area mapping '{name}' → '{code}': code not listed in `known`"
                )));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl TariffBook {
    pub fn from_toml(input: &str) -> Result<Self, TariffError> {
        let mut book: TariffBook =
            toml::from_str(input).map_err(|e| TariffError::ConfigParse(e.to_string()))?;
        book.normalize_in_place()?;
        book.validate()?;
        log::debug!(
            "loaded tariff book '{}' v{} ({} branches)",
            book.name.as_deref().unwrap_or("unnamed"),
            book.version,
            book.branches.len()
        );
        Ok(book)
    }

    /// The catalog shipped with the crate.
    pub fn builtin() -> Result<Self, TariffError> {
        Self::from_toml(BUILTIN_CATALOG)
    }

    pub fn builtin_source() -> &'static str {
        BUILTIN_CATALOG
    }

    /// Every rule-order conflict in the document, per branch.
    ///
    /// Unlike [`TariffBook::from_toml`] this doesn't stop at the first
    /// problem; only a TOML parse failure is an error.
    pub fn audit_toml(input: &str) -> Result<Vec<(String, RuleOrderConflict)>, TariffError> {
        let mut book: TariffBook =
            toml::from_str(input).map_err(|e| TariffError::ConfigParse(e.to_string()))?;
        book.normalize_in_place()?;
        Ok(book
            .branches
            .iter()
            .flat_map(|(code, branch)| {
                audit_rule_order(branch.transit.rules())
                    .into_iter()
                    .map(move |conflict| (code.clone(), conflict))
            })
            .collect())
    }

    pub fn validate(&self) -> Result<(), TariffError> {
        if self.version == 0 {
            return Err(TariffError::ConfigValidation("version must be at least 1".into()));
        }
        if self.branches.is_empty() {
            return Err(TariffError::ConfigValidation(
                "at least one branch is required".into(),
            ));
        }
        for (code, branch) in &self.branches {
            if code.is_empty() {
                return Err(TariffError::ConfigValidation("empty branch code".into()));
            }
            branch.validate(code)?;
        }
        Ok(())
    }

    pub fn branch(&self, code: &str) -> Result<&BranchCatalog, TariffError> {
        self.branches
            .get(&normalize(code))
            .ok_or_else(|| TariffError::UnknownBranch(code.to_string()))
    }

    pub fn resolve_price(
        &self,
        branch: &str,
        region: &str,
        subregion: Option<&str>,
    ) -> Result<f64, TariffError> {
        let key = normalize(branch);
        let catalog = self
            .branches
            .get(&key)
            .ok_or_else(|| TariffError::UnknownBranch(branch.to_string()))?;
        catalog.prices().for_branch(&key).resolve(region, subregion)
    }

    pub fn resolve_transit_fee(
        &self,
        branch: &str,
        region: &str,
        subregion: Option<&str>,
    ) -> Result<f64, TariffError> {
        Ok(self.branch(branch)?.transit().resolve(region, subregion))
    }

    fn normalize_in_place(&mut self) -> Result<(), TariffError> {
        let branches = std::mem::take(&mut self.branches);
        self.branches = branches
            .into_iter()
            .map(|(code, mut branch)| {
                let code = normalize(&code);
                branch.normalize_in_place(&code)?;
                Ok((code, branch))
            })
            .collect::<Result<_, TariffError>>()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
