use crate::catalog::{BranchCatalog, CatalogShape};
use crate::error::TariffError;
use crate::normalize::{normalize, normalize_opt};

/// Resolves a destination to its per-weight-unit price within one branch.
///
/// Pure lookup: no defaults, no fallbacks. Flat catalogs ignore the
/// subregion; tiered catalogs require one declared under the region.
pub struct PriceResolver<'a> {
    catalog: &'a BranchCatalog,
    branch: Option<&'a str>,
}

impl<'a> PriceResolver<'a> {
    pub fn new(catalog: &'a BranchCatalog) -> Self {
        Self {
            catalog,
            branch: None,
        }
    }

    /// Label used in error messages.
    pub fn for_branch(mut self, branch: &'a str) -> Self {
        self.branch = Some(branch);
        self
    }

    pub fn resolve(&self, region: &str, subregion: Option<&str>) -> Result<f64, TariffError> {
        let branch = self.branch.unwrap_or("-").to_string();
        let region_n = normalize(region);
        let not_found = || TariffError::NotFound {
            branch: branch.clone(),
            region: region.trim().to_string(),
        };
        if region_n.is_empty() {
            return Err(not_found());
        }

        let mut zones = self.catalog.zones.iter().filter(|z| z.region == region_n).peekable();
        if zones.peek().is_none() {
            return Err(not_found());
        }

        match self.catalog.shape {
            CatalogShape::Flat => zones.next().map(|z| z.price).ok_or_else(not_found),
            CatalogShape::Tiered => {
                let ambiguous = || TariffError::AmbiguousDestination {
                    branch: branch.clone(),
                    region: region.trim().to_string(),
                    subregion: subregion.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
                };
                let sub_n = normalize_opt(subregion).ok_or_else(ambiguous)?;
                zones
                    .find(|z| z.subregions.iter().any(|s| *s == sub_n))
                    .map(|z| z.price)
                    .ok_or_else(ambiguous)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TariffBook;

    const BOOK: &str = r#"
version = 2

[branches.JKT]
shape = "tiered"

[[branches.JKT.zones]]
region = "Jakarta Utara"
subregions = ["Koja", "Cilincing"]
price = 9000

[[branches.JKT.zones]]
region = "Jakarta Utara"
subregions = ["Kelapa Gading"]
price = 11000

[[branches.JKT.zones]]
region = "Jakarta Barat"
subregions = ["Kalideres"]
price = 10000

[branches.SBY]
shape = "flat"

[[branches.SBY.zones]]
region = "Malang"
price = 12000
"#;

    fn book() -> TariffBook {
        TariffBook::from_toml(BOOK).unwrap()
    }

    #[test]
    fn tiered_lookup() {
        let book = book();
        assert_eq!(book.resolve_price("JKT", "jakarta utara", Some(" koja ")).unwrap(), 9000.0);
        assert_eq!(
            book.resolve_price("JKT", "Jakarta Utara", Some("Kelapa Gading")).unwrap(),
            11000.0
        );
    }

    #[test]
    fn flat_lookup_ignores_subregion() {
        let book = book();
        assert_eq!(book.resolve_price("SBY", "MALANG", None).unwrap(), 12000.0);
        assert_eq!(book.resolve_price("sby", "malang", Some("Batu")).unwrap(), 12000.0);
    }

    #[test]
    fn unknown_region_is_not_found() {
        let book = book();
        let err = book.resolve_price("JKT", "Depok", Some("Beji")).unwrap_err();
        assert!(matches!(err, TariffError::NotFound { .. }));
        let err = book.resolve_price("SBY", "  ", None).unwrap_err();
        assert!(matches!(err, TariffError::NotFound { .. }));
    }

    #[test]
    fn subregion_from_another_region_is_ambiguous() {
        let book = book();
        let err = book
            .resolve_price("JKT", "Jakarta Utara", Some("Kalideres"))
            .unwrap_err();
        assert_eq!(
            err,
            TariffError::AmbiguousDestination {
                branch: "JKT".into(),
                region: "Jakarta Utara".into(),
                subregion: Some("Kalideres".into()),
            }
        );
    }

    #[test]
    fn missing_subregion_in_tiered_catalog_is_ambiguous() {
        let book = book();
        let err = book.resolve_price("JKT", "Jakarta Utara", None).unwrap_err();
        assert!(matches!(
            err,
            TariffError::AmbiguousDestination { subregion: None, .. }
        ));
        assert!(err.to_string().contains("requires a subregion"));
    }

    #[test]
    fn unknown_branch() {
        let err = book().resolve_price("MDN", "Medan", None).unwrap_err();
        assert_eq!(err, TariffError::UnknownBranch("MDN".into()));
    }
}
