//! `waybill-tariff`: branch-scoped tariff catalogs and the resolvers built
//! on them.
//!
//! One catalog document feeds both intake (price + transit fee) and
//! reporting (area classification), so the two paths can't drift apart.

pub mod area;
pub mod catalog;
pub mod error;
pub mod normalize;
pub mod price;
pub mod quote;
pub mod transit;

pub use area::{AreaCode, AreaCodeClassifier};
pub use catalog::{BranchCatalog, CatalogShape, TariffBook, ZoneEntry};
pub use error::TariffError;
pub use normalize::normalize;
pub use price::PriceResolver;
pub use quote::{validate_charges, Quote, QuoteRequest};
pub use transit::{audit_rule_order, ConflictKind, RuleOrderConflict, TransitFeeResolver, TransitRule};
