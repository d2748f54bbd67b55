use proptest::prelude::*;

use waybill_core::{approx_eq, compute_total};
use waybill_tariff::{AreaCode, QuoteRequest, TariffBook};

fn builtin() -> TariffBook {
    TariffBook::builtin().unwrap()
}

#[test]
fn every_declared_destination_has_a_positive_price() {
    let book = builtin();
    let mut checked = 0;
    for (code, branch) in &book.branches {
        for (region, sub) in branch.destinations() {
            let price = book.resolve_price(code, &region, sub.as_deref()).unwrap();
            assert!(price > 0.0);
            checked += 1;
        }
    }
    assert!(checked > 20);
}

#[test]
fn overlapping_transit_rules_resolve_to_first_declared() {
    // "KEPULAUAN SERIBU UTARA" contains "KEPULAUAN SERIBU"; both are rules.
    let book = builtin();
    let fee = book
        .resolve_transit_fee("JKT", "Kepulauan Seribu", Some("Kepulauan Seribu Utara"))
        .unwrap();
    assert_eq!(fee, 75000.0);

    let fee = book
        .resolve_transit_fee("JKT", "Bekasi", Some("Bekasi Utara"))
        .unwrap();
    assert_eq!(fee, 8000.0);
    let fee = book
        .resolve_transit_fee("JKT", "Bekasi", Some("Medan Satria"))
        .unwrap();
    assert_eq!(fee, 6000.0);
}

#[test]
fn builtin_area_codes_cover_both_hubs() {
    let book = builtin();
    let jkt = book.branch("JKT").unwrap().classifier();
    assert_eq!(jkt.classify("Jakarta Utara", Some("Koja")), AreaCode::Known("JU".into()));
    assert_eq!(jkt.classify("", Some("koja")), jkt.classify("KOJA", Some("")));
    assert_eq!(jkt.classify("Jakarta Barat", Some("Palmerah")), AreaCode::Known("JB".into()));
    assert_eq!(jkt.classify("Bekasi", Some("Bekasi Barat")), AreaCode::Unclassified);
}

fn destination() -> impl Strategy<Value = (String, String, Option<String>)> {
    let book = builtin();
    let all: Vec<(String, String, Option<String>)> = book
        .branches
        .iter()
        .flat_map(|(code, branch)| {
            branch
                .destinations()
                .into_iter()
                .map(move |(region, sub)| (code.clone(), region, sub))
        })
        .collect();
    proptest::sample::select(all)
}

proptest! {
    #[test]
    fn quoted_total_matches_components(
        (branch, region, sub) in destination(),
        weight in 0.1f64..500.0,
        admin in 0u32..20_000,
        packaging in 0u32..50_000,
    ) {
        let book = builtin();
        let quote = book.quote(&QuoteRequest {
            branch,
            region: region.to_lowercase(),
            subregion: sub.map(|s| format!("  {s} ")),
            weight,
            admin_fee: admin as f64,
            packaging_fee: packaging as f64,
        }).unwrap();
        let recomputed = compute_total(
            quote.weight,
            quote.price_per_unit,
            quote.admin_fee,
            quote.packaging_fee,
            quote.transit_fee,
        );
        prop_assert!(approx_eq(quote.total, recomputed));
        prop_assert!(approx_eq(
            quote.total,
            weight * quote.price_per_unit + admin as f64 + packaging as f64 + quote.transit_fee,
        ));
    }
}
