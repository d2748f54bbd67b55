//! `waybill quote` and `waybill classify`.

use std::path::Path;

use waybill_tariff::QuoteRequest;

use crate::catalog::load_book;
use crate::exit_codes::EXIT_OUTPUT;
use crate::CliError;

pub fn cmd_quote(catalog: Option<&Path>, request: &QuoteRequest, json: bool) -> Result<(), CliError> {
    let book = load_book(catalog)?;
    let quote = book.quote(request).map_err(CliError::tariff)?;

    if json {
        let out = serde_json::to_string_pretty(&quote)
            .map_err(|e| CliError::new(EXIT_OUTPUT, format!("JSON serialization error: {e}")))?;
        println!("{out}");
        return Ok(());
    }

    let destination = match &quote.subregion {
        Some(sub) => format!("{} / {}", quote.region, sub),
        None => quote.region.clone(),
    };
    println!("branch:      {}", quote.branch);
    println!("destination: {destination}");
    println!(
        "freight:     {} x {} = {}",
        quote.weight,
        quote.price_per_unit,
        quote.weight * quote.price_per_unit
    );
    println!("admin:       {}", quote.admin_fee);
    println!("packaging:   {}", quote.packaging_fee);
    match &quote.transit_rule {
        Some(rule) => println!("transit:     {} ({rule})", quote.transit_fee),
        None => println!("transit:     {}", quote.transit_fee),
    }
    println!("total:       {}", quote.total);
    println!("catalog:     v{}", quote.catalog_version);
    Ok(())
}

pub fn cmd_classify(
    catalog: Option<&Path>,
    branch: &str,
    region: &str,
    subregion: Option<&str>,
) -> Result<(), CliError> {
    let book = load_book(catalog)?;
    let branch_catalog = book.branch(branch).map_err(CliError::tariff)?;
    let code = branch_catalog.classifier().classify(region, subregion);
    log::debug!("{region} / {subregion:?} -> {code}");
    println!("{code}");
    Ok(())
}
