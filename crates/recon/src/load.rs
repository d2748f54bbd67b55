use chrono::{NaiveDate, NaiveDateTime};
use waybill_core::{PaymentMethod, PaymentState, ShipmentRecord};

use crate::error::ReconError;

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Load a datastore CSV export into shipment records.
///
/// Required columns: `tracking_id, created_at, branch, region, weight,
/// price_per_unit, total`. Optional: `subregion, admin_fee, packaging_fee,
/// transit_fee, payment_method, paid, settled_total, catalog_version`.
/// Missing optional fees read as 0, a missing payment method as unset.
pub fn load_csv_records(csv_data: &str) -> Result<Vec<ShipmentRecord>, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ReconError::Csv(e.to_string()))?
        .iter()
        .map(|h| h.to_ascii_lowercase())
        .collect();

    let idx = |name: &str| -> Result<usize, ReconError> {
        headers.iter().position(|h| h == name).ok_or_else(|| ReconError::MissingColumn {
            column: name.into(),
        })
    };
    let opt_idx = |name: &str| headers.iter().position(|h| h == name);

    let tracking_idx = idx("tracking_id")?;
    let created_idx = idx("created_at")?;
    let branch_idx = idx("branch")?;
    let region_idx = idx("region")?;
    let weight_idx = idx("weight")?;
    let price_idx = idx("price_per_unit")?;
    let total_idx = idx("total")?;

    let subregion_idx = opt_idx("subregion");
    let admin_idx = opt_idx("admin_fee");
    let packaging_idx = opt_idx("packaging_fee");
    let transit_idx = opt_idx("transit_fee");
    let method_idx = opt_idx("payment_method");
    let paid_idx = opt_idx("paid");
    let settled_idx = opt_idx("settled_total");
    let version_idx = opt_idx("catalog_version");

    let mut records = Vec::new();

    for row in reader.records() {
        let row = row.map_err(|e| ReconError::Csv(e.to_string()))?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        let field = |i: usize| row.get(i).unwrap_or("").trim();
        let opt_field = |i: Option<usize>| i.map(|i| row.get(i).unwrap_or("").trim()).unwrap_or("");

        let tracking_id = field(tracking_idx).to_string();

        let amount = |column: &str, raw: &str, default: Option<f64>| -> Result<f64, ReconError> {
            if raw.is_empty() {
                if let Some(d) = default {
                    return Ok(d);
                }
            }
            raw.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| ReconError::AmountParse {
                    line,
                    tracking_id: tracking_id.clone(),
                    column: column.into(),
                    value: raw.into(),
                })
        };

        let created_raw = field(created_idx);
        let created_at = parse_datetime(created_raw).ok_or_else(|| ReconError::DateParse {
            line,
            tracking_id: tracking_id.clone(),
            value: created_raw.into(),
        })?;

        let paid_raw = opt_field(paid_idx);
        let state = parse_paid(paid_raw).ok_or_else(|| ReconError::FlagParse {
            line,
            tracking_id: tracking_id.clone(),
            value: paid_raw.into(),
        })?;

        let settled_raw = opt_field(settled_idx);
        let settled_total = if settled_raw.is_empty() {
            None
        } else {
            Some(amount("settled_total", settled_raw, None)?)
        };

        let version_raw = opt_field(version_idx);
        let catalog_version = if version_raw.is_empty() {
            None
        } else {
            Some(version_raw.parse::<u32>().map_err(|_| ReconError::AmountParse {
                line,
                tracking_id: tracking_id.clone(),
                column: "catalog_version".into(),
                value: version_raw.into(),
            })?)
        };

        let subregion = Some(opt_field(subregion_idx))
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        records.push(ShipmentRecord {
            created_at,
            branch: field(branch_idx).to_string(),
            region: field(region_idx).to_string(),
            subregion,
            weight: amount("weight", field(weight_idx), None)?,
            price_per_unit: amount("price_per_unit", field(price_idx), None)?,
            admin_fee: amount("admin_fee", opt_field(admin_idx), Some(0.0))?,
            packaging_fee: amount("packaging_fee", opt_field(packaging_idx), Some(0.0))?,
            transit_fee: amount("transit_fee", opt_field(transit_idx), Some(0.0))?,
            payment_method: PaymentMethod::parse(opt_field(method_idx)),
            total: amount("total", field(total_idx), None)?,
            state,
            settled_total,
            catalog_version,
            tracking_id,
        });
    }

    log::debug!("loaded {} shipment records from CSV", records.len());
    Ok(records)
}

fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn parse_paid(raw: &str) -> Option<PaymentState> {
    match raw.to_ascii_lowercase().as_str() {
        "" | "false" | "0" | "no" | "unpaid" => Some(PaymentState::Unpaid),
        "true" | "1" | "yes" | "paid" => Some(PaymentState::Paid),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "tracking_id,created_at,branch,region,subregion,weight,price_per_unit,admin_fee,packaging_fee,transit_fee,payment_method,total,paid";

    #[test]
    fn load_full_row() {
        let csv = format!(
            "{HEADER}\nJKT2601150001,2026-01-15 09:30:00,JKT,Jakarta Utara,Koja,2,9000,5000,0,0,cash,23000,false\n"
        );
        let records = load_csv_records(&csv).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.tracking_id, "JKT2601150001");
        assert_eq!(r.subregion.as_deref(), Some("Koja"));
        assert_eq!(r.payment_method, PaymentMethod::Cash);
        assert_eq!(r.state, PaymentState::Unpaid);
        assert!(r.is_consistent());
    }

    #[test]
    fn optional_columns_default() {
        let csv = "tracking_id,created_at,branch,region,weight,price_per_unit,total\n\
                   SBY1,2026-01-15,SBY,Malang,1,12000,12000\n";
        let records = load_csv_records(csv).unwrap();
        let r = &records[0];
        assert_eq!(r.subregion, None);
        assert_eq!(r.admin_fee, 0.0);
        assert_eq!(r.payment_method, PaymentMethod::Unset);
        assert_eq!(r.state, PaymentState::Unpaid);
        assert_eq!(r.created_at.format("%H:%M").to_string(), "00:00");
    }

    #[test]
    fn blank_subregion_is_none() {
        let csv = format!("{HEADER}\nA1,2026-01-15T09:30:00,JKT,Jakarta Utara,  ,1,9000,0,0,0,,9000,paid\n");
        let records = load_csv_records(&csv).unwrap();
        assert_eq!(records[0].subregion, None);
        assert_eq!(records[0].state, PaymentState::Paid);
    }

    #[test]
    fn missing_required_column() {
        let csv = "tracking_id,created_at,branch,region,weight,total\n";
        let err = load_csv_records(csv).unwrap_err();
        assert!(err.to_string().contains("price_per_unit"));
    }

    #[test]
    fn bad_amount_reports_line_and_column() {
        let csv = format!("{HEADER}\nA1,2026-01-15 09:30:00,JKT,Jakarta Utara,Koja,two,9000,0,0,0,cash,9000,false\n");
        let err = load_csv_records(&csv).unwrap_err();
        match err {
            ReconError::AmountParse { line, tracking_id, column, value } => {
                assert_eq!(line, 2);
                assert_eq!(tracking_id, "A1");
                assert_eq!(column, "weight");
                assert_eq!(value, "two");
            }
            other => panic!("expected AmountParse, got {other:?}"),
        }
    }

    #[test]
    fn non_finite_amounts_rejected() {
        for (row, column, value) in [
            ("A1,2026-01-15 09:30:00,JKT,Jakarta Utara,Koja,1,9000,0,0,0,cash,NaN,false", "total", "NaN"),
            ("A1,2026-01-15 09:30:00,JKT,Jakarta Utara,Koja,inf,9000,0,0,0,cash,9000,false", "weight", "inf"),
            ("A1,2026-01-15 09:30:00,JKT,Jakarta Utara,Koja,1,9000,-infinity,0,0,cash,9000,false", "admin_fee", "-infinity"),
        ] {
            let err = load_csv_records(&format!("{HEADER}\n{row}\n")).unwrap_err();
            match err {
                ReconError::AmountParse { line, column: c, value: v, .. } => {
                    assert_eq!(line, 2);
                    assert_eq!(c, column);
                    assert_eq!(v, value);
                }
                other => panic!("expected AmountParse, got {other:?}"),
            }
        }
    }

    #[test]
    fn bad_date() {
        let csv = format!("{HEADER}\nA1,15/01/2026,JKT,Jakarta Utara,Koja,1,9000,0,0,0,cash,9000,false\n");
        let err = load_csv_records(&csv).unwrap_err();
        assert!(matches!(err, ReconError::DateParse { .. }));
    }

    #[test]
    fn bad_paid_flag() {
        let csv = format!("{HEADER}\nA1,2026-01-15,JKT,Jakarta Utara,Koja,1,9000,0,0,0,cash,9000,maybe\n");
        let err = load_csv_records(&csv).unwrap_err();
        assert!(err.to_string().contains("maybe"));
    }
}
