// Typed field derivation for products.txt columns.

use chrono::NaiveDate;
use log::warn;

use crate::error::FieldError;
use crate::model::{ApplicantRecord, NormalizedRow, ProductRecord};
use crate::parser::*;

/// Approval-date value the feed uses for products approved before the electronic record.
pub const PREMARKET_SENTINEL: &str = "Approved Prior to Jan 1, 1982";

/// Accepted approval-date layouts, tried in order.
const DATE_FORMATS: &[&str] = &["%b %d, %Y", "%B %d, %Y", "%Y-%m-%d"];

/// Split a combined `DF;Route` value on the last `;`.
///
/// Dosage forms may carry commas ("AEROSOL, FOAM") but never semicolons.
pub fn split_df_route(value: &str) -> (Option<String>, Option<String>) {
    let value = value.trim();
    if value.is_empty() {
        return (None, None);
    }

    match value.rfind(';') {
        Some(pos) => (non_empty(&value[..pos]), non_empty(&value[pos + 1..])),
        None => (Some(value.to_string()), None),
    }
}

/// Parse an approval date, returning `(date, is_premarket)`.
///
/// Empty input is not an error: `(None, false)`.
pub fn parse_approval_date(value: &str) -> Result<(Option<NaiveDate>, bool), FieldError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok((None, false));
    }
    if value == PREMARKET_SENTINEL {
        return Ok((None, true));
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .map(|date| (Some(date), false))
        .ok_or_else(|| FieldError::UnparseableDate {
            value: value.to_string(),
        })
}

/// Map the single-letter application type to the prefix used in application ids.
pub fn map_appl_type_to_prefix(code: &str) -> String {
    match code.trim() {
        "N" => "NDA".to_string(),
        "A" => "ANDA".to_string(),
        other => other.to_string(),
    }
}

/// "Yes"/"No" flag. Anything unrecognized reads as false.
pub fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("yes")
}

/// Applicant short names are matched case-insensitively and without padding.
pub fn normalize_short_name(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase()
}

/// Build typed product and applicant values from a well-formed row.
///
/// An unparseable approval date falls back to `None` and is reported in `warnings`.
pub fn normalize_row(row: &RawRow) -> NormalizedRow {
    let mut warnings = Vec::new();

    let (dosage_form, route) = split_df_route(row.get(COL_DF_ROUTE));
    let (approval_date, approval_date_is_premarket) =
        match parse_approval_date(row.get(COL_APPROVAL_DATE)) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("line {}: {e}; storing null approval date", row.line);
                warnings.push(format!("line {}: {e}", row.line));
                (None, false)
            }
        };

    let appl_type = row.get(COL_APPL_TYPE).trim().to_string();
    let applicant = ApplicantRecord {
        short_name: normalize_short_name(row.get(COL_APPLICANT)),
        full_name: row.get(COL_APPLICANT_FULL_NAME).trim().to_string(),
    };

    let product = ProductRecord {
        ingredient: row.get(COL_INGREDIENT).trim().to_string(),
        dosage_form,
        route,
        trade_name: row.get(COL_TRADE_NAME).trim().to_string(),
        strength: row.get(COL_STRENGTH).trim().to_string(),
        appl_type_prefix: map_appl_type_to_prefix(&appl_type),
        appl_type,
        appl_no: row.get(COL_APPL_NO).trim().to_string(),
        product_no: row.get(COL_PRODUCT_NO).trim().to_string(),
        te_code: non_empty(row.get(COL_TE_CODE)),
        approval_date,
        approval_date_is_premarket,
        is_rld: parse_flag(row.get(COL_RLD)),
        is_rs: parse_flag(row.get(COL_RS)),
        product_type: row.get(COL_TYPE).trim().to_string(),
        applicant_short_name: applicant.short_name.clone(),
        applicant_full_name: applicant.full_name.clone(),
    };

    NormalizedRow {
        line: row.line,
        product,
        applicant,
        warnings,
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(line: &str) -> RawRow {
        let text = format!("header\n{line}\n");
        let mut out = parse_products(&text);
        assert_eq!(out.malformed_rows_skipped, 0, "fixture row must be well-formed");
        out.rows.remove(0)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn df_route_split_on_last_semicolon() {
        assert_eq!(
            split_df_route("AEROSOL, FOAM;TOPICAL"),
            (Some("AEROSOL, FOAM".into()), Some("TOPICAL".into()))
        );
        assert_eq!(
            split_df_route("INJECTABLE; LIPOSOMAL;INTRAVENOUS"),
            (Some("INJECTABLE; LIPOSOMAL".into()), Some("INTRAVENOUS".into()))
        );
    }

    #[test]
    fn df_route_without_semicolon() {
        assert_eq!(split_df_route("TABLET"), (Some("TABLET".into()), None));
        assert_eq!(split_df_route("  TABLET "), (Some("TABLET".into()), None));
    }

    #[test]
    fn df_route_empty() {
        assert_eq!(split_df_route(""), (None, None));
        assert_eq!(split_df_route("   "), (None, None));
        assert_eq!(split_df_route("TABLET;"), (Some("TABLET".into()), None));
    }

    #[test]
    fn approval_date_standard() {
        assert_eq!(
            parse_approval_date("Apr 12, 2023"),
            Ok((Some(date(2023, 4, 12)), false))
        );
        assert_eq!(
            parse_approval_date("Jan 1, 1982"),
            Ok((Some(date(1982, 1, 1)), false))
        );
    }

    #[test]
    fn approval_date_alternate_formats() {
        assert_eq!(
            parse_approval_date("April 12, 2023"),
            Ok((Some(date(2023, 4, 12)), false))
        );
        assert_eq!(
            parse_approval_date("2023-04-12"),
            Ok((Some(date(2023, 4, 12)), false))
        );
    }

    #[test]
    fn approval_date_sentinel_and_empty() {
        assert_eq!(
            parse_approval_date("Approved Prior to Jan 1, 1982"),
            Ok((None, true))
        );
        assert_eq!(parse_approval_date(""), Ok((None, false)));
    }

    #[test]
    fn approval_date_garbage_is_an_error() {
        assert_eq!(
            parse_approval_date("sometime in 1990"),
            Err(FieldError::UnparseableDate {
                value: "sometime in 1990".into()
            })
        );
    }

    #[test]
    fn appl_type_prefix() {
        assert_eq!(map_appl_type_to_prefix("N"), "NDA");
        assert_eq!(map_appl_type_to_prefix("A"), "ANDA");
        assert_eq!(map_appl_type_to_prefix("BLA"), "BLA");
        assert_eq!(map_appl_type_to_prefix(" BLA "), "BLA");
    }

    #[test]
    fn flags() {
        assert!(parse_flag("Yes"));
        assert!(!parse_flag("No"));
        assert!(!parse_flag(""));
        assert!(!parse_flag("maybe"));
    }

    #[test]
    fn normalize_full_row() {
        let row = raw("BUDESONIDE~AEROSOL, FOAM;RECTAL~UCERIS~SALIX~2MG/ACTUATION~N~205613~001\
                       ~AB~Apr 12, 2023~Yes~Yes~RX~SALIX PHARMACEUTICALS INC");
        let n = normalize_row(&row);
        let p = &n.product;
        assert_eq!(p.ingredient, "BUDESONIDE");
        assert_eq!(p.dosage_form.as_deref(), Some("AEROSOL, FOAM"));
        assert_eq!(p.route.as_deref(), Some("RECTAL"));
        assert_eq!(p.appl_type_prefix, "NDA");
        assert_eq!(p.application_key(), "NDA205613");
        assert_eq!(p.approval_date, Some(date(2023, 4, 12)));
        assert!(!p.approval_date_is_premarket);
        assert!(p.is_rld);
        assert!(p.is_rs);
        assert_eq!(p.te_code.as_deref(), Some("AB"));
        assert_eq!(n.applicant.short_name, "SALIX");
        assert_eq!(n.applicant.full_name, "SALIX PHARMACEUTICALS INC");
        assert!(n.warnings.is_empty());
    }

    #[test]
    fn normalize_bad_date_falls_back_with_warning() {
        let row = raw("ASPIRIN~TABLET;ORAL~BAYER ASPIRIN~BAYER~325MG~A~012345~002\
                       ~~13/45/2020~No~No~OTC~bayer ag");
        let n = normalize_row(&row);
        assert_eq!(n.product.approval_date, None);
        assert!(!n.product.approval_date_is_premarket);
        assert_eq!(n.product.te_code, None);
        assert_eq!(n.warnings.len(), 1);
        assert!(n.warnings[0].contains("13/45/2020"));
    }

    #[test]
    fn short_name_is_normalized() {
        assert_eq!(normalize_short_name("  teva   pharms "), "TEVA PHARMS");
    }
}
