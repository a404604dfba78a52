// products.txt row splitting
// Header is discarded; every other non-blank line must carry exactly FIELD_COUNT fields.

use log::debug;

/// Column count of a products.txt data row.
pub const FIELD_COUNT: usize = 14;

/// Literal column separator used by the Orange Book flat files.
pub const DELIMITER: char = '~';

// Column positions
pub const COL_INGREDIENT: usize = 0;
pub const COL_DF_ROUTE: usize = 1;
pub const COL_TRADE_NAME: usize = 2;
pub const COL_APPLICANT: usize = 3;
pub const COL_STRENGTH: usize = 4;
pub const COL_APPL_TYPE: usize = 5;
pub const COL_APPL_NO: usize = 6;
pub const COL_PRODUCT_NO: usize = 7;
pub const COL_TE_CODE: usize = 8;
pub const COL_APPROVAL_DATE: usize = 9;
pub const COL_RLD: usize = 10;
pub const COL_RS: usize = 11;
pub const COL_TYPE: usize = 12;
pub const COL_APPLICANT_FULL_NAME: usize = 13;

/// A well-formed data row, still untyped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based line number in the source text (header is line 1).
    pub line: usize,
    pub fields: [String; FIELD_COUNT],
}

impl RawRow {
    pub fn get(&self, col: usize) -> &str {
        &self.fields[col]
    }
}

#[derive(Debug, Default)]
pub struct ParseOutput {
    pub rows: Vec<RawRow>,
    pub malformed_rows_skipped: usize,
}

/// Split a full products.txt body into rows, preserving file order.
///
/// Rows with the wrong column count are dropped and tallied, never surfaced as errors.
pub fn parse_products(content: &str) -> ParseOutput {
    let mut out = ParseOutput::default();

    // Line 1 is the header
    for (idx, line) in content.lines().enumerate().skip(1) {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.trim().is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split(DELIMITER).collect();
        let Ok(fields) = <[String; FIELD_COUNT]>::try_from(
            parts.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
        ) else {
            debug!(
                "line {}: expected {FIELD_COUNT} fields, found {}; skipping",
                idx + 1,
                parts.len()
            );
            out.malformed_rows_skipped += 1;
            continue;
        };

        out.rows.push(RawRow {
            line: idx + 1,
            fields,
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Ingredient~DF;Route~Trade_Name~Applicant~Strength~Appl_Type~Appl_No\
                          ~Product_No~TE_Code~Approval_Date~RLD~RS~Type~Applicant_Full_Name";

    fn row(ingredient: &str, product_no: &str) -> String {
        format!(
            "{ingredient}~TABLET;ORAL~BRAND~ACME~10MG~N~012345~{product_no}\
             ~AB~Apr 12, 2023~No~No~RX~ACME INC"
        )
    }

    #[test]
    fn header_is_discarded() {
        let text = format!("{HEADER}\n{}\n", row("ASPIRIN", "001"));
        let out = parse_products(&text);
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].get(COL_INGREDIENT), "ASPIRIN");
        assert_eq!(out.rows[0].line, 2);
        assert_eq!(out.malformed_rows_skipped, 0);
    }

    #[test]
    fn header_only_yields_nothing() {
        let out = parse_products(HEADER);
        assert!(out.rows.is_empty());
        assert_eq!(out.malformed_rows_skipped, 0);
    }

    #[test]
    fn wrong_column_count_is_skipped_once_per_row() {
        let text = format!(
            "{HEADER}\n{}\nTOO~FEW~FIELDS\n{}~EXTRA\n{}\n",
            row("ASPIRIN", "001"),
            row("IBUPROFEN", "002"),
            row("NAPROXEN", "003"),
        );
        let out = parse_products(&text);
        assert_eq!(out.malformed_rows_skipped, 2);
        let names: Vec<&str> = out.rows.iter().map(|r| r.get(COL_INGREDIENT)).collect();
        assert_eq!(names, vec!["ASPIRIN", "NAPROXEN"]);
    }

    #[test]
    fn blank_lines_are_not_malformed() {
        let text = format!("{HEADER}\n\n   \n{}\n\n", row("ASPIRIN", "001"));
        let out = parse_products(&text);
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.malformed_rows_skipped, 0);
        assert_eq!(out.rows[0].line, 4);
    }

    #[test]
    fn crlf_line_endings() {
        let text = format!("{HEADER}\r\n{}\r\n", row("ASPIRIN", "001"));
        let out = parse_products(&text);
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].get(COL_APPLICANT_FULL_NAME), "ACME INC");
    }

    #[test]
    fn empty_fields_still_count() {
        let text = format!("{HEADER}\nA{}\n", "~".repeat(FIELD_COUNT - 1));
        let out = parse_products(&text);
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].get(COL_TE_CODE), "");
    }
}
