//! Proposed-set CSV import
//!
//! Parses a CSV file into a proposed segment set for a replace operation.
//! Expected columns: `category`, `amount`, and optionally `percentage`.
//! Parsing errors carry the offending row number; validation against the
//! expense happens later in the segmentation engine.

use std::io::Read;

use crate::error::{CostsplitError, CostsplitResult};
use crate::models::{Money, Percentage, SegmentInput};

/// Parse a proposed segment set from CSV
pub fn parse_segments_csv<R: Read>(reader: R) -> CostsplitResult<Vec<SegmentInput>> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let category_idx = find_column(&headers, "category")?;
    let amount_idx = find_column(&headers, "amount")?;
    let percentage_idx = headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case("percentage"));

    let mut inputs = Vec::new();

    for (row, record) in csv_reader.records().enumerate() {
        let record = record?;
        // Header is line 1
        let line = row + 2;

        let category = record
            .get(category_idx)
            .map(str::trim)
            .unwrap_or_default();
        if category.is_empty() {
            return Err(CostsplitError::Import(format!(
                "Row {}: category is empty",
                line
            )));
        }

        let amount_field = record.get(amount_idx).map(str::trim).unwrap_or_default();
        let amount = Money::parse(amount_field).map_err(|e| {
            CostsplitError::Import(format!("Row {}: {}", line, e))
        })?;

        let percentage = match percentage_idx.and_then(|idx| record.get(idx)).map(str::trim) {
            Some("") | None => None,
            Some(field) => Some(Percentage::parse(field).map_err(|e| {
                CostsplitError::Import(format!("Row {}: {}", line, e))
            })?),
        };

        inputs.push(SegmentInput {
            category: category.to_string(),
            amount,
            percentage,
        });
    }

    if inputs.is_empty() {
        return Err(CostsplitError::Import(
            "CSV contains no segment rows".into(),
        ));
    }

    Ok(inputs)
}

fn find_column(headers: &csv::StringRecord, name: &str) -> CostsplitResult<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| CostsplitError::Import(format!("Missing required column '{}'", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let csv_data = "category,amount\nTravel,60.00\nMeals,40.00\n";
        let inputs = parse_segments_csv(csv_data.as_bytes()).unwrap();

        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0].category, "Travel");
        assert_eq!(inputs[0].amount, Money::from_cents(6000));
        assert_eq!(inputs[0].percentage, None);
    }

    #[test]
    fn test_parse_with_percentage_column() {
        let csv_data = "category,amount,percentage\nTravel,60.00,60.00\nMeals,40.00,\n";
        let inputs = parse_segments_csv(csv_data.as_bytes()).unwrap();

        assert_eq!(
            inputs[0].percentage,
            Some(Percentage::from_hundredths(6000))
        );
        assert_eq!(inputs[1].percentage, None);
    }

    #[test]
    fn test_parse_headers_case_insensitive() {
        let csv_data = "Category,Amount\nTravel,60.00\n";
        let inputs = parse_segments_csv(csv_data.as_bytes()).unwrap();
        assert_eq!(inputs.len(), 1);
    }

    #[test]
    fn test_missing_column_rejected() {
        let csv_data = "category\nTravel\n";
        let err = parse_segments_csv(csv_data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("amount"));
    }

    #[test]
    fn test_bad_amount_reports_row() {
        let csv_data = "category,amount\nTravel,sixty\n";
        let err = parse_segments_csv(csv_data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Row 2"));
    }

    #[test]
    fn test_empty_file_rejected() {
        let csv_data = "category,amount\n";
        let err = parse_segments_csv(csv_data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("no segment rows"));
    }
}
