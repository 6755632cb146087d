//! Correction file decoding.

use super::error::UpdateError;

/// Column holding the subject (patient) id.
pub const SUBJECT_COLUMN: &str = "patientid";

/// One data row of a correction file. Blank cells are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectionRow {
    pub subject_id: Option<i64>,
    pub value: Option<String>,
}

/// Reads a CSV with a header row, keeping `patientid` and `value_column`.
///
/// Other columns are ignored. Subject ids may be written as integers or as
/// integral floats (`123.0`), as spreadsheet exports often do.
pub fn parse_corrections(
    bytes: &[u8],
    value_column: &str,
) -> Result<Vec<CorrectionRow>, UpdateError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| UpdateError::malformed(format!("unreadable header: {e}")))?
        .clone();

    let column_index = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| UpdateError::malformed(format!("missing required column '{name}'")))
    };
    let subject_index = column_index(SUBJECT_COLUMN)?;
    let value_index = column_index(value_column)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| UpdateError::malformed(e.to_string()))?;
        let line = record.position().map_or(0, |p| p.line());

        let subject_id = match non_blank(record.get(subject_index)) {
            None => None,
            Some(cell) => Some(parse_subject_id(cell).ok_or_else(|| {
                UpdateError::malformed(format!("line {line}: invalid {SUBJECT_COLUMN} '{cell}'"))
            })?),
        };
        let value = non_blank(record.get(value_index)).map(str::to_string);

        rows.push(CorrectionRow { subject_id, value });
    }

    Ok(rows)
}

fn non_blank(cell: Option<&str>) -> Option<&str> {
    cell.map(str::trim).filter(|c| !c.is_empty())
}

fn parse_subject_id(cell: &str) -> Option<i64> {
    if let Ok(id) = cell.parse::<i64>() {
        return Some(id);
    }

    let float = cell.parse::<f64>().ok()?;
    let in_range = float >= i64::MIN as f64 && float < i64::MAX as f64;
    (float.is_finite() && float.fract() == 0.0 && in_range).then_some(float as i64)
}
