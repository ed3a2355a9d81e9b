use crate::error::{DashboardError, Result};
use crate::schema::{normalize, SchemaVariant};
use crate::types::{Dataset, RawTable};
use crate::util::label_from_f64;
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub variant: SchemaVariant,
    pub total_rows: usize,
    pub filled_cells: usize,
    pub unparsed_cells: usize,
}

/// Read a survey file and normalize it. `variant` overrides the choice made
/// from the file extension.
pub fn load_dataset(path: &Path, variant: Option<SchemaVariant>) -> Result<(Dataset, LoadReport)> {
    if !path.is_file() {
        return Err(DashboardError::FileNotFound(path.to_path_buf()));
    }
    let ext_variant = SchemaVariant::for_path(path);
    let variant = variant
        .or(ext_variant)
        .ok_or_else(|| DashboardError::UnsupportedFormat(path.to_path_buf()))?;

    let raw = if is_csv(path) {
        read_csv(std::fs::File::open(path)?)?
    } else if ext_variant.is_some() {
        read_workbook(path)?
    } else {
        // Unknown extension with an explicit variant: treat it as delimited text.
        read_csv(std::fs::File::open(path)?)?
    };
    log::info!(
        "Read {} rows x {} columns from {}",
        raw.rows.len(),
        raw.headers.len(),
        path.display()
    );

    let (dataset, norm) = normalize(&raw, variant)?;
    let report = LoadReport {
        variant,
        total_rows: norm.rows,
        filled_cells: norm.filled_cells,
        unparsed_cells: norm.unparsed_cells,
    };
    Ok((dataset, report))
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

/// Read delimited text. The first row is the header; short rows are kept as-is
/// so the normalizer can decide what they mean.
pub fn read_csv<R: Read>(reader: R) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new().flexible(true).trim(csv::Trim::All).from_reader(reader);
    let headers = rdr.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        rows.push(
            record
                .iter()
                .map(|c| if c.is_empty() { None } else { Some(c.to_string()) })
                .collect(),
        );
    }
    Ok(RawTable { headers, rows })
}

/// Read the first sheet of a workbook. Row 1 is the header.
pub fn read_workbook(path: &Path) -> Result<RawTable> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| DashboardError::EmptyWorkbook(path.to_path_buf()))?;
    let range = workbook.worksheet_range(&sheet_name)?;

    let mut rows_iter = range.rows();
    let headers = match rows_iter.next() {
        Some(header) => header.iter().map(|c| cell_to_string(c).unwrap_or_default()).collect(),
        None => Vec::new(),
    };
    let rows = rows_iter
        .map(|row| row.iter().map(cell_to_string).collect::<Vec<_>>())
        .filter(|row| row.iter().any(Option::is_some))
        .collect();
    Ok(RawTable { headers, rows })
}

fn cell_to_string(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) if s.trim().is_empty() => None,
        Data::String(s) => Some(s.trim().to_string()),
        Data::Float(f) => Some(label_from_f64(*f)),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        Data::Error(e) => {
            log::warn!("Cell error in workbook: {:?}", e);
            None
        }
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DANO_SEVERO;

    const HEADER: &str = "id,turma,q1,q2,q3,q4,q5,q6,q7,q8,q9,q10,q11,q12,q13,q14,q15,q16,q17,q18,q19,q20,q21,q22,r1,r2,r3,r4,r5,r6";

    #[test]
    fn read_csv_keeps_header_and_blanks() {
        let text = format!("{}\n1,21A,10,,3\n\n", HEADER);
        let raw = read_csv(text.as_bytes()).unwrap();
        assert_eq!(raw.headers.len(), 30);
        assert_eq!(raw.rows.len(), 1);
        assert_eq!(
            raw.rows[0],
            vec![Some("1".to_string()), Some("21A".to_string()), Some("10".to_string()), None, Some("3".to_string())]
        );
    }

    #[test]
    fn csv_normalizes_positionally() {
        let line = "1,21A,10,8,2,5,2,0,1,3,2,4,1,0,0,0,2,1,0,0,1,2,0,6,1,0,0,0,0,0";
        let raw = read_csv(format!("{}\n{}\n", HEADER, line).as_bytes()).unwrap();
        let (ds, _) = normalize(&raw, SchemaVariant::Positional).unwrap();
        assert_eq!(ds.column_values(DANO_SEVERO).unwrap(), vec![1.0]);
    }

    #[test]
    fn missing_file_is_file_not_found() {
        let path = Path::new("definitely/not/here/Dados_21A.xlsx");
        match load_dataset(path, None) {
            Err(DashboardError::FileNotFound(p)) => assert_eq!(p, path),
            other => panic!("unexpected result: {:?}", other.map(|(_, r)| r)),
        }
    }

    #[test]
    fn workbook_floats_become_labels() {
        assert_eq!(cell_to_string(&Data::Float(21.0)), Some("21".into()));
        assert_eq!(cell_to_string(&Data::String("  ".into())), None);
        assert_eq!(cell_to_string(&Data::Bool(true)), Some("1".into()));
        assert_eq!(cell_to_string(&Data::Empty), None);
    }
}
