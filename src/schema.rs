//! Column schema for the hail survey and the normalizer that maps a raw
//! table onto it.

use crate::error::{DashboardError, Result};
use crate::types::{Dataset, RawTable, Record};
use crate::util::parse_f64_safe;
use serde::Deserialize;
use std::path::Path;

pub const ID: &str = "ID";
pub const TURMA: &str = "Turma";
/// Optional categorical region column (named-header workbooks only).
pub const REGIAO: &str = "Regiao";

pub const QTD_ENTREVISTADOS: &str = "QtdEntrevistados";
pub const MORA_CASA: &str = "MoraCasa";
pub const MORA_APTO: &str = "MoraApto";
pub const DANOS_RESIDENCIA: &str = "DanosResidencia";
pub const DANO_LEVE: &str = "DanoLeve";
pub const DANO_MEDIO: &str = "DanoMedio";
pub const DANO_SEVERO: &str = "DanoSevero";
pub const CARRO_DANIFICADO: &str = "CarroDanificado";
pub const SEGURO_CARRO: &str = "SeguroCarro";
pub const SEGURO_RESIDENCIA: &str = "SeguroResidencia";
pub const ELETRO_MOVEIS: &str = "EletroouMoveisDanificados";
pub const LONA_MANTA: &str = "ConseguiuLonaManta";
pub const CONHECE_PREJUIZO: &str = "ConheceValorPrejuizo";
pub const VALOR_PREJUIZO: &str = "ValorPrejuizoReais";
pub const CONSERTO_DEFINITIVO: &str = "ConsertoDefinitivo";
pub const CONSERTO_TELHA: &str = "ConsertocomTelha";
pub const CONSERTO_BRASILITE: &str = "ConsertocomBrasilite";
pub const CONSERTO_ALUZINCO: &str = "ConsertocomAluzinco";
pub const NAO_CONSERTOU: &str = "NaoConsertouNaoSabe";
pub const SAUDE_MENTAL: &str = "AfetouSaudeMental";
pub const DESALOJADO: &str = "AlguemDesalojado";
pub const AJUDOU: &str = "AjudouVoluntariamente";

/// One-hot region count columns, in registry order.
pub const REGION_COLUMNS: [&str; 6] = ["Regiao1", "Regiao2", "Regiao3", "Regiao4", "Regiao5", "Regiao6"];

/// Every column of the survey export, in file order. The first two are text.
pub const SURVEY_COLUMNS: [&str; 30] = [
    ID,
    TURMA,
    QTD_ENTREVISTADOS,
    MORA_CASA,
    MORA_APTO,
    DANOS_RESIDENCIA,
    DANO_LEVE,
    DANO_MEDIO,
    DANO_SEVERO,
    CARRO_DANIFICADO,
    SEGURO_CARRO,
    SEGURO_RESIDENCIA,
    ELETRO_MOVEIS,
    LONA_MANTA,
    CONHECE_PREJUIZO,
    VALOR_PREJUIZO,
    CONSERTO_DEFINITIVO,
    CONSERTO_TELHA,
    CONSERTO_BRASILITE,
    CONSERTO_ALUZINCO,
    NAO_CONSERTOU,
    SAUDE_MENTAL,
    DESALOJADO,
    AJUDOU,
    REGION_COLUMNS[0],
    REGION_COLUMNS[1],
    REGION_COLUMNS[2],
    REGION_COLUMNS[3],
    REGION_COLUMNS[4],
    REGION_COLUMNS[5],
];

/// Numeric part of the schema (everything after `ID` and `Turma`).
pub fn numeric_columns() -> &'static [&'static str] {
    &SURVEY_COLUMNS[2..]
}

/// How the raw headers relate to the semantic column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaVariant {
    /// Headers are overwritten by position; column count must match exactly.
    Positional,
    /// Headers must already carry every semantic name.
    Named,
}

impl SchemaVariant {
    /// CSV exports are positional, workbooks carry descriptive headers.
    pub fn for_path(path: &Path) -> Option<SchemaVariant> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(SchemaVariant::Positional),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Some(SchemaVariant::Named),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizeReport {
    pub rows: usize,
    /// Blank or absent numeric cells filled with zero.
    pub filled_cells: usize,
    /// Non-numeric cells in numeric columns, also zeroed.
    pub unparsed_cells: usize,
}

/// Map `raw` onto the survey schema. The raw table is left untouched.
pub fn normalize(raw: &RawTable, variant: SchemaVariant) -> Result<(Dataset, NormalizeReport)> {
    let layout = match variant {
        SchemaVariant::Positional => positional_layout(raw)?,
        SchemaVariant::Named => named_layout(raw)?,
    };

    let mut report = NormalizeReport::default();
    let mut records = Vec::with_capacity(raw.rows.len());
    for (row_no, row) in raw.rows.iter().enumerate() {
        if variant == SchemaVariant::Positional && row.len() > SURVEY_COLUMNS.len() {
            return Err(DashboardError::SchemaMismatch {
                expected: SURVEY_COLUMNS.len(),
                actual: row.len(),
                row: Some(row_no + 1),
            });
        }
        let cell = |idx: usize| row.get(idx).and_then(|c| c.as_deref());
        let text = |idx: usize| cell(idx).map(str::trim).unwrap_or("").to_string();

        let mut values = Vec::with_capacity(layout.numeric.len());
        for (name, &idx) in numeric_columns().iter().zip(&layout.numeric) {
            let Some(idx) = idx else {
                values.push(0.0);
                continue;
            };
            let raw_cell = cell(idx).map(str::trim).filter(|c| !c.is_empty());
            let value = match (raw_cell, parse_f64_safe(raw_cell)) {
                (_, Some(v)) => v,
                (None, None) => {
                    report.filled_cells += 1;
                    0.0
                }
                (Some(bad), None) => {
                    log::warn!("Row {}: non-numeric value '{}' in {}, using 0", row_no + 1, bad, name);
                    report.unparsed_cells += 1;
                    0.0
                }
            };
            values.push(value);
        }

        records.push(Record {
            id: layout.id.map(text).unwrap_or_else(|| (row_no + 1).to_string()),
            turma: text(layout.turma),
            region: layout.region.map(text).filter(|r| !r.is_empty()),
            values,
        });
    }
    report.rows = records.len();

    let columns = numeric_columns().iter().map(|c| c.to_string()).collect();
    Ok((Dataset::new(columns, records)?, report))
}

/// Where each semantic column lives in the raw row. `None` columns are
/// absent from the source and read as zero (or the row number for `id`).
struct Layout {
    id: Option<usize>,
    turma: usize,
    region: Option<usize>,
    numeric: Vec<Option<usize>>,
}

fn positional_layout(raw: &RawTable) -> Result<Layout> {
    if raw.headers.len() != SURVEY_COLUMNS.len() {
        return Err(DashboardError::SchemaMismatch {
            expected: SURVEY_COLUMNS.len(),
            actual: raw.headers.len(),
            row: None,
        });
    }
    Ok(Layout {
        id: Some(0),
        turma: 1,
        region: None,
        numeric: (2..SURVEY_COLUMNS.len()).map(Some).collect(),
    })
}

/// Workbooks that carry a categorical `Regiao` column may omit `ID` and the
/// one-hot region columns; everything else is required.
fn named_layout(raw: &RawTable) -> Result<Layout> {
    let find = |name: &str| raw.headers.iter().position(|h| h.trim() == name);
    let region = find(REGIAO);
    let optional = |name: &str| region.is_some() && (name == ID || REGION_COLUMNS.contains(&name));
    let missing: Vec<String> = SURVEY_COLUMNS
        .iter()
        .filter(|name| find(**name).is_none() && !optional(**name))
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(DashboardError::MissingColumn(missing));
    }
    let turma = find(TURMA).ok_or_else(|| DashboardError::MissingColumn(vec![TURMA.to_string()]))?;
    Ok(Layout {
        id: find(ID),
        turma,
        region,
        numeric: numeric_columns().iter().map(|n| find(*n)).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<Option<String>> {
        cells
            .iter()
            .map(|c| if c.is_empty() { None } else { Some(c.to_string()) })
            .collect()
    }

    fn positional_row(turma: &str, fill: &str) -> Vec<Option<String>> {
        let mut cells = vec!["1", turma];
        cells.extend(std::iter::repeat(fill).take(28));
        row(&cells)
    }

    #[test]
    fn positional_renames_by_position() {
        let raw = RawTable {
            headers: (0..30).map(|i| format!("Pergunta {}", i)).collect(),
            rows: vec![positional_row("21A", "2")],
        };
        let (ds, report) = normalize(&raw, SchemaVariant::Positional).unwrap();
        assert_eq!(ds.columns().len(), 28);
        assert_eq!(ds.columns()[0], QTD_ENTREVISTADOS);
        assert_eq!(ds.columns()[27], "Regiao6");
        assert_eq!(ds.records()[0].turma, "21A");
        assert_eq!(ds.column_values(DANO_LEVE).unwrap(), vec![2.0]);
        assert_eq!(report, NormalizeReport { rows: 1, filled_cells: 0, unparsed_cells: 0 });
    }

    #[test]
    fn positional_header_count_mismatch_is_reported() {
        let raw = RawTable { headers: vec!["a".into(); 29], rows: vec![] };
        let err = normalize(&raw, SchemaVariant::Positional).unwrap_err();
        assert!(matches!(err, DashboardError::SchemaMismatch { expected: 30, actual: 29, row: None }));
    }

    #[test]
    fn positional_long_row_is_reported() {
        let mut long = positional_row("21A", "1");
        long.push(Some("extra".into()));
        let raw = RawTable { headers: vec!["h".into(); 30], rows: vec![long] };
        let err = normalize(&raw, SchemaVariant::Positional).unwrap_err();
        assert!(matches!(err, DashboardError::SchemaMismatch { actual: 31, row: Some(1), .. }));
    }

    #[test]
    fn missing_and_bad_cells_become_zero() {
        let short = row(&["7", "21B", "10", "", "abc"]);
        let raw = RawTable { headers: vec!["h".into(); 30], rows: vec![short] };
        let (ds, report) = normalize(&raw, SchemaVariant::Positional).unwrap();
        let rec = &ds.records()[0];
        assert_eq!(rec.values[0], 10.0);
        assert!(rec.values[1..].iter().all(|v| *v == 0.0));
        assert_eq!(report.unparsed_cells, 1);
        assert_eq!(report.filled_cells, 26);
    }

    #[test]
    fn decimal_comma_cell_is_counted_as_unparsed() {
        let mut cells = positional_row("21A", "0");
        cells[2] = Some("2,5".into());
        let raw = RawTable { headers: vec!["h".into(); 30], rows: vec![cells] };
        let (ds, report) = normalize(&raw, SchemaVariant::Positional).unwrap();
        assert_eq!(ds.column_values(QTD_ENTREVISTADOS).unwrap(), vec![0.0]);
        assert_eq!(report.unparsed_cells, 1);
    }

    #[test]
    fn named_requires_every_column() {
        let headers: Vec<String> = SURVEY_COLUMNS
            .iter()
            .filter(|c| **c != DANO_MEDIO && **c != "Regiao6")
            .map(|c| c.to_string())
            .collect();
        let raw = RawTable { headers, rows: vec![] };
        let err = normalize(&raw, SchemaVariant::Named).unwrap_err();
        match err {
            DashboardError::MissingColumn(names) => assert_eq!(names, vec![DANO_MEDIO, "Regiao6"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn named_accepts_any_order_and_region_label() {
        let mut headers: Vec<String> = SURVEY_COLUMNS.iter().rev().map(|c| format!(" {} ", c)).collect();
        headers.push(REGIAO.into());
        let mut cells = vec![Some("0".to_string()); 30];
        cells[29] = Some("1".into()); // ID, reversed
        cells[28] = Some("21A".into()); // Turma
        let qtd_pos = headers.iter().position(|h| h.trim() == QTD_ENTREVISTADOS).unwrap();
        cells[qtd_pos] = Some("12".into());
        cells.push(Some("Zona Rural".into()));
        let raw = RawTable { headers, rows: vec![cells] };

        let (ds, _) = normalize(&raw, SchemaVariant::Named).unwrap();
        let rec = &ds.records()[0];
        assert_eq!(rec.id, "1");
        assert_eq!(rec.turma, "21A");
        assert_eq!(rec.region.as_deref(), Some("Zona Rural"));
        assert_eq!(ds.column_values(QTD_ENTREVISTADOS).unwrap(), vec![12.0]);
    }

    #[test]
    fn region_label_workbook_needs_no_one_hot_columns() {
        let mut headers: Vec<String> = numeric_columns()
            .iter()
            .filter(|c| !REGION_COLUMNS.contains(*c))
            .map(|c| c.to_string())
            .collect();
        headers.insert(0, TURMA.into());
        headers.push(REGIAO.into());
        let mut cells = vec![Some("1".to_string()); headers.len()];
        cells[0] = Some("21C".into());
        *cells.last_mut().unwrap() = Some("Região 4".into());
        let raw = RawTable { headers, rows: vec![cells] };

        let (ds, report) = normalize(&raw, SchemaVariant::Named).unwrap();
        let rec = &ds.records()[0];
        assert_eq!(rec.id, "1");
        assert_eq!(rec.region.as_deref(), Some("Região 4"));
        assert_eq!(ds.column_values(DANO_LEVE).unwrap(), vec![1.0]);
        for col in REGION_COLUMNS {
            assert_eq!(ds.column_values(col).unwrap(), vec![0.0]);
        }
        assert_eq!(report.filled_cells, 0);
    }

    #[test]
    fn one_hot_columns_stay_required_without_region_label() {
        let headers: Vec<String> = SURVEY_COLUMNS
            .iter()
            .filter(|c| !REGION_COLUMNS.contains(*c))
            .map(|c| c.to_string())
            .collect();
        let err = normalize(&RawTable { headers, rows: vec![] }, SchemaVariant::Named).unwrap_err();
        assert!(matches!(err, DashboardError::MissingColumn(ref names) if names.len() == 6));
    }

    #[test]
    fn variant_from_extension() {
        assert_eq!(SchemaVariant::for_path(Path::new("dados.CSV")), Some(SchemaVariant::Positional));
        assert_eq!(SchemaVariant::for_path(Path::new("Dados_21A.xlsx")), Some(SchemaVariant::Named));
        assert_eq!(SchemaVariant::for_path(Path::new("notes.txt")), None);
    }
}
