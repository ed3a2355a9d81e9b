use crate::error::{DashboardError, Result};
use crate::schema::REGION_COLUMNS;
use crate::types::{Aggregate, Dataset, GroupFilter, Series};

/// Sum each of `columns` over the rows selected by `filter` (all rows when `None`).
///
/// An empty selection is valid and gives zero for every column. A column
/// named more than once is summed once, at its first position.
pub fn aggregate(dataset: &Dataset, columns: &[&str], filter: Option<&GroupFilter>) -> Result<Aggregate> {
    let mut unique: Vec<&str> = Vec::with_capacity(columns.len());
    for c in columns {
        if !unique.contains(c) {
            unique.push(*c);
        }
    }
    let columns = unique;
    let indices = columns
        .iter()
        .map(|c| dataset.column_index(c))
        .collect::<Result<Vec<_>>>()?;

    let mut sums = vec![0.0; columns.len()];
    for record in dataset.records() {
        if filter.is_some_and(|f| !f.contains(&record.turma)) {
            continue;
        }
        for (sum, &idx) in sums.iter_mut().zip(&indices) {
            *sum += record.values[idx];
        }
    }
    Ok(columns.iter().copied().zip(sums).collect())
}

fn column_sum(dataset: &Dataset, column: &str) -> Result<f64> {
    Ok(dataset.column_values(column)?.iter().sum())
}

/// `100 * sum(column) / sum(denominator)`, failing when the denominator sums to zero.
pub fn try_percentage(dataset: &Dataset, column: &str, denominator: &str) -> Result<f64> {
    let num = column_sum(dataset, column)?;
    let den = column_sum(dataset, denominator)?;
    if den == 0.0 {
        return Err(DashboardError::DivisionByZero {
            column: column.to_string(),
            denominator: denominator.to_string(),
        });
    }
    Ok(100.0 * num / den)
}

/// Same as [`try_percentage`] but a zero denominator yields `0.0`.
pub fn percentage(dataset: &Dataset, column: &str, denominator: &str) -> Result<f64> {
    match try_percentage(dataset, column, denominator) {
        Err(DashboardError::DivisionByZero { .. }) => {
            log::debug!("{} sums to zero, reporting {} as 0%", denominator, column);
            Ok(0.0)
        }
        other => other,
    }
}

/// Per-class values for "by Turma" charts: the category axis is the `Turma`
/// of each row, with one series per column.
pub fn group_series(dataset: &Dataset, columns: &[&str]) -> Result<(Vec<String>, Vec<Series>)> {
    let categories = dataset.records().iter().map(|r| r.turma.clone()).collect();
    let series = columns
        .iter()
        .map(|c| {
            Ok(Series {
                name: c.to_string(),
                values: dataset.column_values(c)?,
            })
        })
        .collect::<Result<_>>()?;
    Ok((categories, series))
}

/// Totals of the one-hot `Regiao1..Regiao6` columns, keyed by region id.
pub fn region_aggregate(dataset: &Dataset) -> Result<Aggregate> {
    aggregate(dataset, &REGION_COLUMNS, None)
}

/// Sum `value_column` per categorical region label. Rows without a label are
/// skipped; labels keep first-seen order.
pub fn region_aggregate_by_label(dataset: &Dataset, value_column: &str) -> Result<Aggregate> {
    let idx = dataset.column_index(value_column)?;
    let mut agg = Aggregate::new();
    for record in dataset.records() {
        if let Some(region) = &record.region {
            agg.add(region, record.values[idx]);
        }
    }
    Ok(agg)
}

/// Distinct `Turma` labels in first-seen order.
pub fn available_groups(dataset: &Dataset) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for record in dataset.records() {
        if !seen.contains(&record.turma) {
            seen.push(record.turma.clone());
        }
    }
    seen
}
