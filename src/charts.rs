//! Declarative chart descriptions. Nothing here draws; the host decides how a
//! [`ChartSpec`] ends up on screen.

use crate::aggregate::aggregate;
use crate::error::{DashboardError, Result};
use crate::schema::QTD_ENTREVISTADOS;
use crate::types::{ChartKind, ChartSpec, Dataset, Series};

pub fn build_bar(labels: &[String], values: &[f64], title: &str) -> Result<ChartSpec> {
    check_len(title, labels.len(), values.len())?;
    Ok(ChartSpec {
        title: title.to_string(),
        kind: ChartKind::Bar,
        categories: labels.to_vec(),
        series: vec![Series { name: title.to_string(), values: values.to_vec() }],
    })
}

pub fn build_stacked_bar(category_axis: &[String], series_map: Vec<Series>, title: &str) -> Result<ChartSpec> {
    multi_series(ChartKind::StackedBar, category_axis, series_map, title)
}

/// Side-by-side bars, one group per category.
pub fn build_grouped_bar(category_axis: &[String], series_map: Vec<Series>, title: &str) -> Result<ChartSpec> {
    multi_series(ChartKind::GroupedBar, category_axis, series_map, title)
}

/// A pie whose slices all sum to zero is still a valid (empty) chart.
pub fn build_pie(label_value_pairs: &[(String, f64)], title: &str) -> Result<ChartSpec> {
    if let Some((label, value)) = label_value_pairs.iter().find(|(_, v)| *v < 0.0) {
        return Err(DashboardError::NegativeValue { label: label.clone(), value: *value });
    }
    let (categories, values) = label_value_pairs.iter().cloned().unzip();
    Ok(ChartSpec {
        title: title.to_string(),
        kind: ChartKind::Pie,
        categories,
        series: vec![Series { name: title.to_string(), values }],
    })
}

/// Yes/no pie over the interviewed count: `Sim` is the column total, `Não`
/// the remainder of `QtdEntrevistados`.
pub fn yes_no_pie(dataset: &Dataset, column: &str, title: &str) -> Result<ChartSpec> {
    let agg = aggregate(dataset, &[column, QTD_ENTREVISTADOS], None)?;
    let yes = agg.get(column).unwrap_or(0.0);
    let total = agg.get(QTD_ENTREVISTADOS).unwrap_or(0.0);
    let mut no = total - yes;
    if no < 0.0 {
        log::warn!("{} ({}) exceeds {} ({}); clamping 'Não' to 0", column, yes, QTD_ENTREVISTADOS, total);
        no = 0.0;
    }
    build_pie(&[("Sim".to_string(), yes), ("Não".to_string(), no)], title)
}

fn multi_series(kind: ChartKind, category_axis: &[String], series_map: Vec<Series>, title: &str) -> Result<ChartSpec> {
    for s in &series_map {
        check_len(&s.name, category_axis.len(), s.values.len())?;
    }
    Ok(ChartSpec {
        title: title.to_string(),
        kind,
        categories: category_axis.to_vec(),
        series: series_map,
    })
}

fn check_len(series: &str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(DashboardError::ShapeMismatch {
            series: series.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SEGURO_CARRO;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bar_keeps_labels_and_values() {
        let chart = build_bar(&labels(&["Leve", "Médio", "Severo"]), &[3.0, 3.0, 1.0], "Níveis de Dano").unwrap();
        assert_eq!(chart.kind, ChartKind::Bar);
        assert_eq!(chart.categories, vec!["Leve", "Médio", "Severo"]);
        assert_eq!(chart.series[0].values, vec![3.0, 3.0, 1.0]);
        assert_eq!(chart.total(), 7.0);
    }

    #[test]
    fn bar_length_mismatch() {
        let err = build_bar(&labels(&["Casa", "Apartamento"]), &[1.0], "Moradia").unwrap_err();
        assert!(matches!(err, DashboardError::ShapeMismatch { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn stacked_bar_checks_every_series() {
        let axis = labels(&["A", "B"]);
        let ok = vec![
            Series { name: "DanoLeve".into(), values: vec![2.0, 1.0] },
            Series { name: "DanoMedio".into(), values: vec![0.0, 3.0] },
        ];
        let chart = build_stacked_bar(&axis, ok, "Níveis de Dano por Turma").unwrap();
        assert_eq!(chart.kind, ChartKind::StackedBar);
        assert_eq!(chart.series.len(), 2);

        let bad = vec![
            Series { name: "DanoLeve".into(), values: vec![2.0, 1.0] },
            Series { name: "DanoSevero".into(), values: vec![1.0, 0.0, 4.0] },
        ];
        match build_grouped_bar(&axis, bad, "x").unwrap_err() {
            DashboardError::ShapeMismatch { series, expected, actual } => {
                assert_eq!((series.as_str(), expected, actual), ("DanoSevero", 2, 3));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn pie_rejects_negative_and_allows_zero_total() {
        let err = build_pie(&[("Sim".into(), -1.0)], "Seguro").unwrap_err();
        assert!(matches!(err, DashboardError::NegativeValue { .. }));

        let empty = build_pie(&[("Sim".into(), 0.0), ("Não".into(), 0.0)], "Seguro").unwrap();
        assert_eq!(empty.kind, ChartKind::Pie);
        assert_eq!(empty.total(), 0.0);
    }

    #[test]
    fn yes_no_pie_uses_interviewed_remainder() {
        let ds = Dataset::from_columns(
            vec!["A".into(), "B".into()],
            vec![
                (QTD_ENTREVISTADOS.into(), vec![10.0, 10.0]),
                (SEGURO_CARRO.into(), vec![2.0, 0.0]),
            ],
        )
        .unwrap();
        let pie = yes_no_pie(&ds, SEGURO_CARRO, "Cobertura de Seguro para Carro").unwrap();
        assert_eq!(pie.categories, vec!["Sim", "Não"]);
        assert_eq!(pie.series[0].values, vec![2.0, 18.0]);
    }

    #[test]
    fn yes_no_pie_clamps_inconsistent_counts() {
        let ds = Dataset::from_columns(
            vec!["A".into()],
            vec![(QTD_ENTREVISTADOS.into(), vec![3.0]), (SEGURO_CARRO.into(), vec![5.0])],
        )
        .unwrap();
        let pie = yes_no_pie(&ds, SEGURO_CARRO, "x").unwrap();
        assert_eq!(pie.series[0].values, vec![5.0, 0.0]);
    }
}
