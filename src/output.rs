use crate::dashboard::DashboardView;
use crate::error::Result;
use crate::types::{ChartPointRow, ChartSpec, KpiRow, MarkerRow};
use crate::util::{format_count, format_number};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{builder::Builder, settings::Style, Table, Tabled};

/// What gets written to `dashboard.json`.
#[derive(Debug, Serialize)]
pub struct DashboardExport<'a> {
    pub generated_at: DateTime<Local>,
    pub source: &'a Path,
    /// Selected classes; `None` means every class.
    pub turmas: Option<Vec<String>>,
    pub view: &'a DashboardView,
}

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Write `dashboard.json` and `chart_data.csv` into `dir`. Returns both paths.
pub fn export(dir: &Path, export: &DashboardExport<'_>) -> Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(dir)?;
    let json = dir.join("dashboard.json");
    let csv = dir.join("chart_data.csv");
    write_json(&json, export)?;
    write_csv(&csv, &chart_points(export.view.charts()))?;
    log::info!("Exported dashboard to {} and {}", json.display(), csv.display());
    Ok((json, csv))
}

pub fn kpi_rows(view: &DashboardView) -> Vec<KpiRow> {
    view.kpis
        .iter()
        .map(|k| KpiRow { label: k.label.clone(), value: k.display.clone() })
        .collect()
}

pub fn marker_rows(view: &DashboardView) -> Vec<MarkerRow> {
    view.map
        .markers
        .iter()
        .map(|m| MarkerRow {
            region: m.region.clone(),
            label: m.label.clone(),
            lat: format!("{:.6}", m.lat),
            lon: format!("{:.6}", m.lon),
            count: format_count(m.count),
            radius: format_number(m.radius, 1),
        })
        .collect()
}

/// Flatten charts into one row per (category, series) point.
pub fn chart_points<'a>(charts: impl Iterator<Item = &'a ChartSpec>) -> Vec<ChartPointRow> {
    let mut rows = Vec::new();
    for chart in charts {
        let kind = serde_json::to_value(chart.kind)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        for series in &chart.series {
            for (category, value) in chart.categories.iter().zip(&series.values) {
                rows.push(ChartPointRow {
                    chart: chart.title.clone(),
                    kind: kind.clone(),
                    category: category.clone(),
                    series: series.name.clone(),
                    value: *value,
                });
            }
        }
    }
    rows
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

/// Render a chart as a markdown table: categories down, series across.
pub fn chart_table(chart: &ChartSpec) -> String {
    let mut builder = Builder::default();
    let mut header = vec![String::new()];
    header.extend(chart.series.iter().map(|s| s.name.clone()));
    builder.push_record(header);
    for (i, category) in chart.categories.iter().enumerate() {
        let mut record = vec![category.clone()];
        record.extend(chart.series.iter().map(|s| format_count(s.values[i])));
        builder.push_record(record);
    }
    builder.build().with(Style::markdown()).to_string()
}

pub fn print_view(view: &DashboardView) {
    println!("Métricas-Chave ({} turmas)\n", view.rows);
    preview_table_rows(&kpi_rows(view), usize::MAX);

    for section in &view.sections {
        println!("== {} ==\n", section.title);
        for chart in &section.charts {
            println!("{}", chart.title);
            if chart.categories.is_empty() {
                println!("(no rows)\n");
            } else {
                println!("{}\n", chart_table(chart));
            }
        }
    }

    println!("Mapa de Impacto (centro {:.2}, {:.2})\n", view.map.center.0, view.map.center.1);
    preview_table_rows(&marker_rows(view), usize::MAX);
    for name in &view.map.unknown_regions {
        println!("Warning: region '{}' is not in the registry and was not plotted.", name);
    }
}
