//! One recompute pass: filter the dataset, then derive every KPI, chart and
//! map marker the host shows. Holds no state between passes.

use crate::aggregate::{aggregate, group_series, percentage, region_aggregate, region_aggregate_by_label};
use crate::charts::{build_bar, build_grouped_bar, build_stacked_bar, yes_no_pie};
use crate::config::DashboardConfig;
use crate::error::Result;
use crate::regions::{build_markers, LinearRadius, MarkerPresence, RegionRegistry};
use crate::schema::*;
use crate::types::{ChartSpec, Dataset, GroupFilter, Kpi, MapMarker};
use crate::util::{format_count, format_number};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub title: String,
    pub charts: Vec<ChartSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center: (f64, f64),
    pub zoom: u8,
    pub markers: Vec<MapMarker>,
    /// Region names in the data that the registry does not know.
    pub unknown_regions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub rows: usize,
    pub kpis: Vec<Kpi>,
    pub sections: Vec<Section>,
    pub map: MapView,
}

impl DashboardView {
    pub fn charts(&self) -> impl Iterator<Item = &ChartSpec> {
        self.sections.iter().flat_map(|s| s.charts.iter())
    }
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    registry: RegionRegistry,
    radius: LinearRadius,
    presence: MarkerPresence,
    center: (f64, f64),
    zoom: u8,
}

impl Dashboard {
    pub fn new(config: &DashboardConfig) -> Self {
        Dashboard {
            registry: config.registry(),
            radius: config.map.radius(),
            presence: config.map.presence,
            center: config.map.center,
            zoom: config.map.zoom,
        }
    }

    /// Build the full view for the classes in `filter` (every class when `None`).
    pub fn recompute(&self, dataset: &Dataset, filter: Option<&GroupFilter>) -> Result<DashboardView> {
        let owned;
        let data = match filter {
            Some(f) => {
                owned = dataset.filtered(f);
                &owned
            }
            None => dataset,
        };
        log::debug!("Recomputing dashboard over {} of {} rows", data.len(), dataset.len());

        let sections = vec![
            damage_section(data)?,
            insurance_section(data)?,
            recovery_section(data)?,
            social_section(data)?,
        ];

        // Workbooks with a categorical `Regiao` column map damaged homes per
        // label; otherwise the one-hot region columns are used.
        let regions = if dataset.records().iter().any(|r| r.region.is_some()) {
            region_aggregate_by_label(data, DANOS_RESIDENCIA)?
        } else {
            region_aggregate(data)?
        };
        let marker_set = build_markers(&regions, &self.registry, &self.radius, self.presence);
        let map = MapView {
            center: self.center,
            zoom: self.zoom,
            unknown_regions: marker_set.unknown_regions(),
            markers: marker_set.markers,
        };

        Ok(DashboardView {
            rows: data.len(),
            kpis: kpis(data)?,
            sections,
            map,
        })
    }
}

fn kpis(data: &Dataset) -> Result<Vec<Kpi>> {
    let total = aggregate(data, &[QTD_ENTREVISTADOS], None)?.total();
    let mut out = vec![Kpi {
        label: "Total de Alunos".to_string(),
        value: total,
        display: format_count(total),
    }];
    for (label, column) in [
        ("Danos Residência (%)", DANOS_RESIDENCIA),
        ("Seguro Carro (%)", SEGURO_CARRO),
        ("Seguro Residência (%)", SEGURO_RESIDENCIA),
    ] {
        let pct = percentage(data, column, QTD_ENTREVISTADOS)?;
        out.push(Kpi { label: label.to_string(), value: pct, display: format_number(pct, 1) });
    }
    Ok(out)
}

/// Bar chart of column totals with human labels.
fn totals_bar(data: &Dataset, columns: &[(&str, &str)], title: &str) -> Result<ChartSpec> {
    let names: Vec<&str> = columns.iter().map(|(c, _)| *c).collect();
    let agg = aggregate(data, &names, None)?;
    let labels: Vec<String> = columns.iter().map(|(_, l)| l.to_string()).collect();
    build_bar(&labels, &agg.values(), title)
}

fn damage_section(data: &Dataset) -> Result<Section> {
    let (turmas, housing) = group_series(data, &[MORA_CASA, MORA_APTO])?;
    let (_, levels) = group_series(data, &[DANO_LEVE, DANO_MEDIO, DANO_SEVERO])?;
    let (_, categories) = group_series(data, &[DANOS_RESIDENCIA, CARRO_DANIFICADO, ELETRO_MOVEIS])?;
    Ok(Section {
        title: "Danos".to_string(),
        charts: vec![
            build_grouped_bar(&turmas, housing, "Tipo de Moradia por Turma")?,
            build_stacked_bar(&turmas, levels, "Níveis de Dano por Turma")?,
            build_grouped_bar(&turmas, categories, "Danos em Categorias")?,
            totals_bar(
                data,
                &[(DANO_LEVE, "Leve"), (DANO_MEDIO, "Médio"), (DANO_SEVERO, "Severo")],
                "Níveis de Dano",
            )?,
        ],
    })
}

fn insurance_section(data: &Dataset) -> Result<Section> {
    Ok(Section {
        title: "Seguros".to_string(),
        charts: vec![
            yes_no_pie(data, SEGURO_CARRO, "Cobertura de Seguro para Carro")?,
            yes_no_pie(data, SEGURO_RESIDENCIA, "Cobertura de Seguro para Residência")?,
        ],
    })
}

fn recovery_section(data: &Dataset) -> Result<Section> {
    let (turmas, materials) =
        group_series(data, &[CONSERTO_TELHA, CONSERTO_BRASILITE, CONSERTO_ALUZINCO, NAO_CONSERTOU])?;
    Ok(Section {
        title: "Recuperação".to_string(),
        charts: vec![
            totals_bar(
                data,
                &[(CONSERTO_DEFINITIVO, "Definitivo"), (NAO_CONSERTOU, "Não consertou / Não sabe")],
                "Tipo de Conserto",
            )?,
            build_stacked_bar(&turmas, materials, "Materiais Usados para Cobertura de Telhado")?,
            totals_bar(
                data,
                &[
                    (CONSERTO_TELHA, "Telha"),
                    (CONSERTO_BRASILITE, "Brasilite"),
                    (CONSERTO_ALUZINCO, "Aluzinco"),
                    (NAO_CONSERTOU, "Não sabe"),
                ],
                "Materiais Utilizados",
            )?,
            yes_no_pie(data, LONA_MANTA, "Conseguiu Lona ou Manta")?,
        ],
    })
}

fn social_section(data: &Dataset) -> Result<Section> {
    Ok(Section {
        title: "Impacto Social".to_string(),
        charts: vec![
            yes_no_pie(data, SAUDE_MENTAL, "Afetou a Saúde Mental")?,
            yes_no_pie(data, DESALOJADO, "Alguém Ficou Desalojado")?,
            yes_no_pie(data, AJUDOU, "Ajudou Voluntariamente")?,
        ],
    })
}
