//! Dashboard settings, read from an optional TOML file and the environment.

use crate::error::Result;
use crate::regions::{LinearRadius, MarkerPresence, Region, RegionRegistry};
use crate::schema::SchemaVariant;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DATA_ENV: &str = "HAIL_DASHBOARD_DATA";
pub const OUTPUT_ENV: &str = "HAIL_DASHBOARD_OUTPUT";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaChoice {
    /// Pick from the file extension.
    #[default]
    Auto,
    Positional,
    Named,
}

impl SchemaChoice {
    pub fn variant(self) -> Option<SchemaVariant> {
        match self {
            SchemaChoice::Auto => None,
            SchemaChoice::Positional => Some(SchemaVariant::Positional),
            SchemaChoice::Named => Some(SchemaVariant::Named),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub min_radius: f64,
    pub radius_per_unit: f64,
    pub presence: MarkerPresence,
    pub center: (f64, f64),
    pub zoom: u8,
}

impl Default for MapConfig {
    fn default() -> Self {
        let radius = LinearRadius::default();
        MapConfig {
            min_radius: radius.min_radius,
            radius_per_unit: radius.per_unit,
            presence: MarkerPresence::DataOnly,
            center: (-27.64, -52.28),
            zoom: 12,
        }
    }
}

impl MapConfig {
    pub fn radius(&self) -> LinearRadius {
        LinearRadius { min_radius: self.min_radius, per_unit: self.radius_per_unit }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub schema: SchemaChoice,
    pub output_dir: PathBuf,
    pub map: MapConfig,
    /// Replaces the built-in region registry when non-empty.
    pub regions: Vec<Region>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            data_path: PathBuf::from("Dados_21A.xlsx"),
            schema: SchemaChoice::Auto,
            output_dir: PathBuf::from("."),
            map: MapConfig::default(),
            regions: Vec::new(),
        }
    }
}

impl DashboardConfig {
    /// Defaults, overlaid by `path` (if given) and then by the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => {
                log::info!("Reading config from {}", p.display());
                Self::from_toml(&std::fs::read_to_string(p)?)?
            }
            None => DashboardConfig::default(),
        };
        if let Ok(data) = std::env::var(DATA_ENV) {
            config.data_path = PathBuf::from(data);
        }
        if let Ok(out) = std::env::var(OUTPUT_ENV) {
            config.output_dir = PathBuf::from(out);
        }
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn registry(&self) -> RegionRegistry {
        if self.regions.is_empty() {
            RegionRegistry::school_community()
        } else {
            RegionRegistry::new(self.regions.clone())
        }
    }
}
