//! Region registry and map bubble construction.

use crate::error::DashboardError;
use crate::types::{Aggregate, MapMarker};
use crate::util::format_count;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Identifier used by the data (`Regiao1`..`Regiao6`).
    pub id: String,
    /// Display name (`Região 1`, `Zona Rural`).
    pub label: String,
    pub lat: f64,
    pub lon: f64,
}

impl Region {
    pub fn new(id: &str, label: &str, lat: f64, lon: f64) -> Self {
        Region { id: id.to_string(), label: label.to_string(), lat, lon }
    }
}

/// Fixed set of regions with their coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionRegistry {
    regions: Vec<Region>,
}

impl RegionRegistry {
    pub fn new(regions: Vec<Region>) -> Self {
        RegionRegistry { regions }
    }

    /// The six neighbourhoods of the surveyed school community.
    pub fn school_community() -> Self {
        RegionRegistry::new(vec![
            Region::new("Regiao1", "Região 1", -27.644250, -52.304118),
            Region::new("Regiao2", "Região 2", -27.647053, -52.284419),
            Region::new("Regiao3", "Região 3", -27.630867, -52.252368),
            Region::new("Regiao4", "Região 4", -27.643165, -52.232465),
            Region::new("Regiao5", "Região 5", -27.659349, -52.256860),
            Region::new("Regiao6", "Zona Rural", -27.588844, -52.257941),
        ])
    }

    /// Look a region up by id or display label.
    pub fn get(&self, name: &str) -> Option<&Region> {
        let name = name.trim();
        self.regions.iter().find(|r| r.id == name || r.label == name)
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// Maps an aggregate count to a bubble radius. Implementations must return at
/// least [`RadiusScale::min_radius`] and never shrink as the count grows.
pub trait RadiusScale {
    fn min_radius(&self) -> f64;
    fn radius(&self, count: f64) -> f64;
}

/// `min_radius + per_unit * count`, with negative counts treated as zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearRadius {
    pub min_radius: f64,
    pub per_unit: f64,
}

impl Default for LinearRadius {
    fn default() -> Self {
        LinearRadius { min_radius: 6.0, per_unit: 2.0 }
    }
}

impl RadiusScale for LinearRadius {
    fn min_radius(&self) -> f64 {
        self.min_radius
    }

    fn radius(&self, count: f64) -> f64 {
        let count = if count.is_finite() { count.max(0.0) } else { 0.0 };
        self.min_radius + self.per_unit.max(0.0) * count
    }
}

/// Which regions get a bubble.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerPresence {
    /// Only regions that appear in the aggregate.
    #[default]
    DataOnly,
    /// Every registry region; those missing from the aggregate count as zero.
    AllRegions,
}

/// Markers that could be placed plus one error per region that could not.
#[derive(Debug, Default)]
pub struct MarkerSet {
    pub markers: Vec<MapMarker>,
    pub errors: Vec<DashboardError>,
}

impl MarkerSet {
    pub fn unknown_regions(&self) -> Vec<String> {
        self.errors
            .iter()
            .filter_map(|e| match e {
                DashboardError::UnknownRegion(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }
}

pub fn build_markers(
    region_aggregate: &Aggregate,
    registry: &RegionRegistry,
    radius: &dyn RadiusScale,
    presence: MarkerPresence,
) -> MarkerSet {
    let mut set = MarkerSet::default();
    let marker = |region: &Region, count: f64| {
        let r = radius.radius(count).max(radius.min_radius());
        MapMarker {
            region: region.id.clone(),
            label: format!("{}: {}", region.label, format_count(count)),
            lat: region.lat,
            lon: region.lon,
            count,
            radius: r,
        }
    };

    // An id and its display label name the same region; one bubble each.
    let mut placed: Vec<(&Region, f64)> = Vec::new();
    for (name, count) in region_aggregate.iter() {
        match registry.get(name) {
            Some(region) => match placed.iter_mut().find(|(r, _)| r.id == region.id) {
                Some(entry) => entry.1 += count,
                None => placed.push((region, count)),
            },
            None => {
                log::warn!("Region '{}' is not in the registry; skipping its marker", name);
                set.errors.push(DashboardError::UnknownRegion(name.to_string()));
            }
        }
    }
    set.markers = placed.iter().map(|(region, count)| marker(region, *count)).collect();

    if presence == MarkerPresence::AllRegions {
        for region in registry.regions() {
            if !placed.iter().any(|(r, _)| r.id == region.id) {
                set.markers.push(marker(region, 0.0));
            }
        }
        let order = |m: &MapMarker| registry.regions().iter().position(|r| r.id == m.region);
        set.markers.sort_by_key(order);
    }
    set
}
