//! City configuration: zone types and generation parameters.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::CityError;

/// Land-use zone types available in the city.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneType {
    Residential,
    Commercial,
    Business,
    Leisure,
    Parks,
    Industrial,
}

impl ZoneType {
    /// All zone types, in a stable order used for seeding and statistics.
    pub const ALL: [ZoneType; 6] = [
        ZoneType::Residential,
        ZoneType::Commercial,
        ZoneType::Business,
        ZoneType::Leisure,
        ZoneType::Parks,
        ZoneType::Industrial,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ZoneType::Residential => "residential",
            ZoneType::Commercial => "commercial",
            ZoneType::Business => "business",
            ZoneType::Leisure => "leisure",
            ZoneType::Parks => "parks",
            ZoneType::Industrial => "industrial",
        }
    }

    /// Display color (RGB, 0.0-1.0) used by the structured export and preview.
    pub fn color(&self) -> [f64; 3] {
        match self {
            ZoneType::Residential => [0.8, 0.8, 0.6], // Light brown
            ZoneType::Commercial => [0.6, 0.6, 0.9],  // Light blue
            ZoneType::Business => [0.5, 0.5, 0.8],    // Blue
            ZoneType::Leisure => [0.9, 0.7, 0.6],     // Orange
            ZoneType::Parks => [0.4, 0.8, 0.4],       // Green
            ZoneType::Industrial => [0.7, 0.7, 0.7],  // Gray
        }
    }
}

/// Immutable generation parameters for a city.
///
/// Constructed once and treated as read-only by every pipeline stage.
/// `CityGenerator::new` runs `validate` before anything else, so the
/// stages may assume every per-type map is fully populated.
#[derive(Clone, Debug)]
pub struct CityConfig {
    /// City width in grid cells
    pub width: usize,
    /// City height in grid cells
    pub height: usize,

    /// Main road width in cells
    pub main_road_width: f64,
    /// Secondary road width in cells
    pub secondary_road_width: f64,
    /// Local road width in cells
    pub local_road_width: f64,

    /// Spacing of the main arterial grid
    pub main_grid_size: usize,
    /// Spacing of the secondary grid
    pub secondary_grid_size: usize,

    /// Probability (0-1) that a scanned building slot is accepted, per type
    pub zone_densities: HashMap<ZoneType, f64>,
    /// Share of city area per zone type. Used as-is: callers must
    /// renormalize upstream if the shares do not sum to 1.
    pub zone_distribution: HashMap<ZoneType, f64>,

    /// Maximum building height in meters, per type
    pub max_building_height: HashMap<ZoneType, u32>,
    /// Minimum building height in meters, per type
    pub min_building_height: HashMap<ZoneType, u32>,

    /// Coordinate scale fed to the coherent noise field
    pub noise_scale: f64,
    /// Octave count for the noise field
    pub noise_octaves: u32,
}

impl Default for CityConfig {
    fn default() -> Self {
        let zone_densities = HashMap::from([
            (ZoneType::Residential, 0.6),
            (ZoneType::Commercial, 0.8),
            (ZoneType::Business, 0.9),
            (ZoneType::Leisure, 0.4),
            (ZoneType::Parks, 0.1),
            (ZoneType::Industrial, 0.7),
        ]);

        let zone_distribution = HashMap::from([
            (ZoneType::Residential, 0.35),
            (ZoneType::Commercial, 0.15),
            (ZoneType::Business, 0.20),
            (ZoneType::Leisure, 0.10),
            (ZoneType::Parks, 0.15),
            (ZoneType::Industrial, 0.05),
        ]);

        let max_building_height = HashMap::from([
            (ZoneType::Residential, 25),
            (ZoneType::Commercial, 40),
            (ZoneType::Business, 80),
            (ZoneType::Leisure, 15),
            (ZoneType::Parks, 5),
            (ZoneType::Industrial, 20),
        ]);

        let min_building_height = HashMap::from([
            (ZoneType::Residential, 6),
            (ZoneType::Commercial, 8),
            (ZoneType::Business, 20),
            (ZoneType::Leisure, 3),
            (ZoneType::Parks, 0),
            (ZoneType::Industrial, 8),
        ]);

        Self {
            width: 1000,
            height: 1000,
            main_road_width: 20.0,
            secondary_road_width: 12.0,
            local_road_width: 8.0,
            main_grid_size: 200,
            secondary_grid_size: 100,
            zone_densities,
            zone_distribution,
            max_building_height,
            min_building_height,
            noise_scale: 0.1,
            noise_octaves: 4,
        }
    }
}

impl CityConfig {
    /// Check the configuration, failing fast with a descriptive error
    /// instead of silently substituting defaults.
    pub fn validate(&self) -> Result<(), CityError> {
        if self.width == 0 || self.height == 0 {
            return Err(CityError::Config(format!(
                "city dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.main_road_width <= 0.0
            || self.secondary_road_width <= 0.0
            || self.local_road_width <= 0.0
        {
            return Err(CityError::Config("road widths must be positive".into()));
        }
        if self.main_grid_size == 0 || self.secondary_grid_size == 0 {
            return Err(CityError::Config("grid sizes must be positive".into()));
        }
        if self.noise_scale <= 0.0 {
            return Err(CityError::Config("noise scale must be positive".into()));
        }
        if self.noise_octaves == 0 {
            return Err(CityError::Config("noise octave count must be positive".into()));
        }

        for zone_type in ZoneType::ALL {
            let density = self
                .zone_densities
                .get(&zone_type)
                .ok_or_else(|| missing_entry("zone_densities", zone_type))?;
            if !(0.0..=1.0).contains(density) {
                return Err(CityError::Config(format!(
                    "density for {} must be in 0..=1, got {}",
                    zone_type.name(),
                    density
                )));
            }

            self.zone_distribution
                .get(&zone_type)
                .ok_or_else(|| missing_entry("zone_distribution", zone_type))?;

            let min = self
                .min_building_height
                .get(&zone_type)
                .ok_or_else(|| missing_entry("min_building_height", zone_type))?;
            let max = self
                .max_building_height
                .get(&zone_type)
                .ok_or_else(|| missing_entry("max_building_height", zone_type))?;
            if min > max {
                return Err(CityError::Config(format!(
                    "building heights for {} are inverted: min {} > max {}",
                    zone_type.name(),
                    min,
                    max
                )));
            }
        }

        Ok(())
    }

    pub fn density(&self, zone_type: ZoneType) -> f64 {
        self.zone_densities[&zone_type]
    }

    pub fn distribution(&self, zone_type: ZoneType) -> f64 {
        self.zone_distribution[&zone_type]
    }

    pub fn min_height(&self, zone_type: ZoneType) -> u32 {
        self.min_building_height[&zone_type]
    }

    pub fn max_height(&self, zone_type: ZoneType) -> u32 {
        self.max_building_height[&zone_type]
    }
}

fn missing_entry(map: &str, zone_type: ZoneType) -> CityError {
    CityError::Config(format!("{} has no entry for {}", map, zone_type.name()))
}
