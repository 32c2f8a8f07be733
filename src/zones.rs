//! Zone partitioning: noise-perturbed nearest-seed tessellation.
//!
//! Seeds each land-use type onto the plane (business clustered near the
//! center, parks scattered uniformly, the rest loosely clustered), assigns
//! every grid cell to the seed minimizing a noise- and preference-weighted
//! distance, then extracts one zone per seed as the bounding box of its
//! first connected component.

use noise::{NoiseFn, Perlin};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::buildings::Building;
use crate::config::{CityConfig, ZoneType};
use crate::grid::Grid;

/// Average zone footprint (cells) used to derive seed counts from area targets.
const AVG_ZONE_AREA: usize = 10_000;

/// A contiguous land-use region.
///
/// The rectangle is the tight bounding box of the region's first connected
/// component, not its exact cell set; later stages treat everything inside
/// the box as belonging to the zone.
#[derive(Clone, Debug)]
pub struct Zone {
    pub zone_type: ZoneType,
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
    pub density: f64,
    /// Buildings placed within this zone. The city's global list is the
    /// authoritative collection; this is a per-zone view.
    pub buildings: Vec<Building>,
}

impl Zone {
    pub fn new(
        zone_type: ZoneType,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        density: f64,
    ) -> Self {
        Self {
            zone_type,
            x,
            y,
            width,
            height,
            density,
            buildings: Vec::new(),
        }
    }

    /// Zone boundaries as (x1, y1, x2, y2), exclusive on the far side.
    pub fn bounds(&self) -> (usize, usize, usize, usize) {
        (self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn contains_point(&self, x: usize, y: usize) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    pub fn center(&self) -> (usize, usize) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }
}

/// A seed point acting as the attractor for one zone.
struct ZoneSeed {
    x: usize,
    y: usize,
    zone_type: ZoneType,
}

/// Partition the plane into zones. Deterministic for a fixed seed.
pub fn generate_zones(config: &CityConfig, seed: u64) -> Vec<Zone> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let seeds = place_seeds(config, &mut rng);
    let zone_grid = assign_cells(config, &seeds, seed);
    extract_zones(config, &zone_grid, &seeds)
}

/// Instantiate seed points per zone type, count proportional to the
/// configured area share (at least one per type).
fn place_seeds(config: &CityConfig, rng: &mut ChaCha8Rng) -> Vec<ZoneSeed> {
    let total_area = config.width * config.height;
    let mut seeds = Vec::new();

    for zone_type in ZoneType::ALL {
        let target_area = (total_area as f64 * config.distribution(zone_type)) as usize;
        let count = (target_area / AVG_ZONE_AREA).max(1);

        for _ in 0..count {
            let (x, y) = match zone_type {
                // Business districts cluster tightly around the center
                ZoneType::Business => (
                    sample_normal(rng, config.width as f64 / 2.0, config.width as f64 / 6.0),
                    sample_normal(rng, config.height as f64 / 2.0, config.height as f64 / 6.0),
                ),
                // Parks are scattered over the whole plane
                ZoneType::Parks => (
                    rng.gen_range(0..config.width) as f64,
                    rng.gen_range(0..config.height) as f64,
                ),
                // Everything else clusters loosely
                _ => (
                    sample_normal(rng, config.width as f64 / 2.0, config.width as f64 / 4.0),
                    sample_normal(rng, config.height as f64 / 2.0, config.height as f64 / 4.0),
                ),
            };

            seeds.push(ZoneSeed {
                x: (x as i64).clamp(0, config.width as i64 - 1) as usize,
                y: (y as i64).clamp(0, config.height as i64 - 1) as usize,
                zone_type,
            });
        }
    }

    seeds
}

/// Box-Muller gaussian sample over the stage RNG.
fn sample_normal(rng: &mut ChaCha8Rng, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(f64::MIN_POSITIVE);
    let u2: f64 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
    mean + std_dev * z
}

/// Fractional Brownian Motion - layers multiple octaves of Perlin noise.
/// Output is roughly in [-1, 1].
fn fbm(noise: &Perlin, x: f64, y: f64, octaves: u32) -> f64 {
    let mut total = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    let mut max_value = 0.0;

    for _ in 0..octaves {
        total += amplitude * noise.get([x * frequency, y * frequency]);
        max_value += amplitude;
        amplitude *= 0.5;
        frequency *= 2.0;
    }

    total / max_value
}

/// Assign every cell to its noise-weighted nearest seed.
/// Rows are independent, so the scan parallelizes across them; collecting
/// row results in order keeps the output deterministic.
fn assign_cells(config: &CityConfig, seeds: &[ZoneSeed], seed: u64) -> Grid<u32> {
    let perlin = Perlin::new(seed as u32);

    let assignments: Vec<u32> = (0..config.height)
        .into_par_iter()
        .flat_map_iter(|y| {
            let perlin = &perlin;
            (0..config.width).map(move |x| {
                let noise_val = fbm(
                    perlin,
                    x as f64 * config.noise_scale,
                    y as f64 * config.noise_scale,
                    config.noise_octaves,
                );
                closest_seed(config, seeds, x, y, noise_val)
            })
        })
        .collect();

    Grid::from_vec(config.width, config.height, assignments)
}

/// Seed id (1-based) minimizing distance x noise x preference.
/// Ties resolve to the first seed in iteration order.
fn closest_seed(config: &CityConfig, seeds: &[ZoneSeed], x: usize, y: usize, noise_val: f64) -> u32 {
    let mut min_distance = f64::INFINITY;
    let mut closest = 1u32;

    for (i, seed) in seeds.iter().enumerate() {
        let dx = x as f64 - seed.x as f64;
        let dy = y as f64 - seed.y as f64;
        let distance = (dx * dx + dy * dy).sqrt();

        let preference = zone_preference(config, x, y, seed.zone_type);
        let modified = distance * (1.0 + noise_val * 0.3) * preference;

        if modified < min_distance {
            min_distance = modified;
            closest = (i + 1) as u32;
        }
    }

    closest
}

/// Location preference multiplier: a linear function of normalized
/// distance to the city center. Below 1 pulls the type toward the center,
/// growth with distance pushes it toward the periphery.
fn zone_preference(config: &CityConfig, x: usize, y: usize, zone_type: ZoneType) -> f64 {
    let center_x = (config.width / 2) as f64;
    let center_y = (config.height / 2) as f64;
    let dx = x as f64 - center_x;
    let dy = y as f64 - center_y;
    let distance_to_center = (dx * dx + dy * dy).sqrt();
    let max_distance = (center_x * center_x + center_y * center_y).sqrt();
    let d = distance_to_center / max_distance;

    match zone_type {
        ZoneType::Business => 0.5 + d * 0.8,
        ZoneType::Commercial => 0.7 + d * 0.6,
        ZoneType::Residential => 1.0,
        ZoneType::Industrial => 0.8 + d * 0.4,
        ZoneType::Parks => 1.0,
        ZoneType::Leisure => 0.9 + d * 0.3,
    }
}

/// Emit one zone per seed: the tight bounding box of the connected
/// component containing the seed id's first cell in row-major order.
/// Secondary disconnected components keep their grid marking but produce
/// no zone (see DESIGN.md).
fn extract_zones(config: &CityConfig, zone_grid: &Grid<u32>, seeds: &[ZoneSeed]) -> Vec<Zone> {
    // First row-major occurrence of each seed id, found in one pass.
    let mut first_cell: Vec<Option<(usize, usize)>> = vec![None; seeds.len() + 1];
    for (x, y, &id) in zone_grid.iter() {
        let slot = &mut first_cell[id as usize];
        if slot.is_none() {
            *slot = Some((x, y));
        }
    }

    let mut visited = vec![false; config.width * config.height];
    let mut zones = Vec::new();

    for (i, seed) in seeds.iter().enumerate() {
        let id = (i + 1) as u32;
        let Some(start) = first_cell[id as usize] else {
            continue; // seed captured no cells
        };

        let Some((min_x, min_y, max_x, max_y)) =
            flood_fill_bounds(zone_grid, &mut visited, start, id)
        else {
            continue;
        };

        zones.push(Zone::new(
            seed.zone_type,
            min_x,
            min_y,
            max_x - min_x + 1,
            max_y - min_y + 1,
            config.density(seed.zone_type),
        ));
    }

    zones
}

/// Iterative 4-connected flood fill returning the component's bounding box.
/// An explicit stack avoids recursion depth limits on large grids.
fn flood_fill_bounds(
    zone_grid: &Grid<u32>,
    visited: &mut [bool],
    start: (usize, usize),
    id: u32,
) -> Option<(usize, usize, usize, usize)> {
    let (width, height) = (zone_grid.width, zone_grid.height);
    let mut stack = vec![start];
    let mut bounds: Option<(usize, usize, usize, usize)> = None;

    while let Some((x, y)) = stack.pop() {
        let idx = y * width + x;
        if visited[idx] || *zone_grid.get(x, y) != id {
            continue;
        }
        visited[idx] = true;

        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((min_x, min_y, max_x, max_y)) => {
                (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
            }
        });

        if x > 0 {
            stack.push((x - 1, y));
        }
        if x + 1 < width {
            stack.push((x + 1, y));
        }
        if y > 0 {
            stack.push((x, y - 1));
        }
        if y + 1 < height {
            stack.push((x, y + 1));
        }
    }

    bounds
}
