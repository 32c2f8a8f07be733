//! Road network synthesis: hierarchical grid, per-zone patterns, zone
//! connectors, and occupancy rasterization.
//!
//! Roads are layered from coarse to fine: the main arterial grid, a
//! secondary grid between arterials, local patterns keyed by zone type,
//! and finally straight connectors between nearby zone centers. Once all
//! segments exist they are rasterized onto a boolean occupancy grid, the
//! sole road-proximity oracle for building placement.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::{CityConfig, ZoneType};
use crate::grid::Grid;
use crate::zones::Zone;

/// Grid coordinates of a road endpoint.
pub type Point = (i64, i64);

/// Zones whose centers are closer than this get a straight connector road.
const CONNECTOR_DISTANCE: f64 = 150.0;

/// Road hierarchy tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoadKind {
    Main,
    Secondary,
    Local,
}

impl RoadKind {
    pub fn name(&self) -> &'static str {
        match self {
            RoadKind::Main => "main",
            RoadKind::Secondary => "secondary",
            RoadKind::Local => "local",
        }
    }
}

/// An immutable road segment.
#[derive(Clone, Debug, PartialEq)]
pub struct Road {
    pub start: Point,
    pub end: Point,
    pub width: f64,
    pub kind: RoadKind,
}

impl Road {
    pub fn length(&self) -> f64 {
        let dx = (self.end.0 - self.start.0) as f64;
        let dy = (self.end.1 - self.start.1) as f64;
        (dx * dx + dy * dy).sqrt()
    }

    /// Normalized direction vector, or `None` for a zero-length road
    /// (direction is undefined, callers must skip it).
    pub fn direction(&self) -> Option<(f64, f64)> {
        let length = self.length();
        if length == 0.0 {
            return None;
        }
        let dx = (self.end.0 - self.start.0) as f64;
        let dy = (self.end.1 - self.start.1) as f64;
        Some((dx / length, dy / length))
    }
}

/// A road endpoint shared by one or more roads. Merged only on exact
/// point equality; near-miss coincidences stay separate.
#[derive(Clone, Debug)]
pub struct Intersection {
    pub position: Point,
    /// Indices into the network's road list.
    pub roads: Vec<usize>,
}

/// The synthesized road network plus its derived occupancy grid.
pub struct RoadNetwork {
    width: usize,
    height: usize,
    roads: Vec<Road>,
    intersections: Vec<Intersection>,
    intersection_index: HashMap<Point, usize>,
    occupancy: Grid<bool>,
}

impl RoadNetwork {
    pub(crate) fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            roads: Vec::new(),
            intersections: Vec::new(),
            intersection_index: HashMap::new(),
            occupancy: Grid::new(width, height),
        }
    }

    /// Synthesize the full network for the given zones and rasterize it.
    pub fn generate(config: &CityConfig, zones: &[Zone]) -> Self {
        let mut network = Self::empty(config.width, config.height);

        network.generate_main_roads(config);
        network.generate_secondary_roads(config);
        for zone in zones {
            network.generate_zone_roads(config, zone);
        }
        network.connect_zones(config, zones);
        network.rasterize();

        network
    }

    pub fn roads(&self) -> &[Road] {
        &self.roads
    }

    /// Intersections in creation order.
    pub fn intersections(&self) -> &[Intersection] {
        &self.intersections
    }

    /// Occupancy lookup; false outside plane bounds.
    pub fn is_road(&self, x: i64, y: i64) -> bool {
        self.occupancy.in_bounds(x, y) && *self.occupancy.get(x as usize, y as usize)
    }

    /// Add a road, clamping its endpoints into the plane and registering
    /// both endpoints in the intersection index.
    fn add_road(&mut self, start: Point, end: Point, width: f64, kind: RoadKind) {
        let clamp = |(x, y): Point| -> Point {
            (
                x.clamp(0, self.width as i64 - 1),
                y.clamp(0, self.height as i64 - 1),
            )
        };
        let road = Road {
            start: clamp(start),
            end: clamp(end),
            width,
            kind,
        };

        let road_idx = self.roads.len();
        // A zero-length road has one endpoint; registering it twice would
        // inflate the intersection's connected-road count.
        let mut endpoints = vec![road.start];
        if road.end != road.start {
            endpoints.push(road.end);
        }
        for point in endpoints {
            let idx = *self.intersection_index.entry(point).or_insert_with(|| {
                self.intersections.push(Intersection {
                    position: point,
                    roads: Vec::new(),
                });
                self.intersections.len() - 1
            });
            self.intersections[idx].roads.push(road_idx);
        }

        self.roads.push(road);
    }

    /// Main arterial grid: full-span roads at every main-grid multiple.
    fn generate_main_roads(&mut self, config: &CityConfig) {
        for x in (0..config.width).step_by(config.main_grid_size) {
            self.add_road(
                (x as i64, 0),
                (x as i64, config.height as i64 - 1),
                config.main_road_width,
                RoadKind::Main,
            );
        }
        for y in (0..config.height).step_by(config.main_grid_size) {
            self.add_road(
                (0, y as i64),
                (config.width as i64 - 1, y as i64),
                config.main_road_width,
                RoadKind::Main,
            );
        }
    }

    /// Secondary grid between the arterials, skipping coordinates already
    /// covered by a main road.
    fn generate_secondary_roads(&mut self, config: &CityConfig) {
        for x in (config.secondary_grid_size..config.width).step_by(config.secondary_grid_size) {
            if x % config.main_grid_size != 0 {
                self.add_road(
                    (x as i64, 0),
                    (x as i64, config.height as i64 - 1),
                    config.secondary_road_width,
                    RoadKind::Secondary,
                );
            }
        }
        for y in (config.secondary_grid_size..config.height).step_by(config.secondary_grid_size) {
            if y % config.main_grid_size != 0 {
                self.add_road(
                    (0, y as i64),
                    (config.width as i64 - 1, y as i64),
                    config.secondary_road_width,
                    RoadKind::Secondary,
                );
            }
        }
    }

    /// Local road pattern keyed by zone type.
    fn generate_zone_roads(&mut self, config: &CityConfig, zone: &Zone) {
        match zone.zone_type {
            ZoneType::Residential => self.residential_roads(config, zone),
            ZoneType::Commercial => self.commercial_roads(config, zone),
            ZoneType::Business => self.business_roads(config, zone),
            ZoneType::Industrial => self.industrial_roads(config, zone),
            ZoneType::Parks => self.park_roads(config, zone),
            ZoneType::Leisure => self.leisure_roads(config, zone),
        }
    }

    /// Fine grid of short horizontal and vertical segments.
    fn residential_roads(&mut self, config: &CityConfig, zone: &Zone) {
        const GRID: usize = 50;
        let (x1, y1, x2, y2) = zone.bounds();

        for x in (x1..x2).step_by(GRID) {
            for y in (y1..y2).step_by(GRID) {
                if x + GRID <= x2 {
                    self.add_road(
                        (x as i64, y as i64),
                        ((x + GRID) as i64, y as i64),
                        config.local_road_width,
                        RoadKind::Local,
                    );
                }
                if y + GRID <= y2 {
                    self.add_road(
                        (x as i64, y as i64),
                        (x as i64, (y + GRID) as i64),
                        config.local_road_width,
                        RoadKind::Local,
                    );
                }
            }
        }
    }

    /// Horizontal access strips every 40 cells in x, every other row in y.
    fn commercial_roads(&mut self, config: &CityConfig, zone: &Zone) {
        const GRID: usize = 40;
        let (x1, y1, x2, y2) = zone.bounds();

        for x in (x1..x2).step_by(GRID) {
            if x + GRID <= x2 {
                for y in (y1..y2).step_by(GRID * 2) {
                    if y + GRID <= y2 {
                        self.add_road(
                            (x as i64, y as i64),
                            ((x + GRID) as i64, y as i64),
                            config.local_road_width,
                            RoadKind::Local,
                        );
                    }
                }
            }
        }
    }

    /// Wide avenues spanning the whole zone; these take secondary-tier
    /// width despite the local category.
    fn business_roads(&mut self, config: &CityConfig, zone: &Zone) {
        const GRID: usize = 60;
        let (x1, y1, x2, y2) = zone.bounds();

        for x in (x1..x2).step_by(GRID) {
            self.add_road(
                (x as i64, y1 as i64),
                (x as i64, y2 as i64),
                config.secondary_road_width,
                RoadKind::Local,
            );
        }
        for y in (y1..y2).step_by(GRID) {
            self.add_road(
                (x1 as i64, y as i64),
                (x2 as i64, y as i64),
                config.secondary_road_width,
                RoadKind::Local,
            );
        }
    }

    /// Sparse full-height verticals sized for trucks.
    fn industrial_roads(&mut self, config: &CityConfig, zone: &Zone) {
        const GRID: usize = 80;
        let (x1, y1, x2, y2) = zone.bounds();

        for x in (x1..x2).step_by(GRID) {
            self.add_road(
                (x as i64, y1 as i64),
                (x as i64, y2 as i64),
                config.local_road_width * 1.5,
                RoadKind::Local,
            );
        }
    }

    /// Perimeter loop only, and only for large parks.
    fn park_roads(&mut self, config: &CityConfig, zone: &Zone) {
        if zone.width <= 100 && zone.height <= 100 {
            return;
        }

        let (x1, y1, x2, y2) = zone.bounds();
        let corners = [
            (x1 as i64, y1 as i64),
            (x2 as i64, y1 as i64),
            (x2 as i64, y2 as i64),
            (x1 as i64, y2 as i64),
            (x1 as i64, y1 as i64),
        ];
        for pair in corners.windows(2) {
            self.add_road(pair[0], pair[1], config.local_road_width * 0.8, RoadKind::Local);
        }
    }

    /// Horizontal strips every 45 cells in x, every 90 in y.
    fn leisure_roads(&mut self, config: &CityConfig, zone: &Zone) {
        const GRID: usize = 45;
        let (x1, y1, x2, y2) = zone.bounds();

        for x in (x1..x2).step_by(GRID) {
            for y in (y1..y2).step_by(GRID * 2) {
                if x + GRID <= x2 && y + GRID <= y2 {
                    self.add_road(
                        (x as i64, y as i64),
                        ((x + GRID) as i64, y as i64),
                        config.local_road_width,
                        RoadKind::Local,
                    );
                }
            }
        }
    }

    /// Straight connector between every pair of zone centers closer than
    /// the threshold (strict). O(zones^2).
    fn connect_zones(&mut self, config: &CityConfig, zones: &[Zone]) {
        for (i, zone1) in zones.iter().enumerate() {
            for zone2 in &zones[i + 1..] {
                let (c1x, c1y) = zone1.center();
                let (c2x, c2y) = zone2.center();
                let dx = c1x as f64 - c2x as f64;
                let dy = c1y as f64 - c2y as f64;
                if (dx * dx + dy * dy).sqrt() < CONNECTOR_DISTANCE {
                    self.add_road(
                        (c1x as i64, c1y as i64),
                        (c2x as i64, c2y as i64),
                        config.local_road_width,
                        RoadKind::Local,
                    );
                }
            }
        }
    }

    /// Stamp every road onto the occupancy grid.
    fn rasterize(&mut self) {
        let mut occupancy = Grid::new(self.width, self.height);
        for road in &self.roads {
            let half_width = (road.width / 2.0).floor() as i64;
            draw_line(&mut occupancy, road.start, road.end, half_width);
        }
        self.occupancy = occupancy;
    }
}

/// Integer line rasterization (Bresenham), stamping a square neighborhood
/// of the given half-extent at every visited point.
fn draw_line(grid: &mut Grid<bool>, start: Point, end: Point, half_width: i64) {
    let (mut x, mut y) = start;
    let (x1, y1) = end;
    let dx = (x1 - x).abs();
    let dy = (y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };

    if dx > dy {
        let mut err = dx / 2;
        while x != x1 {
            stamp_point(grid, x, y, half_width);
            err -= dy;
            if err < 0 {
                y += sy;
                err += dx;
            }
            x += sx;
        }
    } else {
        let mut err = dy / 2;
        while y != y1 {
            stamp_point(grid, x, y, half_width);
            err -= dx;
            if err < 0 {
                x += sx;
                err += dy;
            }
            y += sy;
        }
    }

    stamp_point(grid, x, y, half_width);
}

/// Axis-aligned square stamp; an intentional approximation of the road's
/// width ribbon. Out-of-bounds cells are clipped.
fn stamp_point(grid: &mut Grid<bool>, x: i64, y: i64, half_width: i64) {
    for dy in -half_width..=half_width {
        for dx in -half_width..=half_width {
            let (nx, ny) = (x + dx, y + dy);
            if grid.in_bounds(nx, ny) {
                grid.set(nx as usize, ny as usize, true);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CityConfig;
    use crate::zones::Zone;

    fn test_config() -> CityConfig {
        CityConfig {
            width: 200,
            height: 200,
            main_grid_size: 100,
            secondary_grid_size: 50,
            ..CityConfig::default()
        }
    }

    #[test]
    fn test_grid_road_counts() {
        let network = RoadNetwork::generate(&test_config(), &[]);
        let mains = network.roads().iter().filter(|r| r.kind == RoadKind::Main).count();
        let secondaries = network
            .roads()
            .iter()
            .filter(|r| r.kind == RoadKind::Secondary)
            .count();
        // Verticals at 0 and 100, horizontals at 0 and 100.
        assert_eq!(mains, 4);
        // Secondary multiples 50 and 150 on each axis; 100 overlaps main.
        assert_eq!(secondaries, 4);
    }

    #[test]
    fn test_endpoints_clipped_into_plane() {
        let config = test_config();
        let zones = vec![Zone::new(ZoneType::Business, 80, 80, 120, 120, 0.9)];
        let network = RoadNetwork::generate(&config, &zones);
        for road in network.roads() {
            for (x, y) in [road.start, road.end] {
                assert!(x >= 0 && x < config.width as i64, "x out of range: {}", x);
                assert!(y >= 0 && y < config.height as i64, "y out of range: {}", y);
            }
        }
    }

    #[test]
    fn test_is_road_out_of_bounds_is_false() {
        let network = RoadNetwork::generate(&test_config(), &[]);
        assert!(!network.is_road(-1, 0));
        assert!(!network.is_road(0, -5));
        assert!(!network.is_road(200, 0));
        assert!(!network.is_road(0, 1000));
    }

    #[test]
    fn test_main_road_rasterized_onto_occupancy() {
        let network = RoadNetwork::generate(&test_config(), &[]);
        // Vertical main road at x = 100, half width 10.
        assert!(network.is_road(100, 50));
        assert!(network.is_road(108, 50));
        assert!(!network.is_road(130, 30));
    }

    #[test]
    fn test_connector_threshold_is_strict() {
        let config = test_config();
        // Centers (50, 50) and (200, 50): exactly 150 apart.
        let far = vec![
            Zone::new(ZoneType::Residential, 0, 0, 100, 100, 0.6),
            Zone::new(ZoneType::Commercial, 150, 0, 100, 100, 0.8),
        ];
        let mut network = RoadNetwork::empty(config.width, config.height);
        network.connect_zones(&config, &far);
        assert!(network.roads().is_empty());

        // One cell closer: connector appears.
        let near = vec![
            Zone::new(ZoneType::Residential, 0, 0, 100, 100, 0.6),
            Zone::new(ZoneType::Commercial, 149, 0, 100, 100, 0.8),
        ];
        let mut network = RoadNetwork::empty(config.width, config.height);
        network.connect_zones(&config, &near);
        assert_eq!(network.roads().len(), 1);
        assert_eq!(network.roads()[0].kind, RoadKind::Local);
    }

    #[test]
    fn test_shared_endpoint_merges_into_one_intersection() {
        let mut network = RoadNetwork::empty(100, 100);
        network.add_road((0, 0), (50, 0), 8.0, RoadKind::Local);
        network.add_road((50, 0), (50, 50), 8.0, RoadKind::Local);
        let shared = network
            .intersections()
            .iter()
            .find(|i| i.position == (50, 0))
            .expect("shared intersection");
        assert_eq!(shared.roads, vec![0, 1]);
        assert_eq!(network.intersections().len(), 3);
    }

    #[test]
    fn test_zero_length_road_registers_one_intersection_entry() {
        let mut network = RoadNetwork::empty(100, 100);
        network.add_road((20, 20), (20, 20), 8.0, RoadKind::Local);
        assert_eq!(network.intersections().len(), 1);
        let intersection = &network.intersections()[0];
        assert_eq!(intersection.position, (20, 20));
        assert_eq!(intersection.roads, vec![0]);
    }

    #[test]
    fn test_zero_length_road_has_no_direction() {
        let road = Road {
            start: (10, 10),
            end: (10, 10),
            width: 8.0,
            kind: RoadKind::Local,
        };
        assert_eq!(road.length(), 0.0);
        assert_eq!(road.direction(), None);
    }

    #[test]
    fn test_draw_line_covers_diagonal() {
        let mut grid: Grid<bool> = Grid::new(10, 10);
        draw_line(&mut grid, (0, 0), (9, 9), 0);
        assert!(*grid.get(0, 0));
        assert!(*grid.get(9, 9));
        assert!(*grid.get(5, 5));
    }
}
