//! City exporters: structured JSON data and OBJ meshes.
//!
//! Both exporters refuse to run before generation completes. The JSON
//! shape round-trips losslessly so downstream consumers can re-import it;
//! the OBJ writer threads a running 1-based vertex counter through the
//! whole file, so face indices stay valid only if emission order is
//! preserved (buildings first, then roads).

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::buildings::Building;
use crate::city::CityGenerator;
use crate::config::ZoneType;
use crate::error::CityError;
use crate::roads::{Point, Road, RoadKind};

/// Root of the structured-data export.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CityData {
    pub config: ConfigData,
    pub zones: Vec<ZoneData>,
    pub roads: Vec<RoadData>,
    pub buildings: Vec<Building>,
    pub intersections: Vec<IntersectionData>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfigData {
    pub width: usize,
    pub height: usize,
    pub main_road_width: f64,
    pub secondary_road_width: f64,
    pub local_road_width: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoneData {
    #[serde(rename = "type")]
    pub zone_type: ZoneType,
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
    pub density: f64,
    pub color: [f64; 3],
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoadData {
    pub start: Point,
    pub end: Point,
    pub width: f64,
    #[serde(rename = "type")]
    pub kind: RoadKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntersectionData {
    pub position: Point,
    pub connected_roads: usize,
}

/// Snapshot the generated city into its structured-data form.
pub fn city_to_data(city: &CityGenerator) -> Result<CityData, CityError> {
    if !city.is_complete() {
        return Err(CityError::NotReady);
    }

    let config = city.config();
    Ok(CityData {
        config: ConfigData {
            width: config.width,
            height: config.height,
            main_road_width: config.main_road_width,
            secondary_road_width: config.secondary_road_width,
            local_road_width: config.local_road_width,
        },
        zones: city
            .zones()
            .iter()
            .map(|zone| ZoneData {
                zone_type: zone.zone_type,
                x: zone.x,
                y: zone.y,
                width: zone.width,
                height: zone.height,
                density: zone.density,
                color: zone.zone_type.color(),
            })
            .collect(),
        roads: city
            .roads()
            .iter()
            .map(|road| RoadData {
                start: road.start,
                end: road.end,
                width: road.width,
                kind: road.kind,
            })
            .collect(),
        buildings: city.buildings().to_vec(),
        intersections: city
            .intersections()
            .iter()
            .map(|intersection| IntersectionData {
                position: intersection.position,
                connected_roads: intersection.roads.len(),
            })
            .collect(),
    })
}

/// Serialize the city to pretty-printed JSON.
pub fn to_json_string(city: &CityGenerator) -> Result<String, CityError> {
    let data = city_to_data(city)?;
    Ok(serde_json::to_string_pretty(&data)?)
}

/// Write the structured-data export to disk.
pub fn export_json(city: &CityGenerator, path: &Path) -> Result<(), CityError> {
    let json = to_json_string(city)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// OBJ emission context: the running global vertex counter every face
/// index is computed against.
struct ObjWriter<'a, W: Write> {
    out: &'a mut W,
    vertex_count: usize,
}

impl<'a, W: Write> ObjWriter<'a, W> {
    fn new(out: &'a mut W) -> Self {
        Self {
            out,
            vertex_count: 1,
        }
    }

    /// Eight box vertices (four at ground, four at roof height) and six
    /// quad faces.
    fn write_building(&mut self, building: &Building) -> io::Result<()> {
        let (x, y) = (building.x as f64, building.y as f64);
        let (w, h) = (building.width as f64, building.height as f64);
        let elevation = building.building_height;

        writeln!(self.out, "v {} 0 {}", x, y)?;
        writeln!(self.out, "v {} 0 {}", x + w, y)?;
        writeln!(self.out, "v {} 0 {}", x + w, y + h)?;
        writeln!(self.out, "v {} 0 {}", x, y + h)?;
        writeln!(self.out, "v {} {} {}", x, elevation, y)?;
        writeln!(self.out, "v {} {} {}", x + w, elevation, y)?;
        writeln!(self.out, "v {} {} {}", x + w, elevation, y + h)?;
        writeln!(self.out, "v {} {} {}", x, elevation, y + h)?;

        let base = self.vertex_count;
        // bottom, top, then the four sides
        writeln!(self.out, "f {} {} {} {}", base, base + 1, base + 2, base + 3)?;
        writeln!(self.out, "f {} {} {} {}", base + 4, base + 7, base + 6, base + 5)?;
        writeln!(self.out, "f {} {} {} {}", base, base + 4, base + 5, base + 1)?;
        writeln!(self.out, "f {} {} {} {}", base + 1, base + 5, base + 6, base + 2)?;
        writeln!(self.out, "f {} {} {} {}", base + 2, base + 6, base + 7, base + 3)?;
        writeln!(self.out, "f {} {} {} {}", base + 3, base + 7, base + 4, base)?;

        self.vertex_count += 8;
        Ok(())
    }

    /// Thin ribbon offset by the road's perpendicular, scaled to half its
    /// width. Zero-length roads have no direction and emit nothing.
    fn write_road(&mut self, road: &Road) -> io::Result<()> {
        let Some((dx, dy)) = road.direction() else {
            return Ok(());
        };

        let half_width = road.width / 2.0;
        let px = -dy * half_width;
        let py = dx * half_width;
        let (x1, y1) = (road.start.0 as f64, road.start.1 as f64);
        let (x2, y2) = (road.end.0 as f64, road.end.1 as f64);

        writeln!(self.out, "v {} 0.1 {}", x1 + px, y1 + py)?;
        writeln!(self.out, "v {} 0.1 {}", x1 - px, y1 - py)?;
        writeln!(self.out, "v {} 0.1 {}", x2 - px, y2 - py)?;
        writeln!(self.out, "v {} 0.1 {}", x2 + px, y2 + py)?;

        let base = self.vertex_count;
        writeln!(self.out, "f {} {} {} {}", base, base + 1, base + 2, base + 3)?;

        self.vertex_count += 4;
        Ok(())
    }
}

/// Write the city as an OBJ mesh: boxed buildings first, then road
/// ribbons, sharing one global vertex numbering.
pub fn write_obj<W: Write>(city: &CityGenerator, out: &mut W) -> Result<(), CityError> {
    if !city.is_complete() {
        return Err(CityError::NotReady);
    }

    writeln!(out, "# 3D City Model")?;
    writeln!(out, "# Generated by city_generator")?;
    writeln!(out)?;

    let mut writer = ObjWriter::new(out);
    for building in city.buildings() {
        writer.write_building(building)?;
    }
    for road in city.roads() {
        writer.write_road(road)?;
    }

    Ok(())
}

/// Write the OBJ mesh to disk.
pub fn export_obj(city: &CityGenerator, path: &Path) -> Result<(), CityError> {
    let file = File::create(path)?;
    let mut out = BufWriter::new(file);
    write_obj(city, &mut out)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CityConfig;

    fn generated_city(width: usize, height: usize, seed: u64) -> CityGenerator {
        let config = CityConfig {
            width,
            height,
            main_grid_size: 100,
            secondary_grid_size: 50,
            ..CityConfig::default()
        };
        let mut generator = CityGenerator::new_seeded(config, seed).unwrap();
        generator.generate();
        generator
    }

    #[test]
    fn test_export_gated_on_completion() {
        let config = CityConfig::default();
        let generator = CityGenerator::new_seeded(config, 1).unwrap();
        assert!(matches!(city_to_data(&generator), Err(CityError::NotReady)));
        let mut sink = Vec::new();
        assert!(matches!(
            write_obj(&generator, &mut sink),
            Err(CityError::NotReady)
        ));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_json_round_trip_is_lossless() {
        let city = generated_city(200, 200, 42);
        let data = city_to_data(&city).unwrap();
        let json = serde_json::to_string(&data).unwrap();
        let parsed: CityData = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, data);
        assert_eq!(parsed.zones.len(), city.zones().len());
        assert_eq!(parsed.roads.len(), city.roads().len());
        assert_eq!(parsed.buildings.len(), city.buildings().len());
        assert_eq!(parsed.intersections.len(), city.intersections().len());
    }

    #[test]
    fn test_small_city_export_has_all_sections() {
        let city = generated_city(100, 100, 42);
        let data = city_to_data(&city).unwrap();
        assert!(!data.zones.is_empty());
        assert!(!data.roads.is_empty());
        assert!(!data.buildings.is_empty());
    }

    #[test]
    fn test_same_seed_produces_identical_json() {
        let a = generated_city(150, 150, 77);
        let b = generated_city(150, 150, 77);
        assert_eq!(to_json_string(&a).unwrap(), to_json_string(&b).unwrap());
    }

    #[test]
    fn test_obj_vertex_and_face_counts() {
        let city = generated_city(200, 200, 42);
        let mut out = Vec::new();
        write_obj(&city, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let vertex_lines = text.lines().filter(|l| l.starts_with("v ")).count();
        let face_lines = text.lines().filter(|l| l.starts_with("f ")).count();

        let building_count = city.buildings().len();
        let ribbon_count = city.roads().iter().filter(|r| r.length() > 0.0).count();

        assert_eq!(vertex_lines, 8 * building_count + 4 * ribbon_count);
        assert_eq!(face_lines, 6 * building_count + ribbon_count);

        // Every face index must reference an already-emitted vertex.
        for line in text.lines().filter(|l| l.starts_with("f ")) {
            for index in line.split_whitespace().skip(1) {
                let index: usize = index.parse().unwrap();
                assert!(index >= 1 && index <= vertex_lines);
            }
        }
    }

    #[test]
    fn test_zero_length_road_emits_no_ribbon() {
        let road = Road {
            start: (10, 10),
            end: (10, 10),
            width: 8.0,
            kind: RoadKind::Local,
        };
        let mut out = Vec::new();
        let mut writer = ObjWriter::new(&mut out);
        writer.write_road(&road).unwrap();
        assert_eq!(writer.vertex_count, 1);
        assert!(out.is_empty());
    }

    #[test]
    fn test_export_json_writes_file() {
        let city = generated_city(100, 100, 3);
        let path = std::env::temp_dir().join("city_generator_export_test.json");
        export_json(&city, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: CityData = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, city_to_data(&city).unwrap());
        std::fs::remove_file(&path).ok();
    }
}
