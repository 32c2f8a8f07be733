//! 2D preview rendering of a generated city to an RGB image.
//!
//! Zones are filled in their display colors, road cells come straight from
//! the occupancy grid, buildings are shaded by height.

use std::path::Path;

use image::{Rgb, RgbImage};

use crate::city::CityGenerator;
use crate::error::CityError;

const BACKGROUND: [u8; 3] = [232, 232, 228];
const ROAD_COLOR: [u8; 3] = [70, 70, 70];

/// Render the city to an image, one pixel per grid cell.
/// Fails with `NotReady` before generation completes.
pub fn render_preview(city: &CityGenerator) -> Result<RgbImage, CityError> {
    if !city.is_complete() {
        return Err(CityError::NotReady);
    }

    let config = city.config();
    let mut img = RgbImage::from_pixel(
        config.width as u32,
        config.height as u32,
        Rgb(BACKGROUND),
    );

    // Zones, blended toward the background so overlaps of later layers read well
    for zone in city.zones() {
        let color = zone.zone_type.color();
        let pixel = Rgb([
            (color[0] * 0.6 * 255.0 + BACKGROUND[0] as f64 * 0.4) as u8,
            (color[1] * 0.6 * 255.0 + BACKGROUND[1] as f64 * 0.4) as u8,
            (color[2] * 0.6 * 255.0 + BACKGROUND[2] as f64 * 0.4) as u8,
        ]);
        for y in zone.y..(zone.y + zone.height).min(config.height) {
            for x in zone.x..(zone.x + zone.width).min(config.width) {
                img.put_pixel(x as u32, y as u32, pixel);
            }
        }
    }

    // Road footprint from the occupancy grid
    for y in 0..config.height {
        for x in 0..config.width {
            if city.is_road(x as i64, y as i64) {
                img.put_pixel(x as u32, y as u32, Rgb(ROAD_COLOR));
            }
        }
    }

    // Buildings, darker the taller they are
    for building in city.buildings() {
        let intensity = (0.3 + building.building_height / 100.0 * 0.7).min(1.0);
        let pixel = Rgb([
            (139.0 * intensity) as u8,
            (69.0 * intensity) as u8,
            (19.0 * intensity) as u8,
        ]);
        for y in building.y..(building.y + building.height).min(config.height) {
            for x in building.x..(building.x + building.width).min(config.width) {
                img.put_pixel(x as u32, y as u32, pixel);
            }
        }
    }

    Ok(img)
}

/// Render and save the preview image; the format follows the extension.
pub fn export_preview(city: &CityGenerator, path: &Path) -> Result<(), CityError> {
    let img = render_preview(city)?;
    img.save(path)?;
    Ok(())
}
