use std::path::PathBuf;
use std::process;

use clap::Parser;

use city_generator::city::CityGenerator;
use city_generator::config::{CityConfig, ZoneType};
use city_generator::error::CityError;
use city_generator::{export, preview};

#[derive(Parser, Debug)]
#[command(name = "city_generator")]
#[command(about = "Generate procedural 2D city layouts with zones, roads and buildings")]
struct Args {
    /// City width in grid cells
    #[arg(short = 'W', long, default_value = "1000")]
    width: usize,

    /// City height in grid cells
    #[arg(short = 'H', long, default_value = "1000")]
    height: usize,

    /// Random seed (uses a random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Main road width
    #[arg(long, default_value = "20.0")]
    main_road_width: f64,

    /// Secondary road width
    #[arg(long, default_value = "12.0")]
    secondary_road_width: f64,

    /// Local road width
    #[arg(long, default_value = "8.0")]
    local_road_width: f64,

    /// Share of residential zones
    #[arg(long, default_value = "0.35")]
    residential: f64,

    /// Share of commercial zones
    #[arg(long, default_value = "0.15")]
    commercial: f64,

    /// Share of business zones
    #[arg(long, default_value = "0.20")]
    business: f64,

    /// Share of leisure zones
    #[arg(long, default_value = "0.10")]
    leisure: f64,

    /// Share of parks
    #[arg(long, default_value = "0.15")]
    parks: f64,

    /// Share of industrial zones
    #[arg(long, default_value = "0.05")]
    industrial: f64,

    /// Export the city to a file (format by extension: .json, .obj)
    #[arg(long)]
    export: Option<PathBuf>,

    /// Save a 2D preview image (e.g. "city.png")
    #[arg(long)]
    preview: Option<PathBuf>,
}

fn main() {
    if let Err(e) = run(Args::parse()) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), CityError> {
    let mut distribution = [
        (ZoneType::Residential, args.residential),
        (ZoneType::Commercial, args.commercial),
        (ZoneType::Business, args.business),
        (ZoneType::Leisure, args.leisure),
        (ZoneType::Parks, args.parks),
        (ZoneType::Industrial, args.industrial),
    ];

    // The core uses the distribution as-is, so renormalize here when the
    // shares don't sum to 1.
    let total: f64 = distribution.iter().map(|(_, share)| share).sum();
    if (total - 1.0).abs() > 0.01 {
        if total <= 0.0 {
            return Err(CityError::Config(
                "zone distribution shares must sum to a positive value".into(),
            ));
        }
        println!(
            "Warning: zone distribution sums to {:.1}%, renormalizing",
            total * 100.0
        );
        for (_, share) in distribution.iter_mut() {
            *share /= total;
        }
    }

    let config = CityConfig {
        width: args.width,
        height: args.height,
        main_road_width: args.main_road_width,
        secondary_road_width: args.secondary_road_width,
        local_road_width: args.local_road_width,
        zone_distribution: distribution.into_iter().collect(),
        ..CityConfig::default()
    };

    let seed = args.seed.unwrap_or_else(rand::random);
    println!("Generating city with seed: {}", seed);
    println!("City size: {}x{}", args.width, args.height);

    let mut generator = CityGenerator::new_seeded(config, seed)?;
    generator.generate();

    let stats = generator.stats()?;
    println!("Generation complete!");
    println!(
        "  {} zones, {} buildings, {} roads, {} intersections",
        stats.total_zones, stats.total_buildings, stats.total_roads, stats.total_intersections
    );
    for entry in &stats.zone_stats {
        println!(
            "  {:<12} {} zones, {} buildings, avg height {:.1}m",
            entry.zone_type.name(),
            entry.zones,
            entry.buildings,
            entry.avg_building_height
        );
    }

    if let Some(path) = &args.export {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => {
                export::export_json(&generator, path)?;
                println!("Exported JSON to {}", path.display());
            }
            Some("obj") => {
                export::export_obj(&generator, path)?;
                println!("Exported OBJ mesh to {}", path.display());
            }
            other => {
                return Err(CityError::UnsupportedFormat(
                    other.unwrap_or("<none>").to_string(),
                ));
            }
        }
    }

    if let Some(path) = &args.preview {
        preview::export_preview(&generator, path)?;
        println!("Saved preview to {}", path.display());
    }

    Ok(())
}
