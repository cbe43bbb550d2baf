//! Run a uniform flow model file and write one results table per bed slope.
//!
//! Usage: `hydraulics <model.ufm> <directory>`
use forest_hydraulics::prelude::*;
use forest_hydraulics::utils;
use log::{error, info};
use std::path::Path;

fn run(ufm: &Path) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting uniform flow model: {}", ufm.display());
    let config = ModelConfig::read(ufm)?;
    let channel = config.channel()?;
    let curve = config.rating_curve()?;
    let tables = curve.run(&channel)?;

    let dir = config.results_dir();
    std::fs::create_dir_all(&dir)?;
    for table in &tables {
        let path = dir.join(format!(
            "hydraulics_results{}.csv",
            table.slope.suffix(config.suffix_decimals)
        ));
        info!(
            "writing results for slope: 1 m in / {} m to {}",
            (table.slope.run_km * 1000.0).round(),
            path.display()
        );
        utils::record(&table.records, &path)?;
    }
    if config.plot {
        plot::rating_curves(&tables, dir.join("rating_curves.png"))?;
    }
    info!("Ended uniform flow model: {}", ufm.display());
    Ok(())
}

fn main() {
    let mut builder = pretty_env_logger::formatted_builder();
    match std::env::var("RUST_LOG") {
        Ok(filters) => builder.parse_filters(&filters),
        Err(_) => builder.filter_level(log::LevelFilter::Info),
    };
    builder.init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("usage: {} <model.ufm> <directory>", args[0]);
        std::process::exit(2);
    }
    let ufm = Path::new(&args[2]).join(&args[1]);
    if let Err(e) = run(&ufm) {
        error!("{}", e);
        std::process::exit(1);
    }
}
