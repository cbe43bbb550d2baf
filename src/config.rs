//! Uniform flow model (ufm) files.
//!
//! A model file is a list of `Key == value` lines. Text after `!` is a comment and keys are
//! matched without regard to case. Data files named in the model are read relative to the
//! directory holding the model file.
//!
//! ```text
//! Channel Width == 10
//! Channel Length == 100
//! Channel Mannings n == 0.03
//! Channel Slopes (km) == slopes.csv
//! Tree Type == Casuarina-overstory
//! Tree Height == 5
//! Tree Width == 3
//! Tree Population == 50
//! Set depths == absolute
//! Flow depths == depths.csv
//! ```
use crate::channel::Channel;
use crate::errors::HydError;
use crate::forest::{Forest, TreeRecord};
use crate::rating::{BedSlope, RatingCurve, Stage};
use crate::tree::{Species, Tree};
use crate::utils;
use log::info;
use serde::Deserialize;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Deserialize)]
struct SlopeRow {
    #[serde(rename = "Slopes")]
    slope: f64,
}

#[derive(Debug, Deserialize)]
struct DepthRow {
    #[serde(rename = "Flow_Depth")]
    depth: f64,
}

#[derive(Debug, Deserialize)]
struct LevelRow {
    #[serde(rename = "Flow_Level")]
    level: f64,
}

/// Contents of a model file.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    /// Directory holding the model file.
    pub home: PathBuf,
    /// Channel width (m).
    pub width: f64,
    /// Channel length (m).
    pub length: f64,
    /// Manning's n of the bed.
    pub n: f64,
    /// Sidewall flag.
    pub sidewalls: bool,
    /// Ruptured forest flag.
    pub ruptured: bool,
    /// Stem blockage flag.
    pub blockage: bool,
    /// Csv of slopes, in km of run per metre of fall.
    pub slope_file: PathBuf,
    /// Species tag of a uniform forest.
    pub tree_type: Option<String>,
    /// Tree height of a uniform forest (m).
    pub tree_height: Option<f64>,
    /// Canopy width of a uniform forest (m).
    pub tree_width: f64,
    /// Population of a uniform forest.
    pub tree_population: Option<u32>,
    /// Csv tree database, used instead of the uniform forest when set.
    pub tree_db: Option<PathBuf>,
    /// Whether depths are absolute rather than fractions of tree height.
    pub absolute_depths: bool,
    /// Csv of flow depths.
    pub depth_file: Option<PathBuf>,
    /// Csv of flow levels.
    pub level_file: Option<PathBuf>,
    /// Decimals of the slope in result file names.
    pub suffix_decimals: u32,
    /// Whether to plot rating curves.
    pub plot: bool,
}

fn parse<T>(key: &str, value: &str) -> Result<T, HydError>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .parse::<T>()
        .map_err(|e| HydError::ParseError(format!("{} == {}: {}", key, value, e)))
}

impl ModelConfig {
    /// Read a model file from `path`.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, HydError> {
        let path = path.as_ref();
        info!("opening uniform flow model (ufm) file: {}", path.display());
        let text = std::fs::read_to_string(path)?;
        let home = path.parent().map(Path::to_path_buf).unwrap_or_default();
        info!("Model home path is: {}", home.display());
        Self::parse(&text, &home)
    }

    /// Parse model file text, resolving data files against `home`.
    pub fn parse(text: &str, home: &Path) -> Result<Self, HydError> {
        let mut width = None;
        let mut length = None;
        let mut slope_file = None;
        let mut config = ModelConfig {
            home: home.to_path_buf(),
            width: 0.0,
            length: 0.0,
            n: 0.03,
            sidewalls: false,
            ruptured: false,
            blockage: true,
            slope_file: PathBuf::new(),
            tree_type: None,
            tree_height: None,
            tree_width: 0.0,
            tree_population: None,
            tree_db: None,
            absolute_depths: false,
            depth_file: None,
            level_file: None,
            suffix_decimals: 0,
            plot: false,
        };

        for line in utils::strip_comments(text) {
            let mut parts = line.splitn(2, "==");
            let key = parts.next().unwrap_or_default().trim();
            let value = match parts.next() {
                Some(v) => v.trim(),
                None => continue,
            };
            let flag = value.eq_ignore_ascii_case("true");
            match key.to_uppercase().as_str() {
                "CHANNEL WIDTH" => {
                    width = Some(parse(key, value)?);
                    info!("Channel width: {} m", value);
                }
                "CHANNEL LENGTH" => {
                    length = Some(parse(key, value)?);
                    info!("Channel length: {} m", value);
                }
                "CHANNEL SLOPES (KM)" => {
                    slope_file = Some(home.join(value));
                    info!("Channel slope file: {}", value);
                }
                "CHANNEL SIDEWALLS" => {
                    config.sidewalls = flag;
                    info!("Use channel sidewalls: {}", flag);
                }
                "TREES RUPTURED" => {
                    config.ruptured = flag;
                    if flag {
                        info!("The forest is ruptured!");
                    }
                }
                "CHANNEL MANNINGS N" => {
                    config.n = parse(key, value)?;
                    info!("Channel bed roughness (Mannings n): {}", value);
                }
                "TREE TYPE" => {
                    config.tree_type = Some(value.to_string());
                    info!("Tree type: {}", value);
                }
                "TREE HEIGHT" => {
                    config.tree_height = Some(parse(key, value)?);
                    info!("Tree height: {} m", value);
                }
                "TREE WIDTH" => {
                    config.tree_width = parse(key, value)?;
                    info!("Tree width: {} m", value);
                }
                "TREE POPULATION" => {
                    config.tree_population = Some(parse(key, value)?);
                    info!("Number of trees: {}", value);
                }
                "SET DEPTHS" => config.absolute_depths = value.eq_ignore_ascii_case("absolute"),
                "FLOW DEPTHS" => {
                    config.depth_file = Some(home.join(value));
                    info!("Flow depths file: {}", value);
                }
                "FLOW LEVELS" => {
                    config.level_file = Some(home.join(value));
                    info!("Flow levels file: {}", value);
                }
                "TREE DB" => {
                    config.tree_db = Some(home.join(value));
                    info!("Tree database file: {}", value);
                }
                "BLOCKAGE" => {
                    if value.eq_ignore_ascii_case("none") {
                        config.blockage = false;
                        info!("Not using blockage factors");
                    }
                }
                "RESULT FILE SUFFIX DECIMALS" => {
                    config.suffix_decimals = parse(key, value)?;
                    info!(
                        "Number of decimals to use in the suffix of the results file: {}",
                        value
                    );
                }
                "PLOT RATING CURVES" => config.plot = flag,
                _ => info!("Ignoring unrecognised line: {}", line),
            }
        }

        config.width = width.ok_or(HydError::MissingKey("Channel Width"))?;
        config.length = length.ok_or(HydError::MissingKey("Channel Length"))?;
        config.slope_file = slope_file.ok_or(HydError::MissingKey("Channel Slopes (km)"))?;
        if config.depth_file.is_none() && config.level_file.is_none() {
            return Err(HydError::NoFlowInput);
        }
        Ok(config)
    }

    /// Plan area of the reach (m²).
    pub fn plan_area(&self) -> f64 {
        self.width * self.length
    }

    /// Build the forest, from the tree database if one is named.
    pub fn forest(&self) -> Result<Forest, HydError> {
        if let Some(db) = &self.tree_db {
            let records: Vec<TreeRecord> = utils::read_csv(db)?;
            return Forest::from_records(&records, self.plan_area());
        }
        let species: Species = self
            .tree_type
            .as_deref()
            .ok_or(HydError::MissingKey("Tree Type"))?
            .parse()?;
        let height = self.tree_height.ok_or(HydError::MissingKey("Tree Height"))?;
        let population = self
            .tree_population
            .ok_or(HydError::MissingKey("Tree Population"))?;
        Ok(Forest::new(self.plan_area()).tree(
            Tree::new(species, height)
                .specimens(population)
                .canopy_width(self.tree_width),
        ))
    }

    /// Build the channel and its forest.
    pub fn channel(&self) -> Result<Channel, HydError> {
        let mut channel = Channel::new(self.width, self.length)
            .mannings_n(self.n)
            .sidewalls(self.sidewalls)
            .blockage(self.blockage)
            .ruptured(self.ruptured)
            .forest(self.forest()?);
        channel.set_water_depth(1.0);
        channel.get_forest().log_geometry();
        Ok(channel)
    }

    /// Read the bed slopes.
    pub fn slopes(&self) -> Result<Vec<BedSlope>, HydError> {
        info!("opening slope file: {}", self.slope_file.display());
        let rows: Vec<SlopeRow> = utils::read_csv(&self.slope_file)?;
        Ok(rows.iter().map(|r| BedSlope::from_km(r.slope)).collect())
    }

    /// Read the water stages. Depths take precedence over levels.
    pub fn stage(&self) -> Result<Stage, HydError> {
        if let Some(file) = &self.depth_file {
            info!("opening flow depth file: {}", file.display());
            let rows: Vec<DepthRow> = utils::read_csv(file)?;
            let scale = if self.absolute_depths {
                1.0
            } else {
                self.tree_height.ok_or(HydError::MissingKey("Tree Height"))?
            };
            return Ok(Stage::Depths(rows.iter().map(|r| r.depth * scale).collect()));
        }
        if let Some(file) = &self.level_file {
            info!("opening flow level file: {}", file.display());
            let rows: Vec<LevelRow> = utils::read_csv(file)?;
            return Ok(Stage::Levels(rows.iter().map(|r| r.level).collect()));
        }
        Err(HydError::NoFlowInput)
    }

    /// Operating points of the model.
    pub fn rating_curve(&self) -> Result<RatingCurve, HydError> {
        Ok(RatingCurve::new(self.stage()?).slopes(&self.slopes()?))
    }

    /// Directory receiving result files.
    pub fn results_dir(&self) -> PathBuf {
        self.home.join("results")
    }
}
