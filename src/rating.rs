//! Rating curves: resolving a channel over a grid of bed slopes and flow stages.
use crate::channel::{Channel, HydraulicsRecord};
use crate::errors::HydError;
use log::info;
use rayon::prelude::*;

/// Bed slope written as a fall of 1 m over `run_km` kilometres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BedSlope {
    /// Horizontal run (km) per metre of fall.
    pub run_km: f64,
}

impl BedSlope {
    /// Slope of 1 m in `km` kilometres.
    pub fn from_km(km: f64) -> Self {
        BedSlope { run_km: km }
    }

    /// Slope of "1 in `n`".
    ///
    /// # Examples
    /// ```
    /// use forest_hydraulics::rating::BedSlope;
    /// assert_eq!(BedSlope::one_in(2000.0).value(), 0.0005);
    /// ```
    pub fn one_in(n: f64) -> Self {
        BedSlope { run_km: n / 1000.0 }
    }

    /// Dimensionless slope (m/m).
    pub fn value(&self) -> f64 {
        1.0 / (self.run_km * 1000.0)
    }

    /// Suffix naming the result file of this slope.
    /// With zero `decimals` the run is truncated to whole metres.
    pub fn suffix(&self, decimals: u32) -> String {
        let run = 1000.0 * self.run_km;
        if decimals > 0 {
            let whole = run.trunc();
            let frac = ((run - whole) * 10f64.powi(decimals as i32)) as i64;
            format!("_{}pt{}", whole as i64, frac)
        } else {
            format!("_pt{}", run as i64)
        }
    }
}

/// Water stages to evaluate, as depths or as water surface levels.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// Water depths (m).
    Depths(Vec<f64>),
    /// Water surface elevations (m).
    Levels(Vec<f64>),
}

impl Stage {
    fn values(&self) -> &[f64] {
        match self {
            Stage::Depths(v) | Stage::Levels(v) => v,
        }
    }

    fn apply(&self, channel: &mut Channel, value: f64) {
        match self {
            Stage::Depths(_) => channel.set_water_depth(value),
            Stage::Levels(_) => channel.set_water_level(value),
        }
    }
}

/// Results for one bed slope.
#[derive(Debug, Clone, PartialEq)]
pub struct SlopeTable {
    /// Bed slope of the table.
    pub slope: BedSlope,
    /// One record per stage, in stage order.
    pub records: Vec<HydraulicsRecord>,
}

/// Grid of operating points for a channel.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingCurve {
    /// Bed slopes.
    pub slopes: Vec<BedSlope>,
    /// Water stages.
    pub stage: Stage,
}

impl RatingCurve {
    /// Create a rating curve over `stage` with no slopes.
    pub fn new(stage: Stage) -> Self {
        RatingCurve {
            slopes: Vec::new(),
            stage,
        }
    }

    /// Set the bed slopes.
    pub fn slopes(mut self, slopes: &[BedSlope]) -> Self {
        self.slopes = slopes.to_vec();
        self
    }

    /// Resolve every operating point. Slopes are solved in parallel, each on its own copy of
    /// `channel`, and tables come back in slope order. The first failure aborts the run.
    pub fn run(&self, channel: &Channel) -> Result<Vec<SlopeTable>, HydError> {
        self.slopes
            .par_iter()
            .map(|slope| self.run_slope(channel.clone(), *slope))
            .collect()
    }

    /// Resolve every stage at a single bed slope.
    pub fn run_slope(&self, mut channel: Channel, slope: BedSlope) -> Result<SlopeTable, HydError> {
        info!(
            "resolving velocity for slope: 1 m in / {} km",
            slope.run_km
        );
        channel.set_bed_slope(slope.value());
        let mut records = Vec::with_capacity(self.stage.values().len());
        for value in self.stage.values() {
            self.stage.apply(&mut channel, *value);
            let submergence = channel.resolve_velocity()?;
            let rec = channel.record()?;
            info!(
                "h: {:>4.2}    U: {:>6.3}    recon regime: {:>3}%    Error: {:>3} %    {}",
                rec.flow_depth, rec.velocity, rec.regime, rec.error, submergence
            );
            records.push(rec);
        }
        Ok(SlopeTable { slope, records })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::Forest;
    use crate::tree::{Species, Tree};
    use approx::assert_relative_eq;

    fn channel() -> Channel {
        Channel::new(10.0, 100.0).mannings_n(0.03).forest(
            Forest::new(0.0).tree(
                Tree::new(Species::CasuarinaOverstory, 5.0)
                    .specimens(50)
                    .canopy_width(3.0),
            ),
        )
    }

    #[test]
    fn slope_conversions() {
        assert_relative_eq!(BedSlope::from_km(2.0).value(), 0.0005);
        assert_eq!(BedSlope::one_in(2000.0), BedSlope::from_km(2.0));
        assert_eq!(BedSlope::from_km(2.0).suffix(0), "_pt2000");
        assert_eq!(BedSlope::from_km(0.5).suffix(0), "_pt500");
        assert_eq!(BedSlope::from_km(0.0625).suffix(1), "_62pt5");
    }

    #[test]
    fn one_table_per_slope_in_order() {
        let curve = RatingCurve::new(Stage::Depths(vec![0.5, 1.0, 2.0, 6.0])).slopes(&[
            BedSlope::one_in(500.0),
            BedSlope::one_in(2000.0),
            BedSlope::one_in(10000.0),
        ]);
        let tables = curve.run(&channel()).unwrap();
        assert_eq!(tables.len(), 3);
        assert_eq!(tables[1].slope, BedSlope::one_in(2000.0));
        for table in &tables {
            assert_eq!(table.records.len(), 4);
            assert_relative_eq!(table.records[0].slope, table.slope.value());
            let depths: Vec<f64> = table.records.iter().map(|r| r.flow_depth).collect();
            assert_eq!(depths, vec![0.5, 1.0, 2.0, 6.0]);
        }
        // steeper reaches run faster
        assert!(tables[0].records[1].velocity > tables[2].records[1].velocity);
    }

    #[test]
    fn parallel_run_matches_sequential() {
        let curve = RatingCurve::new(Stage::Depths(vec![1.0, 3.0]))
            .slopes(&[BedSlope::one_in(1000.0), BedSlope::one_in(3000.0)]);
        let tables = curve.run(&channel()).unwrap();
        for table in &tables {
            let single = curve.run_slope(channel(), table.slope).unwrap();
            assert_eq!(&single, table);
        }
    }

    #[test]
    fn levels_drive_depths() {
        let curve = RatingCurve::new(Stage::Levels(vec![1.0, 2.5]))
            .slopes(&[BedSlope::one_in(2000.0)]);
        let tables = curve.run(&channel()).unwrap();
        assert_relative_eq!(tables[0].records[1].flow_depth, 2.5);
    }

    #[test]
    fn failure_aborts_run() {
        let curve = RatingCurve::new(Stage::Depths(vec![1.0])).slopes(&[BedSlope::one_in(100.0)]);
        let res = curve.run(&Channel::new(10.0, 100.0));
        assert!(matches!(res, Err(HydError::NoCanopy)));
    }
}
