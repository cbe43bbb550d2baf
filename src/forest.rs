//! Populations of trees occupying a channel reach.
use crate::constants::*;
use crate::errors::HydError;
use crate::tree::{DragRegime, Species, Tree};
use log::{error, info};
use serde::Deserialize;

/// Holder struct to read tree records from a tree database csv.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeRecord {
    /// Species tag.
    #[serde(rename = "Type")]
    pub species: String,
    /// Tree height (m).
    #[serde(rename = "Height")]
    pub height: f64,
    /// Number of specimens.
    #[serde(rename = "Population")]
    pub population: u32,
    /// Ground level (m).
    #[serde(rename = "GroundLevel")]
    pub ground_level: f64,
    /// Canopy width (m), zero when the database has no such column.
    #[serde(rename = "CanopyWidth", default)]
    pub canopy_width: f64,
}

/// A collection of tree records spread over the plan area of a reach.
#[derive(Debug, Clone, PartialEq)]
pub struct Forest {
    /// Plan area of the reach (m²).
    pub plan_area: f64,
    /// Submergence-layer velocity coefficient.
    pub cu: f64,
    trees: Vec<Tree>,
    flow_depth: f64,
    flow_level: f64,
}

impl Forest {
    /// Create an empty forest over `plan_area` square metres.
    pub fn new(plan_area: f64) -> Self {
        Forest {
            plan_area,
            cu: DEFAULT_CU,
            trees: Vec::new(),
            flow_depth: 0.0,
            flow_level: 0.0,
        }
    }

    /// Add a tree record, builder style.
    ///
    /// # Examples
    /// ```
    /// use forest_hydraulics::prelude::*;
    /// let forest = Forest::new(1000.0)
    ///     .tree(Tree::new(Species::CasuarinaOverstory, 5.0).specimens(50).canopy_width(3.0));
    /// assert_eq!(forest.population(), 50);
    /// ```
    pub fn tree(mut self, tree: Tree) -> Self {
        self.trees.push(tree);
        self
    }

    /// Add a tree record.
    pub fn add_tree(&mut self, tree: Tree) {
        self.trees.push(tree);
    }

    /// Build a forest from tree database rows.
    /// Rows with an unrecognised species are logged and skipped.
    pub fn from_records(records: &[TreeRecord], plan_area: f64) -> Result<Self, HydError> {
        info!("Reading tree database...");
        let mut forest = Forest::new(plan_area);
        for (i, rec) in records.iter().enumerate() {
            match rec.species.parse::<Species>() {
                Ok(species) => forest.add_tree(
                    Tree::new(species, rec.height)
                        .specimens(rec.population)
                        .ground_level(rec.ground_level)
                        .canopy_width(rec.canopy_width)
                        .id(&i.to_string()),
                ),
                Err(e) => error!("{}", e),
            }
        }
        if forest.trees.is_empty() {
            return Err(HydError::NoCanopy);
        }
        Ok(forest)
    }

    /// Tree records in insertion order.
    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    /// Mutable access to the tree records.
    pub fn trees_mut(&mut self) -> &mut [Tree] {
        &mut self.trees
    }

    /// Last channel-wide depth applied.
    pub fn flow_depth(&self) -> f64 {
        self.flow_depth
    }

    /// Last water level applied.
    pub fn flow_level(&self) -> f64 {
        self.flow_level
    }

    /// Total number of specimens.
    pub fn population(&self) -> u32 {
        self.trees.iter().map(|t| t.number_of_specimens).sum()
    }

    /// Specimens per square metre.
    pub fn density(&self) -> f64 {
        self.population() as f64 / self.plan_area
    }

    fn weighted_average<F: Fn(&Tree) -> f64>(&self, value: F) -> Result<f64, HydError> {
        let mut count = 0.0;
        let mut sum = 0.0;
        for tree in self.trees.iter().filter(|t| value(t) > CANOPY_MIN) {
            count += tree.number_of_specimens as f64;
            sum += value(tree) * tree.number_of_specimens as f64;
        }
        if count > 0.0 {
            Ok(sum / count)
        } else {
            Err(HydError::NoCanopy)
        }
    }

    /// Population weighted mean height (m).
    pub fn average_tree_height(&self) -> Result<f64, HydError> {
        self.weighted_average(|t| t.height)
    }

    /// Population weighted mean canopy width (m).
    pub fn average_canopy_width(&self) -> Result<f64, HydError> {
        self.weighted_average(|t| t.canopy_width)
    }

    /// Height of the canopy top. A ruptured canopy collapses to half its crown width.
    pub fn canopy_height(&self, is_ruptured: bool) -> Result<f64, HydError> {
        if is_ruptured {
            Ok(self.average_canopy_width()? / 2.0)
        } else {
            self.average_tree_height()
        }
    }

    /// Apply a channel-wide flow depth to every tree.
    pub fn set_flow_depth(&mut self, depth: f64) {
        self.flow_depth = depth;
        for tree in self.trees.iter_mut() {
            tree.set_flow_depth(depth);
        }
    }

    /// Apply a water surface elevation to every tree.
    pub fn set_flow_level(&mut self, level: f64) {
        self.flow_level = level;
        for tree in self.trees.iter_mut() {
            tree.set_water_level(level);
        }
    }

    /// Submerge every tree to its full height.
    pub fn submerge(&mut self) {
        for tree in self.trees.iter_mut() {
            let height = tree.height;
            tree.set_flow_depth(height);
        }
    }

    /// Swap every tree to its ruptured drag law.
    pub fn rupture(&mut self) {
        for tree in self.trees.iter_mut() {
            tree.rupture();
        }
    }

    /// Total drag force (N) at velocity `u`.
    pub fn total_drag(&self, u: f64) -> f64 {
        self.trees
            .iter()
            .filter(|t| t.flow_depth() > DRAG_DEPTH)
            .map(|t| t.drag(u).force * t.number_of_specimens as f64)
            .sum()
    }

    /// Drag per unit plan area (Pa) at velocity `u`.
    pub fn drag_shear(&self, u: f64) -> f64 {
        self.total_drag(u) / self.plan_area
    }

    /// Sum of rigid speed-specific drag over the population.
    pub fn total_rigid_speed_specific_drag(&self) -> f64 {
        self.trees
            .iter()
            .filter(|t| t.flow_depth() > DRAG_DEPTH)
            .map(|t| t.rigid_speed_specific_drag() * t.number_of_specimens as f64)
            .sum()
    }

    /// True when `u` is negligible against the threshold velocity of every tree.
    pub fn check_if_rigid(&self, u: f64) -> bool {
        self.trees
            .iter()
            .all(|t| u / t.threshold_velocity() <= RIGID_RATIO)
    }

    /// Record the drag regime of every tree at velocity `u`.
    pub fn record_regimes(&mut self, u: f64) {
        for tree in self.trees.iter_mut() {
            tree.drag_force(u);
        }
    }

    /// Threshold velocity of the first tree scaled to the average tree height.
    pub fn average_threshold_velocity(&self) -> Result<f64, HydError> {
        let mut tree = self.trees.first().cloned().ok_or(HydError::NoCanopy)?;
        tree.height = self.average_tree_height()?;
        Ok(tree.threshold_velocity())
    }

    /// Percentage of tree records in the reconfiguration regime.
    pub fn reconfiguration_proportion(&self) -> u32 {
        if self.trees.is_empty() {
            return 0;
        }
        let hits = self
            .trees
            .iter()
            .filter(|t| t.drag_regime() == DragRegime::Reconfiguration)
            .count();
        (hits as f64 / self.trees.len() as f64 * 100.0).round() as u32
    }

    /// Volume (m³) of water displaced by submerged stems.
    pub fn volume(&self) -> f64 {
        self.trees
            .iter()
            .filter(|t| t.flow_depth() > DRAG_DEPTH)
            .map(|t| t.footprint() * t.flow_depth() * t.number_of_specimens as f64)
            .sum()
    }

    /// Total frontal area (m²) at the working depths.
    pub fn total_frontal_area(&self) -> f64 {
        self.trees
            .iter()
            .map(|t| t.frontal_area() * t.number_of_specimens as f64)
            .sum()
    }

    /// Total plan footprint (m²) of the wet stems.
    pub fn total_plan_area(&self) -> f64 {
        self.trees
            .iter()
            .filter(|t| t.flow_depth() > DRAG_DEPTH)
            .map(|t| t.footprint() * t.number_of_specimens as f64)
            .sum()
    }

    /// Log a summary of the forest.
    pub fn log_geometry(&self) {
        info!("Number of trees is: {}", self.population());
        info!("Forest area is: {} m²", self.plan_area);
        info!("Forest tree density is: {:.3} trees per m²", self.density());
        info!("The total tree volume is: {:.2} m3", self.volume());
        info!(
            "The shear stress from tree drag for a velocity of 1 m/s is: {:.2} Pa",
            self.drag_shear(1.0)
        );
        if let Some(tree) = self.trees.first() {
            let geo = tree.geometry();
            info!(
                "{} {} at {:.2} m: area {:.2} m², first moment {:.2} m³, base diameter {:.3} m",
                tree.species(),
                tree,
                tree.height,
                geo.area,
                geo.first_area,
                geo.base_diameter
            );
            info!(
                "At depth {:.2} m: area {:.2} m², first moment {:.2} m³, diameter {:.3} m, threshold velocity {:.3} m/s, drag at 1 m/s {:.1} N",
                tree.flow_depth(),
                geo.area_h,
                geo.first_area_h,
                geo.diameter_h,
                geo.threshold_velocity,
                geo.drag_1
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn forest() -> Forest {
        Forest::new(1000.0).tree(
            Tree::new(Species::CasuarinaOverstory, 5.0)
                .specimens(50)
                .canopy_width(3.0),
        )
    }

    fn mixed() -> Forest {
        Forest::new(1000.0)
            .tree(
                Tree::new(Species::CasuarinaOverstory, 4.0)
                    .specimens(10)
                    .canopy_width(2.0),
            )
            .tree(
                Tree::new(Species::CasuarinaOverstory, 8.0)
                    .specimens(30)
                    .canopy_width(6.0),
            )
            .tree(Tree::new(Species::CasuarinaOverstory, 0.0).specimens(100))
    }

    #[test]
    fn weighted_averages_skip_tiny_trees() {
        let f = mixed();
        assert_eq!(f.population(), 140);
        assert_relative_eq!(f.average_tree_height().unwrap(), 7.0);
        assert_relative_eq!(f.average_canopy_width().unwrap(), 5.0);
        assert_relative_eq!(f.canopy_height(false).unwrap(), 7.0);
        assert_relative_eq!(f.canopy_height(true).unwrap(), 2.5);
    }

    #[test]
    fn empty_canopy_is_an_error() {
        let f = Forest::new(10.0).tree(Tree::new(Species::CasuarinaOverstory, 5.0));
        assert!(matches!(f.canopy_height(true), Err(HydError::NoCanopy)));
        assert!(Forest::new(10.0).average_threshold_velocity().is_err());
    }

    #[test]
    fn flow_depth_reaches_every_tree() {
        let mut f = mixed();
        f.set_flow_depth(5.0);
        let depths: Vec<f64> = f.trees().iter().map(|t| t.flow_depth()).collect();
        assert_eq!(depths, vec![4.0, 5.0, MIN_VALUE]);
        f.submerge();
        assert_eq!(f.trees()[1].flow_depth(), 8.0);
    }

    #[test]
    fn flow_level_uses_ground_level() {
        let mut f = Forest::new(100.0)
            .tree(Tree::new(Species::CasuarinaOverstory, 5.0).ground_level(1.0))
            .tree(Tree::new(Species::CasuarinaOverstory, 5.0).ground_level(3.0));
        f.set_flow_level(2.5);
        assert_relative_eq!(f.trees()[0].flow_depth(), 1.5);
        assert_eq!(f.trees()[1].flow_depth(), MIN_VALUE);
        assert_eq!(f.flow_level(), 2.5);
    }

    #[test]
    fn drag_only_from_submerged_trees() {
        let mut f = forest();
        f.set_flow_depth(0.0);
        assert_eq!(f.total_drag(1.0), 0.0);
        assert_eq!(f.total_rigid_speed_specific_drag(), 0.0);
        f.set_flow_depth(1.0);
        let single = f.trees()[0].drag(1.0).force;
        assert_relative_eq!(f.total_drag(1.0), single * 50.0);
        assert_relative_eq!(f.drag_shear(1.0), single * 50.0 / 1000.0);
    }

    #[test]
    fn rigidity_check() {
        let mut f = forest();
        f.set_flow_depth(1.0);
        let u0 = f.trees()[0].threshold_velocity();
        assert!(f.check_if_rigid(u0 * 0.0005));
        assert!(!f.check_if_rigid(u0 * 0.01));
    }

    #[test]
    fn regime_proportion_counts_records() {
        let mut f = mixed();
        f.set_flow_depth(3.0);
        f.record_regimes(0.1);
        assert_eq!(f.reconfiguration_proportion(), 0);
        let u0 = f.trees()[1].threshold_velocity();
        f.record_regimes(u0 * 1.5);
        assert!(f.reconfiguration_proportion() >= 33);
    }

    #[test]
    fn footprint_scales_with_population() {
        let mut f = forest();
        f.set_flow_depth(1.0);
        let one = f.trees()[0].footprint();
        assert_relative_eq!(f.total_plan_area(), one * 50.0);
        assert_relative_eq!(f.volume(), one * 50.0 * 1.0);
        assert_relative_eq!(f.total_frontal_area(), f.trees()[0].frontal_area() * 50.0);
    }

    #[test]
    fn dry_trees_have_no_footprint() {
        let mut f = forest().tree(
            Tree::new(Species::CasuarinaOverstory, 5.0)
                .specimens(800)
                .ground_level(3.0),
        );
        f.set_flow_level(1.0);
        assert_eq!(f.trees()[1].flow_depth(), MIN_VALUE);
        let wet = f.trees()[0].footprint() * 50.0;
        assert_relative_eq!(f.total_plan_area(), wet);
        assert_relative_eq!(f.volume(), wet * 1.0);
    }

    #[test]
    fn average_threshold_leaves_trees_untouched() {
        let mut f = mixed();
        f.set_flow_depth(3.0);
        let before = f.clone();
        let u0 = f.average_threshold_velocity().unwrap();
        assert!(u0 > 0.0);
        assert_eq!(f, before);
    }

    #[test]
    fn database_rows_skip_unknown_species() {
        let rows = vec![
            TreeRecord {
                species: "Casuarina-overstory".to_string(),
                height: 6.0,
                population: 12,
                ground_level: 0.5,
                canopy_width: 4.0,
            },
            TreeRecord {
                species: "Mangrove".to_string(),
                height: 3.0,
                population: 40,
                ground_level: 0.0,
                canopy_width: 0.0,
            },
        ];
        let f = Forest::from_records(&rows, 500.0).unwrap();
        assert_eq!(f.trees().len(), 1);
        assert_eq!(f.population(), 12);
        assert_eq!(f.trees()[0].canopy_width, 4.0);
        assert!(Forest::from_records(&rows[1..], 500.0).is_err());
    }
}
