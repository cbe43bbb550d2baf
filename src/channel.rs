//! Rectangular channel reaches obstructed by a forest.
//!
//! A [`Channel`] owns its geometry and a [`Forest`]. For a given water depth and bed slope,
//! [resolve_velocity](struct.Channel.html#method.resolve_velocity) partitions the flow between
//! the forest layer and, when the canopy is overtopped, a free-surface layer above it, and solves
//! the force balance between slope-driven shear and bed plus drag resistance.
use crate::constants::*;
use crate::errors::HydError;
use crate::forest::Forest;
use crate::solver::{newton, NewtonConfig};
use log::{debug, warn};
use serde::Serialize;
use std::fmt;

/// Whether the water surface sits above the canopy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submergence {
    /// Water depth at or below canopy height.
    Emergent,
    /// Water depth above canopy height.
    Submerged,
}

impl fmt::Display for Submergence {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Submergence::Emergent => write!(f, "emergent"),
            Submergence::Submerged => write!(f, "submerged"),
        }
    }
}

/// Non-fatal conditions met while resolving a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HydWarning {
    /// Stem footprint exceeded the storage reduction cap, which was used instead.
    StorageSaturated {
        /// Storage reduction factor before capping.
        raw: f64,
    },
}

/// Blockage of the reach by stems.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blockage {
    /// Stem footprint over plan area, before capping.
    pub raw_srf: f64,
    /// Storage reduction factor.
    pub srf: f64,
    /// Cell width factor.
    pub cwf: f64,
    /// True if the cap was applied.
    pub saturated: bool,
}

/// Fixed description of the reach.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelGeometry {
    /// Channel width (m).
    pub width: f64,
    /// Reach length (m).
    pub length: f64,
    /// Bed slope (m/m).
    pub bed_slope: f64,
    /// Manning's roughness of the bed.
    pub n: f64,
    /// Sidewall friction flag, read from configuration but not used by the resolver.
    pub sidewalls: bool,
    /// Whether stem blockage reduces flow area.
    pub blockage: bool,
    /// Whether the forest is storm damaged.
    pub ruptured: bool,
    /// Bed elevation used to turn water levels into depths (m).
    pub bed_level: f64,
}

/// Hydraulic state of the reach, overwritten by every solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowState {
    /// Water depth (m).
    pub water_depth: f64,
    /// Water surface elevation (m).
    pub water_level: f64,
    /// Energy slope (m/m).
    pub energy_slope: f64,
    /// Share of the energy slope spent on bed friction.
    pub friction_slope: f64,
    /// Share of the energy slope spent on stem drag.
    pub drag_slope: f64,
    /// Depth of the forest layer (m).
    pub forest_depth: f64,
    /// Depth of water above the canopy (m), negative when emergent.
    pub submergence_depth: f64,
    /// Submergence regime.
    pub submergence: Submergence,
    /// Closed-form velocity of a rigid forest (m/s).
    pub rigid_velocity: f64,
    /// Velocity in the forest layer (m/s).
    pub forest_velocity: f64,
    /// Velocity in the layer above the canopy (m/s).
    pub submergence_velocity: f64,
    /// Depth averaged velocity (m/s).
    pub flow_velocity: f64,
}

impl FlowState {
    fn new(slope: f64) -> Self {
        FlowState {
            water_depth: 0.0,
            water_level: 0.0,
            energy_slope: slope,
            friction_slope: 0.0,
            drag_slope: 0.0,
            forest_depth: 0.0,
            submergence_depth: 0.0,
            submergence: Submergence::Emergent,
            rigid_velocity: 0.0,
            forest_velocity: 0.0,
            submergence_velocity: 0.0,
            flow_velocity: 0.0,
        }
    }
}

/// One row of hydraulic results.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HydraulicsRecord {
    /// Water depth (m).
    #[serde(rename = "Flow_Depth")]
    pub flow_depth: f64,
    /// Depth averaged velocity (m/s).
    #[serde(rename = "Velocity")]
    pub velocity: f64,
    /// Manning's velocity of the bare channel (m/s).
    #[serde(rename = "Bare_U")]
    pub bare_u: f64,
    /// Back-calculated Manning's n.
    #[serde(rename = "Mannings_n")]
    pub mannings_n: f64,
    /// Energy slope (m/m).
    #[serde(rename = "Slope")]
    pub slope: f64,
    /// Unit discharge ignoring stem volume (m²/s).
    #[serde(rename = "Q_unblocked")]
    pub q_unblocked: f64,
    /// Unit discharge net of stem volume (m²/s).
    #[serde(rename = "Q_blocked")]
    pub q_blocked: f64,
    /// Percentage of tree records reconfiguring.
    #[serde(rename = "Regime")]
    pub regime: u32,
    /// Force balance error (%).
    #[serde(rename = "Error")]
    pub error: i64,
    /// Threshold velocity of an average tree (m/s).
    #[serde(rename = "U0")]
    pub u0: f64,
    /// Forest layer velocity (m/s).
    #[serde(rename = "forest_u")]
    pub forest_u: f64,
    /// Submergence layer velocity (m/s).
    #[serde(rename = "submergence_u")]
    pub submergence_u: f64,
    /// Cell width factor.
    #[serde(rename = "CWF")]
    pub cwf: f64,
    /// Storage reduction factor.
    #[serde(rename = "SRF")]
    pub srf: f64,
    /// Total frontal area (m²).
    #[serde(rename = "Tot_Af")]
    pub tot_af: f64,
}

/// Rectangular channel reach with a forest.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    /// Fixed geometry.
    pub geometry: ChannelGeometry,
    /// Root finder settings for the force balance.
    pub newton: NewtonConfig,
    forest: Forest,
    state: FlowState,
    warnings: Vec<HydWarning>,
}

impl Channel {
    /// Create a channel `width` wide and `length` long with an empty forest,
    /// a flat bed, Manning's n of 0.03 and blockage enabled.
    ///
    /// # Examples
    /// ```
    /// use forest_hydraulics::prelude::*;
    /// let forest = Forest::new(0.0)
    ///     .tree(Tree::new(Species::CasuarinaOverstory, 5.0).specimens(50).canopy_width(3.0));
    /// let mut channel = Channel::new(10.0, 100.0)
    ///     .slope(1.0 / 2000.0)
    ///     .mannings_n(0.03)
    ///     .forest(forest);
    /// channel.set_water_depth(1.0);
    /// let state = channel.resolve_velocity()?;
    /// assert_eq!(state, Submergence::Emergent);
    /// # Ok::<(), HydError>(())
    /// ```
    pub fn new(width: f64, length: f64) -> Self {
        Channel {
            geometry: ChannelGeometry {
                width,
                length,
                bed_slope: 0.0,
                n: 0.03,
                sidewalls: false,
                blockage: true,
                ruptured: false,
                bed_level: 0.0,
            },
            newton: NewtonConfig::default(),
            forest: Forest::new(width * length),
            state: FlowState::new(0.0),
            warnings: Vec::new(),
        }
    }

    /// Set the bed slope.
    pub fn slope(mut self, slope: f64) -> Self {
        self.set_bed_slope(slope);
        self
    }

    /// Set Manning's n of the bed.
    pub fn mannings_n(mut self, n: f64) -> Self {
        self.geometry.n = n;
        self
    }

    /// Set the sidewall flag.
    pub fn sidewalls(mut self, sidewalls: bool) -> Self {
        self.geometry.sidewalls = sidewalls;
        self
    }

    /// Enable or disable stem blockage.
    pub fn blockage(mut self, blockage: bool) -> Self {
        self.geometry.blockage = blockage;
        self
    }

    /// Mark the forest as ruptured.
    pub fn ruptured(mut self, ruptured: bool) -> Self {
        self.geometry.ruptured = ruptured;
        self
    }

    /// Set the bed level used by [set_water_level](#method.set_water_level).
    pub fn bed_level(mut self, level: f64) -> Self {
        self.geometry.bed_level = level;
        self
    }

    /// Assign the forest, spreading it over the plan area of the channel.
    pub fn forest(mut self, mut forest: Forest) -> Self {
        forest.plan_area = self.plan_area();
        self.forest = forest;
        self
    }

    /// The forest in the reach.
    pub fn get_forest(&self) -> &Forest {
        &self.forest
    }

    /// Hydraulic state from the last solve.
    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// Warnings raised by the last solve.
    pub fn warnings(&self) -> &[HydWarning] {
        &self.warnings
    }

    /// Plan area of the reach (m²).
    pub fn plan_area(&self) -> f64 {
        self.geometry.width * self.geometry.length
    }

    /// Set bed slope, and with it the energy slope of uniform flow.
    pub fn set_bed_slope(&mut self, slope: f64) {
        self.geometry.bed_slope = slope;
        self.state.energy_slope = slope;
    }

    /// Set the water depth and push it down to the trees.
    pub fn set_water_depth(&mut self, depth: f64) {
        self.state.water_depth = depth;
        self.state.water_level = self.geometry.bed_level + depth;
        self.forest.set_flow_depth(depth);
    }

    /// Set the water surface elevation and push it down to the trees.
    pub fn set_water_level(&mut self, level: f64) {
        self.state.water_level = level;
        self.state.water_depth = (level - self.geometry.bed_level).max(MIN_VALUE);
        self.forest.set_flow_level(level);
    }

    /// Volume of water in the reach, ignoring stems (m³).
    pub fn channel_volume(&self) -> f64 {
        self.plan_area() * self.state.water_depth
    }

    /// Cross-section area at the current water depth (m²).
    pub fn flow_area(&self) -> f64 {
        self.geometry.width * self.state.water_depth
    }

    /// Wetted perimeter (m).
    pub fn wet_perimeter(&self) -> f64 {
        self.geometry.width + 2.0 * self.state.water_depth
    }

    /// Stem blockage at the current working depths.
    pub fn blockage_factors(&self) -> Blockage {
        if !self.geometry.blockage {
            return Blockage {
                raw_srf: 0.0,
                srf: 0.0,
                cwf: 0.0,
                saturated: false,
            };
        }
        let raw_srf = self.forest.total_plan_area() / self.plan_area();
        let saturated = raw_srf > MAX_STORAGE_REDUCTION;
        let srf = if saturated {
            MAX_STORAGE_REDUCTION
        } else {
            raw_srf
        };
        Blockage {
            raw_srf,
            srf,
            cwf: srf.sqrt(),
            saturated,
        }
    }

    /// Fraction of plan area occupied by stems, capped at 0.9.
    pub fn storage_reduction_factor(&self) -> f64 {
        self.blockage_factors().srf
    }

    /// Fractional narrowing of flow width by stems.
    pub fn cell_width_factor(&self) -> f64 {
        self.blockage_factors().cwf
    }

    /// Depth and blockage correction to the bed and forest roughness.
    pub fn theta(&self) -> f64 {
        let b = self.blockage_factors();
        (1.0 - b.srf) / (1.0 - b.cwf).powf(4.0 / 3.0)
    }

    /// Hydraulic radius of the flow (m).
    pub fn hydraulic_radius(&self) -> f64 {
        let mut radius = self.state.forest_depth * (1.0 - self.cell_width_factor());
        if self.state.submergence == Submergence::Submerged {
            radius += self.state.submergence_depth;
        }
        radius
    }

    fn bed_shear(&self, u: f64, theta: f64) -> f64 {
        WATER_DENSITY * G * self.geometry.n.powi(2) * theta
            / self.state.forest_depth.powf(1.0 / 3.0)
            * u.powi(2)
    }

    /// Bed shear stress (Pa) at forest layer velocity `u`.
    pub fn bed_shear_stress(&self, u: f64) -> f64 {
        self.bed_shear(u, self.theta())
    }

    /// Slope-driven shear stress (Pa) available at the current depth.
    pub fn total_shear_stress(&self) -> f64 {
        let mut radius = self.state.forest_depth * (1.0 - self.storage_reduction_factor());
        if self.state.submergence == Submergence::Submerged {
            radius += self.state.submergence_depth;
        }
        WATER_DENSITY * G * radius * self.state.energy_slope
    }

    /// Manning's n equivalent of a rigid forest.
    pub fn rigid_forest_n(&self) -> f64 {
        let numerator =
            self.state.forest_depth.powf(1.0 / 3.0) * self.forest.total_rigid_speed_specific_drag();
        let denominator = WATER_DENSITY * G * self.plan_area() * self.theta();
        (numerator / denominator).sqrt()
    }

    /// Bed and rigid forest roughness combined in quadrature.
    pub fn rigid_composite_n(&self) -> f64 {
        (self.geometry.n.powi(2) + self.rigid_forest_n().powi(2)).sqrt()
    }

    /// Solve for the flow velocity at the current depth and slope.
    pub fn resolve_velocity(&mut self) -> Result<Submergence, HydError> {
        self.warnings.clear();
        self.state.energy_slope = self.geometry.bed_slope;

        if self.geometry.ruptured {
            self.forest.rupture();
            debug!("Forest is ruptured...");
        }

        let canopy = self.forest.canopy_height(self.geometry.ruptured)?;
        self.state.forest_depth = canopy;
        self.state.submergence_depth = self.state.water_depth - canopy;
        if self.state.submergence_depth > SUBMERGENCE_TOLERANCE {
            self.state.submergence = Submergence::Submerged;
            self.forest.submerge();
        } else {
            self.state.submergence = Submergence::Emergent;
            self.state.forest_depth = self.state.water_depth;
        }
        debug!(
            "Water depth: {:.2}    Canopy height: {:.2}    State: {}",
            self.state.water_depth, canopy, self.state.submergence
        );

        let blockage = self.blockage_factors();
        if blockage.saturated {
            warn!(
                "Storage reduction factor is large! {:.3} capped at {}",
                blockage.raw_srf, MAX_STORAGE_REDUCTION
            );
            self.warnings.push(HydWarning::StorageSaturated {
                raw: blockage.raw_srf,
            });
        }

        let radius = self.state.forest_depth * (1.0 - blockage.cwf);
        let composite_n = self.rigid_composite_n();
        let rigid_u = radius.powf(2.0 / 3.0) * self.state.energy_slope.sqrt() / composite_n;
        self.state.rigid_velocity = rigid_u;
        debug!(
            "Rigid velocity: {:.3} m/s Mannings n: {:.3} CWF: {:.2}",
            rigid_u, composite_n, blockage.cwf
        );

        let forest_u = if self.forest.check_if_rigid(rigid_u) {
            rigid_u
        } else {
            let theta = self.theta();
            let total = self.total_shear_stress();
            newton(
                |u| self.bed_shear(u, theta) + self.forest.drag_shear(u) - total,
                &self.newton,
            )?
        };
        self.state.forest_velocity = forest_u;
        self.forest.record_regimes(forest_u);

        // slope shares scale with the shear each term resists
        let total = self.total_shear_stress();
        if total > 0.0 {
            let slope = self.state.energy_slope;
            self.state.friction_slope = slope * self.bed_shear_stress(forest_u) / total;
            self.state.drag_slope = slope * self.forest.drag_shear(forest_u) / total;
        } else {
            self.state.friction_slope = 0.0;
            self.state.drag_slope = 0.0;
        }
        debug!(
            "bed stress: {:.2} forest stress: {:.2} total stress: {:.3}",
            self.bed_shear_stress(forest_u),
            self.forest.drag_shear(forest_u),
            self.total_shear_stress()
        );

        if self.state.submergence == Submergence::Submerged {
            let us = self.submergence_layer_velocity(forest_u);
            self.state.submergence_velocity = us;
            self.state.flow_velocity = (self.state.forest_depth * forest_u * (1.0 - blockage.cwf)
                + self.state.submergence_depth * us)
                / self.state.water_depth;
        } else {
            self.state.submergence_velocity = 0.0;
            self.state.flow_velocity = forest_u;
        }
        Ok(self.state.submergence)
    }

    /// Log-law velocity (m/s) of the layer above the canopy, given forest layer velocity `uf`.
    pub fn submergence_layer_velocity(&self, uf: f64) -> f64 {
        let s = &self.state;
        let shear_u = (G * s.submergence_depth * s.energy_slope).sqrt();
        let k = self.forest.cu * shear_u / KAPPA;
        let us = s.water_depth / s.submergence_depth * (s.water_depth / s.forest_depth).ln() - 1.0;
        k * us + uf
    }

    /// Mismatch of the force balance at the resolved velocity, in percent of total shear.
    pub fn conversion_error(&self) -> i64 {
        let u = self.state.forest_velocity;
        let total = self.total_shear_stress();
        ((self.bed_shear_stress(u) + self.forest.drag_shear(u) - total) / total * 100.0).round()
            as i64
    }

    /// Manning's n back-calculated from the resolved velocity.
    pub fn mannings_n_effective(&self) -> f64 {
        self.hydraulic_radius().powf(2.0 / 3.0) * self.state.energy_slope.sqrt()
            / self.state.flow_velocity
    }

    /// Unit discharge ignoring stem volume (m²/s).
    pub fn q_unblocked(&self) -> f64 {
        self.flow_area() * self.state.flow_velocity / self.geometry.width
    }

    /// Mean cross-section area net of stem volume (m²).
    pub fn effective_flow_area(&self) -> f64 {
        (self.channel_volume() - self.forest.volume()) / self.geometry.length
    }

    /// Unit discharge net of stem volume (m²/s).
    pub fn q_blocked(&self) -> f64 {
        self.effective_flow_area() * self.state.flow_velocity / self.geometry.width
    }

    /// Manning's velocity of the channel without its forest (m/s).
    pub fn mannings_u(&self) -> f64 {
        self.state.water_depth.powf(2.0 / 3.0) * self.state.energy_slope.sqrt() / self.geometry.n
    }

    /// Threshold velocity of a tree of average height (m/s).
    pub fn threshold_velocity(&self) -> Result<f64, HydError> {
        self.forest.average_threshold_velocity()
    }

    /// Collect the results of the last solve.
    pub fn record(&self) -> Result<HydraulicsRecord, HydError> {
        let blockage = self.blockage_factors();
        Ok(HydraulicsRecord {
            flow_depth: self.state.water_depth,
            velocity: self.state.flow_velocity,
            bare_u: self.mannings_u(),
            mannings_n: self.mannings_n_effective(),
            slope: self.state.energy_slope,
            q_unblocked: self.q_unblocked(),
            q_blocked: self.q_blocked(),
            regime: self.forest.reconfiguration_proportion(),
            error: self.conversion_error(),
            u0: self.threshold_velocity()?,
            forest_u: self.state.forest_velocity,
            submergence_u: self.state.submergence_velocity,
            cwf: blockage.cwf,
            srf: blockage.srf,
            tot_af: self.forest.total_frontal_area(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Species, Tree};
    use approx::assert_relative_eq;

    fn casuarina(specimens: u32) -> Forest {
        Forest::new(0.0).tree(
            Tree::new(Species::CasuarinaOverstory, 5.0)
                .specimens(specimens)
                .canopy_width(3.0),
        )
    }

    fn reach() -> Channel {
        Channel::new(10.0, 100.0)
            .slope(1.0 / 2000.0)
            .mannings_n(0.03)
            .blockage(true)
            .forest(casuarina(50))
    }

    #[test]
    fn forest_spread_over_plan_area() {
        let channel = reach();
        assert_eq!(channel.get_forest().plan_area, 1000.0);
        assert_eq!(channel.state().energy_slope, 1.0 / 2000.0);
    }

    #[test]
    fn shallow_reach_is_emergent() {
        let mut channel = reach();
        channel.set_water_depth(1.0);
        let state = channel.resolve_velocity().unwrap();
        assert_eq!(state, Submergence::Emergent);
        assert_eq!(channel.state().forest_depth, 1.0);
        assert_eq!(channel.state().flow_velocity, channel.state().forest_velocity);
        assert_eq!(channel.state().submergence_velocity, 0.0);
        assert!(channel.state().flow_velocity > 0.0);
        // drag is not negligible at this density
        assert!(channel.state().flow_velocity < channel.mannings_u());
        assert!(channel.warnings().is_empty());
    }

    #[test]
    fn force_balance_at_convergence() {
        let mut channel = reach();
        channel.set_water_depth(1.0);
        channel.resolve_velocity().unwrap();
        let u = channel.state().forest_velocity;
        assert!(u != channel.state().rigid_velocity);
        let residual = channel.bed_shear_stress(u) + channel.get_forest().drag_shear(u)
            - channel.total_shear_stress();
        assert!(residual.abs() < 1e-5);
        assert_eq!(channel.conversion_error(), 0);
        let s = channel.state();
        assert_relative_eq!(
            s.friction_slope + s.drag_slope,
            s.energy_slope,
            max_relative = 1e-6
        );
    }

    #[test]
    fn deep_reach_is_submerged() {
        let mut channel = reach();
        channel.set_water_depth(6.0);
        let state = channel.resolve_velocity().unwrap();
        assert_eq!(state, Submergence::Submerged);
        for tree in channel.get_forest().trees() {
            assert_eq!(tree.flow_depth(), tree.height);
        }
        let s = *channel.state();
        assert_relative_eq!(s.forest_depth, 5.0);
        assert_relative_eq!(s.submergence_depth, 1.0);
        assert!(s.submergence_velocity > s.forest_velocity);
        let cwf = channel.cell_width_factor();
        let expected = (5.0 * s.forest_velocity * (1.0 - cwf) + s.submergence_velocity) / 6.0;
        assert_relative_eq!(s.flow_velocity, expected, max_relative = 1e-12);
        assert_relative_eq!(
            channel.hydraulic_radius(),
            5.0 * (1.0 - cwf) + 1.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn submergence_tolerance() {
        let mut channel = reach();
        channel.set_water_depth(5.0005);
        assert_eq!(channel.resolve_velocity().unwrap(), Submergence::Emergent);
        assert_eq!(channel.state().forest_depth, 5.0005);
        channel.set_water_depth(5.01);
        assert_eq!(channel.resolve_velocity().unwrap(), Submergence::Submerged);
    }

    #[test]
    fn negligible_velocity_short_circuits() {
        let mut channel = reach().slope(1e-12);
        channel.set_water_depth(1.0);
        channel.resolve_velocity().unwrap();
        let s = channel.state();
        assert!(channel.get_forest().check_if_rigid(s.rigid_velocity));
        assert_eq!(s.forest_velocity, s.rigid_velocity);
    }

    #[test]
    fn storage_reduction_is_capped() {
        let mut channel = Channel::new(10.0, 100.0)
            .slope(1.0 / 2000.0)
            .forest(casuarina(5000));
        channel.set_water_depth(1.0);
        let b = channel.blockage_factors();
        assert!(b.saturated);
        assert!(b.raw_srf > 0.9);
        assert_eq!(channel.storage_reduction_factor(), 0.9);
        channel.resolve_velocity().unwrap();
        assert_eq!(channel.warnings().len(), 1);
        assert!(matches!(
            channel.warnings()[0],
            HydWarning::StorageSaturated { .. }
        ));
    }

    #[test]
    fn blockage_disabled() {
        let mut channel = Channel::new(10.0, 100.0)
            .slope(1.0 / 2000.0)
            .blockage(false)
            .forest(casuarina(5000));
        channel.set_water_depth(1.0);
        assert_eq!(channel.cell_width_factor(), 0.0);
        assert_eq!(channel.storage_reduction_factor(), 0.0);
        assert_eq!(channel.theta(), 1.0);
    }

    #[test]
    fn resolving_twice_is_idempotent() {
        for depth in &[1.0, 6.0] {
            let mut channel = reach().ruptured(true);
            channel.set_water_depth(*depth);
            channel.resolve_velocity().unwrap();
            let first = (*channel.state(), channel.record().unwrap());
            channel.resolve_velocity().unwrap();
            let second = (*channel.state(), channel.record().unwrap());
            assert_eq!(first, second);
        }
    }

    #[test]
    fn ruptured_canopy_collapses() {
        let mut channel = reach().ruptured(true);
        channel.set_water_depth(2.0);
        assert_eq!(channel.resolve_velocity().unwrap(), Submergence::Submerged);
        assert_relative_eq!(channel.state().forest_depth, 1.5);
        assert!(channel.get_forest().trees().iter().all(|t| t.is_ruptured()));
    }

    #[test]
    fn water_level_sets_depth() {
        let forest = Forest::new(0.0).tree(
            Tree::new(Species::CasuarinaOverstory, 5.0)
                .specimens(50)
                .canopy_width(3.0)
                .ground_level(2.0),
        );
        let mut channel = reach().bed_level(2.0).forest(forest);
        channel.set_water_level(3.5);
        assert_relative_eq!(channel.get_forest().trees()[0].flow_depth(), 1.5);
        assert_relative_eq!(channel.state().water_depth, 1.5);
        assert_eq!(channel.resolve_velocity().unwrap(), Submergence::Emergent);
    }

    #[test]
    fn empty_forest_fails() {
        let mut channel = Channel::new(10.0, 100.0).slope(0.001);
        channel.set_water_depth(1.0);
        assert!(matches!(
            channel.resolve_velocity(),
            Err(HydError::NoCanopy)
        ));
    }

    #[test]
    fn record_reports_resolved_state() {
        let mut channel = reach();
        channel.set_water_depth(1.0);
        channel.resolve_velocity().unwrap();
        let rec = channel.record().unwrap();
        assert_eq!(rec.flow_depth, 1.0);
        assert_eq!(rec.velocity, channel.state().flow_velocity);
        assert_relative_eq!(rec.q_unblocked, rec.velocity, max_relative = 1e-12);
        assert!(rec.q_blocked < rec.q_unblocked);
        assert_relative_eq!(
            rec.bare_u,
            1.0 / 0.03 * (0.0005f64).sqrt(),
            max_relative = 1e-12
        );
        assert!(rec.mannings_n > 0.03);
        assert_eq!(rec.error, 0);
        assert!(rec.u0 > rec.velocity);
        assert_eq!(rec.regime, 0);
    }

    #[test]
    fn dry_trees_leave_velocity_alone() {
        let mut wet = reach();
        let mut mixed = Channel::new(10.0, 100.0)
            .slope(1.0 / 2000.0)
            .mannings_n(0.03)
            .blockage(true)
            .forest(
                casuarina(50).tree(
                    Tree::new(Species::CasuarinaOverstory, 5.0)
                        .specimens(800)
                        .canopy_width(3.0)
                        .ground_level(3.0),
                ),
            );
        wet.set_water_level(1.0);
        mixed.set_water_level(1.0);
        wet.resolve_velocity().unwrap();
        mixed.resolve_velocity().unwrap();
        assert!(mixed.warnings().is_empty());
        assert_relative_eq!(
            mixed.storage_reduction_factor(),
            wet.storage_reduction_factor(),
            max_relative = 1e-12
        );
        assert_relative_eq!(
            mixed.state().flow_velocity,
            wet.state().flow_velocity,
            max_relative = 1e-12
        );
    }
}
