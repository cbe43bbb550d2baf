//! Allometric and biomechanical model of individual trees.
//!
//! A [`Tree`] carries the allometric closures of its species, describing frontal area, first moment
//! of area, stem diameter and flexural modulus as functions of tree height and submerged depth.
//! Drag follows the Vogel reconfiguration law: below the threshold velocity the stem is rigid and
//! drag grows with the square of velocity, above it the (negative) Vogel exponent softens that growth.
use crate::constants::*;
use crate::errors::HydError;
use std::fmt;
use std::str::FromStr;

/// Power law of the form `coefficient * height^exponent`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerLaw {
    /// Leading coefficient.
    pub coefficient: f64,
    /// Exponent on tree height.
    pub exponent: f64,
}

impl PowerLaw {
    /// Create a power law from its coefficient and exponent.
    pub const fn new(coefficient: f64, exponent: f64) -> Self {
        PowerLaw {
            coefficient,
            exponent,
        }
    }

    /// Evaluate the power law at tree height `height`.
    pub fn eval(&self, height: f64) -> f64 {
        self.coefficient * height.powf(self.exponent)
    }
}

/// Sigmoid closure `-i / (j * (k + x^m)) + l` on relative depth `x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SigmoidShape {
    /// Numerator.
    pub i: f64,
    /// Denominator scale.
    pub j: f64,
    /// Denominator offset.
    pub k: f64,
    /// Asymptote.
    pub l: f64,
    /// Exponent on relative depth.
    pub m: f64,
}

impl SigmoidShape {
    /// Fraction of the full value at relative depth `x`, clamped to [0, 1].
    pub fn fraction(&self, x: f64) -> f64 {
        let a = -self.i / (self.j * (self.k + x.powf(self.m))) + self.l;
        a.max(0.0).min(1.0)
    }
}

/// Drag law coefficients: drag coefficient and Vogel exponent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragLaw {
    /// Drag coefficient.
    pub cd: f64,
    /// Vogel exponent, negative for reconfiguring stems.
    pub vogel: f64,
}

/// The complete set of allometric closures describing one species.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Allometry {
    /// Full frontal area against height.
    pub area: PowerLaw,
    /// Frontal area fraction against relative depth.
    pub area_h: SigmoidShape,
    /// First moment of area about the base against height.
    pub first_area: PowerLaw,
    /// Quadratic coefficients mapping area fraction to first-moment fraction.
    pub first_area_h: [f64; 2],
    /// Basal stem diameter against height.
    pub diameter: PowerLaw,
    /// Quadratic taper coefficients on relative depth.
    pub diameter_h: [f64; 2],
    /// Flexural modulus against height.
    pub modulus: PowerLaw,
    /// Intact drag law.
    pub drag: DragLaw,
}

/// Capability shared by every supported tree species.
pub trait SpeciesParameters {
    /// Species tag, as written in model files.
    fn name(&self) -> &'static str;
    /// Allometric closures of an intact tree.
    fn allometry(&self) -> Allometry;
    /// Drag law of a storm-damaged, broken tree.
    fn ruptured_drag(&self) -> DragLaw;
}

/// Casuarina overstory trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CasuarinaOverstory;

impl SpeciesParameters for CasuarinaOverstory {
    fn name(&self) -> &'static str {
        "Casuarina-overstory"
    }

    fn allometry(&self) -> Allometry {
        Allometry {
            area: PowerLaw::new(0.5982, 1.331),
            area_h: SigmoidShape {
                i: 1.274,
                j: 5.0,
                k: 0.2104,
                l: 1.210,
                m: 2.137,
            },
            first_area: PowerLaw::new(0.2557, 2.3311),
            first_area_h: [0.8881, 0.1119],
            diameter: PowerLaw::new(0.01, 1.15),
            diameter_h: [-0.246, 1.19],
            modulus: PowerLaw::new(2.437, 3.667),
            // Cd0 and Vogel exponent from the CY model
            drag: DragLaw {
                cd: 0.1198,
                vogel: -0.8801,
            },
        }
    }

    fn ruptured_drag(&self) -> DragLaw {
        DragLaw {
            cd: 0.084,
            vogel: -0.587,
        }
    }
}

/// Tag selecting a supported species.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Species {
    /// See [`CasuarinaOverstory`].
    CasuarinaOverstory,
}

impl Species {
    /// Parameters backing this species.
    pub fn parameters(&self) -> &'static dyn SpeciesParameters {
        match self {
            Species::CasuarinaOverstory => &CasuarinaOverstory,
        }
    }
}

impl FromStr for Species {
    type Err = HydError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Casuarina-overstory" => Ok(Species::CasuarinaOverstory),
            other => Err(HydError::UnknownSpecies(other.to_string())),
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.parameters().name())
    }
}

/// Drag behaviour of a stem at the most recent velocity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragRegime {
    /// Velocity at or below the threshold velocity.
    Rigid,
    /// Velocity above the threshold velocity, stems bend.
    Reconfiguration,
}

/// Drag evaluated at a velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drag {
    /// Drag force (N).
    pub force: f64,
    /// Regime the stem is in.
    pub regime: DragRegime,
}

/// Geometry summary of a tree, for logging.
#[derive(Debug, Clone, Copy)]
pub struct Geometry {
    /// Full-height frontal area (m²).
    pub area: f64,
    /// Full-height first moment of area (m³).
    pub first_area: f64,
    /// Basal diameter (m).
    pub base_diameter: f64,
    /// Frontal area at the working depth (m²).
    pub area_h: f64,
    /// First moment of area at the working depth (m³).
    pub first_area_h: f64,
    /// Stem diameter at the working depth (m).
    pub diameter_h: f64,
    /// Threshold velocity at the working depth (m/s).
    pub threshold_velocity: f64,
    /// Drag at 1 m/s (N).
    pub drag_1: f64,
}

/// One tree record, standing for `number_of_specimens` identical trees.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    species: Species,
    allometry: Allometry,
    /// Tree height (m).
    pub height: f64,
    /// Crown width (m).
    pub canopy_width: f64,
    /// Number of identical trees this record represents.
    pub number_of_specimens: u32,
    /// Ground elevation at the tree (m).
    pub ground_level: f64,
    /// Identifier used in diagnostics.
    pub tree_id: String,
    flow_depth: f64,
    water_level: f64,
    drag_regime: DragRegime,
    ruptured: bool,
}

impl Tree {
    /// Create a single intact specimen of `species` with height `height`.
    /// Use [specimens](#method.specimens), [canopy_width](#method.canopy_width) and
    /// [ground_level](#method.ground_level) to fill in the rest.
    ///
    /// # Examples
    /// ```
    /// use forest_hydraulics::prelude::*;
    /// let tree = Tree::new(Species::CasuarinaOverstory, 5.0)
    ///     .specimens(50)
    ///     .canopy_width(3.0);
    /// assert_eq!(tree.number_of_specimens, 50);
    /// ```
    pub fn new(species: Species, height: f64) -> Self {
        Tree {
            species,
            allometry: species.parameters().allometry(),
            height,
            canopy_width: 0.0,
            number_of_specimens: 1,
            ground_level: 0.0,
            tree_id: String::new(),
            flow_depth: MIN_VALUE,
            water_level: 0.0,
            drag_regime: DragRegime::Rigid,
            ruptured: false,
        }
    }

    /// Set the number of specimens.
    pub fn specimens(mut self, n: u32) -> Self {
        self.number_of_specimens = n;
        self
    }

    /// Set the canopy width (m).
    pub fn canopy_width(mut self, width: f64) -> Self {
        self.canopy_width = width;
        self
    }

    /// Set the ground level (m).
    pub fn ground_level(mut self, level: f64) -> Self {
        self.ground_level = level;
        self
    }

    /// Set the identifier.
    pub fn id(mut self, id: &str) -> Self {
        self.tree_id = id.to_string();
        self
    }

    /// Species of the tree.
    pub fn species(&self) -> Species {
        self.species
    }

    /// Allometric closures currently in force.
    pub fn allometry(&self) -> &Allometry {
        &self.allometry
    }

    /// Submerged depth of the tree (m).
    pub fn flow_depth(&self) -> f64 {
        self.flow_depth
    }

    /// Water level last applied to the tree (m).
    pub fn water_level(&self) -> f64 {
        self.water_level
    }

    /// Regime recorded by the last call to [drag_force](#method.drag_force).
    pub fn drag_regime(&self) -> DragRegime {
        self.drag_regime
    }

    /// Whether the tree carries ruptured drag coefficients.
    pub fn is_ruptured(&self) -> bool {
        self.ruptured
    }

    /// Set the submerged depth, clamped to `[0.0001, height]`.
    pub fn set_flow_depth(&mut self, depth: f64) {
        let depth = if depth >= self.height {
            self.height
        } else {
            depth
        };
        self.flow_depth = depth.max(MIN_VALUE);
    }

    /// Set the submerged depth from a water surface elevation.
    /// Depths below 0.001 m above ground floor at 0.0001.
    pub fn set_water_level(&mut self, level: f64) {
        self.water_level = level;
        let depth = level - self.ground_level;
        if depth < DRY_DEPTH {
            self.flow_depth = MIN_VALUE;
        } else {
            self.set_flow_depth(depth);
        }
    }

    /// Swap in the ruptured drag law of the species.
    pub fn rupture(&mut self) {
        self.allometry.drag = self.species.parameters().ruptured_drag();
        self.ruptured = true;
    }

    /// Full-height frontal area (m²).
    pub fn area(&self) -> f64 {
        self.allometry.area.eval(self.height)
    }

    /// Frontal area below `depth` (m²).
    pub fn area_h(&self, depth: f64) -> f64 {
        let x = depth / self.height;
        let area = self.allometry.area_h.fraction(x) * self.area();
        if area > AREA_FLOOR {
            area
        } else {
            MIN_VALUE
        }
    }

    /// Frontal area below the working depth (m²).
    pub fn frontal_area(&self) -> f64 {
        self.area_h(self.flow_depth)
    }

    /// Full-height first moment of area about the base (m³).
    pub fn first_area(&self) -> f64 {
        self.allometry.first_area.eval(self.height)
    }

    /// First moment of area about the base for the part of the tree below `depth` (m³).
    pub fn first_area_h(&self, depth: f64) -> f64 {
        let area_h = self.area_h(depth);
        let a = area_h / self.area();
        let [p0, p1] = self.allometry.first_area_h;
        let mut z_h = (p0 * a.powi(2) + p1 * a) * self.first_area();
        if DRAG_DEPTH < depth && depth < SHALLOW_DEPTH {
            // quadratic closure is ill-conditioned this shallow
            z_h = area_h * depth / 2.0;
        }
        if z_h > AREA_FLOOR {
            z_h
        } else {
            MIN_VALUE
        }
    }

    /// Basal stem diameter (m).
    pub fn base_diameter(&self) -> f64 {
        self.allometry.diameter.eval(self.height)
    }

    /// Stem diameter at height `depth` along the trunk (m).
    pub fn diameter_h(&self, depth: f64) -> f64 {
        let x = depth / self.height;
        let [a, b] = self.allometry.diameter_h;
        ((1.0 - (a * x.powi(2) + b * x)) * self.base_diameter()).max(0.0)
    }

    /// Flexural modulus of the stem.
    pub fn modulus(&self) -> f64 {
        self.allometry.modulus.eval(self.height)
    }

    /// Approach velocity (m/s) at which bending resistance equals the drag moment.
    pub fn threshold_velocity(&self) -> f64 {
        if self.flow_depth > DRAG_DEPTH {
            let cd = self.allometry.drag.cd;
            (2.0 * self.modulus()
                / (WATER_DENSITY * cd * self.first_area_h(self.flow_depth) * self.flow_depth))
                .sqrt()
        } else {
            RIGID_THRESHOLD_VELOCITY
        }
    }

    /// Drag at approach velocity `u`, without recording the regime.
    pub fn drag(&self, u: f64) -> Drag {
        let threshold = self.threshold_velocity();
        let regime = if u <= threshold {
            DragRegime::Rigid
        } else {
            DragRegime::Reconfiguration
        };
        if self.flow_depth <= DRAG_DEPTH {
            return Drag { force: 0.0, regime };
        }
        let DragLaw { cd, vogel } = self.allometry.drag;
        let reconfiguration = (u / threshold).max(1.0).powf(vogel);
        Drag {
            force: 0.5 * WATER_DENSITY * cd * self.frontal_area() * u.powi(2) * reconfiguration,
            regime,
        }
    }

    /// Drag force (N) at approach velocity `u`, recording the drag regime.
    pub fn drag_force(&mut self, u: f64) -> f64 {
        let drag = self.drag(u);
        self.drag_regime = drag.regime;
        drag.force
    }

    /// Drag per unit squared velocity for a rigid stem (N s²/m²).
    pub fn rigid_speed_specific_drag(&self) -> f64 {
        if self.flow_depth > DRAG_DEPTH {
            0.5 * WATER_DENSITY * self.allometry.drag.cd * self.frontal_area()
        } else {
            0.0
        }
    }

    /// Diameter (m) of the equivalent cylinder occupying the submerged part of the tree.
    pub fn equivalent_diameter(&self) -> f64 {
        4.0 * self.frontal_area() / (std::f64::consts::PI * self.flow_depth)
    }

    /// Plan footprint (m²) of the equivalent cylinder.
    pub fn footprint(&self) -> f64 {
        std::f64::consts::PI * self.equivalent_diameter().powi(2) / 4.0
    }

    /// Summary of full-height and working-depth geometry.
    pub fn geometry(&self) -> Geometry {
        Geometry {
            area: self.area(),
            first_area: self.first_area(),
            base_diameter: self.base_diameter(),
            area_h: self.frontal_area(),
            first_area_h: self.first_area_h(self.flow_depth),
            diameter_h: self.diameter_h(self.flow_depth),
            threshold_velocity: self.threshold_velocity(),
            drag_1: self.drag(1.0).force,
        }
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Tree: {}", self.tree_id)
    }
}
