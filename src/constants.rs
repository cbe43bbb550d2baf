//! Physical constants and numerical thresholds shared across the model.

/// Density of water (kg/m³).
pub const WATER_DENSITY: f64 = 998.0;
/// Gravitational acceleration (m/s²).
pub const G: f64 = 9.81;
/// Von Kármán constant.
pub const KAPPA: f64 = 0.41;

/// Floor applied to working depths, areas and moments so ratios never divide by zero.
pub const MIN_VALUE: f64 = 0.0001;
/// Trees submerged by less than this depth (m) carry no drag and occupy no plan area.
pub const DRAG_DEPTH: f64 = 0.001;
/// Water surfaces less than this height (m) above a tree's ground level leave it dry.
pub const DRY_DEPTH: f64 = 0.001;
/// Areas and moments at or below this value collapse to [`MIN_VALUE`].
pub const AREA_FLOOR: f64 = 0.001;
/// Canopy submergence (m) above which the reach is in the submerged regime.
pub const SUBMERGENCE_TOLERANCE: f64 = 0.001;
/// Largest velocity to threshold ratio at which the forest counts as rigid.
pub const RIGID_RATIO: f64 = 0.001;
/// Trees shorter or narrower than this (m) are left out of canopy averages.
pub const CANOPY_MIN: f64 = 0.001;
/// Upper bound on the storage reduction factor.
pub const MAX_STORAGE_REDUCTION: f64 = 0.9;
/// Threshold velocity (m/s) reported for dry stems.
pub const RIGID_THRESHOLD_VELOCITY: f64 = 99999.0;
/// Submergence-layer velocity coefficient, Yang & Choi (2010), for frontal densities below 5 m⁻¹.
pub const DEFAULT_CU: f64 = 1.0;

/// Working depths below this bound (m) receive the shallow first-moment approximation.
pub const SHALLOW_DEPTH: f64 = 0.01;
