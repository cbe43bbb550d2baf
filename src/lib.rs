/*!
* # Forest Hydraulics - Flow resistance of reconfiguring forests.
* Flexible trees standing in a channel bend as the water speeds up, so the drag they exert grows more
* slowly than the square of velocity.  This crate computes the equilibrium velocity of steady, uniform
* flow through a rectangular reach holding a forest of such trees, for a grid of bed slopes and flow
* depths, to produce rating curves (depth and slope against velocity, discharge and Manning's n).
*
* The model is layered:
*  - A [Tree](tree/struct.Tree.html) describes frontal area, first moment of area and flexural modulus of
*    one species as functions of height and submerged depth, and evaluates Vogel-law drag.
*  - A [Forest](forest/struct.Forest.html) aggregates drag, footprint and canopy height over a population.
*  - A [Channel](channel/struct.Channel.html) decides whether the canopy is emergent or submerged, works
*    out the stem blockage, and solves the balance of slope-driven shear against bed and drag resistance.
*  - A [RatingCurve](rating/struct.RatingCurve.html) runs the channel over every (slope, depth) pair.
*
*  ## Quick Start
*
* ```rust
* use forest_hydraulics::prelude::*;
*
* fn main() -> Result<(), HydError> {
*     // 50 Casuarina trees, 5 m tall with 3 m crowns
*     let forest = Forest::new(0.0)
*         .tree(Tree::new(Species::CasuarinaOverstory, 5.0).specimens(50).canopy_width(3.0));
*     // a reach 10 m wide and 100 m long
*     let channel = Channel::new(10.0, 100.0).mannings_n(0.03).forest(forest);
*
*     let curve = RatingCurve::new(Stage::Depths(vec![0.5, 1.0, 2.0, 4.0, 6.0]))
*         .slopes(&[BedSlope::one_in(1000.0), BedSlope::one_in(2000.0)]);
*     let tables = curve.run(&channel)?;
*     for table in &tables {
*         for rec in &table.records {
*             assert!(rec.velocity > 0.0);
*         }
*     }
*     Ok(())
* }
* ```
*
* Models can also be described in a plain text model file, see [config](config/index.html), and run with
* the `hydraulics` binary.
*/

#![warn(missing_docs)]
pub mod channel;
pub mod config;
pub mod constants;
pub mod errors;
pub mod forest;
pub mod plot;
pub mod rating;
pub mod solver;
pub mod tree;
pub mod utils;

/// Commonly used types.
pub mod prelude {
    pub use crate::channel::{Channel, HydWarning, HydraulicsRecord, Submergence};
    pub use crate::config::ModelConfig;
    pub use crate::errors::HydError;
    pub use crate::forest::{Forest, TreeRecord};
    pub use crate::plot;
    pub use crate::rating::{BedSlope, RatingCurve, SlopeTable, Stage};
    pub use crate::tree::{DragRegime, Species, SpeciesParameters, Tree};
}
