//! Error type for the crate.
/// Custom error type for the forest_hydraulics crate.
#[derive(Debug)]
pub enum HydError {
    /// Error type from csv crate.
    CsvError(String),
    /// Error type from std::io.
    IoError(String),
    /// A value in a model or data file could not be parsed.
    ParseError(String),
    /// A required key is absent from the model file.
    MissingKey(&'static str),
    /// Neither flow depths nor flow levels were supplied.
    NoFlowInput,
    /// The species tag does not match a supported tree model.
    UnknownSpecies(String),
    /// The forest holds no trees that qualify for the requested average.
    NoCanopy,
    /// The force balance did not converge on a velocity.
    SolveFailed {
        /// Number of iterations performed.
        iterations: usize,
        /// Last iterate of the velocity.
        last: f64,
    },
}

impl std::error::Error for HydError {}

impl std::fmt::Display for HydError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            HydError::CsvError(msg) => {
                write!(f, "Could not serialize/deserialize csv file: {}", msg)
            }
            HydError::IoError(msg) => write!(f, "Could not access file from path provided: {}", msg),
            HydError::ParseError(msg) => write!(f, "Could not parse value: {}", msg),
            HydError::MissingKey(key) => write!(f, "Model file is missing the '{}' entry.", key),
            HydError::NoFlowInput => write!(
                f,
                "Model file sets neither 'Flow depths' nor 'Flow levels'."
            ),
            HydError::UnknownSpecies(tag) => write!(f, "Tree type not recognised: {}", tag),
            HydError::NoCanopy => write!(f, "Forest has no trees with a measurable canopy."),
            HydError::SolveFailed { iterations, last } => write!(
                f,
                "Velocity failed to converge after {} iterations, last value {}",
                iterations, last
            ),
        }
    }
}

impl From<csv::Error> for HydError {
    fn from(e: csv::Error) -> Self {
        HydError::CsvError(e.to_string())
    }
}

impl From<std::io::Error> for HydError {
    fn from(e: std::io::Error) -> Self {
        HydError::IoError(e.to_string())
    }
}

impl From<std::num::ParseFloatError> for HydError {
    fn from(e: std::num::ParseFloatError) -> Self {
        HydError::ParseError(e.to_string())
    }
}

impl From<std::num::ParseIntError> for HydError {
    fn from(e: std::num::ParseIntError) -> Self {
        HydError::ParseError(e.to_string())
    }
}
