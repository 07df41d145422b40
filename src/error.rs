/*
 * Error Module
 *
 * Configuration is the only fallible surface of the simulation. Numeric
 * degeneracies inside a tick are corrected in place and never reach here.
 */

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A parameter is outside the range the simulation can run with.
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),

    /// The tuning file could not be read.
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),

    /// The tuning file is not valid JSON for `SimulationParams`.
    #[error("failed to parse tuning file: {0}")]
    Parse(#[from] serde_json::Error),
}
