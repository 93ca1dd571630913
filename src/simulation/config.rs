use crate::core::error::ValidationError;
use crate::optimization::strategy::HybridWeights;
use serde::{Deserialize, Serialize};

/// Default simulation ceiling: 100 years of monthly periods.
pub const DEFAULT_HORIZON_MONTHS: u32 = 1200;

/// Tunables for a simulation run.
///
/// Passed explicitly to the simulator and comparator; nothing is read from
/// the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Maximum periods before a run is declared failed.
    pub horizon_months: u32,
    /// Weights for the hybrid ordering.
    pub hybrid: HybridWeights,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            horizon_months: DEFAULT_HORIZON_MONTHS,
            hybrid: HybridWeights::default(),
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.horizon_months == 0 {
            return Err(ValidationError::ZeroHorizon);
        }
        self.hybrid.validate()
    }
}
