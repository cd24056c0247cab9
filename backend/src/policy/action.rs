//! Adapter for external decision-makers
//!
//! An external model (for example a trained reinforcement-learning agent)
//! sees only the numeric [`FeatureVector`] and answers with an action index:
//! 0 = In_Service, 1 = Standby, 2 = Under_Maintenance. Indices outside that
//! range are treated as Standby and counted.

use super::{FeatureVector, PolicyContext, StatusPolicy};
use crate::models::{OperationalStatus, Train};
use tracing::warn;

/// Wraps a `FnMut(&FeatureVector) -> u8` model as a [`StatusPolicy`]
pub struct ActionIndexPolicy<F>
where
    F: FnMut(&FeatureVector) -> u8,
{
    name: String,
    model: F,
    invalid_actions: usize,
}

impl<F> ActionIndexPolicy<F>
where
    F: FnMut(&FeatureVector) -> u8,
{
    pub fn new(name: impl Into<String>, model: F) -> Self {
        Self {
            name: name.into(),
            model,
            invalid_actions: 0,
        }
    }

    /// Number of out-of-range indices returned by the model so far
    pub fn invalid_actions(&self) -> usize {
        self.invalid_actions
    }
}

impl<F> StatusPolicy for ActionIndexPolicy<F>
where
    F: FnMut(&FeatureVector) -> u8,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn decide(
        &mut self,
        train: &Train,
        features: &FeatureVector,
        _ctx: &PolicyContext<'_>,
    ) -> OperationalStatus {
        let action = (self.model)(features);
        OperationalStatus::from_action_index(action).unwrap_or_else(|| {
            self.invalid_actions += 1;
            warn!(policy = %self.name, train = %train.id(), action, "invalid action index");
            OperationalStatus::Standby
        })
    }
}
