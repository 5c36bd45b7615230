use serde::{Deserialize, Serialize};

use crate::error::{AeError, Result};

/// Hyperparameters for one training run.
///
/// Every field has a default, so a partial JSON object deserializes with
/// the remaining fields filled in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingOptions {
    /// Number of full passes over the dataset.
    pub epochs: u32,
    /// Coefficient of the squared-norm penalty added to the loss.
    pub regularisation: f32,
    /// Standard deviation of the initial parameter noise.
    pub initial_noise: f32,
    /// Adam step size.
    pub learning_rate: f32,
    /// Adam first moment decay.
    pub beta1: f32,
    /// Adam second moment decay.
    pub beta2: f32,
    /// Adam denominator guard.
    pub epsilon: f32,
    /// Log a progress record every this many steps. Only active when it is
    /// smaller than `epochs`.
    pub report_interval: u32,
    /// Keep the parameters of the lowest-loss step instead of the last one.
    pub keep_lowest_loss: bool,
    /// Fixed seed for parameter initialization. `None` draws from the OS.
    pub seed: Option<u64>,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            epochs: 1000,
            regularisation: 0.01,
            initial_noise: 0.01,
            learning_rate: 0.01,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            report_interval: 100,
            keep_lowest_loss: true,
            seed: None,
        }
    }
}

impl TrainingOptions {
    /// Rejects option sets that cannot drive a run.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(AeError::InvalidOptions("epochs must be at least one"));
        }
        if self.report_interval == 0 {
            return Err(AeError::InvalidOptions(
                "report interval must be at least one",
            ));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(AeError::InvalidOptions(
                "learning rate must be positive and finite",
            ));
        }
        if !(self.regularisation.is_finite() && self.regularisation >= 0.0) {
            return Err(AeError::InvalidOptions(
                "regularisation must be non-negative and finite",
            ));
        }
        if !(self.initial_noise.is_finite() && self.initial_noise >= 0.0) {
            return Err(AeError::InvalidOptions(
                "initial noise must be non-negative and finite",
            ));
        }
        if !(0.0..1.0).contains(&self.beta1) || !(0.0..1.0).contains(&self.beta2) {
            return Err(AeError::InvalidOptions(
                "moment decays must lie in [0, 1)",
            ));
        }
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(AeError::InvalidOptions(
                "epsilon must be positive and finite",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let options: TrainingOptions =
            serde_json::from_str(r#"{"epochs": 5, "seed": 7}"#).unwrap();
        assert_eq!(options.epochs, 5);
        assert_eq!(options.seed, Some(7));
        assert_eq!(options.report_interval, 100);
        assert!(options.keep_lowest_loss);
    }

    #[test]
    fn validate_rejects_degenerate_runs() {
        let cases = [
            TrainingOptions {
                epochs: 0,
                ..Default::default()
            },
            TrainingOptions {
                report_interval: 0,
                ..Default::default()
            },
            TrainingOptions {
                learning_rate: -1.0,
                ..Default::default()
            },
            TrainingOptions {
                regularisation: f32::NAN,
                ..Default::default()
            },
            TrainingOptions {
                beta1: 1.0,
                ..Default::default()
            },
            TrainingOptions {
                epsilon: 0.0,
                ..Default::default()
            },
            TrainingOptions {
                epsilon: f32::NAN,
                ..Default::default()
            },
        ];

        for options in cases {
            assert!(options.validate().is_err(), "{options:?}");
        }
    }

    #[test]
    fn defaults_validate() {
        assert!(TrainingOptions::default().validate().is_ok());
    }
}
