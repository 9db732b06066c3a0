use serde::{Deserialize, Serialize};

/// Rejected animation parameter.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamError {
    #[error("{name} must be positive and finite, got {value}")]
    NotPositive { name: &'static str, value: f32 },
}

/// Shape of the melt animation.
///
/// All fields are positive reals. The apps keep them constant for the process
/// lifetime; the engine accepts validated replacements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationParameters {
    /// Peak radial displacement contributed by the noise field.
    pub amplitude: f32,
    /// Spatial scale of the noise sample space.
    pub frequency: f32,
    /// Rate at which the noise field scrolls and the melt oscillates.
    pub speed: f32,
    /// Extra displacement per unit depth below the equator.
    pub melt_factor: f32,
}

impl Default for AnimationParameters {
    fn default() -> Self {
        Self {
            amplitude: 0.5,
            frequency: 0.5,
            speed: 0.3,
            melt_factor: 1.5,
        }
    }
}

impl AnimationParameters {
    /// Build a validated parameter set.
    pub fn new(
        amplitude: f32,
        frequency: f32,
        speed: f32,
        melt_factor: f32,
    ) -> Result<Self, ParamError> {
        let params = Self {
            amplitude,
            frequency,
            speed,
            melt_factor,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), ParamError> {
        for (name, value) in [
            ("amplitude", self.amplitude),
            ("frequency", self.frequency),
            ("speed", self.speed),
            ("melt_factor", self.melt_factor),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ParamError::NotPositive { name, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let p = AnimationParameters::default();
        assert_eq!(p.amplitude, 0.5);
        assert_eq!(p.frequency, 0.5);
        assert_eq!(p.speed, 0.3);
        assert_eq!(p.melt_factor, 1.5);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn new_accepts_positive_values() {
        let p = AnimationParameters::new(1.0, 2.0, 0.1, 0.5).unwrap();
        assert_eq!(p.frequency, 2.0);
    }

    #[test]
    fn new_rejects_zero_and_negative() {
        let err = AnimationParameters::new(0.0, 0.5, 0.3, 1.5).unwrap_err();
        assert_eq!(
            err,
            ParamError::NotPositive {
                name: "amplitude",
                value: 0.0
            }
        );
        assert!(AnimationParameters::new(0.5, 0.5, -0.3, 1.5).is_err());
    }

    #[test]
    fn new_rejects_non_finite() {
        let err = AnimationParameters::new(0.5, 0.5, 0.3, f32::INFINITY).unwrap_err();
        assert!(err.to_string().contains("melt_factor"));
        assert!(AnimationParameters::new(f32::NAN, 0.5, 0.3, 1.5).is_err());
    }

    #[test]
    fn serializes_field_names() {
        let json = serde_json::to_string(&AnimationParameters::default()).unwrap();
        assert!(json.contains("\"melt_factor\":1.5"));
    }
}
