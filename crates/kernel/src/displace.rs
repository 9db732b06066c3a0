use glam::Vec3;
use serde::Serialize;

use crate::field::NoiseSource;
use crate::geometry::{BaseGeometry, LiveGeometry};
use crate::params::{AnimationParameters, ParamError};

/// Every intermediate of one vertex's displacement, for probing and tests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplacementSample {
    /// Radial distance of the base vertex from the center.
    pub distance: f32,
    /// Raw noise sampled in the scrolled, frequency-scaled space.
    pub noise_value: f32,
    /// `amplitude * noise_value`.
    pub displacement: f32,
    /// `|y| * melt_factor` below the equator, else zero.
    pub melt_effect: f32,
    /// `melt_effect * sin(t * speed)`.
    pub melt_contribution: f32,
    /// Signed distance moved along the radial direction.
    pub total: f32,
    /// Resulting vertex.
    pub position: Vec3,
}

/// Recomputes the deformed mesh from the base mesh and elapsed time.
///
/// Each vertex moves along its own radial direction by
/// `amplitude * noise(p * frequency + (0, 0, t * speed))`, plus an oscillating
/// sag proportional to its depth below `y = 0`. Vertices at the exact center
/// have no direction and stay put.
#[derive(Debug, Clone)]
pub struct DisplacementEngine<N> {
    params: AnimationParameters,
    noise: N,
}

impl<N: NoiseSource> DisplacementEngine<N> {
    pub fn new(params: AnimationParameters, noise: N) -> Result<Self, ParamError> {
        params.validate()?;
        Ok(Self { params, noise })
    }

    pub fn params(&self) -> &AnimationParameters {
        &self.params
    }

    /// Swap in new parameters; the next pass uses them.
    pub fn set_params(&mut self, params: AnimationParameters) -> Result<(), ParamError> {
        params.validate()?;
        tracing::debug!(?params, "animation parameters replaced");
        self.params = params;
        Ok(())
    }

    /// Full breakdown of one vertex at time `t`.
    pub fn sample(&self, base: Vec3, t: f32) -> DisplacementSample {
        let p = &self.params;
        let distance = base.length();

        let noise_value = self.noise.noise3d(
            base.x * p.frequency,
            base.y * p.frequency,
            base.z * p.frequency + t * p.speed,
        );
        let displacement = p.amplitude * noise_value;

        let melt_effect = if base.y < 0.0 {
            base.y.abs() * p.melt_factor
        } else {
            0.0
        };
        let melt_contribution = melt_effect * (t * p.speed).sin();
        let total = displacement + melt_contribution;

        // No radial direction at the center
        let position = if distance == 0.0 {
            base
        } else {
            base + (base / distance) * total
        };

        DisplacementSample {
            distance,
            noise_value,
            displacement,
            melt_effect,
            melt_contribution,
            total,
            position,
        }
    }

    /// Displaced position of one vertex at time `t`.
    pub fn displace_vertex(&self, base: Vec3, t: f32) -> Vec3 {
        self.sample(base, t).position
    }

    /// Rewrite every vertex of `live` from `base` at time `t`, in place, and
    /// flag the buffer for upload.
    pub fn apply(&self, base: &BaseGeometry, live: &mut LiveGeometry, t: f32) {
        live.sync_len(base);
        for (out, &p) in live.positions_mut().iter_mut().zip(base.positions()) {
            *out = self.displace_vertex(p, t);
        }
        live.mark_dirty();
        tracing::trace!(t, vertices = base.len(), "displacement pass");
    }

    /// Fresh deformed copy of `base` at time `t`.
    pub fn compute(&self, base: &BaseGeometry, t: f32) -> LiveGeometry {
        let mut live = LiveGeometry::from_base(base);
        self.apply(base, &mut live, t);
        live
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::SimplexNoise;

    const EPS: f32 = 1e-6;

    fn approx(a: Vec3, b: Vec3, eps: f32) -> bool {
        (a - b).abs().max_element() <= eps
    }

    fn simplex_engine() -> DisplacementEngine<SimplexNoise> {
        DisplacementEngine::new(AnimationParameters::default(), SimplexNoise::new(1)).unwrap()
    }

    #[test]
    fn constant_noise_moves_unit_x_outward() {
        let engine = DisplacementEngine::new(
            AnimationParameters::default(),
            |_: f32, _: f32, _: f32| 0.2_f32,
        )
        .unwrap();
        let s = engine.sample(Vec3::X, 0.0);
        assert_eq!(s.distance, 1.0);
        assert_eq!(s.melt_effect, 0.0);
        assert!((s.displacement - 0.1).abs() < EPS);
        assert!(approx(s.position, Vec3::new(1.1, 0.0, 0.0), EPS));
    }

    #[test]
    fn noise_is_sampled_in_scaled_space() {
        let engine = DisplacementEngine::new(
            AnimationParameters::default(),
            |x: f32, y: f32, z: f32| {
                assert_eq!((x, y, z), (0.5, 0.0, 0.0));
                0.2_f32
            },
        )
        .unwrap();
        engine.displace_vertex(Vec3::X, 0.0);
    }

    #[test]
    fn time_scrolls_noise_along_z() {
        let engine = DisplacementEngine::new(
            AnimationParameters::default(),
            |_: f32, _: f32, z: f32| z,
        )
        .unwrap();
        // z sample = 0 * 0.5 + 2 * 0.3
        let s = engine.sample(Vec3::X, 2.0);
        assert!((s.noise_value - 0.6).abs() < EPS);
    }

    #[test]
    fn south_pole_at_time_zero_is_unmoved() {
        let engine = DisplacementEngine::new(
            AnimationParameters::default(),
            |_: f32, _: f32, _: f32| 0.0_f32,
        )
        .unwrap();
        let s = engine.sample(Vec3::NEG_Y, 0.0);
        assert_eq!(s.distance, 1.0);
        assert!((s.melt_effect - 1.5).abs() < EPS);
        assert_eq!(s.melt_contribution, 0.0);
        assert_eq!(s.total, 0.0);
        assert_eq!(s.position, Vec3::NEG_Y);
    }

    #[test]
    fn melt_oscillates_with_time() {
        let engine = DisplacementEngine::new(
            AnimationParameters::default(),
            |_: f32, _: f32, _: f32| 0.0_f32,
        )
        .unwrap();
        let t = std::f32::consts::FRAC_PI_2 / 0.3;
        let s = engine.sample(Vec3::NEG_Y, t);
        assert!((s.melt_contribution - 1.5).abs() < 1e-5);
        // Pushed further down, radially outward from the center
        assert!(approx(s.position, Vec3::new(0.0, -2.5, 0.0), 1e-5));

        let s = engine.sample(Vec3::NEG_Y, 3.0 * t);
        assert!((s.melt_contribution + 1.5).abs() < 1e-4);
    }

    #[test]
    fn center_vertex_is_never_displaced() {
        let engine = simplex_engine();
        for i in 0..50 {
            let t = i as f32 * 0.73;
            let p = engine.displace_vertex(Vec3::ZERO, t);
            assert_eq!(p, Vec3::ZERO);
            assert!(p.is_finite());
        }
    }

    #[test]
    fn displacement_is_radial() {
        let engine = simplex_engine();
        let base = BaseGeometry::icosphere(1.0, 3).unwrap();
        for &t in &[0.0, 1.3, 17.25] {
            for &p in base.positions() {
                let delta = engine.displace_vertex(p, t) - p;
                let cross = delta.cross(p.normalize());
                assert!(cross.length() < 1e-5, "non-radial delta {delta:?} at {p:?}");
            }
        }
    }

    #[test]
    fn deterministic_for_identical_inputs() {
        let base = BaseGeometry::icosphere(1.0, 4).unwrap();
        let a = simplex_engine().compute(&base, 4.2);
        let b = simplex_engine().compute(&base, 4.2);
        assert_eq!(a.positions(), b.positions());
    }

    #[test]
    fn lower_mirror_melts_at_least_as_much() {
        let engine = simplex_engine();
        for i in 1..20 {
            let y = i as f32 * 0.05;
            let upper = engine.sample(Vec3::new(0.3, y, -0.2), 1.0);
            let lower = engine.sample(Vec3::new(0.3, -y, -0.2), 1.0);
            assert!(lower.melt_effect.abs() >= upper.melt_effect.abs());
            assert!(lower.melt_effect > 0.0);
            assert_eq!(upper.melt_effect, 0.0);
        }
    }

    #[test]
    fn continuous_in_time() {
        let engine = simplex_engine();
        let p = Vec3::new(0.3, -0.8, 0.52).normalize();
        let t = 3.0;
        let mut last = f32::INFINITY;
        for &dt in &[1e-1, 1e-2, 1e-3] {
            let step = (engine.displace_vertex(p, t + dt) - engine.displace_vertex(p, t)).length();
            assert!(step < last, "delta {step} did not shrink for dt {dt}");
            last = step;
        }
        assert!(last < 1e-2);
    }

    #[test]
    fn apply_rewrites_from_base_not_previous_frame() {
        let engine = simplex_engine();
        let base = BaseGeometry::icosphere(1.0, 2).unwrap();
        let mut live = LiveGeometry::from_base(&base);
        engine.apply(&base, &mut live, 9.0);
        engine.apply(&base, &mut live, 2.0);
        let fresh = engine.compute(&base, 2.0);
        assert_eq!(live.positions(), fresh.positions());
    }

    #[test]
    fn apply_flags_upload_and_keeps_length() {
        let engine = simplex_engine();
        let base = BaseGeometry::icosphere(1.0, 1).unwrap();
        let mut live = LiveGeometry::from_base(&base);
        live.mark_uploaded();
        engine.apply(&base, &mut live, 0.5);
        assert!(live.needs_upload());
        assert_eq!(live.len(), base.len());
    }

    #[test]
    fn very_late_time_stays_finite() {
        let engine = simplex_engine();
        for t in [1e20_f32, 3.0e19, 1e30] {
            let p = engine.displace_vertex(Vec3::new(0.6, -0.8, 0.0), t);
            assert!(p.is_finite(), "non-finite vertex at t={t}: {p}");
        }
    }

    #[test]
    fn set_params_validates() {
        let mut engine = simplex_engine();
        let mut params = *engine.params();
        params.amplitude = -1.0;
        assert!(engine.set_params(params).is_err());
        assert_eq!(engine.params().amplitude, 0.5);

        params.amplitude = 2.0;
        engine.set_params(params).unwrap();
        assert_eq!(engine.params().amplitude, 2.0);
    }

    #[test]
    fn new_rejects_invalid_params() {
        let params = AnimationParameters {
            speed: 0.0,
            ..AnimationParameters::default()
        };
        assert!(DisplacementEngine::new(params, SimplexNoise::default()).is_err());
    }
}
