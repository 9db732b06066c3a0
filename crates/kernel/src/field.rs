use noise::{NoiseFn, Simplex};

/// Deterministic, continuous 3D scalar noise.
///
/// Implementations must return the same value for the same input and keep no
/// state that is observable between calls. Output is roughly in `[-1, 1]`.
pub trait NoiseSource {
    fn noise3d(&self, x: f32, y: f32, z: f32) -> f32;
}

/// Closures double as noise sources, which keeps mocked fields cheap in tests.
impl<F> NoiseSource for F
where
    F: Fn(f32, f32, f32) -> f32,
{
    fn noise3d(&self, x: f32, y: f32, z: f32) -> f32 {
        self(x, y, z)
    }
}

/// Coordinates beyond this magnitude are wrapped back into range; the
/// simplex lattice lookup overflows its integer cell index far above it.
const WRAP_SPAN: f64 = 1.0e9;

/// Seeded 3D simplex gradient noise.
///
/// Non-finite input samples as zero.
#[derive(Clone)]
pub struct SimplexNoise {
    seed: u32,
    simplex: Simplex,
}

impl SimplexNoise {
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            simplex: Simplex::new(seed),
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }
}

impl Default for SimplexNoise {
    fn default() -> Self {
        Self::new(0)
    }
}

impl std::fmt::Debug for SimplexNoise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimplexNoise")
            .field("seed", &self.seed)
            .finish()
    }
}

impl NoiseSource for SimplexNoise {
    fn noise3d(&self, x: f32, y: f32, z: f32) -> f32 {
        if !(x.is_finite() && y.is_finite() && z.is_finite()) {
            return 0.0;
        }
        self.simplex.get([wrap(x), wrap(y), wrap(z)]) as f32
    }
}

fn wrap(v: f32) -> f64 {
    let v = v as f64;
    if v.abs() > WRAP_SPAN {
        v.rem_euclid(WRAP_SPAN)
    } else {
        v
    }
}
