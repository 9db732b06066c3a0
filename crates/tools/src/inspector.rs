use glam::Vec3;
use melt_kernel::{BaseGeometry, LiveGeometry};
use serde::Serialize;

/// Geometry inspector for developer tooling.
///
/// Compares the live mesh against its base to show how far the surface has
/// melted.
pub struct GeometryInspector;

impl GeometryInspector {
    /// Aggregate radius and displacement figures over the whole mesh.
    pub fn summary(base: &BaseGeometry, live: &LiveGeometry) -> MeshSummary {
        let mut summary = MeshSummary {
            vertex_count: live.len(),
            ..MeshSummary::default()
        };
        if live.is_empty() {
            return summary;
        }

        let mut radius_sum = 0.0_f64;
        let mut disp_sum = 0.0_f64;
        let (mut lower_sum, mut lower_n) = (0.0_f64, 0usize);
        let (mut upper_sum, mut upper_n) = (0.0_f64, 0usize);
        summary.min_radius = f32::INFINITY;

        for (b, l) in base.positions().iter().zip(live.positions()) {
            let r = l.length();
            summary.min_radius = summary.min_radius.min(r);
            summary.max_radius = summary.max_radius.max(r);
            radius_sum += r as f64;

            let d = signed_displacement(*b, *l);
            summary.max_displacement = summary.max_displacement.max(d.abs());
            disp_sum += d.abs() as f64;
            if b.y < 0.0 {
                lower_sum += d as f64;
                lower_n += 1;
            } else {
                upper_sum += d as f64;
                upper_n += 1;
            }
        }

        let n = live.len() as f64;
        summary.mean_radius = (radius_sum / n) as f32;
        summary.mean_displacement = (disp_sum / n) as f32;
        summary.lower_mean_displacement = mean(lower_sum, lower_n);
        summary.upper_mean_displacement = mean(upper_sum, upper_n);
        summary
    }

    /// Base and live position of one vertex.
    pub fn inspect_vertex(
        base: &BaseGeometry,
        live: &LiveGeometry,
        index: usize,
    ) -> Option<VertexInfo> {
        let b = *base.positions().get(index)?;
        let l = *live.positions().get(index)?;
        Some(VertexInfo {
            index,
            base: b.to_array(),
            live: l.to_array(),
            displacement: signed_displacement(b, l),
        })
    }
}

/// Movement along the base vertex's outward direction.
fn signed_displacement(base: Vec3, live: Vec3) -> f32 {
    (live - base).dot(base.normalize_or_zero())
}

fn mean(sum: f64, n: usize) -> f32 {
    if n == 0 { 0.0 } else { (sum / n as f64) as f32 }
}

/// Summary of the live mesh for the inspector.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MeshSummary {
    pub vertex_count: usize,
    pub min_radius: f32,
    pub max_radius: f32,
    pub mean_radius: f32,
    pub max_displacement: f32,
    pub mean_displacement: f32,
    /// Mean signed displacement of vertices below the equator.
    pub lower_mean_displacement: f32,
    /// Mean signed displacement of vertices on or above the equator.
    pub upper_mean_displacement: f32,
}

impl std::fmt::Display for MeshSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Mesh: vertices={} radius=[{:.3}, {:.3}] mean_radius={:.3} max_disp={:.3} lower={:+.3} upper={:+.3}",
            self.vertex_count,
            self.min_radius,
            self.max_radius,
            self.mean_radius,
            self.max_displacement,
            self.lower_mean_displacement,
            self.upper_mean_displacement,
        )
    }
}

/// Detailed info about a single vertex.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VertexInfo {
    pub index: usize,
    pub base: [f32; 3],
    pub live: [f32; 3],
    pub displacement: f32,
}

impl std::fmt::Display for VertexInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Vertex [{}] base=({:.3}, {:.3}, {:.3}) live=({:.3}, {:.3}, {:.3}) disp={:+.4}",
            self.index,
            self.base[0],
            self.base[1],
            self.base[2],
            self.live[0],
            self.live[1],
            self.live[2],
            self.displacement,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use melt_kernel::{AnimationParameters, DisplacementEngine};

    fn constant_engine(value: f32) -> DisplacementEngine<impl melt_kernel::NoiseSource> {
        DisplacementEngine::new(
            AnimationParameters::default(),
            move |_: f32, _: f32, _: f32| value,
        )
        .unwrap()
    }

    #[test]
    fn undeformed_sphere_summary() {
        let base = BaseGeometry::icosphere(1.0, 2).unwrap();
        let live = LiveGeometry::from_base(&base);
        let s = GeometryInspector::summary(&base, &live);
        assert_eq!(s.vertex_count, 540);
        assert!((s.min_radius - 1.0).abs() < 1e-5);
        assert!((s.max_radius - 1.0).abs() < 1e-5);
        assert!(s.max_displacement < 1e-5);
    }

    #[test]
    fn uniform_noise_shifts_every_vertex() {
        let base = BaseGeometry::icosphere(1.0, 2).unwrap();
        let live = constant_engine(0.2).compute(&base, 0.0);
        let s = GeometryInspector::summary(&base, &live);
        assert!((s.mean_radius - 1.1).abs() < 1e-4);
        assert!((s.upper_mean_displacement - 0.1).abs() < 1e-4);
        assert!((s.lower_mean_displacement - 0.1).abs() < 1e-4);
    }

    #[test]
    fn melt_shows_in_lower_hemisphere() {
        let base = BaseGeometry::icosphere(1.0, 3).unwrap();
        // sin(t * speed) = 1
        let t = std::f32::consts::FRAC_PI_2 / 0.3;
        let live = constant_engine(0.0).compute(&base, t);
        let s = GeometryInspector::summary(&base, &live);
        assert!(s.lower_mean_displacement > 0.5);
        assert!(s.upper_mean_displacement.abs() < 1e-5);
    }

    #[test]
    fn empty_mesh_summary() {
        let base = BaseGeometry::from_positions(Vec::new());
        let live = LiveGeometry::from_base(&base);
        let s = GeometryInspector::summary(&base, &live);
        assert_eq!(s, MeshSummary::default());
    }

    #[test]
    fn inspect_vertex_found_and_missing() {
        let base = BaseGeometry::from_positions(vec![Vec3::X]);
        let live = constant_engine(0.2).compute(&base, 0.0);
        let info = GeometryInspector::inspect_vertex(&base, &live, 0).unwrap();
        assert!((info.displacement - 0.1).abs() < 1e-6);
        assert!(info.to_string().contains("Vertex [0]"));
        assert!(GeometryInspector::inspect_vertex(&base, &live, 1).is_none());
    }

    #[test]
    fn summary_display_and_json() {
        let base = BaseGeometry::icosphere(1.0, 0).unwrap();
        let live = LiveGeometry::from_base(&base);
        let s = GeometryInspector::summary(&base, &live);
        assert!(format!("{s}").contains("vertices=60"));
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"vertex_count\":60"));
    }
}
