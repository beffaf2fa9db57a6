use std::collections::HashMap;

use super::diagnostics::GeomMeshDiagnostics;
use super::{Point3, Transform, Vec3};

/// Indexed triangle mesh handed to the renderer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeomMesh {
    pub positions: Vec<[f64; 3]>,
    pub indices: Vec<u32>,
    pub normals: Option<Vec<[f64; 3]>>,
}

impl GeomMesh {
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if any vertex position contains NaN or Inf values.
    #[must_use]
    pub fn has_invalid_vertices(&self) -> bool {
        self.positions.iter().any(|p| {
            !p[0].is_finite() || !p[1].is_finite() || !p[2].is_finite()
        })
    }

    /// Returns true if all vertex indices are within bounds.
    #[must_use]
    pub fn has_valid_indices(&self) -> bool {
        let n = self.positions.len() as u32;
        self.indices.iter().all(|&i| i < n)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.indices.len() % 3 != 0 {
            return Err("mesh indices are not a triangle list (len % 3 != 0)".to_string());
        }
        if self.has_invalid_vertices() {
            return Err("mesh has invalid vertex coordinates (NaN/Inf)".to_string());
        }
        if !self.has_valid_indices() {
            return Err("mesh has out-of-bounds vertex indices".to_string());
        }
        if self.normals.as_ref().is_some_and(|n| n.len() != self.positions.len()) {
            return Err("mesh normal buffer does not match vertex count".to_string());
        }
        Ok(())
    }

    /// Total area of all triangles.
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        self.indices
            .chunks_exact(3)
            .filter_map(|tri| {
                let a = self.positions.get(tri[0] as usize)?;
                let b = self.positions.get(tri[1] as usize)?;
                let c = self.positions.get(tri[2] as usize)?;
                Some(triangle_area(
                    Point3::from_array(*a),
                    Point3::from_array(*b),
                    Point3::from_array(*c),
                ))
            })
            .sum()
    }

    /// Returns a rigidly transformed copy. Normals are rotated, not recomputed.
    #[must_use]
    pub fn transformed(&self, transform: Transform) -> Self {
        Self {
            positions: self
                .positions
                .iter()
                .map(|p| transform.apply_point(Point3::from_array(*p)).to_array())
                .collect(),
            indices: self.indices.clone(),
            normals: self.normals.as_ref().map(|normals| {
                normals
                    .iter()
                    .map(|n| transform.apply_vec(Vec3::new(n[0], n[1], n[2])).to_array())
                    .collect()
            }),
        }
    }
}

/// Half the magnitude of the cross product of two edge vectors.
#[must_use]
pub fn triangle_area(a: Point3, b: Point3, c: Point3) -> f64 {
    b.sub_point(a).cross(c.sub_point(a)).length() * 0.5
}

/// Builds the final mesh with smooth normals and topology diagnostics.
///
/// Vertices are not welded: sweeps rely on a stable ring-major vertex layout.
pub(crate) fn finalize_mesh(points: Vec<Point3>, indices: Vec<u32>) -> (GeomMesh, GeomMeshDiagnostics) {
    let degenerate_triangle_count = count_degenerate_triangles(&points, &indices);
    let (open_edge_count, non_manifold_edge_count) = count_edge_topology(&indices);

    let mut warnings = Vec::new();
    if non_manifold_edge_count > 0 {
        warnings.push("mesh has non-manifold edges".to_string());
    }
    if degenerate_triangle_count > 0 {
        warnings.push(format!("mesh has {degenerate_triangle_count} degenerate triangles"));
    }

    let normals = compute_smooth_normals(&points, &indices);
    let mesh = GeomMesh {
        positions: points.into_iter().map(Point3::to_array).collect(),
        indices,
        normals: Some(normals),
    };

    let diagnostics = GeomMeshDiagnostics {
        vertex_count: mesh.vertex_count(),
        triangle_count: mesh.triangle_count(),
        degenerate_triangle_count,
        open_edge_count,
        non_manifold_edge_count,
        warnings,
        ..GeomMeshDiagnostics::default()
    };

    (mesh, diagnostics)
}

fn count_degenerate_triangles(points: &[Point3], indices: &[u32]) -> usize {
    indices
        .chunks_exact(3)
        .filter(|tri| {
            let (Some(a), Some(b), Some(c)) = (
                points.get(tri[0] as usize),
                points.get(tri[1] as usize),
                points.get(tri[2] as usize),
            ) else {
                return true;
            };
            triangle_area(*a, *b, *c) <= 1e-12
        })
        .count()
}

pub(crate) fn count_edge_topology(indices: &[u32]) -> (usize, usize) {
    let mut edge_counts: HashMap<(u32, u32), u32> = HashMap::new();

    for tri in indices.chunks_exact(3) {
        let i0 = tri[0];
        let i1 = tri[1];
        let i2 = tri[2];

        if i0 == i1 || i1 == i2 || i0 == i2 {
            continue;
        }

        let edges = [(i0, i1), (i1, i2), (i2, i0)];
        for (ea, eb) in edges {
            let (lo, hi) = if ea <= eb { (ea, eb) } else { (eb, ea) };
            *edge_counts.entry((lo, hi)).or_insert(0) += 1;
        }
    }

    let mut open_edge_count = 0usize;
    let mut non_manifold_edge_count = 0usize;
    for (_edge, count) in edge_counts {
        if count == 1 {
            open_edge_count += 1;
        } else if count > 2 {
            non_manifold_edge_count += 1;
        }
    }

    (open_edge_count, non_manifold_edge_count)
}

fn compute_smooth_normals(points: &[Point3], indices: &[u32]) -> Vec<[f64; 3]> {
    let mut normals = vec![Vec3::ZERO; points.len()];

    for tri in indices.chunks_exact(3) {
        let i0 = tri[0] as usize;
        let i1 = tri[1] as usize;
        let i2 = tri[2] as usize;

        let (Some(a), Some(b), Some(c)) = (points.get(i0), points.get(i1), points.get(i2)) else {
            continue;
        };

        let n = b.sub_point(*a).cross(c.sub_point(*a));
        normals[i0] = normals[i0] + n;
        normals[i1] = normals[i1] + n;
        normals[i2] = normals[i2] + n;
    }

    normals
        .into_iter()
        .map(|n| n.normalized().unwrap_or(Vec3::Z).to_array())
        .collect()
}
