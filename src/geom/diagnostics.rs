//! Mesh diagnostics for the duct geometry kernel.
//!
//! Diagnostics travel alongside every shell and flange mesh. Duct shells are
//! open tubes by construction, so open edges are expected there; flanges are
//! closed solids and should report zero open edges.
//!
//! # Example
//!
//! ```ignore
//! use duct_engine::geom::{flange_at, FlangeOptions};
//!
//! let flange = flange_at(&frame, profile, options);
//! if flange.diagnostics.is_valid_solid() {
//!     println!("flange is watertight with {} triangles", flange.diagnostics.triangle_count);
//! }
//! ```

/// Counts and warnings collected while building a mesh.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GeomMeshDiagnostics {
    /// Total number of vertices in the final mesh.
    pub vertex_count: usize,

    /// Total number of triangles in the final mesh.
    pub triangle_count: usize,

    /// Number of zero-area triangles. Clamped inputs (e.g. a wall thicker than
    /// the section) may legitimately produce these.
    pub degenerate_triangle_count: usize,

    /// Number of open (boundary) edges in the mesh.
    pub open_edge_count: usize,

    /// Number of edges shared by more than two triangles.
    pub non_manifold_edge_count: usize,

    /// Number of inputs that were clamped into a valid range before use.
    pub clamped_input_count: usize,

    /// Human-readable warnings about mesh issues.
    pub warnings: Vec<String>,
}

impl GeomMeshDiagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the mesh is watertight (no open edges).
    #[must_use]
    pub fn is_watertight(&self) -> bool {
        self.open_edge_count == 0
    }

    /// Returns `true` if the mesh is manifold (no non-manifold edges).
    #[must_use]
    pub fn is_manifold(&self) -> bool {
        self.non_manifold_edge_count == 0
    }

    /// Returns `true` if the mesh is both watertight and manifold.
    #[must_use]
    pub fn is_valid_solid(&self) -> bool {
        self.is_watertight() && self.is_manifold()
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Merges another diagnostics struct into this one.
    ///
    /// Counts are summed and warnings appended.
    pub fn merge(&mut self, other: &GeomMeshDiagnostics) {
        self.vertex_count += other.vertex_count;
        self.triangle_count += other.triangle_count;
        self.degenerate_triangle_count += other.degenerate_triangle_count;
        self.open_edge_count += other.open_edge_count;
        self.non_manifold_edge_count += other.non_manifold_edge_count;
        self.clamped_input_count += other.clamped_input_count;
        self.warnings.extend(other.warnings.iter().cloned());
    }

    /// Returns a short summary string suitable for logging.
    ///
    /// Format: `"V:{vertices} T:{triangles} [issues...]"`
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("V:{} T:{}", self.vertex_count, self.triangle_count)];

        if self.degenerate_triangle_count > 0 {
            parts.push(format!("degenerate:{}", self.degenerate_triangle_count));
        }
        if self.open_edge_count > 0 {
            parts.push(format!("open:{}", self.open_edge_count));
        }
        if self.non_manifold_edge_count > 0 {
            parts.push(format!("non-manifold:{}", self.non_manifold_edge_count));
        }
        if self.clamped_input_count > 0 {
            parts.push(format!("clamped:{}", self.clamped_input_count));
        }

        parts.join(" ")
    }
}
