mod area;
mod core;
mod diagnostics;
mod flange;
mod frame;
mod loft;
mod mesh;
mod metrics;
mod section;

pub use area::{
    AreaEstimate, AreaOptions, CM2_PER_M2, estimate_area, ring_band_area, shell_area,
};
pub use core::{BBox, Point3, Tolerance, Transform, Vec2, Vec3};
pub use diagnostics::GeomMeshDiagnostics;
pub use flange::{
    Flange, FlangeOptions, ShellEnd, combined_flange, combined_size, end_flange, flange_at,
};
pub use frame::{
    Frame, MAX_ARC_ANGLE, MAX_STEPS, MIN_ARC_ANGLE, SectionSize, SweepPath, compute_frames,
};
pub use loft::{Ring, ShellMesh, ShellOptions, loft_shell};
pub use mesh::{GeomMesh, triangle_area};
pub use metrics::{GeomMetrics, GeomTimingReport, TimingBucket};
pub use section::{
    CrossSectionShape, MAX_ROUND_SEGMENTS, MIN_ROUND_SEGMENTS, SectionProfile,
};

pub(crate) use mesh::finalize_mesh;

#[cfg(test)]
mod tests;
