//! Dimension annotations and their screen-space label placement.

mod annotation;
mod declutter;

pub use annotation::{
    Arrow, DimensionAnnotation, DimensionConfig, DimensionSpec, EditableControl, ExtensionExtent,
    Label, Segment, arrow_mesh, build_dimension, editable_control, format_measure,
};
pub use declutter::{
    Camera, DeclutterConfig, LabelDeclutter, ScreenLabel, ScreenPoint, resolve_overlaps,
};
