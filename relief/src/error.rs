use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshError {
    #[error("invalid plate: {0}")]
    InvalidPlate(String),
    #[error("invalid extrusion profile: {0}")]
    InvalidProfile(String),
    #[error("mesh with {num_vertices} vertices and {num_faces} faces is invalid: {reason}")]
    InvalidMesh {
        reason: String,
        num_vertices: usize,
        num_faces: usize,
    },
}

/// A footprint operation failed. The build skips whatever needed it.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{0}")]
pub struct KernelError(pub String);

/// Something that couldn't be raised, and was left flat instead.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("skipped {layer} ({num_shapes} shapes): {reason}")]
pub struct DegenerateGeometryWarning {
    /// A category name, "border", or "emboss N"
    pub layer: String,
    pub num_shapes: usize,
    pub reason: String,
}
