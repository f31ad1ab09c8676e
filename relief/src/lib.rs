//! Extrudes a classified road network into a 3D-printable relief: a base plate with road ridges
//! raised on top, one terrace per height.

#[macro_use]
extern crate log;

mod arrangement;
mod builder;
mod cleanup;
mod error;
mod kernel;
mod mesh;
mod plate;
mod profile;

pub use crate::builder::{
    build_mesh, Border, EmbossShape, Placement, ReliefBuilder, ReliefModel, RidgeMode,
};
pub use crate::error::{DegenerateGeometryWarning, KernelError, MeshError};
pub use crate::kernel::{FootprintKernel, GeoKernel};
pub use crate::mesh::Mesh;
pub use crate::plate::{PlateFrame, PlateSpec};
pub use crate::profile::{ExtrusionProfile, ReliefSettings, Ridge};
