//! Mesh file loading. Only the PLY format is supported; everything else the
//! renderer consumes is built programmatically or through the registry.

pub mod ply;
