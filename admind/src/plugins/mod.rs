//! Plugin identity, registry access and lifecycle control

pub mod ident;
pub mod lifecycle;
pub mod registry;
