//! Caller identity and the admin authorization gate

pub mod gate;
pub mod identity;
