//! Export surfaces: the OPC UA write-set mapper and the CSV mirror.

pub mod csv;
pub mod mapping;
