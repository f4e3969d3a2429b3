//! ---
//! glx_section: "02-data-model"
//! glx_subsection: "module"
//! glx_type: "source"
//! glx_scope: "code"
//! glx_description: "Wire and domain data model shared across the field core."
//! glx_version: "v0.0.0-prealpha"
//! glx_owner: "tbd"
//! ---
//! Data model shared across the GeoLynx field core.
//!
//! All wire-facing structs mirror the backend payloads (camelCase field
//! names); nothing in this crate performs I/O.

#![warn(missing_docs)]

pub mod execution;
pub mod spatial;

pub use execution::{
    ExecutionSheet, GeometryTrack, OperationKey, OperationRecord, OperationStatus,
    PolygonAssignment,
};
pub use spatial::{Animal, AnimalUpload, CuriosityUpload, HistoricalCuriosity, NearbyEntities};
