//! Common types and utilities shared across the topographic map crates.

pub mod error;
pub mod geometry;
pub mod grid;

pub use error::{TopoError, TopoResult};
pub use geometry::{Contour, Point, Polyline, Segment};
pub use grid::HeightGrid;
