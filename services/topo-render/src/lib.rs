//! Topographic contour map renderer.
//!
//! This module exposes the configuration and rendering commands so they can
//! be driven from tests as well as from the `topo-render` binary.

pub mod config;
pub mod pipeline;

pub use config::{load_config, parse_config, TopoConfig};
