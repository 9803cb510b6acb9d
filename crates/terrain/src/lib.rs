//! Procedural terrain synthesis.
//!
//! - Gradient noise with multi-octave summation
//! - Height grid synthesis with domain warp and box blur
//! - Animation sessions sharing one noise field across frames

pub mod noise;
pub mod session;
pub mod synth;

pub use noise::NoiseField;
pub use session::AnimationSession;
pub use synth::{generate_height_grid, generate_still, TerrainParams};
