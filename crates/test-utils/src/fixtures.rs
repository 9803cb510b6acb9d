//! Common test fixtures for the topographic map tests.

/// Seeds used across the suite.
pub mod seeds {
    /// The seed used by reproducibility scenarios
    pub const REFERENCE: u64 = 20_240_115;

    /// A handful of seeds for property-style sweeps
    pub const SWEEP: [u64; 6] = [0, 1, 7, 42, 1_000, u64::MAX];
}

/// Grid and canvas sizes.
pub mod sizes {
    /// Smallest grid with an interior cell
    pub const MIN_GRID: (usize, usize) = (2, 2);

    /// Grid used by the round-trip scenario
    pub const ROUND_TRIP_GRID: (usize, usize) = (60, 60);

    /// Grid resolution of the browser reference
    pub const REFERENCE_GRID: (usize, usize) = (150, 150);

    /// Default canvas edge in pixels
    pub const CANVAS: usize = 600;
}

/// The identity permutation 0..=255, for hand-checkable noise values.
pub fn identity_permutation() -> [u8; 256] {
    let mut table = [0u8; 256];
    for (i, slot) in table.iter_mut().enumerate() {
        *slot = i as u8;
    }
    table
}

/// The reversed permutation 255..=0.
pub fn reversed_permutation() -> [u8; 256] {
    let mut table = identity_permutation();
    table.reverse();
    table
}
