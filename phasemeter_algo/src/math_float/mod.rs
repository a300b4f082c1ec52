pub mod energy;
pub mod filters;
pub mod harmonic;

pub use energy::EnergyAccumulator;
pub use harmonic::{HarmonicAccumulator, Phasor, ReferenceWindow};
