pub mod bank;
pub mod biquad;

pub use bank::FilterBank;
pub use biquad::{BiquadCoeffs, FilterBiquad};
