pub mod capture;
pub mod offset;

pub use capture::CaptureBuffer;
pub use offset::OffsetEstimator;
