pub mod point;
pub mod eye_sample;

pub use point::Point;
pub use eye_sample::{DetectionStatus, Eye, EyeSample, EyesSample, SessionStatus};
