pub mod preprocessing;
pub mod morphology;
pub mod contours;
