pub mod entity;
pub mod flags;
pub mod layout;
pub mod measures;
pub mod thresholds;
