//! Behaviours built on the hardware capability
pub mod color;
pub mod contact;
pub mod course;
pub mod drive;
pub mod line_follow;
pub mod line_search;
pub mod odometry;
