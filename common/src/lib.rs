pub mod config;
pub mod misc;
pub mod progress;
