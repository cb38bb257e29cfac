pub mod analysis;
pub mod config;
pub mod edgar;
pub mod funds;
pub mod output;
pub mod tracker;
pub mod utils;

// Re-exports
pub use config::TrackerConfig;
pub use tracker::Tracker;
