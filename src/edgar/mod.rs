pub mod client;
pub mod filing;
pub mod holdings;
pub mod locator;
pub mod manifest;
