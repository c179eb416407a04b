pub mod analysis;
pub mod config;
pub mod error;
pub mod evidence;
pub mod gateway;
pub mod report;
pub mod session;

// Re-export common error type
pub use error::CentinelaError;
