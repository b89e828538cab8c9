// Public modules
pub mod error;
pub mod surgery;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
