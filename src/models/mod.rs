pub mod price_record;
pub mod watch_state;

// Re-exports for convenience
pub use price_record::*;
pub use watch_state::*;
