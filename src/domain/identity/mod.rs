// ============================================================================
// Identity Domain - Users and Sessions
// ============================================================================

pub mod errors;
pub mod session;
pub mod service;

pub use errors::*;
pub use session::*;
pub use service::*;
