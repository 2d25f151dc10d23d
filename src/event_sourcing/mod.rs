// ============================================================================
// Event Sourcing Infrastructure
// ============================================================================
//
// Generic aggregate and event envelope abstractions.
// Domain-specific code is in src/domain/, persistence is in src/store/.
//
// ============================================================================

mod core;

pub use core::*;
