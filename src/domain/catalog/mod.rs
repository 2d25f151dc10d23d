// ============================================================================
// Catalog Domain - Kitchens and Menu Items
// ============================================================================
//
// - Value objects (NewKitchen, NewMenuItem, BulkInsertMode, BulkInsertReport)
// - Errors (CatalogError)
// - Service (kitchen and menu CRUD, fan-out insert across kitchens)
//
// ============================================================================

pub mod value_objects;
pub mod errors;
pub mod service;

pub use value_objects::*;
pub use errors::*;
pub use service::*;
