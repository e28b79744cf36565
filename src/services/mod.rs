//! Service layer for costsplit
//!
//! The service layer provides business logic on top of the storage layer,
//! handling validation, capability checks, derived fields, and audit
//! logging. The segmentation engine lives in `segment`.

pub mod category;
pub mod expense;
pub mod import;
pub mod segment;

pub use category::CategoryService;
pub use expense::ExpenseService;
pub use segment::SegmentationService;
