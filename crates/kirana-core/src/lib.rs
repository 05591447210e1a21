pub mod collection;
pub mod error;
pub mod export;
pub mod models;
pub mod quantity;
pub mod sink;

pub use collection::{ItemCollection, ItemView, SEED_ROWS};
pub use error::CoreError;
pub use export::{DraftSnapshot, ExportItem, ExportPayload};
pub use models::{ItemRecord, ItemUpdate, PackagingType, VendorInfo, VendorUpdate};
pub use sink::{DraftSink, SavedDraft};
