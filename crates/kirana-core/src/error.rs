use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("vendor name is required")]
    VendorNameRequired,
    #[error("draft must contain at least one item")]
    EmptyDraft,
    #[error("item id {0} appears more than once")]
    DuplicateItemId(u64),
}
