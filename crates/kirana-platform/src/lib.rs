pub mod config;
pub mod contracts;
pub mod json_sink;

pub use config::ServiceConfig;
pub use contracts::{
    DraftView, GenerateInvoiceRequest, HealthResponse, InvoiceData, InvoiceDocument, ProductLine,
    SaveDraftResponse,
};
pub use json_sink::JsonFileSink;
