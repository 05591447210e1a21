use std::{net::SocketAddr, sync::Arc};

use anyhow::Result as AnyResult;
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use chrono::Utc;
use kirana_core::{
    DraftSink, DraftSnapshot, ExportPayload, ItemCollection, ItemUpdate, ItemView, VendorInfo,
    VendorUpdate,
};
use kirana_platform::{
    DraftView, GenerateInvoiceRequest, HealthResponse, InvoiceDocument, JsonFileSink,
    SaveDraftResponse, ServiceConfig,
};
use kirana_sheet::{XLSX_CONTENT_TYPE, render_xlsx};
use tokio::sync::RwLock;
use tracing::{debug, error, info};

const GENERATION_FAILED: &str = "Error generating invoice. Please try again.";

#[derive(Clone)]
struct AppState {
    draft: Arc<RwLock<ItemCollection>>,
    sink: Arc<dyn DraftSink>,
    seed_rows: usize,
}

impl AppState {
    fn new(sink: Arc<dyn DraftSink>, seed_rows: usize) -> Self {
        Self {
            draft: Arc::new(RwLock::new(fresh_draft(seed_rows))),
            sink,
            seed_rows,
        }
    }
}

#[tokio::main]
async fn main() -> AnyResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "kirana_gateway=info".to_string()),
        )
        .init();

    let config = ServiceConfig::from_env("0.0.0.0:3001")?;
    let sink = Arc::new(JsonFileSink::new(config.export_dir.clone()));
    let state = AppState::new(sink, config.seed_rows);

    let addr: SocketAddr = config.http_addr.parse()?;
    info!(
        "invoice gateway listening on {} (drafts saved to {})",
        addr,
        config.export_dir.display()
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state, config.body_limit_bytes)).await?;

    Ok(())
}

fn router(state: AppState, body_limit_bytes: usize) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/generate-invoice", post(generate_invoice))
        .route("/api/generate-excel", post(generate_invoice))
        .route("/api/draft", get(get_draft))
        .route("/api/draft/items", post(add_item))
        .route(
            "/api/draft/items/{item_id}",
            patch(update_item).delete(delete_item),
        )
        .route("/api/draft/vendor", patch(update_vendor))
        .route("/api/draft/export", get(export_draft))
        .route("/api/draft/excel", post(draft_excel))
        .route("/api/draft/save", post(save_draft))
        .route("/api/draft/restore", post(restore_draft))
        .route("/api/draft/reset", post(reset_draft))
        .layer(DefaultBodyLimit::max(body_limit_bytes))
        .with_state(state)
}

fn fresh_draft(seed_rows: usize) -> ItemCollection {
    ItemCollection::with_rows(VendorInfo::new_at(Utc::now()), seed_rows)
}

fn draft_view(draft: &ItemCollection) -> DraftView {
    DraftView {
        vendor_info: draft.vendor().clone(),
        items: draft.items().iter().map(ItemView::from).collect(),
        total: draft.display_total(),
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "Server is running".to_string(),
    })
}

async fn generate_invoice(
    Json(payload): Json<GenerateInvoiceRequest>,
) -> Result<Response, (StatusCode, String)> {
    let document = payload.into_document(Utc::now()).map_err(invalid_request)?;
    info!(
        "generating invoice {} for {} ({} products)",
        document.invoice_number,
        document.vendor_name,
        document.products.len()
    );
    workbook_response(&document)
}

async fn get_draft(State(state): State<AppState>) -> Json<DraftView> {
    let draft = state.draft.read().await;
    Json(draft_view(&draft))
}

async fn add_item(State(state): State<AppState>) -> (StatusCode, Json<DraftView>) {
    let mut draft = state.draft.write().await;
    *draft = draft.add_item();
    (StatusCode::CREATED, Json(draft_view(&draft)))
}

async fn delete_item(
    State(state): State<AppState>,
    Path(item_id): Path<u64>,
) -> Json<DraftView> {
    let mut draft = state.draft.write().await;
    *draft = draft.delete_item(item_id);
    Json(draft_view(&draft))
}

async fn update_item(
    State(state): State<AppState>,
    Path(item_id): Path<u64>,
    Json(update): Json<ItemUpdate>,
) -> Result<Json<DraftView>, (StatusCode, String)> {
    let mut draft = state.draft.write().await;
    if draft.get(item_id).is_none() {
        return Err((StatusCode::NOT_FOUND, format!("item {item_id} not found")));
    }

    debug!(item_id, field = update.field_name(), "updating draft item");
    *draft = draft.update_item(item_id, update);
    Ok(Json(draft_view(&draft)))
}

async fn update_vendor(
    State(state): State<AppState>,
    Json(update): Json<VendorUpdate>,
) -> Json<DraftView> {
    let mut draft = state.draft.write().await;
    *draft = draft.update_vendor(update);
    Json(draft_view(&draft))
}

async fn export_draft(
    State(state): State<AppState>,
) -> Result<Json<ExportPayload>, (StatusCode, String)> {
    let draft = state.draft.read().await;
    draft.vendor().ensure_exportable().map_err(invalid_request)?;
    Ok(Json(draft.build_export_payload()))
}

async fn draft_excel(State(state): State<AppState>) -> Result<Response, (StatusCode, String)> {
    let payload = {
        let draft = state.draft.read().await;
        draft.vendor().ensure_exportable().map_err(invalid_request)?;
        draft.build_export_payload()
    };
    if payload.products.is_empty() {
        return Err(invalid_request("No invoice data provided"));
    }

    workbook_response(&InvoiceDocument::from_payload(payload))
}

async fn save_draft(
    State(state): State<AppState>,
) -> Result<Json<SaveDraftResponse>, (StatusCode, String)> {
    let snapshot = state.draft.read().await.snapshot(Utc::now());
    let saved = state.sink.save(&snapshot).await.map_err(|err| {
        error!("failed to save draft: {err:#}");
        internal_error("failed to save draft")
    })?;

    Ok(Json(SaveDraftResponse {
        file_name: snapshot.file_name(),
        location: saved.location,
        bytes_written: saved.bytes_written,
    }))
}

async fn restore_draft(
    State(state): State<AppState>,
    Json(snapshot): Json<DraftSnapshot>,
) -> Result<Json<DraftView>, (StatusCode, String)> {
    let restored = ItemCollection::from_snapshot(snapshot).map_err(invalid_request)?;
    let mut draft = state.draft.write().await;
    *draft = restored;
    Ok(Json(draft_view(&draft)))
}

async fn reset_draft(State(state): State<AppState>) -> Json<DraftView> {
    let mut draft = state.draft.write().await;
    *draft = fresh_draft(state.seed_rows);
    Json(draft_view(&draft))
}

fn workbook_response(document: &InvoiceDocument) -> Result<Response, (StatusCode, String)> {
    let bytes = render_xlsx(document).map_err(|err| {
        error!("failed to generate workbook: {err}");
        internal_error(GENERATION_FAILED)
    })?;
    let disposition = format!("attachment; filename={}", document.attachment_name());

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

fn invalid_request(err: impl std::fmt::Display) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, err.to_string())
}

fn internal_error<E: std::fmt::Display>(err: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

#[cfg(test)]
mod tests {
    use kirana_core::{PackagingType, SavedDraft};
    use serde_json::json;

    use super::*;

    struct FailingSink;

    #[async_trait::async_trait]
    impl DraftSink for FailingSink {
        async fn save(&self, _snapshot: &DraftSnapshot) -> AnyResult<SavedDraft> {
            anyhow::bail!("disk full")
        }
    }

    fn state_with(sink: Arc<dyn DraftSink>) -> AppState {
        AppState::new(sink, 5)
    }

    fn file_state(dir: &tempfile::TempDir) -> AppState {
        state_with(Arc::new(JsonFileSink::new(dir.path())))
    }

    async fn name_vendor(state: &AppState) {
        update_vendor(
            State(state.clone()),
            Json(VendorUpdate::VendorName("Sharma Traders".to_string())),
        )
        .await;
    }

    #[tokio::test]
    async fn health_reports_running() {
        assert_eq!(health().await.0.status, "Server is running");
    }

    #[tokio::test]
    async fn generate_returns_an_xlsx_attachment() {
        let request: GenerateInvoiceRequest = serde_json::from_value(json!({
            "invoiceData": {
                "vendorName": "Sharma Traders",
                "invoiceNumber": "INV-000042",
                "products": [{ "itemName": "Tea", "finalAmount": 100, "totalQuantity": 20 }]
            }
        }))
        .unwrap();

        let response = generate_invoice(Json(request)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], XLSX_CONTENT_TYPE);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=Invoice-INV-000042.xlsx"
        );
    }

    #[tokio::test]
    async fn generate_without_vendor_is_a_bad_request() {
        let request: GenerateInvoiceRequest =
            serde_json::from_value(json!({ "products": [{ "itemName": "Tea" }] })).unwrap();

        let (status, message) = generate_invoice(Json(request)).await.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "Vendor name is required");
    }

    #[tokio::test]
    async fn draft_edits_keep_opening_stock_in_sync() {
        let dir = tempfile::tempdir().unwrap();
        let state = file_state(&dir);

        for update in [
            ItemUpdate::ItemName("Biscuits".to_string()),
            ItemUpdate::PackagingType(PackagingType::BoxPiecesPacks),
            ItemUpdate::TotalUnits("2".to_string()),
            ItemUpdate::UnitsPerPack("12".to_string()),
            ItemUpdate::PacksPerUnit("10".to_string()),
            ItemUpdate::FinalAmount("480".to_string()),
        ] {
            update_item(State(state.clone()), Path(1), Json(update))
                .await
                .unwrap();
        }

        let view = get_draft(State(state.clone())).await.0;
        let first = &view.items[0];
        assert_eq!(first.record.opening_stock, "240");
        assert_eq!(first.total_quantity, 240);
        assert_eq!(first.purchase_price, "2.00");
        assert_eq!(view.total, "480.00");
    }

    #[tokio::test]
    async fn unknown_item_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let state = file_state(&dir);

        let (status, _) = update_item(
            State(state),
            Path(99),
            Json(ItemUpdate::ItemName("Tea".to_string())),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn add_and_delete_respect_collection_rules() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(Arc::new(JsonFileSink::new(dir.path())), 1);

        let view = delete_item(State(state.clone()), Path(1)).await.0;
        assert_eq!(view.items.len(), 1);

        let (status, view) = add_item(State(state.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(view.0.items[1].record.id, 2);
    }

    #[tokio::test]
    async fn export_requires_a_vendor_name() {
        let dir = tempfile::tempdir().unwrap();
        let state = file_state(&dir);

        let (status, _) = export_draft(State(state.clone())).await.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);

        name_vendor(&state).await;
        update_item(
            State(state.clone()),
            Path(2),
            Json(ItemUpdate::ItemName("Tea".to_string())),
        )
        .await
        .unwrap();

        let payload = export_draft(State(state)).await.unwrap().0;
        assert_eq!(payload.vendor_name, "Sharma Traders");
        assert_eq!(payload.products.len(), 1);
    }

    #[tokio::test]
    async fn draft_excel_needs_named_items() {
        let dir = tempfile::tempdir().unwrap();
        let state = file_state(&dir);
        name_vendor(&state).await;

        let (status, message) = draft_excel(State(state.clone())).await.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "No invoice data provided");

        update_item(
            State(state.clone()),
            Path(1),
            Json(ItemUpdate::ItemName("Tea".to_string())),
        )
        .await
        .unwrap();
        let response = draft_excel(State(state)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn saved_draft_can_be_restored() {
        let dir = tempfile::tempdir().unwrap();
        let state = file_state(&dir);
        name_vendor(&state).await;
        update_item(
            State(state.clone()),
            Path(3),
            Json(ItemUpdate::TotalUnits("7".to_string())),
        )
        .await
        .unwrap();

        let saved = save_draft(State(state.clone())).await.unwrap().0;
        assert!(saved.location.ends_with(&saved.file_name));

        let raw = std::fs::read(&saved.location).unwrap();
        let snapshot: DraftSnapshot = serde_json::from_slice(&raw).unwrap();

        reset_draft(State(state.clone())).await;
        let view = restore_draft(State(state.clone()), Json(snapshot))
            .await
            .unwrap()
            .0;
        assert_eq!(view.vendor_info.vendor_name, "Sharma Traders");
        assert_eq!(view.items[2].record.opening_stock, "7");
    }

    #[tokio::test]
    async fn sink_failure_is_an_internal_error() {
        let state = state_with(Arc::new(FailingSink));

        let (status, message) = save_draft(State(state)).await.unwrap_err();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "failed to save draft");
    }
}
