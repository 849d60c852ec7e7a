//! Axum web server exposing the directory map.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::{header, StatusCode},
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use geodir_layout::{LatLon, WebMercator};
use geodir_search::{
    Category, CategoryPalette, Record, RecordFields, RecordId, RecordStore, ToggleMode,
};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::VisConfig;
use crate::controller::VisibilityController;
use crate::events::{MarkerBoard, MarkerEvent};

/// Controller driving the in-memory marker board.
pub type MapController = VisibilityController<WebMercator, MarkerBoard>;

/// Shared application state.
pub struct AppState {
    controller: RwLock<MapController>,
    palette: CategoryPalette,
}

/// Map server.
pub struct VisServer {
    state: Arc<AppState>,
}

impl VisServer {
    /// Create a server over a record store, laid out at `zoom`.
    pub fn new(store: RecordStore, palette: CategoryPalette, zoom: f64) -> Self {
        let controller =
            VisibilityController::new(store, WebMercator::default(), MarkerBoard::new(), zoom);
        Self {
            state: Arc::new(AppState {
                controller: RwLock::new(controller),
                palette,
            }),
        }
    }

    /// Create a server with the zoom and colours from `config`.
    pub fn from_config(store: RecordStore, config: &VisConfig) -> Self {
        let palette = CategoryPalette::new(store.categories(), &config.color_overrides);
        Self::new(store, palette, config.initial_zoom)
    }

    /// Build the router for the server.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(index_handler))
            .route("/api/status", get(status_handler))
            .route("/api/categories", get(categories_handler))
            .route("/api/markers", get(markers_handler))
            .route("/api/events", get(events_handler))
            .route("/api/records", get(records_handler))
            .route("/api/records/export", get(export_handler))
            .route("/api/records/{id}", get(record_handler))
            .route("/api/search", post(search_handler))
            .route("/api/categories/toggle", post(toggle_handler))
            .route("/api/filters/reset", post(reset_handler))
            .route("/api/zoom", post(zoom_handler))
            .route("/ws", get(ws_handler))
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the server on the given address.
    pub async fn serve(self, addr: SocketAddr) -> Result<(), std::io::Error> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Map server running on http://{}", addr);
        axum::serve(listener, self.router()).await
    }
}

async fn index_handler() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    record_count: usize,
    visible_count: usize,
    zoom: f64,
    frame: u64,
}

async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let controller = state.controller.read().await;
    Json(StatusResponse {
        status: "ok",
        record_count: controller.store().len(),
        visible_count: controller.visible().len(),
        zoom: controller.zoom(),
        frame: controller.sink().frame(),
    })
}

#[derive(Debug, Serialize)]
struct CategoryView {
    name: Category,
    color: String,
    active: bool,
}

#[derive(Debug, Serialize)]
struct CategoriesResponse {
    all_active: bool,
    categories: Vec<CategoryView>,
}

async fn categories_handler(State(state): State<Arc<AppState>>) -> Json<CategoriesResponse> {
    let controller = state.controller.read().await;
    let filter = controller.filter_state();
    Json(CategoriesResponse {
        all_active: filter.all_active(),
        categories: filter
            .all_categories()
            .iter()
            .map(|category| CategoryView {
                name: category.clone(),
                color: state.palette.color(category).to_string(),
                active: filter.is_active(category),
            })
            .collect(),
    })
}

/// A drawn marker with what the map needs to render it.
#[derive(Debug, Clone, Serialize)]
struct MarkerView {
    record: RecordId,
    name: String,
    category: Category,
    color: String,
    coord: LatLon,
    displaced: bool,
}

#[derive(Debug, Clone, Serialize)]
struct MarkersResponse {
    frame: u64,
    zoom: f64,
    record_count: usize,
    visible_count: usize,
    markers: Vec<MarkerView>,
}

impl MarkersResponse {
    fn capture(controller: &MapController, palette: &CategoryPalette) -> Self {
        let store = controller.store();
        let markers: Vec<_> = controller
            .placements()
            .filter_map(|(id, placement)| {
                let record = store.get(id)?;
                Some(MarkerView {
                    record: id,
                    name: record.name().to_string(),
                    category: record.category().clone(),
                    color: palette.color(record.category()).to_string(),
                    coord: placement.coord,
                    displaced: placement.is_displaced(),
                })
            })
            .collect();
        Self {
            frame: controller.sink().frame(),
            zoom: controller.zoom(),
            record_count: store.len(),
            visible_count: markers.len(),
            markers,
        }
    }
}

async fn markers_handler(State(state): State<Arc<AppState>>) -> Json<MarkersResponse> {
    let controller = state.controller.read().await;
    Json(MarkersResponse::capture(&controller, &state.palette))
}

async fn events_handler(State(state): State<Arc<AppState>>) -> Json<Vec<MarkerEvent>> {
    let controller = state.controller.read().await;
    Json(controller.sink().last_frame_events().to_vec())
}

/// A record with its id and marker colour.
#[derive(Debug, Serialize)]
struct RecordCard {
    id: RecordId,
    color: String,
    #[serde(flatten)]
    record: Record,
}

impl RecordCard {
    fn new(id: RecordId, record: &Record, palette: &CategoryPalette) -> Self {
        Self {
            id,
            color: palette.color(record.category()).to_string(),
            record: record.clone(),
        }
    }
}

/// Visible records, in store order.
async fn records_handler(State(state): State<Arc<AppState>>) -> Json<Vec<RecordCard>> {
    let controller = state.controller.read().await;
    let store = controller.store();
    Json(
        controller
            .visible()
            .iter()
            .filter_map(|&id| store.get(id).map(|r| RecordCard::new(id, r, &state.palette)))
            .collect(),
    )
}

/// A visible record as an export row.
#[derive(Debug, Serialize)]
struct ExportRow {
    #[serde(flatten)]
    fields: RecordFields,
    latitude: f64,
    longitude: f64,
}

impl ExportRow {
    /// Rows for the visible records, in store order.
    fn visible(controller: &MapController) -> Vec<Self> {
        let store = controller.store();
        controller
            .visible()
            .iter()
            .filter_map(|&id| store.get(id))
            .map(|record| Self {
                fields: record.fields().clone(),
                latitude: record.coord().lat,
                longitude: record.coord().lon,
            })
            .collect()
    }
}

/// Visible records as a JSON download.
async fn export_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let controller = state.controller.read().await;
    let rows = ExportRow::visible(&controller);
    tracing::info!("Exporting {} filtered records", rows.len());

    (
        [(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"geodir_filtered.json\"",
        )],
        Json(rows),
    )
}

async fn record_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<usize>,
) -> Result<Json<RecordCard>, StatusCode> {
    let controller = state.controller.read().await;
    let id = RecordId(id);
    let record = controller.store().get(id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(RecordCard::new(id, record, &state.palette)))
}

#[derive(Debug, Deserialize)]
struct SearchRequest {
    query: String,
}

async fn search_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> Json<MarkersResponse> {
    let mut controller = state.controller.write().await;
    controller.on_query_change(&req.query);
    Json(MarkersResponse::capture(&controller, &state.palette))
}

#[derive(Debug, Deserialize)]
struct ToggleRequest {
    category: String,
    #[serde(default)]
    mode: ToggleMode,
}

async fn toggle_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ToggleRequest>,
) -> Result<Json<MarkersResponse>, StatusCode> {
    let mut controller = state.controller.write().await;
    let category = Category::new(req.category);
    if !controller.filter_state().all_categories().contains(&category) {
        return Err(StatusCode::NOT_FOUND);
    }
    controller.on_category_toggle(&category, req.mode);
    Ok(Json(MarkersResponse::capture(&controller, &state.palette)))
}

async fn reset_handler(State(state): State<Arc<AppState>>) -> Json<MarkersResponse> {
    let mut controller = state.controller.write().await;
    controller.reset_filters();
    Json(MarkersResponse::capture(&controller, &state.palette))
}

#[derive(Debug, Deserialize)]
struct ZoomRequest {
    zoom: f64,
}

async fn zoom_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ZoomRequest>,
) -> Result<Json<MarkersResponse>, StatusCode> {
    if !req.zoom.is_finite() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let mut controller = state.controller.write().await;
    controller.on_zoom_change(req.zoom);
    Ok(Json(MarkersResponse::capture(&controller, &state.palette)))
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let initial = handle_ws_command(&state, WsCommand::GetMarkers).await;
    if let Ok(json) = serde_json::to_string(&initial) {
        if socket.send(Message::Text(json.into())).await.is_err() {
            return;
        }
    }

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => {
                let response = match serde_json::from_str::<WsCommand>(&text) {
                    Ok(cmd) => handle_ws_command(&state, cmd).await,
                    Err(e) => {
                        tracing::debug!("Rejected websocket message: {}", e);
                        WsResponse::Error {
                            message: e.to_string(),
                        }
                    }
                };
                if let Ok(json) = serde_json::to_string(&response) {
                    if socket.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum WsCommand {
    #[serde(rename = "get_markers")]
    GetMarkers,
    #[serde(rename = "get_events")]
    GetEvents,
    #[serde(rename = "search")]
    Search { query: String },
    #[serde(rename = "toggle")]
    Toggle {
        category: String,
        #[serde(default)]
        mode: ToggleMode,
    },
    #[serde(rename = "reset")]
    Reset,
    #[serde(rename = "zoom")]
    Zoom { zoom: f64 },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum WsResponse {
    #[serde(rename = "markers")]
    Markers(MarkersResponse),
    #[serde(rename = "events")]
    Events { events: Vec<MarkerEvent> },
    #[serde(rename = "error")]
    Error { message: String },
}

async fn handle_ws_command(state: &Arc<AppState>, cmd: WsCommand) -> WsResponse {
    match cmd {
        WsCommand::GetMarkers => {
            let controller = state.controller.read().await;
            return WsResponse::Markers(MarkersResponse::capture(&controller, &state.palette));
        }
        WsCommand::GetEvents => {
            let controller = state.controller.read().await;
            return WsResponse::Events {
                events: controller.sink().last_frame_events().to_vec(),
            };
        }
        _ => {}
    }

    let mut controller = state.controller.write().await;
    match cmd {
        WsCommand::GetMarkers | WsCommand::GetEvents => {}
        WsCommand::Search { query } => {
            controller.on_query_change(&query);
        }
        WsCommand::Toggle { category, mode } => {
            let category = Category::new(category);
            if !controller.filter_state().all_categories().contains(&category) {
                return WsResponse::Error {
                    message: format!("unknown category: {}", category),
                };
            }
            controller.on_category_toggle(&category, mode);
        }
        WsCommand::Reset => controller.reset_filters(),
        WsCommand::Zoom { zoom } => {
            if !zoom.is_finite() {
                return WsResponse::Error {
                    message: format!("invalid zoom: {}", zoom),
                };
            }
            controller.on_zoom_change(zoom);
        }
    }
    WsResponse::Markers(MarkersResponse::capture(&controller, &state.palette))
}
