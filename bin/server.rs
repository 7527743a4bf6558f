// PG Accounting - JSON API server
// Persistence shell over the ledger core: CRUD for the four record types,
// arrears/summary queries, CSV export, and database backup.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    routing::{delete, get, put},
    Router,
};
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;

use pg_accounting::{
    add_expense, add_payment, add_room, add_tenant, arrears_csv, backup_database, compute_arrears,
    delete_expense, delete_payment, delete_room, delete_tenant, expenses_csv, list_expenses,
    list_payments, list_rooms, list_tenants, monthly_summary, occupancy, open_database,
    payments_csv, tenant_statement, update_room_status, DuplicateRoomName, NewExpense, NewPayment,
    NewTenant, RoomStatus, DEFAULT_DB_PATH,
};
use serde::{Deserialize, Serialize};

/// Shared application state
#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<Connection>>,
    db_path: PathBuf,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn err(message: String) -> Self {
        Self {
            success: false,
            data: (),
            error: Some(message),
        }
    }
}

fn internal_error(e: anyhow::Error) -> axum::response::Response {
    eprintln!("Request failed: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::err(e.to_string())),
    )
        .into_response()
}

// ============================================================================
// Room handlers
// ============================================================================

#[derive(Deserialize)]
struct RoomRequest {
    name: String,
    rent: f64,
    #[serde(default)]
    deposit: f64,
    #[serde(default = "default_status")]
    status: RoomStatus,
}

fn default_status() -> RoomStatus {
    RoomStatus::Vacant
}

/// GET /api/rooms
async fn get_rooms(State(state): State<AppState>) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();
    match list_rooms(&conn) {
        Ok(rooms) => (StatusCode::OK, Json(ApiResponse::ok(rooms))).into_response(),
        Err(e) => internal_error(e),
    }
}

/// POST /api/rooms - 409 when the room name is already taken
async fn create_room(
    State(state): State<AppState>,
    Json(req): Json<RoomRequest>,
) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();
    match add_room(&conn, &req.name, req.rent, req.deposit, req.status) {
        Ok(id) => (StatusCode::CREATED, Json(ApiResponse::ok(id))).into_response(),
        Err(e) if e.downcast_ref::<DuplicateRoomName>().is_some() => {
            (StatusCode::CONFLICT, Json(ApiResponse::err(e.to_string()))).into_response()
        }
        Err(e) => internal_error(e),
    }
}

/// DELETE /api/rooms/:id
async fn remove_room(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();
    match delete_room(&conn, id) {
        Ok(()) => (StatusCode::OK, Json(ApiResponse::ok(id))).into_response(),
        Err(e) => internal_error(e),
    }
}

#[derive(Deserialize)]
struct StatusRequest {
    status: RoomStatus,
}

/// PUT /api/rooms/:id/status
async fn set_room_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<StatusRequest>,
) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();
    match update_room_status(&conn, id, req.status) {
        Ok(()) => (StatusCode::OK, Json(ApiResponse::ok(id))).into_response(),
        Err(e) => internal_error(e),
    }
}

// ============================================================================
// Tenant handlers
// ============================================================================

/// GET /api/tenants
async fn get_tenants(State(state): State<AppState>) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();
    match list_tenants(&conn) {
        Ok(tenants) => (StatusCode::OK, Json(ApiResponse::ok(tenants))).into_response(),
        Err(e) => internal_error(e),
    }
}

/// POST /api/tenants
async fn create_tenant(
    State(state): State<AppState>,
    Json(req): Json<NewTenant>,
) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();
    match add_tenant(&conn, &req) {
        Ok(id) => (StatusCode::CREATED, Json(ApiResponse::ok(id))).into_response(),
        Err(e) => internal_error(e),
    }
}

/// DELETE /api/tenants/:id
async fn remove_tenant(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();
    match delete_tenant(&conn, id) {
        Ok(()) => (StatusCode::OK, Json(ApiResponse::ok(id))).into_response(),
        Err(e) => internal_error(e),
    }
}

/// GET /api/tenants/:id/statement/:year/:month
async fn get_statement(
    State(state): State<AppState>,
    Path((id, year, month)): Path<(i64, i32, u32)>,
) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();
    match tenant_statement(&conn, id, year, month) {
        Ok(statement) => (StatusCode::OK, Json(ApiResponse::ok(statement))).into_response(),
        Err(e) => internal_error(e),
    }
}

// ============================================================================
// Payment & expense handlers
// ============================================================================

/// GET /api/payments
async fn get_payments(State(state): State<AppState>) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();
    match list_payments(&conn) {
        Ok(payments) => (StatusCode::OK, Json(ApiResponse::ok(payments))).into_response(),
        Err(e) => internal_error(e),
    }
}

/// POST /api/payments
async fn create_payment(
    State(state): State<AppState>,
    Json(req): Json<NewPayment>,
) -> impl IntoResponse {
    if !(1..=12).contains(&req.month) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::err(format!(
                "Billing month must be 1-12, got {}",
                req.month
            ))),
        )
            .into_response();
    }

    let conn = state.db.lock().unwrap();
    match add_payment(&conn, &req) {
        Ok(id) => (StatusCode::CREATED, Json(ApiResponse::ok(id))).into_response(),
        Err(e) => internal_error(e),
    }
}

/// DELETE /api/payments/:id
async fn remove_payment(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();
    match delete_payment(&conn, id) {
        Ok(()) => (StatusCode::OK, Json(ApiResponse::ok(id))).into_response(),
        Err(e) => internal_error(e),
    }
}

/// GET /api/expenses
async fn get_expenses(State(state): State<AppState>) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();
    match list_expenses(&conn) {
        Ok(expenses) => (StatusCode::OK, Json(ApiResponse::ok(expenses))).into_response(),
        Err(e) => internal_error(e),
    }
}

/// POST /api/expenses
async fn create_expense(
    State(state): State<AppState>,
    Json(req): Json<NewExpense>,
) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();
    match add_expense(&conn, &req) {
        Ok(id) => (StatusCode::CREATED, Json(ApiResponse::ok(id))).into_response(),
        Err(e) => internal_error(e),
    }
}

/// DELETE /api/expenses/:id
async fn remove_expense(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();
    match delete_expense(&conn, id) {
        Ok(()) => (StatusCode::OK, Json(ApiResponse::ok(id))).into_response(),
        Err(e) => internal_error(e),
    }
}

// ============================================================================
// Report & export handlers
// ============================================================================

/// GET /api/arrears/:year/:month
async fn get_arrears(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();
    match compute_arrears(&conn, year, month) {
        Ok(rows) => (StatusCode::OK, Json(ApiResponse::ok(rows))).into_response(),
        Err(e) => internal_error(e),
    }
}

/// GET /api/summary/:year/:month
async fn get_summary(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();
    match monthly_summary(&conn, year, month) {
        Ok(summary) => (StatusCode::OK, Json(ApiResponse::ok(summary))).into_response(),
        Err(e) => internal_error(e),
    }
}

/// GET /api/occupancy
async fn get_occupancy(State(state): State<AppState>) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();
    match occupancy(&conn) {
        Ok(snap) => (StatusCode::OK, Json(ApiResponse::ok(snap))).into_response(),
        Err(e) => internal_error(e),
    }
}

fn csv_response(filename: &str, bytes: Vec<u8>) -> axum::response::Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response()
}

/// GET /api/export/arrears/:year/:month
async fn export_arrears(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();
    let result = compute_arrears(&conn, year, month).and_then(|rows| arrears_csv(&rows));
    match result {
        Ok(bytes) => csv_response(&format!("arrears_{}_{}.csv", year, month), bytes),
        Err(e) => internal_error(e),
    }
}

/// GET /api/export/payments
async fn export_payments(State(state): State<AppState>) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();
    let result = list_payments(&conn).and_then(|payments| payments_csv(&payments));
    match result {
        Ok(bytes) => csv_response("payments.csv", bytes),
        Err(e) => internal_error(e),
    }
}

/// GET /api/export/expenses
async fn export_expenses(State(state): State<AppState>) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();
    let result = list_expenses(&conn).and_then(|expenses| expenses_csv(&expenses));
    match result {
        Ok(bytes) => csv_response("expenses.csv", bytes),
        Err(e) => internal_error(e),
    }
}

/// GET /api/backup - download the database file as an opaque blob
async fn download_backup(State(state): State<AppState>) -> impl IntoResponse {
    // Hold the lock so no write lands mid-copy; the backup checkpoints the
    // WAL through this connection before reading the file.
    let conn = state.db.lock().unwrap();
    match backup_database(&conn, &state.db_path) {
        Ok(blob) => (
            StatusCode::OK,
            [
                (
                    header::CONTENT_TYPE,
                    "application/octet-stream".to_string(),
                ),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"pg_accounts.db\"".to_string(),
                ),
            ],
            blob,
        )
            .into_response(),
        Err(e) => internal_error(e),
    }
}

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() {
    println!("🏠 PG Accounting - API Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let db_path = PathBuf::from(DEFAULT_DB_PATH);
    let conn = open_database(&db_path).expect("Failed to open database");
    println!("✓ Database opened: {:?}", db_path);

    // Create shared state
    let state = AppState {
        db: Arc::new(Mutex::new(conn)),
        db_path,
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/rooms", get(get_rooms).post(create_room))
        .route("/rooms/:id", delete(remove_room))
        .route("/rooms/:id/status", put(set_room_status))
        .route("/tenants", get(get_tenants).post(create_tenant))
        .route("/tenants/:id", delete(remove_tenant))
        .route("/tenants/:id/statement/:year/:month", get(get_statement))
        .route("/payments", get(get_payments).post(create_payment))
        .route("/payments/:id", delete(remove_payment))
        .route("/expenses", get(get_expenses).post(create_expense))
        .route("/expenses/:id", delete(remove_expense))
        .route("/arrears/:year/:month", get(get_arrears))
        .route("/summary/:year/:month", get(get_summary))
        .route("/occupancy", get(get_occupancy))
        .route("/export/arrears/:year/:month", get(export_arrears))
        .route("/export/payments", get(export_payments))
        .route("/export/expenses", get(export_expenses))
        .route("/backup", get(download_backup))
        .with_state(state);

    let app = Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive());

    // Start server
    let addr = "0.0.0.0:3000";
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    println!("\n🚀 Server running on http://localhost:3000");
    println!("   Arrears: http://localhost:3000/api/arrears/2024/3");
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
