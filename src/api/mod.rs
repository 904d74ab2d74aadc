use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Json, Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::core::{
    CategoryBreakdown, DerivedRecord, EditOutcome, IncomeCategory, OrderStage, Rates, RawIncome,
    RosterEntry, RosterTotals, SettlementOrder, StageStatus, WorkerProfile, category_breakdown,
    derive_with, reallocate_with,
};
use crate::error::{AmountError, ConfigError, RosterError};

pub type SharedOrder = Arc<Mutex<SettlementOrder>>;

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum AmountInput {
    Number(f64),
    Text(String),
}

impl AmountInput {
    fn resolve(&self) -> Result<f64, AmountError> {
        match self {
            AmountInput::Number(value) => Ok(*value),
            AmountInput::Text(text) => parse_amount(text),
        }
    }
}

pub fn parse_amount(input: &str) -> Result<f64, AmountError> {
    let value = input
        .trim()
        .parse::<f64>()
        .map_err(|_| AmountError::NotNumeric {
            input: input.to_string(),
        })?;
    if !value.is_finite() {
        return Err(AmountError::NotFinite {
            input: input.to_string(),
        });
    }
    Ok(value)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DerivePayload {
    #[serde(flatten)]
    income: RawIncome,
    rates: Option<Rates>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReallocatePayload {
    new_total: f64,
    current: RawIncome,
    #[serde(default)]
    fallback: RawIncome,
    rates: Option<Rates>,
}

#[derive(Debug, Deserialize)]
struct AmountEditPayload {
    category: IncomeCategory,
    value: AmountInput,
}

#[derive(Debug, Deserialize)]
struct TotalEditPayload {
    value: AmountInput,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeriveResponse {
    record: DerivedRecord,
    breakdown: [CategoryBreakdown; 3],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReallocateResponse {
    raw: RawIncome,
    record: DerivedRecord,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StepView {
    stage: OrderStage,
    label: &'static str,
    status: StageStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WorkerView {
    index: usize,
    profile: WorkerProfile,
    masked_account: String,
    baseline: RawIncome,
    record: DerivedRecord,
    breakdown: [CategoryBreakdown; 3],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderResponse {
    month: String,
    task_label: String,
    stage: OrderStage,
    steps: Vec<StepView>,
    rates: Rates,
    workers: Vec<WorkerView>,
    totals: RosterTotals,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EditResponse {
    outcome: EditOutcome,
    worker: WorkerView,
    totals: RosterTotals,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StageResponse {
    stage: OrderStage,
    steps: Vec<StepView>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(order: SharedOrder) -> Router {
    Router::new()
        .route("/api/derive", post(derive_handler))
        .route("/api/reallocate", post(reallocate_handler))
        .route("/api/order", get(order_handler))
        .route("/api/order/advance", post(advance_handler))
        .route("/api/order/back", post(back_handler))
        .route("/api/order/workers/:index", put(replace_handler))
        .route("/api/order/workers/:index/amount", post(amount_handler))
        .route("/api/order/workers/:index/total", post(total_handler))
        .fallback(not_found_handler)
        .with_state(order)
}

pub async fn run_http_server(port: u16, order: SettlementOrder) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router(Arc::new(Mutex::new(order)));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("settlement API listening on http://{addr}");
    tracing::info!("local access: http://127.0.0.1:{port}/api/order");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn derive_handler(Json(payload): Json<DerivePayload>) -> Response {
    let rates = payload.rates.unwrap_or_default();
    if let Err(err) = rates.validate() {
        return rates_error_response(&err);
    }
    json_response(
        StatusCode::OK,
        DeriveResponse {
            record: derive_with(payload.income, &rates),
            breakdown: category_breakdown(payload.income, &rates),
        },
    )
}

async fn reallocate_handler(Json(payload): Json<ReallocatePayload>) -> Response {
    let rates = payload.rates.unwrap_or_default();
    if let Err(err) = rates.validate() {
        return rates_error_response(&err);
    }
    let raw = reallocate_with(payload.new_total, payload.current, payload.fallback, &rates);
    json_response(
        StatusCode::OK,
        ReallocateResponse {
            raw,
            record: derive_with(raw, &rates),
        },
    )
}

async fn order_handler(State(order): State<SharedOrder>) -> Response {
    let order = order.lock().await;
    json_response(StatusCode::OK, build_order_response(&order))
}

async fn advance_handler(State(order): State<SharedOrder>) -> Response {
    let mut order = order.lock().await;
    let stage = order.advance();
    tracing::info!(stage = %stage, "order advanced");
    json_response(StatusCode::OK, build_stage_response(stage))
}

async fn back_handler(State(order): State<SharedOrder>) -> Response {
    let mut order = order.lock().await;
    let stage = order.back();
    tracing::info!(stage = %stage, "order moved back");
    json_response(StatusCode::OK, build_stage_response(stage))
}

async fn amount_handler(
    State(order): State<SharedOrder>,
    Path(index): Path<usize>,
    Json(payload): Json<AmountEditPayload>,
) -> Response {
    let value = match payload.value.resolve() {
        Ok(value) => value,
        Err(err) => return amount_error_response(index, &err),
    };

    let mut order = order.lock().await;
    let result = order
        .roster_mut()
        .and_then(|roster| roster.set_amount(index, payload.category, value));
    edit_response(&order, index, result)
}

async fn total_handler(
    State(order): State<SharedOrder>,
    Path(index): Path<usize>,
    Json(payload): Json<TotalEditPayload>,
) -> Response {
    let value = match payload.value.resolve() {
        Ok(value) => value,
        Err(err) => return amount_error_response(index, &err),
    };

    let mut order = order.lock().await;
    let result = order
        .roster_mut()
        .and_then(|roster| roster.set_total(index, value));
    edit_response(&order, index, result)
}

async fn replace_handler(
    State(order): State<SharedOrder>,
    Path(index): Path<usize>,
    Json(raw): Json<RawIncome>,
) -> Response {
    let mut order = order.lock().await;
    let result = order
        .roster_mut()
        .and_then(|roster| roster.replace_raw(index, raw))
        .map(|()| EditOutcome::Updated);
    edit_response(&order, index, result)
}

fn edit_response(
    order: &SettlementOrder,
    index: usize,
    result: Result<EditOutcome, RosterError>,
) -> Response {
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(err) => return roster_error_response(&err),
    };

    let roster = order.roster();
    let entry = match roster.entry(index) {
        Ok(entry) => entry,
        Err(err) => return roster_error_response(&err),
    };

    match outcome {
        EditOutcome::Updated => tracing::info!(
            index,
            total_amount_due = entry.record.total_amount_due,
            "worker amounts updated"
        ),
        EditOutcome::Unchanged => tracing::debug!(index, "edit left amounts unchanged"),
    }

    json_response(
        StatusCode::OK,
        EditResponse {
            outcome,
            worker: worker_view(index, entry, roster.rates()),
            totals: roster.totals(),
        },
    )
}

fn build_order_response(order: &SettlementOrder) -> OrderResponse {
    let roster = order.roster();
    OrderResponse {
        month: order.month.clone(),
        task_label: order.task_label.clone(),
        stage: order.stage(),
        steps: steps_for(order.stage()),
        rates: *roster.rates(),
        workers: roster
            .entries()
            .iter()
            .enumerate()
            .map(|(index, entry)| worker_view(index, entry, roster.rates()))
            .collect(),
        totals: roster.totals(),
    }
}

fn build_stage_response(stage: OrderStage) -> StageResponse {
    StageResponse {
        stage,
        steps: steps_for(stage),
    }
}

fn steps_for(current: OrderStage) -> Vec<StepView> {
    OrderStage::ALL
        .iter()
        .map(|stage| StepView {
            stage: *stage,
            label: stage.label(),
            status: current.status_of(*stage),
        })
        .collect()
}

fn worker_view(index: usize, entry: &RosterEntry, rates: &Rates) -> WorkerView {
    WorkerView {
        index,
        profile: entry.profile.clone(),
        masked_account: entry.profile.masked_account(),
        baseline: entry.baseline,
        record: entry.record,
        breakdown: category_breakdown(entry.record.raw(), rates),
    }
}

fn amount_error_response(index: usize, err: &AmountError) -> Response {
    tracing::warn!(index, error = %err, "rejected amount input");
    error_response(StatusCode::BAD_REQUEST, &err.to_string())
}

fn rates_error_response(err: &ConfigError) -> Response {
    tracing::warn!(error = %err, "rejected rate override");
    error_response(StatusCode::BAD_REQUEST, &err.to_string())
}

fn roster_error_response(err: &RosterError) -> Response {
    let status = match err {
        RosterError::RecordNotFound { .. } => StatusCode::NOT_FOUND,
        RosterError::OrderLocked { .. } => StatusCode::CONFLICT,
    };
    tracing::warn!(error = %err, "rejected roster edit");
    error_response(status, &err.to_string())
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
