use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::NaiveDate;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::advisory::{
    self, AdvisoryError, AdvisoryOutcome, FairnessAdvisor, LeastLoadedAdvisor, SuggestionRequest,
};
use crate::{BoardError, Chore, ChoreBoard, ChoreUpdate, MonthlySchedule, RosterError, defaults};

#[derive(Clone)]
pub struct AppState {
    board: Arc<RwLock<ChoreBoard>>,
    advisor: Arc<dyn FairnessAdvisor>,
    advisor_timeout: Duration,
}

impl AppState {
    pub fn new(board: ChoreBoard) -> Self {
        Self::with_shared(Arc::new(RwLock::new(board)))
    }

    pub fn with_shared(board: Arc<RwLock<ChoreBoard>>) -> Self {
        Self {
            board,
            advisor: Arc::new(LeastLoadedAdvisor),
            advisor_timeout: advisory::DEFAULT_TIMEOUT,
        }
    }

    pub fn with_advisor(mut self, advisor: Arc<dyn FairnessAdvisor>) -> Self {
        self.advisor = advisor;
        self
    }

    pub fn with_advisor_timeout(mut self, timeout: Duration) -> Self {
        self.advisor_timeout = timeout;
        self
    }

    fn board(&self) -> Arc<RwLock<ChoreBoard>> {
        self.board.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
    Unavailable(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<BoardError> for ApiError {
    fn from(value: BoardError) -> Self {
        let message = value.to_string();
        match value {
            BoardError::Roster(RosterError::Unknown(_)) | BoardError::UnknownChore(_) => {
                ApiError::NotFound(message)
            }
            BoardError::Roster(RosterError::Duplicate(_)) | BoardError::DuplicateChore(_) => {
                ApiError::Conflict(message)
            }
            BoardError::Roster(RosterError::BlankName)
            | BoardError::InvalidChore(_)
            | BoardError::BeforeReferenceMonth
            | BoardError::MonthOutOfRange(_) => ApiError::Invalid(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Unavailable(message) => {
                (StatusCode::SERVICE_UNAVAILABLE, "unavailable", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

/// One month as the API presents it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleView {
    pub month: i64,
    pub label: String,
    pub frozen: bool,
    pub week_dates: Vec<NaiveDate>,
    pub schedule: MonthlySchedule,
}

impl ScheduleView {
    fn of(board: &ChoreBoard, month: i64) -> Self {
        Self {
            month,
            label: board.month_label(month),
            frozen: board.is_frozen(month),
            week_dates: board.calendar().week_dates(month),
            schedule: board.schedule_for(month),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct MemberPayload {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RenamePayload {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct NewChorePayload {
    #[serde(default)]
    id: Option<String>,
    #[serde(flatten)]
    fields: ChoreUpdate,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuggestionPayload {
    chore_id: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/roster", get(list_members).post(add_member))
        .route("/roster/:name", put(rename_member).delete(remove_member))
        .route("/chores", get(list_chores).post(add_chore))
        .route("/chores/:id", put(update_chore).delete(remove_chore))
        .route("/schedule", get(current_schedule))
        .route("/schedule/:month", get(schedule_for_month))
        .route("/month/next", post(next_month))
        .route("/month/previous", post(previous_month))
        .route(
            "/months/:month/freeze",
            post(freeze_month).delete(unfreeze_month),
        )
        .route("/suggestion", post(suggest_assignee))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "chore board HTTP API listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_members(State(state): State<AppState>) -> Json<Vec<String>> {
    let board = state.board();
    let members = {
        let guard = board.read();
        guard.roster().iter().cloned().collect()
    };
    Json(members)
}

async fn add_member(
    State(state): State<AppState>,
    Json(payload): Json<MemberPayload>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let board = state.board();
    let added = {
        let mut guard = board.write();
        guard.add_member(payload.name.as_deref())?
    };
    Ok((StatusCode::CREATED, Json(json!({ "name": added }))))
}

async fn rename_member(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(payload): Json<RenamePayload>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let board = state.board();
    let (renamed, rewritten) = {
        let mut guard = board.write();
        let rewritten = guard.rename_member(&name, &payload.name)?;
        (payload.name.trim().to_string(), rewritten)
    };
    Ok(Json(json!({ "name": renamed, "rewrittenTasks": rewritten })))
}

async fn remove_member(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    let board = state.board();
    {
        let mut guard = board.write();
        guard.remove_member(&name)?;
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn list_chores(State(state): State<AppState>) -> Json<Vec<Chore>> {
    let board = state.board();
    let chores = {
        let guard = board.read();
        guard.chores().iter().cloned().collect()
    };
    Json(chores)
}

async fn add_chore(
    State(state): State<AppState>,
    Json(payload): Json<NewChorePayload>,
) -> Result<(StatusCode, Json<Chore>), ApiError> {
    let board = state.board();
    let created = {
        let mut guard = board.write();
        let id = payload.id.unwrap_or_else(|| guard.chores().next_new_id());
        let mut chore = defaults::new_chore(id);
        payload.fields.apply_to(&mut chore);
        let id = guard.add_chore(Some(chore))?;
        guard
            .chores()
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::not_found(format!("chore '{id}' not found after creation")))?
    };
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_chore(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<ChoreUpdate>,
) -> Result<Json<Chore>, ApiError> {
    if update.is_empty() {
        return Err(ApiError::invalid("update names no fields"));
    }
    let board = state.board();
    let updated = {
        let mut guard = board.write();
        guard.update_chore(&id, update)?.clone()
    };
    Ok(Json(updated))
}

async fn remove_chore(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let board = state.board();
    {
        let mut guard = board.write();
        guard.remove_chore(&id)?;
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn current_schedule(State(state): State<AppState>) -> Json<ScheduleView> {
    let board = state.board();
    let view = {
        let guard = board.read();
        ScheduleView::of(&guard, guard.month_offset())
    };
    Json(view)
}

async fn schedule_for_month(
    State(state): State<AppState>,
    Path(month): Path<i64>,
) -> Result<Json<ScheduleView>, ApiError> {
    if month < 0 {
        return Err(BoardError::BeforeReferenceMonth.into());
    }
    let board = state.board();
    let view = {
        let guard = board.read();
        ScheduleView::of(&guard, month)
    };
    Ok(Json(view))
}

async fn next_month(State(state): State<AppState>) -> Result<Json<ScheduleView>, ApiError> {
    let board = state.board();
    let view = {
        let mut guard = board.write();
        let month = guard.next_month()?;
        ScheduleView::of(&guard, month)
    };
    Ok(Json(view))
}

async fn previous_month(State(state): State<AppState>) -> Result<Json<ScheduleView>, ApiError> {
    let board = state.board();
    let view = {
        let mut guard = board.write();
        let month = guard.previous_month()?;
        ScheduleView::of(&guard, month)
    };
    Ok(Json(view))
}

async fn freeze_month(
    State(state): State<AppState>,
    Path(month): Path<i64>,
) -> Result<Json<ScheduleView>, ApiError> {
    if month < 0 {
        return Err(BoardError::BeforeReferenceMonth.into());
    }
    let board = state.board();
    let view = {
        let mut guard = board.write();
        guard.freeze_month(month);
        ScheduleView::of(&guard, month)
    };
    Ok(Json(view))
}

async fn unfreeze_month(
    State(state): State<AppState>,
    Path(month): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let board = state.board();
    let removed = {
        let mut guard = board.write();
        guard.unfreeze_month(month)
    };
    if !removed {
        return Err(ApiError::not_found(format!("month {month} is not frozen")));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn suggest_assignee(
    State(state): State<AppState>,
    Json(payload): Json<SuggestionPayload>,
) -> Result<Json<AdvisoryOutcome>, ApiError> {
    let board = state.board();
    let request = {
        let guard = board.read();
        SuggestionRequest::from_board(&guard, &payload.chore_id)
    };
    let request = request.map_err(|err| match err {
        AdvisoryError::UnknownChore(_) => ApiError::not_found(err.to_string()),
        other => ApiError::invalid(other.to_string()),
    })?;

    let outcome =
        advisory::request_suggestion(state.advisor.as_ref(), &request, state.advisor_timeout)
            .await;
    match outcome {
        AdvisoryOutcome::Unavailable { message } => Err(ApiError::Unavailable(message)),
        suggested => Ok(Json(suggested)),
    }
}
