//! In-memory fake of the warehouse service.
//!
//! Speaks the real wire format (camelCase bodies, kebab-case query keys,
//! `{"errors": [...]}` failure bodies) for projects, people and engagements,
//! so client crates can be tested over real HTTP.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: u64,
    pub name: String,
    pub client_id: Option<u64>,
    pub source_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Engagement {
    pub id: u64,
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
    pub confidence_percentage: u8,
    pub project_id: String,
    pub employment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<Project>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub client_id: Option<Option<u64>>,
    #[serde(default, deserialize_with = "present")]
    pub source_url: Option<Option<String>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

/// Create and update payload. Outer `None` means the field was not sent.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementInput {
    pub start: Option<NaiveDate>,
    #[serde(default, deserialize_with = "present")]
    pub end: Option<Option<NaiveDate>>,
    pub confidence_percentage: Option<u8>,
    pub project_id: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub employment_id: Option<Option<String>>,
}

/// Distinguishes an explicit `null` from a missing key.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A failure response in the service's error body format.
#[derive(Debug)]
pub struct Failure {
    status: StatusCode,
    code: &'static str,
    description: String,
    field: Option<&'static str>,
}

impl Failure {
    fn not_found(what: &str, id: u64) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: "not-found",
            description: format!("No {what} with id {id}."),
            field: None,
        }
    }

    fn invalid(code: &'static str, field: &'static str, description: &str) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            code,
            description: description.to_string(),
            field: Some(field),
        }
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let mut error = json!({"code": self.code, "description": self.description});
        if let Some(field) = self.field {
            error["fieldName"] = json!(field);
        }
        (self.status, Json(json!({ "errors": [error] }))).into_response()
    }
}

#[derive(Default)]
pub struct Store {
    next_id: u64,
    projects: BTreeMap<u64, Project>,
    people: BTreeMap<u64, Person>,
    engagements: BTreeMap<u64, Engagement>,
}

impl Store {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
pub struct AppState {
    db: Db,
    token: Option<String>,
}

/// A fake with no authentication.
pub fn app() -> Router {
    router(None)
}

/// A fake that rejects requests without `Token <token>` or `Bearer <token>`.
pub fn app_with_token(token: &str) -> Router {
    router(Some(token.to_string()))
}

fn router(token: Option<String>) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(Store::default())),
        token,
    };
    Router::new()
        .route("/v1/projects", get(list_projects).post(create_project))
        .route("/v1/projects/{id}", get(get_project).put(update_project))
        .route("/v1/people", post(create_person))
        .route("/v1/people/search", get(search_people))
        .route("/v1/people/{id}", get(get_person))
        .route("/v1/engagements", get(list_engagements).post(create_engagement))
        .route(
            "/v1/engagements/{id}",
            get(get_engagement).put(update_engagement).delete(delete_engagement),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, app()).await
}

pub async fn run_with(listener: TcpListener, app: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, app).await
}

async fn require_token(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(token) = state.token.as_deref() else {
        return next.run(request).await;
    };
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Token ").or_else(|| value.strip_prefix("Bearer ")))
        .is_some_and(|presented| presented == token);
    if authorized {
        next.run(request).await
    } else {
        debug!(path = %request.uri().path(), "rejecting unauthenticated request");
        Failure {
            status: StatusCode::UNAUTHORIZED,
            code: "invalid-id-token",
            description: "The given id token is invalid.".to_string(),
            field: None,
        }
        .into_response()
    }
}

// --- projects ---

async fn list_projects(State(state): State<AppState>) -> Json<serde_json::Value> {
    let store = state.db.read().await;
    let projects: Vec<&Project> = store.projects.values().collect();
    Json(json!({ "projects": projects }))
}

async fn get_project(State(state): State<AppState>, Path(id): Path<u64>) -> Result<Json<Project>, Failure> {
    let store = state.db.read().await;
    store
        .projects
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| Failure::not_found("project", id))
}

async fn create_project(
    State(state): State<AppState>,
    Json(input): Json<ProjectInput>,
) -> Result<(StatusCode, Json<Project>), Failure> {
    let name = input
        .name
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| Failure::invalid("blank", "name", "Name can't be blank."))?;
    let mut store = state.db.write().await;
    let now = Utc::now();
    let project = Project {
        id: store.next_id(),
        name,
        client_id: input.client_id.flatten(),
        source_url: input.source_url.flatten(),
        created_at: now,
        updated_at: now,
    };
    store.projects.insert(project.id, project.clone());
    Ok((StatusCode::CREATED, Json(project)))
}

async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(input): Json<ProjectInput>,
) -> Result<Json<Project>, Failure> {
    let mut store = state.db.write().await;
    let project = store
        .projects
        .get_mut(&id)
        .ok_or_else(|| Failure::not_found("project", id))?;
    if let Some(name) = input.name {
        project.name = name;
    }
    if let Some(client_id) = input.client_id {
        project.client_id = client_id;
    }
    if let Some(source_url) = input.source_url {
        project.source_url = source_url;
    }
    project.updated_at = Utc::now();
    Ok(Json(project.clone()))
}

// --- people ---

async fn create_person(
    State(state): State<AppState>,
    Json(input): Json<PersonInput>,
) -> Result<(StatusCode, Json<Person>), Failure> {
    let first_name = input
        .first_name
        .ok_or_else(|| Failure::invalid("blank", "firstName", "First name can't be blank."))?;
    let last_name = input
        .last_name
        .ok_or_else(|| Failure::invalid("blank", "lastName", "Last name can't be blank."))?;
    let mut store = state.db.write().await;
    let now = Utc::now();
    let person = Person {
        id: store.next_id(),
        first_name,
        last_name,
        email: input.email,
        created_at: now,
        updated_at: now,
    };
    store.people.insert(person.id, person.clone());
    Ok((StatusCode::CREATED, Json(person)))
}

async fn get_person(State(state): State<AppState>, Path(id): Path<u64>) -> Result<Json<Person>, Failure> {
    let store = state.db.read().await;
    store
        .people
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| Failure::not_found("person", id))
}

async fn search_people(
    State(state): State<AppState>,
    Query(criteria): Query<BTreeMap<String, String>>,
) -> Json<serde_json::Value> {
    let store = state.db.read().await;
    let matches = |person: &&Person| {
        criteria.iter().all(|(key, wanted)| match key.as_str() {
            "first-name" => person.first_name == *wanted,
            "last-name" => person.last_name == *wanted,
            "email" => person.email.as_deref() == Some(wanted.as_str()),
            _ => true,
        })
    };
    let people: Vec<&Person> = store.people.values().filter(matches).collect();
    Json(json!({ "people": people }))
}

// --- engagements ---

async fn list_engagements(
    State(state): State<AppState>,
    Query(filters): Query<BTreeMap<String, String>>,
) -> Json<serde_json::Value> {
    let store = state.db.read().await;
    let engagements: Vec<Engagement> = store
        .engagements
        .values()
        .filter(|e| filters.get("project-id").map_or(true, |id| e.project_id == *id))
        .filter(|e| {
            filters
                .get("employment-id")
                .map_or(true, |id| e.employment_id.as_deref() == Some(id.as_str()))
        })
        .map(|e| with_project(&store, e))
        .collect();
    Json(json!({ "engagements": engagements }))
}

async fn get_engagement(State(state): State<AppState>, Path(id): Path<u64>) -> Result<Json<Engagement>, Failure> {
    let store = state.db.read().await;
    store
        .engagements
        .get(&id)
        .map(|e| Json(with_project(&store, e)))
        .ok_or_else(|| Failure::not_found("engagement", id))
}

async fn create_engagement(
    State(state): State<AppState>,
    Json(input): Json<EngagementInput>,
) -> Result<(StatusCode, Json<Engagement>), Failure> {
    let start = input
        .start
        .ok_or_else(|| Failure::invalid("blank", "start", "Start can't be blank."))?;
    let project_id = input
        .project_id
        .ok_or_else(|| Failure::invalid("blank", "projectId", "Project can't be blank."))?;
    let confidence_percentage = check_confidence(input.confidence_percentage.unwrap_or(100))?;
    let end = input.end.flatten();
    check_range(start, end)?;

    let mut store = state.db.write().await;
    let now = Utc::now();
    let engagement = Engagement {
        id: store.next_id(),
        start,
        end,
        confidence_percentage,
        project_id,
        employment_id: input.employment_id.flatten(),
        project: None,
        created_at: now,
        updated_at: now,
    };
    store.engagements.insert(engagement.id, engagement.clone());
    Ok((StatusCode::CREATED, Json(engagement)))
}

async fn update_engagement(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(input): Json<EngagementInput>,
) -> Result<Json<Engagement>, Failure> {
    let mut store = state.db.write().await;
    let engagement = store
        .engagements
        .get_mut(&id)
        .ok_or_else(|| Failure::not_found("engagement", id))?;
    let start = input.start.unwrap_or(engagement.start);
    let end = input.end.unwrap_or(engagement.end);
    check_range(start, end)?;
    if let Some(confidence) = input.confidence_percentage {
        engagement.confidence_percentage = check_confidence(confidence)?;
    }
    engagement.start = start;
    engagement.end = end;
    if let Some(project_id) = input.project_id {
        engagement.project_id = project_id;
    }
    if let Some(employment_id) = input.employment_id {
        engagement.employment_id = employment_id;
    }
    engagement.updated_at = Utc::now();
    Ok(Json(engagement.clone()))
}

async fn delete_engagement(State(state): State<AppState>, Path(id): Path<u64>) -> Result<StatusCode, Failure> {
    let mut store = state.db.write().await;
    store
        .engagements
        .remove(&id)
        .map(|_| StatusCode::OK)
        .ok_or_else(|| Failure::not_found("engagement", id))
}

fn with_project(store: &Store, engagement: &Engagement) -> Engagement {
    let project = engagement
        .project_id
        .parse::<u64>()
        .ok()
        .and_then(|id| store.projects.get(&id))
        .cloned();
    Engagement {
        project,
        ..engagement.clone()
    }
}

fn check_confidence(confidence: u8) -> Result<u8, Failure> {
    if confidence > 100 {
        return Err(Failure::invalid(
            "out-of-range",
            "confidencePercentage",
            "Confidence percentage must be between 0 and 100.",
        ));
    }
    Ok(confidence)
}

fn check_range(start: NaiveDate, end: Option<NaiveDate>) -> Result<(), Failure> {
    match end {
        Some(end) if end < start => Err(Failure::invalid(
            "end-before-start",
            "end",
            "End must not be before start.",
        )),
        _ => Ok(()),
    }
}
