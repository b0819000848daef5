//! Person endpoints
//!
//! - `POST /people` create (enriched)
//! - `GET /people` filtered, paginated list
//! - `GET /people/:id` fetch one
//! - `PUT /people/:id` replace name fields (re-enriched)
//! - `DELETE /people/:id` soft delete

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use rollcall_common::db::{Person, PersonInput};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::db::PersonFilter;
use crate::error::{ApiError, ApiResult};
use crate::pagination::Pagination;
use crate::AppState;

/// Query parameters for `GET /people`
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Page number (1-indexed, default 1)
    pub page: Option<i64>,
    /// Page size (default 10)
    pub limit: Option<i64>,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub gender: Option<String>,
    pub country: Option<String>,
}

/// List response with results and metadata
#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub data: Vec<Person>,
    pub meta: ListMeta,
}

#[derive(Debug, Serialize)]
pub struct ListMeta {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub offset: i64,
    pub total_pages: i64,
}

fn parse_input(payload: Result<Json<PersonInput>, JsonRejection>) -> ApiResult<PersonInput> {
    payload
        .map(|Json(input)| input)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

fn parse_query(query: Result<Query<ListQuery>, QueryRejection>) -> ApiResult<ListQuery> {
    query
        .map(|Query(query)| query)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

fn parse_id(id: Result<Path<i64>, PathRejection>) -> ApiResult<i64> {
    id.map(|Path(id)| id)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// POST /people
pub async fn create_person(
    State(state): State<AppState>,
    payload: Result<Json<PersonInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Person>)> {
    let input = parse_input(payload)?;
    let person = state.people.create_person(input).await?;
    Ok((StatusCode::CREATED, Json(person)))
}

/// GET /people
pub async fn list_people(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<ListResponse>> {
    let query = parse_query(query)?;
    let pagination = Pagination::new(query.page, query.limit)?;
    let filter = PersonFilter {
        name: query.name,
        surname: query.surname,
        gender: query.gender,
        country: query.country,
    };

    let page = state.people.list_people(filter, pagination).await?;

    Ok(Json(ListResponse {
        data: page.records,
        meta: ListMeta {
            total: page.total,
            page: pagination.page,
            limit: pagination.limit,
            offset: pagination.offset,
            total_pages: pagination.total_pages(page.total),
        },
    }))
}

/// GET /people/:id
pub async fn get_person(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Person>> {
    let id = parse_id(id)?;
    Ok(Json(state.people.get_person(id).await?))
}

/// PUT /people/:id
pub async fn update_person(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<PersonInput>, JsonRejection>,
) -> ApiResult<Json<Person>> {
    let id = parse_id(id)?;
    let input = parse_input(payload)?;
    Ok(Json(state.people.update_person(id, input).await?))
}

/// DELETE /people/:id
pub async fn delete_person(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let id = parse_id(id)?;
    state.people.delete_person(id).await?;
    Ok(Json(json!({ "message": "Person deleted successfully" })))
}

/// Build person routes
pub fn people_routes() -> Router<AppState> {
    Router::new()
        .route("/people", get(list_people).post(create_person))
        .route(
            "/people/:id",
            get(get_person).put(update_person).delete(delete_person),
        )
}
