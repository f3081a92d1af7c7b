//! Route handlers and wire types for the scheduler API.
//!
//! Responses re-annotate definitions with a freshly projected
//! `next_occurrence` so readers never see a stale cached date. Validation
//! and not-found errors carry structured detail; everything 500-class
//! returns a generic message and logs the specifics server-side.

use crate::{
    api::AppState,
    core::{category, recurring},
    entities::{category as category_entity, recurring_definition},
    errors::{Error, Result},
};
use axum::{
    Json, async_trait,
    extract::{FromRequestParts, Path, Query, State},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::convert::Infallible;
use tracing::error;

/// Caller identity, read from the `x-user-id` header.
///
/// Real authentication is out of scope; absent or unparsable headers fall
/// back to user 1, matching the original backend's development behavior.
#[derive(Debug, Clone, Copy)]
pub struct UserId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Infallible> {
        let user_id = parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse().ok())
            .unwrap_or(1);
        Ok(Self(user_id))
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Validation { fields } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "message": "validation failed",
                    "fields": fields,
                }),
            ),
            Self::InvalidCategory { category_id } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "message": format!("category {category_id} not found for this user"),
                }),
            ),
            Self::NotFound { id } => (
                StatusCode::NOT_FOUND,
                json!({
                    "message": format!("recurring definition {id} not found"),
                }),
            ),
            other => {
                // Storage and config failures stay generic on the wire
                error!("internal error: {other}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": "internal server error" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

/// Request body for `POST /recurring`
#[derive(Debug, Deserialize)]
pub struct CreateRecurringRequest {
    /// Human-readable label
    pub description: String,
    /// Amount per occurrence
    pub amount: Decimal,
    /// "income" or "expense"
    pub kind: String,
    /// "daily", "weekly", "monthly" or "yearly"
    pub frequency: String,
    /// Anchor date
    pub start_date: NaiveDate,
    /// Optional schedule cutoff
    pub end_date: Option<NaiveDate>,
    /// Optional owned category
    pub category_id: Option<i64>,
    /// Opaque metadata
    pub payment_method: Option<String>,
    /// Opaque metadata
    pub notes: Option<String>,
    /// Defaults to active when omitted
    pub active: Option<bool>,
}

/// Request body for `PUT /recurring/{id}`.
///
/// Scalar fields keep their stored value when omitted; the nullable fields
/// (`end_date`, `category_id`, `payment_method`, `notes`) are replaced with
/// the request value on every call, so omitting them clears them - the same
/// full-replace semantics the original backend used for its update route.
#[derive(Debug, Deserialize)]
pub struct UpdateRecurringRequest {
    /// New label
    pub description: Option<String>,
    /// New amount
    pub amount: Option<Decimal>,
    /// New kind
    pub kind: Option<String>,
    /// New frequency
    pub frequency: Option<String>,
    /// New anchor date
    pub start_date: Option<NaiveDate>,
    /// Replacement end date (omitting clears it)
    pub end_date: Option<NaiveDate>,
    /// Replacement category (omitting makes the definition uncategorized)
    pub category_id: Option<i64>,
    /// Replacement payment method
    pub payment_method: Option<String>,
    /// Replacement notes
    pub notes: Option<String>,
    /// New active flag
    pub active: Option<bool>,
}

/// Request body for `PATCH /recurring/{id}/toggle`
#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    /// Target state: true resumes, false pauses
    pub active: bool,
}

/// Query parameters for `GET /recurring/upcoming`
#[derive(Debug, Deserialize)]
pub struct UpcomingParams {
    /// Maximum entries to return (default 5)
    pub limit: Option<usize>,
}

/// Wire shape of a recurring definition
#[derive(Debug, Serialize)]
pub struct RecurringResponse {
    /// Definition id
    pub id: i64,
    /// Label
    pub description: String,
    /// Amount per occurrence
    pub amount: Decimal,
    /// "income" or "expense"
    pub kind: String,
    /// Frequency string
    pub frequency: String,
    /// Category reference, if any
    pub category_id: Option<i64>,
    /// Anchor date
    pub start_date: NaiveDate,
    /// Schedule cutoff, if any
    pub end_date: Option<NaiveDate>,
    /// Projected next occurrence; null when the schedule has run out
    pub next_occurrence: Option<NaiveDate>,
    /// Whether the definition is active
    pub active: bool,
    /// Opaque metadata
    pub payment_method: Option<String>,
    /// Opaque metadata
    pub notes: Option<String>,
}

impl RecurringResponse {
    fn from_model(
        model: recurring_definition::Model,
        next_occurrence: Option<NaiveDate>,
    ) -> Self {
        Self {
            id: model.id,
            description: model.description,
            amount: model.amount,
            kind: model.kind,
            frequency: model.frequency,
            category_id: model.category_id,
            start_date: model.start_date,
            end_date: model.end_date,
            next_occurrence,
            active: model.active,
            payment_method: model.payment_method,
            notes: model.notes,
        }
    }
}

/// Request body for `POST /categories`
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    /// Display name
    pub name: String,
    /// Optional display color
    pub color: Option<String>,
    /// Optional display icon
    pub icon: Option<String>,
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// `GET /health`
pub async fn health() -> &'static str {
    "ok"
}

/// `POST /recurring`
pub async fn create_recurring(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Json(request): Json<CreateRecurringRequest>,
) -> Result<impl IntoResponse> {
    let input = recurring::DefinitionInput {
        description: request.description,
        amount: request.amount,
        kind: request.kind,
        frequency: request.frequency,
        start_date: request.start_date,
        end_date: request.end_date,
        category_id: request.category_id,
        payment_method: request.payment_method,
        notes: request.notes,
        active: request.active.unwrap_or(true),
    };
    let created = recurring::create_definition(&state.db, user_id, input, today()).await?;
    let next_occurrence = created.next_occurrence;
    Ok((
        StatusCode::CREATED,
        Json(RecurringResponse::from_model(created, next_occurrence)),
    ))
}

/// `GET /recurring`
pub async fn list_recurring(
    State(state): State<AppState>,
    UserId(user_id): UserId,
) -> Result<Json<Vec<RecurringResponse>>> {
    let as_of = today();
    let definitions = recurring::list_definitions(&state.db, user_id).await?;
    let mut response = Vec::with_capacity(definitions.len());
    for definition in definitions {
        let next_occurrence = recurring::project(&definition, as_of)?;
        response.push(RecurringResponse::from_model(definition, next_occurrence));
    }
    Ok(Json(response))
}

/// `GET /recurring/{id}`
pub async fn get_recurring(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(id): Path<i64>,
) -> Result<Json<RecurringResponse>> {
    let definition = recurring::get_definition(&state.db, user_id, id)
        .await?
        .ok_or(Error::NotFound { id })?;
    let next_occurrence = recurring::project(&definition, today())?;
    Ok(Json(RecurringResponse::from_model(
        definition,
        next_occurrence,
    )))
}

/// `PUT /recurring/{id}`
pub async fn update_recurring(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(id): Path<i64>,
    Json(request): Json<UpdateRecurringRequest>,
) -> Result<Json<RecurringResponse>> {
    let patch = recurring::DefinitionPatch {
        description: request.description,
        amount: request.amount,
        kind: request.kind,
        frequency: request.frequency,
        start_date: request.start_date,
        end_date: Some(request.end_date),
        category_id: Some(request.category_id),
        payment_method: Some(request.payment_method),
        notes: Some(request.notes),
        active: request.active,
    };
    let updated = recurring::update_definition(&state.db, user_id, id, patch, today()).await?;
    let next_occurrence = updated.next_occurrence;
    Ok(Json(RecurringResponse::from_model(updated, next_occurrence)))
}

/// `PATCH /recurring/{id}/toggle`
pub async fn toggle_recurring(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(id): Path<i64>,
    Json(request): Json<ToggleRequest>,
) -> Result<Json<serde_json::Value>> {
    let updated = recurring::toggle_active(&state.db, user_id, id, request.active).await?;
    Ok(Json(json!({ "id": updated.id, "active": updated.active })))
}

/// `DELETE /recurring/{id}`
pub async fn delete_recurring(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    recurring::delete_definition(&state.db, user_id, id).await?;
    Ok(Json(json!({ "id": id })))
}

/// `GET /recurring/upcoming`
pub async fn list_upcoming(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Query(params): Query<UpcomingParams>,
) -> Result<Json<Vec<RecurringResponse>>> {
    let limit = params.limit.unwrap_or(5);
    let upcoming = recurring::list_upcoming(&state.db, user_id, today(), limit).await?;
    let response = upcoming
        .into_iter()
        .map(|entry| {
            RecurringResponse::from_model(entry.definition, Some(entry.next_occurrence))
        })
        .collect();
    Ok(Json(response))
}

/// `GET /recurring/totals`
pub async fn monthly_totals(
    State(state): State<AppState>,
    UserId(user_id): UserId,
) -> Result<Json<recurring::MonthlyTotals>> {
    let totals = recurring::monthly_totals(&state.db, user_id).await?;
    Ok(Json(totals))
}

/// `POST /categories`
pub async fn create_category(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse> {
    let created = category::create_category(
        &state.db,
        user_id,
        request.name,
        request.color,
        request.icon,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /categories`
pub async fn list_categories(
    State(state): State<AppState>,
    UserId(user_id): UserId,
) -> Result<Json<Vec<category_entity::Model>>> {
    let categories = category::list_categories(&state.db, user_id).await?;
    Ok(Json(categories))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{api, test_utils::*};
    use axum::Router;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn test_app() -> Result<Router> {
        let db = setup_test_db().await?;
        Ok(api::router().with_state(AppState { db }))
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    // Anchors far in the future keep projections independent of the test
    // host's clock.
    fn future_definition(description: &str) -> serde_json::Value {
        json!({
            "description": description,
            "amount": "25.00",
            "kind": "expense",
            "frequency": "monthly",
            "start_date": "2099-01-15",
        })
    }

    #[tokio::test]
    async fn test_health() -> Result<()> {
        let app = test_app().await?;
        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_returns_created_record() -> Result<()> {
        let app = test_app().await?;

        let response = app
            .oneshot(post_json("/recurring", future_definition("Rent")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_json(response).await;
        assert_eq!(body["description"], "Rent");
        assert_eq!(body["active"], true);
        // Future anchor projects onto itself
        assert_eq!(body["next_occurrence"], "2099-01-15");
        Ok(())
    }

    #[tokio::test]
    async fn test_create_validation_lists_fields() -> Result<()> {
        let app = test_app().await?;

        let response = app
            .oneshot(post_json(
                "/recurring",
                json!({
                    "description": "",
                    "amount": "-1",
                    "kind": "expense",
                    "frequency": "quarterly",
                    "start_date": "2099-01-01",
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["fields"], json!(["description", "amount", "frequency"]));
        Ok(())
    }

    #[tokio::test]
    async fn test_get_unknown_id_is_404() -> Result<()> {
        let app = test_app().await?;

        let response = app.oneshot(get("/recurring/42")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["message"], "recurring definition 42 not found");
        Ok(())
    }

    #[tokio::test]
    async fn test_list_is_scoped_by_user_header() -> Result<()> {
        let app = test_app().await?;

        let response = app
            .clone()
            .oneshot(post_json("/recurring", future_definition("Rent")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app.clone().oneshot(get("/recurring")).await.unwrap();
        assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);

        let request = Request::builder()
            .uri("/recurring")
            .header("x-user-id", "2")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert!(body_json(response).await.as_array().unwrap().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_toggle_and_delete_round_trip() -> Result<()> {
        let app = test_app().await?;

        let response = app
            .clone()
            .oneshot(post_json("/recurring", future_definition("Gym")))
            .await
            .unwrap();
        let id = body_json(response).await["id"].as_i64().unwrap();

        let request = Request::builder()
            .method("PATCH")
            .uri(format!("/recurring/{id}/toggle"))
            .header("content-type", "application/json")
            .body(Body::from(json!({ "active": false }).to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body, json!({ "id": id, "active": false }));

        let request = Request::builder()
            .method("DELETE")
            .uri(format!("/recurring/{id}"))
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Deleting again is a 404, not a silent success
        let request = Request::builder()
            .method("DELETE")
            .uri(format!("/recurring/{id}"))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_changes_schedule() -> Result<()> {
        let app = test_app().await?;

        let response = app
            .clone()
            .oneshot(post_json("/recurring", future_definition("Insurance")))
            .await
            .unwrap();
        let id = body_json(response).await["id"].as_i64().unwrap();

        let request = Request::builder()
            .method("PUT")
            .uri(format!("/recurring/{id}"))
            .header("content-type", "application/json")
            .body(Body::from(
                json!({
                    "frequency": "yearly",
                    "start_date": "2099-06-01",
                })
                .to_string(),
            ))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["frequency"], "yearly");
        assert_eq!(body["next_occurrence"], "2099-06-01");
        Ok(())
    }

    #[tokio::test]
    async fn test_upcoming_respects_limit() -> Result<()> {
        let app = test_app().await?;

        for (description, day) in [("A", 10), ("B", 20), ("C", 5)] {
            let response = app
                .clone()
                .oneshot(post_json(
                    "/recurring",
                    json!({
                        "description": description,
                        "amount": "5.00",
                        "kind": "expense",
                        "frequency": "monthly",
                        "start_date": format!("2099-03-{day:02}"),
                    }),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = app.oneshot(get("/recurring/upcoming?limit=2")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let descriptions: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| entry["description"].as_str().unwrap())
            .collect();
        assert_eq!(descriptions, vec!["C", "A"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_totals_are_monthly_normalized() -> Result<()> {
        let app = test_app().await?;

        let response = app
            .clone()
            .oneshot(post_json(
                "/recurring",
                json!({
                    "description": "Salary",
                    "amount": "1200.00",
                    "kind": "income",
                    "frequency": "yearly",
                    "start_date": "2099-01-01",
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app.oneshot(get("/recurring/totals")).await.unwrap();
        let body = body_json(response).await;
        // Decimal serializes as a string; compare numerically to stay
        // independent of trailing-zero scale
        let parse = |field: &str| body[field].as_str().unwrap().parse::<Decimal>().unwrap();
        assert_eq!(parse("income"), Decimal::from(100));
        assert_eq!(parse("expenses"), Decimal::ZERO);
        assert_eq!(parse("net"), Decimal::from(100));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_with_unknown_category_is_400() -> Result<()> {
        let app = test_app().await?;

        let mut body = future_definition("Rent");
        body["category_id"] = json!(777);
        let response = app.oneshot(post_json("/recurring", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn test_category_round_trip() -> Result<()> {
        let app = test_app().await?;

        let response = app
            .clone()
            .oneshot(post_json("/categories", json!({ "name": "Housing" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let category_id = body_json(response).await["id"].as_i64().unwrap();

        let mut body = future_definition("Rent");
        body["category_id"] = json!(category_id);
        let response = app
            .clone()
            .oneshot(post_json("/recurring", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app.oneshot(get("/categories")).await.unwrap();
        let body = body_json(response).await;
        assert_eq!(body[0]["name"], "Housing");
        Ok(())
    }
}
