use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router, middleware};
use log::{error, info};
use serde_json::{Value, json};

mod error;
mod metrics;
mod store;

pub use metrics::RequestCounter;
pub use store::BookStore;

use error::ApiError;
use store::StoreResult;

use crate::datamodel::{Book, BookId, BookPatch, NewBook};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<BookStore>,
    pub metrics: RequestCounter,
}

impl AppState {
    pub fn new(store: BookStore) -> Self {
        Self {
            store: Arc::new(store),
            metrics: RequestCounter::default(),
        }
    }
}

/// Runs a store call on the blocking pool; SQLite calls hold the connection
/// mutex for their whole duration.
async fn with_store<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&BookStore) -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(&state.store);
    Ok(tokio::task::spawn_blocking(move || f(&store)).await??)
}

async fn list_books(State(state): State<AppState>) -> Result<Json<Vec<Book>>, ApiError> {
    Ok(Json(with_store(&state, |store| store.list()).await?))
}

#[axum::debug_handler]
async fn add_book(
    State(state): State<AppState>,
    Json(book): Json<NewBook>,
) -> Result<impl IntoResponse, ApiError> {
    check_required("title", &book.title)?;
    check_required("author", &book.author)?;
    check_rating(book.rating)?;

    let book = with_store(&state, move |store| store.create(book)).await?;
    info!("created book {} `{}`", book.id, book.title);
    Ok((StatusCode::CREATED, Json(book)))
}

async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<BookId>,
    Json(patch): Json<BookPatch>,
) -> Result<Json<Value>, ApiError> {
    if let Some(title) = &patch.title {
        check_required("title", title)?;
    }
    if let Some(author) = &patch.author {
        check_required("author", author)?;
    }
    if let Some(rating) = patch.rating {
        check_rating(rating)?;
    }

    with_store(&state, move |store| store.update(id, patch))
        .await?
        .ok_or(ApiError::NotFound)?;
    info!("updated book {id}");
    Ok(Json(json!({ "message": "Book updated" })))
}

async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<BookId>,
) -> Result<Json<Value>, ApiError> {
    with_store(&state, move |store| store.delete(id))
        .await?
        .ok_or(ApiError::NotFound)?;
    info!("deleted book {id}");
    Ok(Json(json!({ "message": "Book deleted" })))
}

fn check_required(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::Invalid(format!("`{field}` must not be empty")));
    }
    Ok(())
}

fn check_rating(rating: Option<i64>) -> Result<(), ApiError> {
    match rating {
        Some(r) if !(1..=5).contains(&r) => Err(ApiError::Invalid(format!(
            "`rating` must be between 1 and 5, got {r}"
        ))),
        _ => Ok(()),
    }
}

/// Shared by `/health` and `/readyz`: the service is only ready when the
/// database answers.
async fn database_probe(State(state): State<AppState>) -> (StatusCode, &'static str) {
    match with_store(&state, |store| store.ping()).await {
        Ok(()) => (StatusCode::OK, "OK"),
        Err(err) => {
            error!("database probe failed: {err}");
            (StatusCode::INTERNAL_SERVER_ERROR, "DB error")
        }
    }
}

async fn livez() -> &'static str {
    "OK"
}

async fn render_metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, metrics::CONTENT_TYPE)],
        state.metrics.render(),
    )
}

pub fn make_app(state: AppState) -> Router {
    Router::new()
        .route("/books", get(list_books).post(add_book))
        .route("/books/{id}", axum::routing::put(update_book).delete(delete_book))
        .route("/health", get(database_probe))
        .route("/readyz", get(database_probe))
        .route("/livez", get(livez))
        .route("/metrics", get(render_metrics))
        .layer(middleware::from_fn_with_state(state.clone(), metrics::track))
        .with_state(state)
}
