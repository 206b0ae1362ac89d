//! Generic record endpoints.
//!
//! One router per store, nested under `/api/{Kind}`:
//!
//! | Method | Path            | Store call        |
//! |--------|-----------------|-------------------|
//! | GET    | `/All`          | `get_all`         |
//! | GET    | `/All/ListView` | `get_list_view`   |
//! | GET    | `/Count`        | `count_all`       |
//! | GET    | `/Single`       | `get_single`      |
//! | GET    | `/Single/:id`   | `get`             |
//! | POST   | `/`             | `create`          |
//! | PUT    | `/`             | `update`          |
//! | DELETE | `/:id`          | `delete`          |
//!
//! Read-only routers answer the three mutations with 405.

use crate::error::AppError;
use crate::extractors::CorrelationId;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use flight_schedule_core::{ListView, MemoryStore, Record, RecordId, Validator};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

/// Whether clients may write through the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Create, update and delete are routed to the store
    ReadWrite,
    /// Create, update and delete answer 405
    ReadOnly,
}

type StoreState<T, V> = State<Arc<MemoryStore<T, V>>>;

/// Builds the endpoints for one store.
pub fn crud_router<T, V>(store: Arc<MemoryStore<T, V>>, access: Access) -> Router
where
    T: Record + Serialize + DeserializeOwned,
    V: Validator<T>,
{
    let router = Router::new()
        .route("/All", get(get_all::<T, V>))
        .route("/All/ListView", get(get_list_view::<T, V>))
        .route("/Count", get(count::<T, V>))
        .route("/Single", get(get_single::<T, V>))
        .route("/Single/:id", get(get_by_id::<T, V>));

    let router = match access {
        Access::ReadWrite => router
            .route("/", post(create::<T, V>).put(update::<T, V>))
            .route("/:id", delete(delete_by_id::<T, V>)),
        Access::ReadOnly => router
            .route("/", post(read_only::<T>).put(read_only::<T>))
            .route("/:id", delete(read_only::<T>)),
    };

    router.with_state(store)
}

async fn get_all<T, V>(State(store): StoreState<T, V>) -> Json<Vec<T>>
where
    T: Record + Serialize + DeserializeOwned,
    V: Validator<T>,
{
    Json(store.get_all().await)
}

async fn get_list_view<T, V>(State(store): StoreState<T, V>) -> Json<Vec<ListView>>
where
    T: Record + Serialize + DeserializeOwned,
    V: Validator<T>,
{
    Json(store.get_list_view().await)
}

async fn count<T, V>(State(store): StoreState<T, V>) -> Json<usize>
where
    T: Record + Serialize + DeserializeOwned,
    V: Validator<T>,
{
    Json(store.count_all().await)
}

async fn get_single<T, V>(State(store): StoreState<T, V>) -> Result<Json<T>, AppError>
where
    T: Record + Serialize + DeserializeOwned,
    V: Validator<T>,
{
    store
        .get_single()
        .await
        .map(Json)
        .ok_or_else(|| AppError::empty(T::KIND))
}

async fn get_by_id<T, V>(
    State(store): StoreState<T, V>,
    Path(id): Path<RecordId>,
) -> Result<Json<T>, AppError>
where
    T: Record + Serialize + DeserializeOwned,
    V: Validator<T>,
{
    Ok(Json(store.get(id).await?))
}

async fn create<T, V>(
    State(store): StoreState<T, V>,
    correlation_id: CorrelationId,
    Json(record): Json<T>,
) -> Result<Json<T>, AppError>
where
    T: Record + Serialize + DeserializeOwned,
    V: Validator<T>,
{
    let stored = store.create(record).await?;
    tracing::info!(
        correlation_id = %correlation_id.0,
        kind = T::KIND,
        id = stored.id(),
        "Record created"
    );
    Ok(Json(stored))
}

async fn update<T, V>(
    State(store): StoreState<T, V>,
    correlation_id: CorrelationId,
    Json(record): Json<T>,
) -> Result<Json<T>, AppError>
where
    T: Record + Serialize + DeserializeOwned,
    V: Validator<T>,
{
    let stored = store.update(record).await?;
    tracing::info!(
        correlation_id = %correlation_id.0,
        kind = T::KIND,
        id = stored.id(),
        "Record updated"
    );
    Ok(Json(stored))
}

async fn delete_by_id<T, V>(
    State(store): StoreState<T, V>,
    correlation_id: CorrelationId,
    Path(id): Path<RecordId>,
) -> Result<StatusCode, AppError>
where
    T: Record + Serialize + DeserializeOwned,
    V: Validator<T>,
{
    store.delete(id).await?;
    tracing::info!(
        correlation_id = %correlation_id.0,
        kind = T::KIND,
        id,
        "Record deleted"
    );
    Ok(StatusCode::OK)
}

#[allow(clippy::unused_async)]
async fn read_only<T: Record>() -> AppError {
    AppError::method_not_allowed(T::KIND)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use flight_schedule_core::{environment::SystemClock, Gate, GateStore, NoDomainRules};
    use tower::ServiceExt;

    fn gates() -> Arc<GateStore> {
        Arc::new(GateStore::new(NoDomainRules, Arc::new(SystemClock)))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_read_only_rejects_writes() {
        let app = crud_router(gates(), Access::ReadOnly);

        let request = Request::builder()
            .method("DELETE")
            .uri("/1")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body_json(response).await["code"], "METHOD_NOT_ALLOWED");
    }

    #[tokio::test]
    async fn test_single_on_empty_store_is_not_found() {
        let app = crud_router(gates(), Access::ReadOnly);

        let request = Request::builder()
            .uri("/Single")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_read_write_creates_and_counts() {
        let store = gates();
        let app = crud_router(Arc::clone(&store), Access::ReadWrite);

        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"name":"B7"}"#))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["integer64ID"], 1);

        let request = Request::builder().uri("/Count").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(body_json(response).await, 1);
        assert!(store.exists(|g: &Gate| g.name() == "B7").await);
    }
}
