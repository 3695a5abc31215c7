use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequestParts, Path, Query, State,
    },
    http::{request::Parts, StatusCode},
    response::Json,
    routing::{get, put},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::adapter::driver::request_dto::{OrdersQueryParams, PlaceOrderRequest};
use crate::adapter::driver::response_dto::{OrderListResponse, OrderResponse};
use crate::application::service::{OrderApplicationService, OrderQueryService};
use crate::application::ApplicationError;
use crate::domain::error::DomainError;
use crate::domain::model::{OrderId, UserId};
use crate::domain::port::{OrderRepository, ProductLookup};

/// 認証層が付与する要求者IDのヘッダー
pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

type ApiFailure = (StatusCode, Json<ApiError>);

fn api_error(status: StatusCode, code: &str, error: impl Into<String>) -> ApiFailure {
    (
        status,
        Json(ApiError {
            error: error.into(),
            code: code.to_string(),
        }),
    )
}

// アプリケーションサービスを含む状態
#[derive(Clone)]
pub struct AppState {
    pub order_service: Arc<OrderApplicationService>,
    pub order_query_service: Arc<OrderQueryService>,
}

impl AppState {
    /// 同じリポジトリを共有するコマンド側・クエリ側サービスを組み立てる
    pub fn new(
        order_repository: Arc<dyn OrderRepository>,
        product_lookup: Arc<dyn ProductLookup>,
    ) -> Self {
        Self {
            order_service: Arc::new(OrderApplicationService::new(
                order_repository.clone(),
                product_lookup,
            )),
            order_query_service: Arc::new(OrderQueryService::new(order_repository)),
        }
    }
}

/// リクエストを行ったユーザー
/// `X-User-Id` ヘッダーのUUIDから取り出す。欠落・不正は401
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester(pub UserId);

#[async_trait]
impl<S> FromRequestParts<S> for Requester
where
    S: Send + Sync,
{
    type Rejection = ApiFailure;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| {
                api_error(
                    StatusCode::UNAUTHORIZED,
                    "UNAUTHORIZED",
                    "X-User-Idヘッダーが必要です",
                )
            })?
            .to_str()
            .map_err(|_| {
                api_error(
                    StatusCode::UNAUTHORIZED,
                    "UNAUTHORIZED",
                    "X-User-Idヘッダーが不正です",
                )
            })?;

        UserId::from_string(value.trim()).map(Requester).map_err(|_| {
            api_error(
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "X-User-IdはUUIDである必要があります",
            )
        })
    }
}

// REST APIルーターを作成
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/orders", get(list_orders).post(place_order))
        .route("/api/v1/orders/:order_id", get(get_order))
        .route("/api/v1/orders/:order_id/cancel", put(cancel_order))
        .layer(TraceLayer::new_for_http())
}

// ヘルスチェックエンドポイント
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

// 注文作成エンドポイント
async fn place_order(
    State(state): State<AppState>,
    Requester(user_id): Requester,
    body: Result<Json<PlaceOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiFailure> {
    let Json(request) = body.map_err(|rejection| {
        api_error(
            StatusCode::BAD_REQUEST,
            "INVALID_BODY",
            format!("無効なリクエストボディです: {}", rejection.body_text()),
        )
    })?;

    let order = state
        .order_service
        .place_order(user_id, request.into_requested_lines())
        .await
        .map_err(map_application_error)?;

    let response = OrderResponse::from_order(&order).map_err(map_domain_error)?;
    Ok((StatusCode::CREATED, Json(response)))
}

// 注文一覧取得エンドポイント
async fn list_orders(
    State(state): State<AppState>,
    Requester(user_id): Requester,
    query: Result<Query<OrdersQueryParams>, QueryRejection>,
) -> Result<Json<OrderListResponse>, ApiFailure> {
    let Query(params) = query.map_err(|_| {
        api_error(
            StatusCode::BAD_REQUEST,
            "INVALID_PARAMETER",
            "無効なクエリパラメータです",
        )
    })?;
    let filter = params.filter().map_err(|err| {
        api_error(StatusCode::BAD_REQUEST, "INVALID_PARAMETER", err.to_string())
    })?;

    let page = state
        .order_query_service
        .list_orders(user_id, filter, params.pagination())
        .await
        .map_err(map_application_error)?;

    let response = OrderListResponse::from_page(&page).map_err(map_domain_error)?;
    Ok(Json(response))
}

// 注文詳細取得エンドポイント
async fn get_order(
    State(state): State<AppState>,
    Requester(user_id): Requester,
    order_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<OrderResponse>, ApiFailure> {
    let order_id = parse_order_id(order_id)?;

    let order = state
        .order_query_service
        .get_order(user_id, order_id)
        .await
        .map_err(map_application_error)?;

    let response = OrderResponse::from_order(&order).map_err(map_domain_error)?;
    Ok(Json(response))
}

// 注文キャンセルエンドポイント
async fn cancel_order(
    State(state): State<AppState>,
    Requester(user_id): Requester,
    order_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<OrderResponse>, ApiFailure> {
    let order_id = parse_order_id(order_id)?;

    let order = state
        .order_service
        .cancel_order(user_id, order_id)
        .await
        .map_err(map_application_error)?;

    let response = OrderResponse::from_order(&order).map_err(map_domain_error)?;
    Ok(Json(response))
}

fn parse_order_id(path: Result<Path<Uuid>, PathRejection>) -> Result<OrderId, ApiFailure> {
    path.map(|Path(id)| OrderId::from_uuid(id)).map_err(|_| {
        api_error(
            StatusCode::BAD_REQUEST,
            "INVALID_UUID",
            "無効な注文ID形式です",
        )
    })
}

// アプリケーションエラーをHTTPエラーにマッピング
fn map_application_error(err: ApplicationError) -> ApiFailure {
    match err {
        ApplicationError::DomainError(domain_err) => map_domain_error(domain_err),
        ApplicationError::RepositoryError(repo_err) => {
            tracing::error!(error = %repo_err, "repository failure");
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "REPOSITORY_ERROR",
                repo_err.to_string(),
            )
        }
    }
}

// ドメインエラーを適切なHTTPステータスコードとエラーコードにマッピング
fn map_domain_error(domain_err: DomainError) -> ApiFailure {
    let (status, code) = match &domain_err {
        DomainError::InvalidLineCount { .. } => (StatusCode::BAD_REQUEST, "INVALID_LINE_COUNT"),
        DomainError::InvalidQuantity { .. } => (StatusCode::BAD_REQUEST, "INVALID_QUANTITY"),
        DomainError::InvalidValue(_) => (StatusCode::BAD_REQUEST, "INVALID_VALUE"),
        DomainError::ProductNotFound(_) => (StatusCode::NOT_FOUND, "PRODUCT_NOT_FOUND"),
        DomainError::ProductInactive(_) => {
            (StatusCode::UNPROCESSABLE_ENTITY, "PRODUCT_INACTIVE")
        }
        DomainError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
        DomainError::OrderNotFound(_) => (StatusCode::NOT_FOUND, "ORDER_NOT_FOUND"),
        DomainError::InvalidTransition { .. } => (StatusCode::CONFLICT, "INVALID_TRANSITION"),
        DomainError::NegativeAmount(_) => (StatusCode::UNPROCESSABLE_ENTITY, "NEGATIVE_AMOUNT"),
        DomainError::AmountOverflow => (StatusCode::UNPROCESSABLE_ENTITY, "AMOUNT_OVERFLOW"),
    };
    api_error(status, code, domain_err.to_string())
}
