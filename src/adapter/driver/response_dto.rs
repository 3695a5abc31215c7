use crate::domain::error::DomainError;
use crate::domain::model::{Order, OrderLine};
use crate::domain::port::OrderPage;
use serde::{Deserialize, Serialize};

/// 注文用のレスポンスDTO
/// 金額は精度を落とさないよう文字列で返す（例: "25.50"）
#[derive(Debug, Serialize, Deserialize)]
pub struct OrderResponse {
    pub id: String,
    pub code: String,
    pub user_id: String,
    pub status: String,
    pub lines: Vec<OrderLineResponse>,
    pub total_price: String,
    pub created_at: String,
}

/// 注文明細用のレスポンスDTO
#[derive(Debug, Serialize, Deserialize)]
pub struct OrderLineResponse {
    pub product: LineProductResponse,
    pub quantity: u32,
    pub price: String,
    pub subtotal: String,
}

/// 明細に埋め込む商品情報（注文時点の名前）
#[derive(Debug, Serialize, Deserialize)]
pub struct LineProductResponse {
    pub id: String,
    pub name: String,
}

/// ページング情報
#[derive(Debug, Serialize, Deserialize)]
pub struct PaginationResponse {
    pub current_page: u32,
    pub limit: u32,
    pub skip: u64,
    pub total: u64,
    pub total_page: u64,
}

/// 注文一覧用のレスポンスDTO
#[derive(Debug, Serialize, Deserialize)]
pub struct OrderListResponse {
    pub orders: Vec<OrderResponse>,
    pub pagination: PaginationResponse,
}

impl OrderResponse {
    /// ドメインオブジェクトからOrderResponseを作成
    pub fn from_order(order: &Order) -> Result<Self, DomainError> {
        let lines = order
            .order_lines()
            .iter()
            .map(OrderLineResponse::from_order_line)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id: order.id().to_string(),
            code: order.code().to_string(),
            user_id: order.user_id().to_string(),
            status: order.status().to_string(),
            lines,
            total_price: order.total_price().to_string(),
            created_at: order.created_at().to_rfc3339(),
        })
    }
}

impl OrderLineResponse {
    /// ドメインオブジェクトからOrderLineResponseを作成
    pub fn from_order_line(order_line: &OrderLine) -> Result<Self, DomainError> {
        Ok(Self {
            product: LineProductResponse {
                id: order_line.product_id().to_string(),
                name: order_line.product_name().to_string(),
            },
            quantity: order_line.quantity(),
            price: order_line.unit_price().to_string(),
            subtotal: order_line.subtotal()?.to_string(),
        })
    }
}

impl OrderListResponse {
    pub fn from_page(page: &OrderPage) -> Result<Self, DomainError> {
        let orders = page
            .orders
            .iter()
            .map(OrderResponse::from_order)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            orders,
            pagination: PaginationResponse {
                current_page: page.pagination.page(),
                limit: page.pagination.limit(),
                skip: page.pagination.skip(),
                total: page.total,
                total_page: page.total_pages(),
            },
        })
    }
}
