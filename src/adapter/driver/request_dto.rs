use crate::domain::error::DomainError;
use crate::domain::model::{OrderCode, OrderStatus, ProductId};
use crate::domain::port::{OrderFilter, Pagination};
use crate::domain::service::RequestedLine;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 注文作成用のリクエストDTO
#[derive(Debug, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
    pub lines: Vec<PlaceOrderLineRequest>,
}

/// 注文明細のリクエストDTO
/// 数量の検証はドメイン側で行うため、負の値もそのまま受け取る
#[derive(Debug, Serialize, Deserialize)]
pub struct PlaceOrderLineRequest {
    pub product_id: Uuid,
    pub quantity: i64,
}

impl PlaceOrderRequest {
    /// リクエストの並び順どおりに明細へ変換
    pub fn into_requested_lines(self) -> Vec<RequestedLine> {
        self.lines
            .into_iter()
            .map(|line| RequestedLine::new(ProductId::from_uuid(line.product_id), line.quantity))
            .collect()
    }
}

/// 注文一覧取得用のクエリパラメータ
#[derive(Debug, Default, Deserialize)]
pub struct OrdersQueryParams {
    pub code: Option<String>,
    pub status: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl OrdersQueryParams {
    /// 絞り込み条件に変換（空文字は未指定扱い）
    pub fn filter(&self) -> Result<OrderFilter, DomainError> {
        let code = non_empty(&self.code).map(OrderCode::from_string).transpose()?;
        let status = non_empty(&self.status)
            .map(OrderStatus::from_string)
            .transpose()?;
        Ok(OrderFilter { code, status })
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
