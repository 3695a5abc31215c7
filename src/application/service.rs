use crate::application::ApplicationError;
use crate::domain::error::DomainError;
use crate::domain::model::{Order, OrderCode, OrderId, OrderStatus, UserId};
use crate::domain::port::{OrderRepository, ProductLookup};
use crate::domain::service::{OrderLineAssembler, RequestedLine};
use chrono::Utc;
use std::sync::Arc;

mod order_query_service;

pub use order_query_service::OrderQueryService;

/// 注文アプリケーションサービス
/// 注文の作成（価格の確定と一括保存）とキャンセルを担当する
pub struct OrderApplicationService {
    order_repository: Arc<dyn OrderRepository>,
    product_lookup: Arc<dyn ProductLookup>,
}

impl OrderApplicationService {
    /// 新しいアプリケーションサービスを作成
    ///
    /// # Arguments
    /// * `order_repository` - 注文リポジトリ
    /// * `product_lookup` - 商品参照
    pub fn new(
        order_repository: Arc<dyn OrderRepository>,
        product_lookup: Arc<dyn ProductLookup>,
    ) -> Self {
        Self {
            order_repository,
            product_lookup,
        }
    }

    /// 新しい注文を作成
    ///
    /// 1. 明細数と数量を検証（商品参照の前）
    /// 2. 商品を一括参照し、存在・販売状態を確認して単価を確定
    /// 3. 注文集約を組み立て、明細ごと一つのトランザクションで保存
    ///
    /// # Arguments
    /// * `user_id` - 注文者（認証レイヤーで確認済み）
    /// * `requested` - 注文する商品と数量
    ///
    /// # Returns
    /// * `Ok(Order)` - 作成された注文（ステータスはCreated）
    /// * `Err(ApplicationError)` - 作成失敗。何も保存されない
    #[tracing::instrument(
        name = "place_order",
        skip(self, requested),
        fields(user_id = %user_id, lines = requested.len())
    )]
    pub async fn place_order(
        &self,
        user_id: UserId,
        requested: Vec<RequestedLine>,
    ) -> Result<Order, ApplicationError> {
        OrderLineAssembler::validate(&requested)?;

        let product_ids = OrderLineAssembler::distinct_product_ids(&requested);
        let products = self.product_lookup.get_by_ids(&product_ids).await?;
        tracing::debug!(
            requested = product_ids.len(),
            found = products.len(),
            "products resolved"
        );

        let order_lines = OrderLineAssembler::assemble(&requested, &products).map_err(|err| {
            tracing::warn!(error = %err, "order rejected");
            err
        })?;

        let created_at = Utc::now();
        let order = Order::place(
            self.order_repository.next_identity(),
            OrderCode::generate(created_at),
            user_id,
            order_lines,
            created_at,
        )?;

        self.order_repository.create_atomic(&order).await?;

        tracing::info!(
            order_id = %order.id(),
            code = %order.code(),
            total_price = %order.total_price(),
            "order placed"
        );
        Ok(order)
    }

    /// 注文をキャンセル
    ///
    /// ステータスの更新は読み取り時のステータスを条件に行うため、
    /// 同じ注文への同時キャンセルは一方のみが成功する
    ///
    /// # Arguments
    /// * `requester` - 要求者
    /// * `order_id` - 注文ID
    ///
    /// # Returns
    /// * `Ok(Order)` - キャンセル後の注文
    /// * `Err(ApplicationError)` - OrderNotFound / Forbidden / InvalidTransition など
    #[tracing::instrument(
        name = "cancel_order",
        skip(self),
        fields(requester = %requester, order_id = %order_id)
    )]
    pub async fn cancel_order(
        &self,
        requester: UserId,
        order_id: OrderId,
    ) -> Result<Order, ApplicationError> {
        let mut order = self
            .order_repository
            .find_by_id(order_id)
            .await?
            .ok_or(DomainError::OrderNotFound(order_id))?;

        let previous = order.status();
        order.cancel(requester).map_err(|err| {
            tracing::warn!(error = %err, "cancel rejected");
            err
        })?;

        let updated = self
            .order_repository
            .update_status_conditional(order_id, previous, order.status())
            .await?;

        if !updated {
            // 読み取り後に別のリクエストがキャンセルを完了させた
            tracing::warn!("order status changed concurrently");
            return Err(DomainError::InvalidTransition {
                from: OrderStatus::Cancelled,
                to: OrderStatus::Cancelled,
            }
            .into());
        }

        tracing::info!("order cancelled");
        Ok(order)
    }
}
