use crate::application::ApplicationError;
use crate::domain::error::DomainError;
use crate::domain::model::{Order, OrderId, UserId};
use crate::domain::port::{OrderFilter, OrderPage, OrderRepository, Pagination};
use std::sync::Arc;

/// 注文クエリサービス
/// 読み取り専用の注文操作を提供する
/// 常に要求者自身の注文のみを返す
pub struct OrderQueryService {
    order_repository: Arc<dyn OrderRepository>,
}

impl OrderQueryService {
    /// 新しい注文クエリサービスを作成
    ///
    /// # Arguments
    /// * `order_repository` - 注文リポジトリ
    pub fn new(order_repository: Arc<dyn OrderRepository>) -> Self {
        Self { order_repository }
    }

    /// 注文IDで注文を取得
    ///
    /// 他人の注文は存在しない注文と同じく OrderNotFound になる
    ///
    /// # Returns
    /// * `Ok(Order)` - 明細を含む注文
    /// * `Err(ApplicationError)` - 見つからない、または取得失敗
    #[tracing::instrument(
        name = "get_order",
        skip(self),
        fields(requester = %requester, order_id = %order_id)
    )]
    pub async fn get_order(
        &self,
        requester: UserId,
        order_id: OrderId,
    ) -> Result<Order, ApplicationError> {
        let order = self
            .order_repository
            .find_by_id(order_id)
            .await?
            .filter(|order| order.is_owned_by(requester))
            .ok_or(DomainError::OrderNotFound(order_id))?;
        Ok(order)
    }

    /// 要求者の注文一覧を取得
    /// 作成日時の降順で並べて返す
    ///
    /// # Arguments
    /// * `requester` - 要求者
    /// * `filter` - 注文コード・ステータスによる絞り込み
    /// * `pagination` - ページング指定
    #[tracing::instrument(name = "list_orders", skip(self, filter), fields(requester = %requester))]
    pub async fn list_orders(
        &self,
        requester: UserId,
        filter: OrderFilter,
        pagination: Pagination,
    ) -> Result<OrderPage, ApplicationError> {
        let page = self
            .order_repository
            .list(requester, &filter, pagination)
            .await?;
        tracing::debug!(returned = page.orders.len(), total = page.total, "orders listed");
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::driven::InMemoryOrderRepository;
    use crate::domain::model::{Money, OrderCode, OrderLine, OrderStatus, ProductId};
    use crate::domain::port::RepositoryError;
    use async_trait::async_trait;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn order_for(user_id: UserId) -> Order {
        let now = Utc::now();
        let line = OrderLine::new(
            ProductId::new(),
            "Pen".to_string(),
            1,
            Money::new(Decimal::new(1000, 2)).unwrap(),
        )
        .unwrap();
        Order::place(OrderId::new(), OrderCode::generate(now), user_id, vec![line], now).unwrap()
    }

    #[tokio::test]
    async fn test_get_own_order() {
        let repository = Arc::new(InMemoryOrderRepository::new());
        let service = OrderQueryService::new(repository.clone());

        let user_id = UserId::new();
        let order = order_for(user_id);
        repository.create_atomic(&order).await.unwrap();

        let found = service.get_order(user_id, order.id()).await.unwrap();
        assert_eq!(found.id(), order.id());
        assert_eq!(found.order_lines().len(), 1);
    }

    #[tokio::test]
    async fn test_get_other_users_order_is_not_found() {
        let repository = Arc::new(InMemoryOrderRepository::new());
        let service = OrderQueryService::new(repository.clone());

        let order = order_for(UserId::new());
        repository.create_atomic(&order).await.unwrap();

        let result = service.get_order(UserId::new(), order.id()).await;
        assert!(matches!(
            result,
            Err(ApplicationError::DomainError(DomainError::OrderNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_list_orders_only_returns_own_orders() {
        let repository = Arc::new(InMemoryOrderRepository::new());
        let service = OrderQueryService::new(repository.clone());

        let user_id = UserId::new();
        repository.create_atomic(&order_for(user_id)).await.unwrap();
        repository.create_atomic(&order_for(user_id)).await.unwrap();
        repository.create_atomic(&order_for(UserId::new())).await.unwrap();

        let page = service
            .list_orders(user_id, OrderFilter::default(), Pagination::default())
            .await
            .unwrap();

        assert_eq!(page.total, 2);
        assert!(page.orders.iter().all(|o| o.user_id() == user_id));
    }

    #[tokio::test]
    async fn test_list_orders_by_status() {
        let repository = Arc::new(InMemoryOrderRepository::new());
        let service = OrderQueryService::new(repository.clone());

        let user_id = UserId::new();
        let cancelled = order_for(user_id);
        repository.create_atomic(&cancelled).await.unwrap();
        repository.create_atomic(&order_for(user_id)).await.unwrap();
        repository
            .update_status_conditional(cancelled.id(), OrderStatus::Created, OrderStatus::Cancelled)
            .await
            .unwrap();

        let filter = OrderFilter {
            status: Some(OrderStatus::Cancelled),
            ..OrderFilter::default()
        };
        let page = service
            .list_orders(user_id, filter, Pagination::default())
            .await
            .unwrap();

        assert_eq!(page.orders.len(), 1);
        assert_eq!(page.orders[0].id(), cancelled.id());
    }

    struct BrokenRepository;

    #[async_trait]
    impl OrderRepository for BrokenRepository {
        async fn create_atomic(&self, _order: &Order) -> Result<(), RepositoryError> {
            Err(RepositoryError::ConnectionFailed("down".to_string()))
        }

        async fn find_by_id(&self, _order_id: OrderId) -> Result<Option<Order>, RepositoryError> {
            Err(RepositoryError::ConnectionFailed("down".to_string()))
        }

        async fn update_status_conditional(
            &self,
            _order_id: OrderId,
            _expected: OrderStatus,
            _new_status: OrderStatus,
        ) -> Result<bool, RepositoryError> {
            Err(RepositoryError::ConnectionFailed("down".to_string()))
        }

        async fn list(
            &self,
            _user_id: UserId,
            _filter: &OrderFilter,
            _pagination: Pagination,
        ) -> Result<OrderPage, RepositoryError> {
            Err(RepositoryError::ConnectionFailed("down".to_string()))
        }

        fn next_identity(&self) -> OrderId {
            OrderId::new()
        }
    }

    #[tokio::test]
    async fn test_repository_failure_is_propagated() {
        let service = OrderQueryService::new(Arc::new(BrokenRepository));

        let result = service
            .list_orders(UserId::new(), OrderFilter::default(), Pagination::default())
            .await;
        assert!(matches!(
            result,
            Err(ApplicationError::RepositoryError(RepositoryError::ConnectionFailed(_)))
        ));
    }
}
