//! インメモリのポート実装
//!
//! テストやローカルでの動作確認用。`tokio::sync::RwLock` で保護し、
//! 条件付き更新は一つの書き込みロック内で比較と書き込みを行う。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::model::{Money, Order, OrderId, OrderStatus, ProductId, ProductSnapshot, UserId};
use crate::domain::port::{
    OrderFilter, OrderPage, OrderRepository, Pagination, ProductLookup, RepositoryError,
};

/// インメモリ商品カタログ
#[derive(Default)]
pub struct InMemoryProductCatalog {
    products: RwLock<HashMap<ProductId, ProductSnapshot>>,
}

impl InMemoryProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 商品を登録（同じIDは上書き）
    pub async fn insert(&self, product: ProductSnapshot) {
        self.products.write().await.insert(product.id(), product);
    }

    /// 商品価格を変更
    pub async fn set_price(&self, id: ProductId, price: Money) -> Result<(), RepositoryError> {
        let mut products = self.products.write().await;
        let current = products
            .get(&id)
            .ok_or_else(|| RepositoryError::OperationFailed(format!("product {} not found", id)))?;
        let updated =
            ProductSnapshot::new(id, current.name().to_string(), price, current.is_active());
        products.insert(id, updated);
        Ok(())
    }

    /// 販売状態を変更
    pub async fn set_active(&self, id: ProductId, active: bool) -> Result<(), RepositoryError> {
        let mut products = self.products.write().await;
        let current = products
            .get(&id)
            .ok_or_else(|| RepositoryError::OperationFailed(format!("product {} not found", id)))?;
        let updated = ProductSnapshot::new(id, current.name().to_string(), current.price(), active);
        products.insert(id, updated);
        Ok(())
    }
}

#[async_trait]
impl ProductLookup for InMemoryProductCatalog {
    async fn get_by_ids(
        &self,
        ids: &[ProductId],
    ) -> Result<HashMap<ProductId, ProductSnapshot>, RepositoryError> {
        let products = self.products.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| products.get(id).map(|product| (*id, product.clone())))
            .collect())
    }
}

/// インメモリ注文リポジトリ
/// 挿入順を保持し、一覧は新しい順に返す
#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<Vec<Order>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 保存済みの注文数
    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create_atomic(&self, order: &Order) -> Result<(), RepositoryError> {
        let mut orders = self.orders.write().await;
        if orders
            .iter()
            .any(|stored| stored.id() == order.id() || stored.code() == order.code())
        {
            return Err(RepositoryError::OperationFailed(format!(
                "duplicate order id or code: {}",
                order.code()
            )));
        }
        orders.push(order.clone());
        Ok(())
    }

    async fn find_by_id(&self, order_id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let orders = self.orders.read().await;
        Ok(orders.iter().find(|order| order.id() == order_id).cloned())
    }

    async fn update_status_conditional(
        &self,
        order_id: OrderId,
        expected: OrderStatus,
        new_status: OrderStatus,
    ) -> Result<bool, RepositoryError> {
        let mut orders = self.orders.write().await;
        let Some(slot) = orders.iter_mut().find(|order| order.id() == order_id) else {
            return Ok(false);
        };
        if slot.status() != expected {
            return Ok(false);
        }

        *slot = Order::reconstruct(
            slot.id(),
            slot.code().clone(),
            slot.user_id(),
            slot.order_lines().to_vec(),
            new_status,
            slot.created_at(),
        )
        .map_err(|e| RepositoryError::OperationFailed(e.to_string()))?;
        Ok(true)
    }

    async fn list(
        &self,
        user_id: UserId,
        filter: &OrderFilter,
        pagination: Pagination,
    ) -> Result<OrderPage, RepositoryError> {
        let orders = self.orders.read().await;
        let mut matching: Vec<&Order> = orders
            .iter()
            .rev()
            .filter(|order| order.is_owned_by(user_id) && filter.matches(order))
            .collect();
        // 同時刻の注文は後から登録したものを先にする（stable sort）
        matching.sort_by(|a, b| b.created_at().cmp(&a.created_at()));

        let total = matching.len() as u64;
        let skip = usize::try_from(pagination.skip()).unwrap_or(usize::MAX);
        let page = matching
            .into_iter()
            .skip(skip)
            .take(pagination.limit() as usize)
            .cloned()
            .collect();

        Ok(OrderPage {
            orders: page,
            pagination,
            total,
        })
    }

    fn next_identity(&self) -> OrderId {
        OrderId::new()
    }
}
