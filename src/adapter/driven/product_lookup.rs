use crate::adapter::database_error::DatabaseError;
use crate::domain::model::{Money, ProductId, ProductSnapshot};
use crate::domain::port::{ProductLookup, RepositoryError};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{MySql, Pool, QueryBuilder, Row};
use std::collections::HashMap;

/// MySQL商品参照
/// productsテーブルから注文時点の価格と販売状態を取得する
pub struct MySqlProductLookup {
    pool: Pool<MySql>,
}

impl MySqlProductLookup {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductLookup for MySqlProductLookup {
    async fn get_by_ids(
        &self,
        ids: &[ProductId],
    ) -> Result<HashMap<ProductId, ProductSnapshot>, RepositoryError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        // 1回の問い合わせでまとめて取得
        let mut query = QueryBuilder::<MySql>::new(
            "SELECT id, name, price, active FROM products WHERE id IN (",
        );
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(id.to_string());
        }
        separated.push_unseparated(")");

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryError(format!("商品の取得に失敗しました: {}", e)))?;

        let mut products = HashMap::with_capacity(rows.len());
        for row in rows {
            let id: String = row
                .try_get("id")
                .map_err(|e| DatabaseError::DecodeError(format!("商品ID: {}", e)))?;
            let name: String = row
                .try_get("name")
                .map_err(|e| DatabaseError::DecodeError(format!("商品名: {}", e)))?;
            let price: Decimal = row
                .try_get("price")
                .map_err(|e| DatabaseError::DecodeError(format!("価格: {}", e)))?;
            let active: bool = row
                .try_get("active")
                .map_err(|e| DatabaseError::DecodeError(format!("販売状態: {}", e)))?;

            let id = ProductId::from_string(&id).map_err(|e| {
                RepositoryError::FetchFailed(format!("商品IDの解析に失敗しました: {}", e))
            })?;
            let price = Money::new(price).map_err(|e| {
                RepositoryError::FetchFailed(format!("価格の構築に失敗しました: {}", e))
            })?;

            products.insert(id, ProductSnapshot::new(id, name, price, active));
        }

        tracing::debug!(requested = ids.len(), found = products.len(), "products looked up");
        Ok(products)
    }
}
