use crate::adapter::database_error::DatabaseError;
use crate::domain::model::{
    Money, Order, OrderCode, OrderId, OrderLine, OrderStatus, ProductId, UserId,
};
use crate::domain::port::{OrderFilter, OrderPage, OrderRepository, Pagination, RepositoryError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, Pool, QueryBuilder, Row};
use std::collections::HashMap;

/// ordersテーブルの1行
struct OrderHeader {
    id: OrderId,
    code: OrderCode,
    user_id: UserId,
    status: OrderStatus,
    created_at: DateTime<Utc>,
}

fn decode_error(context: &str) -> impl FnOnce(sqlx::Error) -> RepositoryError + '_ {
    move |e| DatabaseError::DecodeError(format!("{}: {}", context, e)).into()
}

fn parse_error<E: std::fmt::Display>(
    context: &str,
) -> impl FnOnce(E) -> RepositoryError + '_ {
    move |e| RepositoryError::FetchFailed(format!("{}の構築に失敗しました: {}", context, e))
}

fn query_error(context: &str) -> impl FnOnce(sqlx::Error) -> RepositoryError + '_ {
    move |e| DatabaseError::QueryError(format!("{}: {}", context, e)).into()
}

impl OrderHeader {
    fn from_row(row: &MySqlRow) -> Result<Self, RepositoryError> {
        let id: String = row.try_get("id").map_err(decode_error("注文ID"))?;
        let code: String = row.try_get("code").map_err(decode_error("注文コード"))?;
        let user_id: String = row.try_get("user_id").map_err(decode_error("ユーザーID"))?;
        let status: String = row.try_get("status").map_err(decode_error("注文ステータス"))?;
        let created_at: DateTime<Utc> = row
            .try_get("created_at")
            .map_err(decode_error("作成日時"))?;

        Ok(Self {
            id: OrderId::from_string(&id).map_err(parse_error("注文ID"))?,
            code: OrderCode::from_string(&code).map_err(parse_error("注文コード"))?,
            user_id: UserId::from_string(&user_id).map_err(parse_error("ユーザーID"))?,
            status: OrderStatus::from_string(&status).map_err(parse_error("注文ステータス"))?,
            created_at,
        })
    }
}

/// order_linesテーブルの1行を注文IDと明細に変換
fn order_line_from_row(row: &MySqlRow) -> Result<(String, OrderLine), RepositoryError> {
    let order_id: String = row.try_get("order_id").map_err(decode_error("注文ID"))?;
    let product_id: String = row.try_get("product_id").map_err(decode_error("商品ID"))?;
    let product_name: String = row
        .try_get("product_name")
        .map_err(decode_error("商品名"))?;
    let quantity: u32 = row.try_get("quantity").map_err(decode_error("数量"))?;
    let price: Decimal = row.try_get("price").map_err(decode_error("単価"))?;

    let product_id = ProductId::from_string(&product_id).map_err(parse_error("商品ID"))?;
    let unit_price = Money::new(price).map_err(parse_error("金額"))?;
    let order_line = OrderLine::new(product_id, product_name, quantity, unit_price)
        .map_err(parse_error("注文明細"))?;

    Ok((order_id, order_line))
}

/// MySQL注文リポジトリ
/// MySQLデータベースを使用して注文を永続化する
pub struct MySqlOrderRepository {
    pool: Pool<MySql>,
}

impl MySqlOrderRepository {
    /// 新しいMySQL注文リポジトリを作成
    ///
    /// # Arguments
    /// * `pool` - MySQLコネクションプール
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    /// 注文ヘッダーに明細を読み込んで注文集約を再構築する
    /// ヘッダーの並び順を保つ
    async fn load_orders(
        &self,
        headers: Vec<OrderHeader>,
    ) -> Result<Vec<Order>, RepositoryError> {
        if headers.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = QueryBuilder::<MySql>::new(
            "SELECT order_id, line_no, product_id, product_name, quantity, price \
             FROM order_lines WHERE order_id IN (",
        );
        let mut separated = query.separated(", ");
        for header in &headers {
            separated.push_bind(header.id.to_string());
        }
        separated.push_unseparated(") ORDER BY order_id, line_no");

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(query_error("注文明細の取得に失敗しました"))?;

        // 注文IDごとにグループ化（line_no順）
        let mut lines_by_order: HashMap<String, Vec<OrderLine>> = HashMap::new();
        for row in &rows {
            let (order_id, order_line) = order_line_from_row(row)?;
            lines_by_order.entry(order_id).or_default().push(order_line);
        }

        headers
            .into_iter()
            .map(|header| {
                let order_lines = lines_by_order
                    .remove(&header.id.to_string())
                    .unwrap_or_default();
                Order::reconstruct(
                    header.id,
                    header.code,
                    header.user_id,
                    order_lines,
                    header.status,
                    header.created_at,
                )
                .map_err(parse_error("注文集約"))
            })
            .collect()
    }

    /// 所有者と絞り込み条件のWHERE句を追加
    fn push_conditions(
        query: &mut QueryBuilder<'_, MySql>,
        user_id: UserId,
        filter: &OrderFilter,
    ) {
        query.push(" WHERE user_id = ").push_bind(user_id.to_string());
        if let Some(code) = &filter.code {
            query.push(" AND code = ").push_bind(code.as_str().to_string());
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status.to_string());
        }
    }
}

#[async_trait]
impl OrderRepository for MySqlOrderRepository {
    async fn create_atomic(&self, order: &Order) -> Result<(), RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DatabaseError::ConnectionError(format!("トランザクション開始: {}", e)))
            .map_err(RepositoryError::from)?;

        let order_id = order.id().to_string();

        sqlx::query(
            r#"
            INSERT INTO orders (id, code, user_id, status, total_price, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&order_id)
        .bind(order.code().as_str())
        .bind(order.user_id().to_string())
        .bind(order.status().to_string())
        .bind(order.total_price().amount())
        .bind(order.created_at())
        .execute(&mut *tx)
        .await
        .map_err(query_error("注文の保存に失敗しました"))?;

        // 注文明細を登録順の行番号付きで一括INSERT
        let mut lines = QueryBuilder::<MySql>::new(
            "INSERT INTO order_lines \
             (order_id, line_no, product_id, product_name, quantity, price) ",
        );
        lines.push_values(
            order.order_lines().iter().zip(1u32..),
            |mut row, (order_line, line_no)| {
                row.push_bind(order_id.clone())
                    .push_bind(line_no)
                    .push_bind(order_line.product_id().to_string())
                    .push_bind(order_line.product_name().to_string())
                    .push_bind(order_line.quantity())
                    .push_bind(order_line.unit_price().amount());
            },
        );
        lines
            .build()
            .execute(&mut *tx)
            .await
            .map_err(query_error("注文明細の保存に失敗しました"))?;

        // エラー時はtxのDropでロールバックされる
        tx.commit()
            .await
            .map_err(query_error("トランザクションのコミットに失敗しました"))?;

        Ok(())
    }

    async fn find_by_id(&self, order_id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, code, user_id, status, created_at
            FROM orders
            WHERE id = ?
            "#,
        )
        .bind(order_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(query_error("注文の取得に失敗しました"))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let header = OrderHeader::from_row(&row)?;
        Ok(self.load_orders(vec![header]).await?.into_iter().next())
    }

    async fn update_status_conditional(
        &self,
        order_id: OrderId,
        expected: OrderStatus,
        new_status: OrderStatus,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE orders SET status = ? WHERE id = ? AND status = ?")
            .bind(new_status.to_string())
            .bind(order_id.to_string())
            .bind(expected.to_string())
            .execute(&self.pool)
            .await
            .map_err(query_error("注文ステータスの更新に失敗しました"))?;

        Ok(result.rows_affected() == 1)
    }

    async fn list(
        &self,
        user_id: UserId,
        filter: &OrderFilter,
        pagination: Pagination,
    ) -> Result<OrderPage, RepositoryError> {
        let mut count = QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM orders");
        Self::push_conditions(&mut count, user_id, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(query_error("注文件数の取得に失敗しました"))?;

        let mut query =
            QueryBuilder::<MySql>::new("SELECT id, code, user_id, status, created_at FROM orders");
        Self::push_conditions(&mut query, user_id, filter);
        query
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.skip());

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(query_error("注文一覧の取得に失敗しました"))?;

        let headers = rows
            .iter()
            .map(OrderHeader::from_row)
            .collect::<Result<Vec<_>, _>>()?;
        let orders = self.load_orders(headers).await?;

        Ok(OrderPage {
            orders,
            pagination,
            total: u64::try_from(total).unwrap_or(0),
        })
    }

    fn next_identity(&self) -> OrderId {
        OrderId::new()
    }
}
