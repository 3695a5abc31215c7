// 出力ポート
// ドメイン層が外部に依存する機能をトレイトとして定義
// アダプター層でこれらのトレイトを実装する

use crate::domain::model::{
    Order, OrderCode, OrderId, OrderStatus, ProductId, ProductSnapshot, UserId,
};
use async_trait::async_trait;
use std::collections::HashMap;

/// リポジトリエラー型
/// リポジトリ操作で発生するエラーを表現する
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[allow(clippy::enum_variant_names)]
pub enum RepositoryError {
    /// データベース接続に失敗
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    /// 操作に失敗
    #[error("Operation failed: {0}")]
    OperationFailed(String),
    /// データの取得に失敗
    #[error("Fetch failed: {0}")]
    FetchFailed(String),
}

/// 注文一覧の絞り込み条件
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFilter {
    pub code: Option<OrderCode>,
    pub status: Option<OrderStatus>,
}

impl OrderFilter {
    /// 条件に一致するか（インメモリ実装用）
    pub fn matches(&self, order: &Order) -> bool {
        self.code.as_ref().map_or(true, |code| order.code() == code)
            && self.status.map_or(true, |status| order.status() == status)
    }
}

/// ページング指定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    limit: u32,
}

impl Pagination {
    pub const DEFAULT_PAGE: u32 = 1;
    pub const DEFAULT_LIMIT: u32 = 20;
    pub const MAX_LIMIT: u32 = 100;

    /// ページ番号と件数から作成
    /// page は1以上、limit は1〜MAX_LIMITに丸める
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        let page = page.unwrap_or(Self::DEFAULT_PAGE).max(1);
        let limit = limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT);
        Self { page, limit }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// 読み飛ばす件数
    pub fn skip(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// ページング付きの注文一覧
#[derive(Debug, Clone, PartialEq)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub pagination: Pagination,
    /// 条件に一致する全件数
    pub total: u64,
}

impl OrderPage {
    /// 総ページ数
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.pagination.limit()))
    }
}

/// 商品参照トレイト
/// 商品カタログの読み取り専用ビュー
#[async_trait]
pub trait ProductLookup: Send + Sync {
    /// 複数の商品IDをまとめて検索する
    ///
    /// # Returns
    /// * `Ok(HashMap)` - 見つかった商品のみを含むマップ（存在しないIDはキーに含まれない）
    /// * `Err(RepositoryError)` - 検索失敗
    async fn get_by_ids(
        &self,
        ids: &[ProductId],
    ) -> Result<HashMap<ProductId, ProductSnapshot>, RepositoryError>;
}

/// 注文リポジトリトレイト
/// 注文集約の永続化を抽象化する
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// 注文と全明細を一つのトランザクションで保存する
    /// すべての行が保存されるか、何も保存されないかのどちらか
    ///
    /// # Arguments
    /// * `order` - 保存する注文
    async fn create_atomic(&self, order: &Order) -> Result<(), RepositoryError>;

    /// 注文IDで注文を検索する
    ///
    /// # Returns
    /// * `Ok(Some(Order))` - 注文が見つかった
    /// * `Ok(None)` - 注文が見つからなかった
    /// * `Err(RepositoryError)` - 検索失敗
    async fn find_by_id(&self, order_id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// 現在のステータスが `expected` の場合のみステータスを更新する
    ///
    /// # Returns
    /// * `Ok(true)` - 更新した
    /// * `Ok(false)` - 注文が存在しないか、ステータスが一致しなかった
    /// * `Err(RepositoryError)` - 更新失敗
    async fn update_status_conditional(
        &self,
        order_id: OrderId,
        expected: OrderStatus,
        new_status: OrderStatus,
    ) -> Result<bool, RepositoryError>;

    /// 指定ユーザーの注文を取得する
    /// 作成日時の降順で並べて返す
    async fn list(
        &self,
        user_id: UserId,
        filter: &OrderFilter,
        pagination: Pagination,
    ) -> Result<OrderPage, RepositoryError>;

    /// 新しい一意の注文IDを生成する
    fn next_identity(&self) -> OrderId;
}
