use chrono::{DateTime, Utc};

use crate::domain::error::DomainError;
use crate::domain::model::{Money, OrderCode, OrderId, OrderLine, OrderStatus, UserId};

/// Order集約
/// 注文とその明細を一つの単位として扱い、ビジネスルールを適用する
///
/// 明細は作成時に確定し、以後変更されない。そのため合計金額は
/// 作成（または再構築）時に明細から計算した値を保持する。
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    id: OrderId,
    code: OrderCode,
    user_id: UserId,
    order_lines: Vec<OrderLine>,
    status: OrderStatus,
    total_price: Money,
    created_at: DateTime<Utc>,
}

impl Order {
    /// 1注文あたりの最小明細数
    pub const MIN_LINES: usize = 1;
    /// 1注文あたりの最大明細数
    pub const MAX_LINES: usize = 5;

    /// 新しい注文を作成
    /// 初期ステータスはCreated
    ///
    /// 事前条件:
    /// - 明細数が1〜5件
    pub fn place(
        id: OrderId,
        code: OrderCode,
        user_id: UserId,
        order_lines: Vec<OrderLine>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        Self::ensure_line_count(order_lines.len())?;
        let total_price = Self::sum_subtotals(&order_lines)?;

        Ok(Self {
            id,
            code,
            user_id,
            order_lines,
            status: OrderStatus::Created,
            total_price,
            created_at,
        })
    }

    /// データベースから取得したデータで注文を再構築
    /// 合計金額は保存値ではなく明細から再計算する
    pub fn reconstruct(
        id: OrderId,
        code: OrderCode,
        user_id: UserId,
        order_lines: Vec<OrderLine>,
        status: OrderStatus,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        Self::ensure_line_count(order_lines.len())?;
        let total_price = Self::sum_subtotals(&order_lines)?;

        Ok(Self {
            id,
            code,
            user_id,
            order_lines,
            status,
            total_price,
            created_at,
        })
    }

    /// 明細数が許容範囲かを検証
    pub fn ensure_line_count(count: usize) -> Result<(), DomainError> {
        if !(Self::MIN_LINES..=Self::MAX_LINES).contains(&count) {
            return Err(DomainError::InvalidLineCount {
                count,
                min: Self::MIN_LINES,
                max: Self::MAX_LINES,
            });
        }
        Ok(())
    }

    fn sum_subtotals(order_lines: &[OrderLine]) -> Result<Money, DomainError> {
        order_lines
            .iter()
            .try_fold(Money::zero(), |acc, line| acc.add(&line.subtotal()?))
    }

    /// 注文IDを取得
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// 注文コードを取得
    pub fn code(&self) -> &OrderCode {
        &self.code
    }

    /// 注文者のユーザーIDを取得
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// 注文明細のリストを取得（登録順）
    pub fn order_lines(&self) -> &[OrderLine] {
        &self.order_lines
    }

    /// 注文ステータスを取得
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// 合計金額（明細小計の総和）
    pub fn total_price(&self) -> Money {
        self.total_price
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// 指定ユーザーが所有者かどうか
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }

    /// 注文をキャンセル
    /// 事前条件:
    /// - 要求者が注文の所有者
    /// - ステータスがCreated
    pub fn cancel(&mut self, requester: UserId) -> Result<(), DomainError> {
        if !self.is_owned_by(requester) {
            return Err(DomainError::Forbidden(self.id));
        }

        let next = OrderStatus::Cancelled;
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }

        self.status = next;
        Ok(())
    }
}
