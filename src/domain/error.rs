use crate::domain::model::{OrderId, OrderStatus, ProductId};
use rust_decimal::Decimal;

/// ドメイン層のエラー型
/// ビジネスルール違反を表現する
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// 注文明細の数が範囲外（1〜5件）
    #[error("Invalid line count: {count} (must be between {min} and {max})")]
    InvalidLineCount { count: usize, min: usize, max: usize },
    /// 無効な数量（0以下）
    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity { quantity: i64 },
    /// 商品が存在しない
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),
    /// 商品が販売停止中
    #[error("Product is inactive: {0}")]
    ProductInactive(ProductId),
    /// 許可されていない状態遷移（例: キャンセル済みの注文を再度キャンセル）
    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    /// 注文の所有者以外による操作
    #[error("Forbidden: order {0} is owned by another user")]
    Forbidden(OrderId),
    /// 注文が存在しない、または閲覧権限がない
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),
    /// 負の金額
    #[error("Negative amount: {0}")]
    NegativeAmount(Decimal),
    /// 金額計算のオーバーフロー
    #[error("Amount overflow")]
    AmountOverflow,
    /// 無効な値
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_are_stable() {
        let err = DomainError::InvalidLineCount {
            count: 6,
            min: 1,
            max: 5,
        };
        assert_eq!(
            err.to_string(),
            "Invalid line count: 6 (must be between 1 and 5)"
        );

        let err = DomainError::InvalidTransition {
            from: OrderStatus::Cancelled,
            to: OrderStatus::Cancelled,
        };
        assert_eq!(err.to_string(), "Invalid transition: cancelled -> cancelled");
    }
}
