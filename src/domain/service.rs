// ドメインサービス
// 商品カタログと注文集約にまたがる明細の組み立てを実装

use std::collections::HashMap;

use crate::domain::error::DomainError;
use crate::domain::model::{Order, OrderLine, ProductId, ProductSnapshot};

/// 注文リクエストの1行
/// 数量は検証前の値をそのまま保持する
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestedLine {
    pub product_id: ProductId,
    pub quantity: i64,
}

impl RequestedLine {
    pub fn new(product_id: ProductId, quantity: i64) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

/// 注文明細組み立てサービス
/// 商品参照の前に行える検証と、参照結果からの価格確定を担当
pub struct OrderLineAssembler;

impl OrderLineAssembler {
    /// 商品参照の前に行う検証
    /// 明細数 → 各数量 の順にチェックし、最初の違反を返す
    pub fn validate(requested: &[RequestedLine]) -> Result<(), DomainError> {
        Order::ensure_line_count(requested.len())?;

        for line in requested {
            Self::checked_quantity(line.quantity)?;
        }

        Ok(())
    }

    /// 一括参照に渡す商品ID（重複を除き、リクエスト順を保つ）
    pub fn distinct_product_ids(requested: &[RequestedLine]) -> Vec<ProductId> {
        let mut ids: Vec<ProductId> = Vec::with_capacity(requested.len());
        for line in requested {
            if !ids.contains(&line.product_id) {
                ids.push(line.product_id);
            }
        }
        ids
    }

    /// 参照結果から注文明細を組み立てる
    /// 同じ商品が複数回指定された場合も、それぞれ別の明細として扱う
    ///
    /// # Errors
    /// * `ProductNotFound` - 参照結果に存在しない商品
    /// * `ProductInactive` - 販売停止中の商品
    pub fn assemble(
        requested: &[RequestedLine],
        products: &HashMap<ProductId, ProductSnapshot>,
    ) -> Result<Vec<OrderLine>, DomainError> {
        Self::validate(requested)?;

        requested
            .iter()
            .map(|line| {
                let product = products
                    .get(&line.product_id)
                    .ok_or(DomainError::ProductNotFound(line.product_id))?;
                product.capture_line(Self::checked_quantity(line.quantity)?)
            })
            .collect()
    }

    /// 1以上かつ保存できる範囲（u32）の数量のみ受け付ける
    fn checked_quantity(quantity: i64) -> Result<u32, DomainError> {
        if quantity <= 0 {
            return Err(DomainError::InvalidQuantity { quantity });
        }
        u32::try_from(quantity).map_err(|_| DomainError::InvalidQuantity { quantity })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Money;
    use rust_decimal::Decimal;

    fn product(cents: i64, active: bool) -> ProductSnapshot {
        ProductSnapshot::new(
            ProductId::new(),
            "item".to_string(),
            Money::new(Decimal::new(cents, 2)).unwrap(),
            active,
        )
    }

    fn catalog(products: &[&ProductSnapshot]) -> HashMap<ProductId, ProductSnapshot> {
        products.iter().map(|p| (p.id(), (*p).clone())).collect()
    }

    #[test]
    fn test_validate_rejects_empty_request() {
        let result = OrderLineAssembler::validate(&[]);
        assert!(matches!(
            result,
            Err(DomainError::InvalidLineCount { count: 0, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_non_positive_quantity() {
        let requested = [
            RequestedLine::new(ProductId::new(), 1),
            RequestedLine::new(ProductId::new(), -2),
        ];
        let result = OrderLineAssembler::validate(&requested);
        assert_eq!(result, Err(DomainError::InvalidQuantity { quantity: -2 }));
    }

    #[test]
    fn test_validate_checks_line_count_before_quantity() {
        let requested: Vec<RequestedLine> = (0..6)
            .map(|_| RequestedLine::new(ProductId::new(), 0))
            .collect();
        let result = OrderLineAssembler::validate(&requested);
        assert!(matches!(
            result,
            Err(DomainError::InvalidLineCount { count: 6, .. })
        ));
    }

    #[test]
    fn test_quantity_above_u32_is_invalid() {
        let requested = [RequestedLine::new(ProductId::new(), i64::from(u32::MAX) + 1)];
        assert!(matches!(
            OrderLineAssembler::validate(&requested),
            Err(DomainError::InvalidQuantity { .. })
        ));
    }

    #[test]
    fn test_distinct_product_ids_keeps_request_order() {
        let a = ProductId::new();
        let b = ProductId::new();
        let requested = [
            RequestedLine::new(b, 1),
            RequestedLine::new(a, 1),
            RequestedLine::new(b, 3),
        ];
        assert_eq!(OrderLineAssembler::distinct_product_ids(&requested), vec![b, a]);
    }

    #[test]
    fn test_assemble_captures_prices() {
        let p1 = product(1000, true);
        let p2 = product(550, true);
        let requested = [
            RequestedLine::new(p1.id(), 2),
            RequestedLine::new(p2.id(), 1),
        ];

        let lines = OrderLineAssembler::assemble(&requested, &catalog(&[&p1, &p2])).unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].unit_price(), p1.price());
        assert_eq!(lines[1].unit_price(), p2.price());
    }

    #[test]
    fn test_assemble_keeps_duplicate_products_as_separate_lines() {
        let p1 = product(1000, true);
        let requested = [
            RequestedLine::new(p1.id(), 1),
            RequestedLine::new(p1.id(), 1),
        ];

        let lines = OrderLineAssembler::assemble(&requested, &catalog(&[&p1])).unwrap();

        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|line| line.quantity() == 1));
    }

    #[test]
    fn test_assemble_unknown_product_fails() {
        let p1 = product(1000, true);
        let missing = ProductId::new();
        let requested = [
            RequestedLine::new(p1.id(), 1),
            RequestedLine::new(missing, 1),
        ];

        let result = OrderLineAssembler::assemble(&requested, &catalog(&[&p1]));
        assert_eq!(result, Err(DomainError::ProductNotFound(missing)));
    }

    #[test]
    fn test_assemble_inactive_product_fails() {
        let p1 = product(1000, false);
        let requested = [RequestedLine::new(p1.id(), 1)];

        let result = OrderLineAssembler::assemble(&requested, &catalog(&[&p1]));
        assert_eq!(result, Err(DomainError::ProductInactive(p1.id())));
    }
}
