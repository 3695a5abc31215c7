use crate::domain::error::DomainError;
use crate::domain::model::{Money, OrderLine, ProductId};

/// 商品スナップショット
/// 商品カタログが所有するデータを、注文作成時点で読み取った不変の写し
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSnapshot {
    id: ProductId,
    name: String,
    price: Money,
    active: bool,
}

impl ProductSnapshot {
    pub fn new(id: ProductId, name: String, price: Money, active: bool) -> Self {
        Self {
            id,
            name,
            price,
            active,
        }
    }

    pub fn id(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 現在の単価を取得
    pub fn price(&self) -> Money {
        self.price
    }

    /// 販売中かどうか
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// この商品の名前と価格を確定した注文明細を作成
    /// 販売停止中の商品からは作成できない
    pub fn capture_line(&self, quantity: u32) -> Result<OrderLine, DomainError> {
        if !self.active {
            return Err(DomainError::ProductInactive(self.id));
        }
        OrderLine::new(self.id, self.name.clone(), quantity, self.price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_capture_line_copies_current_price() {
        let price = Money::new(Decimal::new(1000, 2)).unwrap();
        let product = ProductSnapshot::new(ProductId::new(), "Pen".to_string(), price, true);

        let line = product.capture_line(3).unwrap();

        assert_eq!(line.product_id(), product.id());
        assert_eq!(line.product_name(), "Pen");
        assert_eq!(line.unit_price(), price);
        assert_eq!(line.quantity(), 3);
    }

    #[test]
    fn test_capture_line_from_inactive_product_fails() {
        let price = Money::new(Decimal::new(1000, 2)).unwrap();
        let product = ProductSnapshot::new(ProductId::new(), "Pen".to_string(), price, false);

        let result = product.capture_line(1);
        assert_eq!(result, Err(DomainError::ProductInactive(product.id())));
    }
}
