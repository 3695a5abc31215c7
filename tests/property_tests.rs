use proptest::prelude::*;
use rust_decimal::Decimal;
use shop_order_management::adapter::driven::{InMemoryOrderRepository, InMemoryProductCatalog};
use shop_order_management::application::service::OrderApplicationService;
use shop_order_management::application::ApplicationError;
use shop_order_management::domain::error::DomainError;
use shop_order_management::domain::model::{
    Money, Order, OrderCode, OrderId, OrderLine, ProductId, ProductSnapshot, UserId,
};
use shop_order_management::domain::service::RequestedLine;
use chrono::Utc;
use std::sync::Arc;

fn money(cents: i64) -> Money {
    Money::new(Decimal::new(cents, 2)).unwrap()
}

fn place(lines: Vec<OrderLine>) -> Result<Order, DomainError> {
    let now = Utc::now();
    Order::place(OrderId::new(), OrderCode::generate(now), UserId::new(), lines, now)
}

/// 価格（セント）と数量の組
fn priced_line() -> impl Strategy<Value = (i64, u32)> {
    (0i64..1_000_000, 1u32..1_000)
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

// Money のプロパティベーステスト
proptest! {
    /// Money の加算は交換法則を満たす (a + b = b + a)
    #[test]
    fn test_money_addition_is_commutative(
        amount1 in 0i64..1_000_000_000,
        amount2 in 0i64..1_000_000_000,
    ) {
        let result1 = money(amount1).add(&money(amount2)).unwrap();
        let result2 = money(amount2).add(&money(amount1)).unwrap();

        prop_assert_eq!(result1, result2);
    }

    /// Money の乗算は分配法則を満たす (a * (b + c) = a * b + a * c)
    #[test]
    fn test_money_multiplication_distributive(
        cents in 0i64..1_000_000,
        factor1 in 1u32..1_000,
        factor2 in 1u32..1_000,
    ) {
        let price = money(cents);

        let left_side = price.multiply(factor1 + factor2).unwrap();
        let right_side = price
            .multiply(factor1)
            .unwrap()
            .add(&price.multiply(factor2).unwrap())
            .unwrap();

        prop_assert_eq!(left_side, right_side);
    }

    /// 負の金額は作成できない
    #[test]
    fn test_money_rejects_negative(cents in i64::MIN / 2..0) {
        let result = Money::new(Decimal::new(cents, 2));
        prop_assert!(matches!(result, Err(DomainError::NegativeAmount(_))));
    }
}

// 注文のプロパティベーステスト
proptest! {
    /// 合計金額は常に (単価 × 数量) の厳密な総和と等しい
    #[test]
    fn test_order_total_is_exact_sum_of_lines(
        lines in prop::collection::vec(priced_line(), 1..=5),
    ) {
        let expected: Decimal = lines
            .iter()
            .map(|(cents, quantity)| Decimal::new(*cents, 2) * Decimal::from(*quantity))
            .sum();
        let order_lines = lines
            .iter()
            .map(|(cents, quantity)| {
                OrderLine::new(ProductId::new(), "P".to_string(), *quantity, money(*cents)).unwrap()
            })
            .collect();

        let order = place(order_lines).unwrap();

        prop_assert_eq!(order.total_price().amount(), expected);
        prop_assert_eq!(order.order_lines().len(), lines.len());
    }

    /// 明細数が範囲外の注文は常に InvalidLineCount
    #[test]
    fn test_order_rejects_out_of_range_line_count(
        count in prop_oneof![Just(0usize), 6usize..20],
    ) {
        let order_lines = (0..count)
            .map(|_| OrderLine::new(ProductId::new(), "P".to_string(), 1, money(100)).unwrap())
            .collect();

        let result = place(order_lines);

        prop_assert!(
            matches!(result, Err(DomainError::InvalidLineCount { count: c, .. }) if c == count),
            "unexpected result: {:?}",
            result
        );
    }

    /// 同じ商品を複数回指定しても、明細はまとめられずリクエスト順に残る
    #[test]
    fn test_duplicate_products_stay_separate_lines(
        quantities in prop::collection::vec(1i64..50, 1..=5),
    ) {
        let rt = runtime();
        let catalog = Arc::new(InMemoryProductCatalog::new());
        let repository = Arc::new(InMemoryOrderRepository::new());
        let service = OrderApplicationService::new(repository.clone(), catalog.clone());
        let product = ProductSnapshot::new(ProductId::new(), "P1".to_string(), money(1000), true);

        let order = rt.block_on(async {
            catalog.insert(product.clone()).await;
            let requested = quantities
                .iter()
                .map(|quantity| RequestedLine::new(product.id(), *quantity))
                .collect();
            service.place_order(UserId::new(), requested).await
        }).unwrap();

        let stored: Vec<i64> = order
            .order_lines()
            .iter()
            .map(|line| i64::from(line.quantity()))
            .collect();
        prop_assert_eq!(stored, quantities.clone());
        let total_quantity: i64 = quantities.iter().sum();
        prop_assert_eq!(order.total_price().amount(), Decimal::new(1000 * total_quantity, 2));
    }

    /// 存在しない商品を含む注文は ProductNotFound で失敗し、何も保存されない
    #[test]
    fn test_unknown_product_never_persists(
        known_count in 0usize..4,
        quantity in 1i64..10,
    ) {
        let rt = runtime();
        let catalog = Arc::new(InMemoryProductCatalog::new());
        let repository = Arc::new(InMemoryOrderRepository::new());
        let service = OrderApplicationService::new(repository.clone(), catalog.clone());
        let missing = ProductId::new();

        let (result, is_empty) = rt.block_on(async {
            let mut requested = Vec::new();
            for _ in 0..known_count {
                let product =
                    ProductSnapshot::new(ProductId::new(), "P".to_string(), money(500), true);
                catalog.insert(product.clone()).await;
                requested.push(RequestedLine::new(product.id(), quantity));
            }
            requested.push(RequestedLine::new(missing, quantity));
            let result = service.place_order(UserId::new(), requested).await;
            (result, repository.is_empty().await)
        });

        prop_assert!(matches!(
            result,
            Err(ApplicationError::DomainError(DomainError::ProductNotFound(id))) if id == missing
        ));
        prop_assert!(is_empty);
    }

    /// 0以下の数量は商品を参照する前に InvalidQuantity で失敗する
    #[test]
    fn test_non_positive_quantity_is_rejected(quantity in -1_000i64..=0) {
        let rt = runtime();
        let catalog = Arc::new(InMemoryProductCatalog::new());
        let repository = Arc::new(InMemoryOrderRepository::new());
        let service = OrderApplicationService::new(repository.clone(), catalog);

        let requested = vec![RequestedLine::new(ProductId::new(), quantity)];
        let result = rt.block_on(service.place_order(UserId::new(), requested));

        let is_invalid_quantity = matches!(
            result,
            Err(ApplicationError::DomainError(DomainError::InvalidQuantity { quantity: q }))
                if q == quantity
        );
        prop_assert!(is_invalid_quantity);
    }
}
