// ドメインモデル（エンティティと値オブジェクト）

mod order;
mod product;
mod value_objects;

pub use order::Order;
pub use product::ProductSnapshot;
pub use value_objects::{Money, OrderCode, OrderId, OrderLine, OrderStatus, ProductId, UserId};
