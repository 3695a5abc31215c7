// 駆動される側アダプター（リポジトリ実装など）

mod in_memory;
mod order_repository;
mod product_lookup;

pub use in_memory::{InMemoryOrderRepository, InMemoryProductCatalog};
pub use order_repository::MySqlOrderRepository;
pub use product_lookup::MySqlProductLookup;
