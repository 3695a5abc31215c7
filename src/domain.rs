// ドメイン層
// 注文集約・値オブジェクト・出力ポートを定義する

pub mod error;
pub mod model;
pub mod port;
pub mod service;
