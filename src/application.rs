// アプリケーション層
// ユースケース（注文作成・キャンセル・照会）を組み立てる

pub mod error;
pub mod service;

pub use error::ApplicationError;
