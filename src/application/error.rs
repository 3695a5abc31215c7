use crate::domain::error::DomainError;
use crate::domain::port::RepositoryError;

/// アプリケーション層のエラー型
/// ドメインエラーとリポジトリエラーをラップする
/// リポジトリエラーはリトライせず、そのまま呼び出し元へ伝播する
#[derive(Debug, thiserror::Error)]
pub enum ApplicationError {
    /// ドメインエラー（検証エラー・ビジネスルール違反）
    #[error("Domain error: {0}")]
    DomainError(#[from] DomainError),
    /// リポジトリエラー（永続化・商品参照の失敗）
    #[error("Repository error: {0}")]
    RepositoryError(#[from] RepositoryError),
}
