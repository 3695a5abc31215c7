use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter};

/// RUST_LOG未設定時のフィルタ
pub const DEFAULT_FILTER: &str = "info";

/// ログ出力を初期化する
/// 出力レベルはRUST_LOGで指定する（未設定・不正値の場合は`DEFAULT_FILTER`）
pub fn init_tracing() -> Result<(), TryInitError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .try_init()
}
