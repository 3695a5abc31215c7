use shop_order_management::adapter::driven::{MySqlOrderRepository, MySqlProductLookup};
use shop_order_management::adapter::driver::{create_router, AppState};
use shop_order_management::adapter::{telemetry, AppConfig, DatabaseMigration};

use sqlx::mysql::MySqlPoolOptions;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .envファイルから環境変数を読み込む
    dotenvy::dotenv().ok();

    telemetry::init_tracing()?;

    let config = AppConfig::from_env()?;
    tracing::info!(
        host = %config.database.host,
        port = config.database.port,
        database = %config.database.database,
        "database configuration loaded"
    );

    // 接続プールを作成
    let pool = MySqlPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.connection_string())
        .await?;

    // マイグレーションを実行
    DatabaseMigration::new(pool.clone()).run().await?;

    let order_repository = Arc::new(MySqlOrderRepository::new(pool.clone()));
    let product_lookup = Arc::new(MySqlProductLookup::new(pool));
    let app_state = AppState::new(order_repository, product_lookup);

    // REST APIルーターを作成
    let app = create_router()
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(app_state);

    // サーバーを起動
    let address = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(address).await?;
    tracing::info!(%address, "order API listening");

    axum::serve(listener, app).await?;

    Ok(())
}
