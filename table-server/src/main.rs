use table_server::{Config, Server, ServerState, print_banner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 环境准备 (dotenv + 日志)
    dotenv::dotenv().ok();

    let config = Config::from_env();
    table_server::utils::init_logger(
        if config.is_development() { "debug" } else { "info" },
        config.is_production(),
        config.log_dir().to_str(),
    )?;

    print_banner();
    tracing::info!("Table server starting...");

    // 2. 初始化状态
    let state = ServerState::initialize(&config);

    // 3. 启动 HTTP 服务器
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e);
    }

    Ok(())
}
