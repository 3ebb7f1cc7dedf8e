#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();
    let config = channel_tasks_server::config::Config::from_env()?;
    channel_tasks_server::web::start_web_server(config).await
}
