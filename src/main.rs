use sesame::api;
use sesame::logger::*;
use sesame::server::*;
use sesame::settings::*;
use std::sync::Arc;
use tokio::signal;
use warp::Filter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();

    let project_settings = parse_settings(cli.settings.as_deref())?;
    info!(?project_settings);
    logger.reload_from_config(&LogConfig::from(&project_settings.log))?;

    let server = Arc::new(Server::try_new(&project_settings).await?);

    if cli.clear_sessions {
        server.session_broker.clear().await?;
        info!("all sessions cleared");
        return Ok(());
    }

    let address: std::net::SocketAddr = project_settings.http.address.parse()?;

    let api_v1 = warp::path("api")
        .and(warp::path("v1"))
        .and(api::v1::routes(server.clone()))
        .recover(api::v1::recover_error)
        .with(warp::trace::request());

    let (bound, serving) = warp::serve(api_v1).try_bind_with_graceful_shutdown(address, async {
        if let Err(e) = signal::ctrl_c().await {
            error!("could not listen for SIGINT: {}", e);
        }
    })?;
    info!("listening on {}", bound);
    serving.await;

    info!("server shutdown successfully");
    Ok(())
}
