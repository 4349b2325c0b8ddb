use std::sync::Arc;
use std::time::Duration;

use actix_web::dev::ServerHandle;
use actix_web::{App, HttpServer, rt, web};
use dotenvy::dotenv;
use log::{error, info};

use pow_ledger_node::api::{self, AppState};
use pow_ledger_node::config::Config;
use pow_ledger_node::error::Result;
use pow_ledger_node::node::Node;
use pow_ledger_node::transport::HttpTransport;

fn main() {
    let _ = dotenv();
    env_logger::init();

    if let Err(e) = run() {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = Config::from_env()?;
    let (host, port) = (config.host.clone(), config.port);

    // built outside any async runtime: the blocking client may not be
    // created or dropped inside one
    let transport = Arc::new(HttpTransport::new(
        config.http_address(),
        config.peers.clone(),
    )?);
    let node = Arc::new(Node::new(config));
    let handle = node.start(transport)?;

    println!(
        "⛓️ Starting ledger node {} at http://{host}:{port}",
        node.config().miner_name
    );

    let served = rt::System::new().block_on(serve(node.clone(), host, port));

    handle.shutdown();
    handle.join()?;
    served?;
    info!("node stopped");
    Ok(())
}

async fn serve(node: Arc<Node>, host: String, port: u16) -> std::io::Result<()> {
    let state = web::Data::new(AppState::new(node.clone()));
    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(api::init_routes)
    })
    .bind((host.as_str(), port))?
    .run();

    rt::spawn(stop_on_fatal(node, server.handle()));
    server.await
}

/// Bring the HTTP server down once a background activity stops the node.
async fn stop_on_fatal(node: Arc<Node>, server: ServerHandle) {
    while !node.is_stopping() {
        rt::time::sleep(Duration::from_millis(250)).await;
    }
    server.stop(true).await;
}
