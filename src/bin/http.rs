#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;

    use chore_wheel::{BoardConfig, ChoreBoard, advisory, http_api, logging};

    logging::init_logging("info");

    let addr: SocketAddr = std::env::var("CHORE_WHEEL_HTTP_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;

    let config = BoardConfig::from_env()?;
    let board = ChoreBoard::new(config);
    let state = http_api::AppState::new(board).with_advisor(advisory::advisor_from_env());

    println!("chore-wheel HTTP API listening on http://{addr}");
    http_api::serve(addr, state).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
