use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let mode = std::env::var("MOCK_MODE").ok();
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    println!(
        "mock link API ({}) on {addr}: POST /v1/url, PUT /v1/url?url=, links under https://{}/",
        mode.as_deref().unwrap_or("available"),
        mock_server::LINK_DOMAIN
    );
    mock_server::serve(listener, mock_server::app_for_mode(mode.as_deref())).await
}
