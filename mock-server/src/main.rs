use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let tokens = std::env::var("MOCK_TOKENS").unwrap_or_else(|_| mock_server::DEFAULT_TOKEN.to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    println!("listening on {addr}");
    let router = mock_server::app_with_tokens(tokens.split(',').map(str::trim).filter(|t| !t.is_empty()));
    mock_server::run_app(listener, router).await
}
