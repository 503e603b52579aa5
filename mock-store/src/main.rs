use mock_store::Credentials;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "9200".to_string());
    let credentials = std::env::var("MOCK_STORE_USER").ok().map(|user| {
        let password = std::env::var("MOCK_STORE_PASSWORD").unwrap_or_default();
        Credentials::new(user, password)
    });

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    match &credentials {
        Some(c) => println!("listening on {addr} (basic auth as {})", c.username),
        None => println!("listening on {addr}"),
    }
    mock_store::run(listener, credentials).await
}
