use std::net::SocketAddr;
use std::time::Duration;

use faceoff_server::build_app;
use faceoff_server::config::ServerConfig;

pub struct TestServer {
    pub addr: SocketAddr,
    _shutdown: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Start a test server with default config.
    pub async fn new() -> Self {
        Self::from_config(ServerConfig::default()).await
    }

    pub async fn from_config(config: ServerConfig) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (app, _state) = build_app(config);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the server a moment to start accepting
        tokio::time::sleep(Duration::from_millis(20)).await;

        Self {
            addr,
            _shutdown: handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

/// Build a join request body.
pub fn join_body(topic_id: u64, theme_name: &str, preferred_side: Option<&str>) -> serde_json::Value {
    let mut body = serde_json::json!({
        "topic_id": topic_id,
        "theme_name": theme_name,
    });
    if let Some(side) = preferred_side {
        body["preferred_side"] = serde_json::json!(side);
    }
    body
}

/// POST /api/v1/rooms/join as `user_id`.
pub async fn post_join(
    client: &reqwest::Client,
    base_url: &str,
    user_id: u64,
    body: &serde_json::Value,
) -> reqwest::Response {
    client
        .post(format!("{base_url}/api/v1/rooms/join"))
        .header("x-user-id", user_id.to_string())
        .json(body)
        .send()
        .await
        .unwrap()
}

/// POST /api/v1/rooms/leave as `user_id`.
pub async fn post_leave(
    client: &reqwest::Client,
    base_url: &str,
    user_id: u64,
) -> reqwest::Response {
    client
        .post(format!("{base_url}/api/v1/rooms/leave"))
        .header("x-user-id", user_id.to_string())
        .send()
        .await
        .unwrap()
}
