#[allow(dead_code)]
mod common;

use std::time::Duration;

use common::{TestServer, join_body, post_join};
use faceoff_server::config::{BroadcastConfig, LimitsConfig, ServerConfig};

#[tokio::test]
async fn stream_receives_matching_success() {
    let server = TestServer::new().await;
    let client = reqwest::Client::new();
    let base = server.base_url();

    let first: serde_json::Value = post_join(&client, &base, 1, &join_body(7, "privacy", None))
        .await
        .json()
        .await
        .unwrap();
    let room_id = first["room_id"].as_str().unwrap().to_string();

    // Complete the pairing after a short delay.
    let join_base = base.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        let client = reqwest::Client::new();
        post_join(&client, &join_base, 2, &join_body(7, "privacy", None)).await;
    });

    let sse_resp = client
        .get(format!("{base}/api/v1/rooms/{room_id}/stream"))
        .send()
        .await
        .unwrap();
    assert_eq!(sse_resp.status(), 200);

    let mut collected = String::new();
    let found = tokio::time::timeout(Duration::from_secs(3), async {
        let mut resp = sse_resp;
        loop {
            match resp.chunk().await {
                Ok(Some(bytes)) => {
                    collected.push_str(&String::from_utf8_lossy(&bytes));
                    if collected.contains("matching-success") && collected.contains(&room_id) {
                        return true;
                    }
                },
                _ => return false,
            }
        }
    })
    .await
    .unwrap_or(false);

    assert!(
        found,
        "stream should carry the matching-success announcement, got: {collected}"
    );
}

#[tokio::test]
async fn stream_rejected_when_broadcast_disabled() {
    let config = ServerConfig {
        broadcast: BroadcastConfig {
            enabled: false,
            ..BroadcastConfig::default()
        },
        ..ServerConfig::default()
    };
    let server = TestServer::from_config(config).await;
    let client = reqwest::Client::new();
    let base = server.base_url();

    // Matching still works without a transport.
    let first: serde_json::Value = post_join(&client, &base, 1, &join_body(7, "privacy", None))
        .await
        .json()
        .await
        .unwrap();
    let second: serde_json::Value = post_join(&client, &base, 2, &join_body(7, "privacy", None))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(second["matched"], true);

    let room_id = first["room_id"].as_str().unwrap();
    let resp = client
        .get(format!("{base}/api/v1/rooms/{room_id}/stream"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 503);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "broadcast_disabled");
}

#[tokio::test]
async fn stream_rejected_over_subscriber_cap() {
    let config = ServerConfig {
        limits: LimitsConfig {
            max_sse_subscribers: 1,
            ..LimitsConfig::default()
        },
        ..ServerConfig::default()
    };
    let server = TestServer::from_config(config).await;
    let client = reqwest::Client::new();
    let base = server.base_url();

    let first: serde_json::Value = post_join(&client, &base, 1, &join_body(7, "privacy", None))
        .await
        .json()
        .await
        .unwrap();
    let room_id = first["room_id"].as_str().unwrap();

    let resp1 = client
        .get(format!("{base}/api/v1/rooms/{room_id}/stream"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp1.status(), 200);

    // Give it a moment to register
    tokio::time::sleep(Duration::from_millis(50)).await;

    let resp2 = client
        .get(format!("{base}/api/v1/rooms/{room_id}/stream"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp2.status(), 503);
}
