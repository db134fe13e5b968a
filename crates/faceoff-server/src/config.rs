use serde::Deserialize;

/// Top-level server configuration, loaded from `faceoff.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub broadcast: BroadcastConfig,
    pub limits: LimitsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            broadcast: BroadcastConfig::default(),
            limits: LimitsConfig::default(),
        }
    }
}

/// Announcement fan-out configuration. Disabling broadcasting is a valid
/// no-op setup: matches still form, nothing is announced.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BroadcastConfig {
    pub enabled: bool,
    pub capacity: usize,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: 1024,
        }
    }
}

/// Infrastructure limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_sse_subscribers: usize,
    pub max_theme_len: usize,
    pub max_live_rooms: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_sse_subscribers: 100,
            max_theme_len: 255,
            max_live_rooms: 10_000,
        }
    }
}

impl ServerConfig {
    /// Validate configuration, exiting on fatal issues.
    pub fn validate(&self) {
        if self.listen_addr.parse::<std::net::SocketAddr>().is_err() {
            tracing::error!(
                addr = %self.listen_addr,
                "listen_addr is not a valid socket address"
            );
            std::process::exit(1);
        }
        if self.broadcast.enabled && self.broadcast.capacity == 0 {
            tracing::error!("broadcast.capacity must be > 0");
            std::process::exit(1);
        }
        if self.limits.max_sse_subscribers == 0 {
            tracing::error!("limits.max_sse_subscribers must be > 0");
            std::process::exit(1);
        }
        if self.limits.max_theme_len == 0 {
            tracing::error!("limits.max_theme_len must be > 0");
            std::process::exit(1);
        }
        if self.limits.max_live_rooms == 0 {
            tracing::error!("limits.max_live_rooms must be > 0");
            std::process::exit(1);
        }
    }

    /// Load config from `faceoff.toml` if it exists, then apply env var
    /// overrides.
    pub fn load() -> Self {
        let mut config = match std::fs::read_to_string("faceoff.toml") {
            Ok(content) => match toml::from_str::<ServerConfig>(&content) {
                Ok(cfg) => {
                    tracing::info!("Loaded configuration from faceoff.toml");
                    cfg
                },
                Err(e) => {
                    tracing::warn!("Failed to parse faceoff.toml: {e}, using defaults");
                    ServerConfig::default()
                },
            },
            Err(_) => {
                tracing::info!("No faceoff.toml found, using defaults");
                ServerConfig::default()
            },
        };

        if let Ok(addr) = std::env::var("FACEOFF_LISTEN_ADDR")
            && !addr.is_empty()
        {
            config.listen_addr = addr;
        }
        if let Ok(val) = std::env::var("FACEOFF_BROADCAST_ENABLED")
            && let Ok(enabled) = val.parse::<bool>()
        {
            config.broadcast.enabled = enabled;
        }
        if let Ok(val) = std::env::var("FACEOFF_MAX_SSE_SUBSCRIBERS")
            && let Ok(n) = val.parse::<usize>()
        {
            config.limits.max_sse_subscribers = n;
        }
        if let Ok(val) = std::env::var("FACEOFF_MAX_LIVE_ROOMS")
            && let Ok(n) = val.parse::<usize>()
        {
            config.limits.max_live_rooms = n;
        }

        config
    }
}
