use serde::Deserialize;

/// Top-level service configuration, loaded from `quizlobby.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LobbyConfig {
    pub rooms: RoomsConfig,
    pub events: EventsConfig,
}

/// Room lifecycle configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RoomsConfig {
    /// Global cap on live rooms.
    pub max_rooms: usize,
    /// Rooms idle longer than this are reclaimed by the janitor.
    pub idle_timeout_secs: u64,
    /// Interval between janitor sweeps.
    pub sweep_interval_secs: u64,
}

impl Default for RoomsConfig {
    fn default() -> Self {
        Self {
            max_rooms: 100,
            idle_timeout_secs: 3600,
            sweep_interval_secs: 60,
        }
    }
}

/// Notification fan-out configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    pub broadcast_capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: 1024,
        }
    }
}

impl LobbyConfig {
    /// Validate configuration. Fatal misconfiguration is logged and exits.
    pub fn validate(&self) {
        if self.rooms.max_rooms == 0 {
            tracing::error!("rooms.max_rooms must be > 0");
            std::process::exit(1);
        }
        if self.rooms.idle_timeout_secs == 0 {
            tracing::error!("rooms.idle_timeout_secs must be > 0");
            std::process::exit(1);
        }
        if self.rooms.sweep_interval_secs == 0 {
            tracing::error!("rooms.sweep_interval_secs must be > 0");
            std::process::exit(1);
        }
        if self.events.broadcast_capacity == 0 {
            tracing::error!("events.broadcast_capacity must be > 0");
            std::process::exit(1);
        }
    }

    /// Load config from `quizlobby.toml` if it exists, then apply env var
    /// overrides.
    pub fn load() -> Self {
        let mut config = match std::fs::read_to_string("quizlobby.toml") {
            Ok(content) => match toml::from_str::<LobbyConfig>(&content) {
                Ok(cfg) => {
                    tracing::info!("Loaded configuration from quizlobby.toml");
                    cfg
                },
                Err(e) => {
                    tracing::warn!("Failed to parse quizlobby.toml: {e}, using defaults");
                    LobbyConfig::default()
                },
            },
            Err(_) => {
                tracing::info!("No quizlobby.toml found, using defaults");
                LobbyConfig::default()
            },
        };

        if let Ok(val) = std::env::var("QUIZLOBBY_MAX_ROOMS")
            && let Ok(n) = val.parse::<usize>()
        {
            config.rooms.max_rooms = n;
        }
        if let Ok(val) = std::env::var("QUIZLOBBY_IDLE_TIMEOUT_SECS")
            && let Ok(n) = val.parse::<u64>()
        {
            config.rooms.idle_timeout_secs = n;
        }
        if let Ok(val) = std::env::var("QUIZLOBBY_SWEEP_INTERVAL_SECS")
            && let Ok(n) = val.parse::<u64>()
        {
            config.rooms.sweep_interval_secs = n;
        }
        if let Ok(val) = std::env::var("QUIZLOBBY_BROADCAST_CAPACITY")
            && let Ok(n) = val.parse::<usize>()
        {
            config.events.broadcast_capacity = n;
        }

        config
    }
}
