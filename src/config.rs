use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum number of candidate songs scored per suggestion request.
    /// Unset means every unrated song is scored. Zero is rejected at load.
    #[serde(default)]
    pub suggest_candidate_budget: Option<usize>,

    /// Upper bound for the `limit` query parameter on ranked suggestions
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_suggestions() -> usize {
    20
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            suggest_candidate_budget: None,
            max_suggestions: default_max_suggestions(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings that would leave the server unable to answer
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.suggest_candidate_budget == Some(0) {
            anyhow::bail!("SUGGEST_CANDIDATE_BUDGET must be at least 1");
        }
        if self.max_suggestions == 0 {
            anyhow::bail!("MAX_SUGGESTIONS must be at least 1");
        }
        Ok(())
    }

    /// Socket address the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
