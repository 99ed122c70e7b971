use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use platform_api::DEFAULT_NAMESPACE;
use products_hr::{EmployeeId, IdStrategy};

const DEFAULT_RANDOM_ID_MAX: EmployeeId = 1000;

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Normalized route prefix: leading slash, no trailing slash, `""` for root.
    pub namespace: String,
    pub network: NetworkConfig,
    pub id_strategy: IdStrategy,
    pub seed_demo_data: bool,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NetworkConfig {
    pub latency: Duration,
    pub failure_rate: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            network: NetworkConfig::default(),
            id_strategy: IdStrategy::Sequential,
            seed_demo_data: true,
            cors_allowed_origins: vec!["http://localhost:5173".into()],
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let namespace = normalize_namespace(
            &lookup("API_NAMESPACE").unwrap_or_else(|| DEFAULT_NAMESPACE.into()),
        );

        let latency_ms = match lookup("SIM_LATENCY_MS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("invalid SIM_LATENCY_MS `{raw}`"))?,
            None => 0,
        };
        let failure_rate = match lookup("SIM_FAILURE_RATE") {
            Some(raw) => raw
                .trim()
                .parse::<f64>()
                .with_context(|| format!("invalid SIM_FAILURE_RATE `{raw}`"))?,
            None => 0.0,
        };
        if !(0.0..=1.0).contains(&failure_rate) {
            return Err(anyhow!(
                "SIM_FAILURE_RATE must be between 0 and 1, got {failure_rate}"
            ));
        }

        let random_max = match lookup("ID_RANDOM_MAX") {
            Some(raw) => raw
                .trim()
                .parse::<EmployeeId>()
                .with_context(|| format!("invalid ID_RANDOM_MAX `{raw}`"))?,
            None => DEFAULT_RANDOM_ID_MAX,
        };
        let id_strategy = match lookup("ID_STRATEGY")
            .map(|val| val.trim().to_lowercase())
            .as_deref()
        {
            None | Some("sequential") => IdStrategy::Sequential,
            Some("random") => IdStrategy::Random { max: random_max },
            Some(other) => {
                return Err(anyhow!(
                    "unknown ID_STRATEGY `{other}` (use sequential|random)"
                ));
            }
        };

        let seed_demo_data = lookup("SEED_DEMO_DATA")
            .map(|val| matches!(val.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(true);

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .filter_map(|s| {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
            .collect::<Vec<_>>();

        Ok(Self {
            namespace,
            network: NetworkConfig {
                latency: Duration::from_millis(latency_ms),
                failure_rate,
            },
            id_strategy,
            seed_demo_data,
            cors_allowed_origins,
        })
    }
}

fn normalize_namespace(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
