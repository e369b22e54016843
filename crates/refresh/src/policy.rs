use kbase_catalog::Provider;
use kbase_config::RefreshConfig;

/// How many files one indexing pass may process for an embedding provider.
///
/// In order of precedence: the provider's own `max_batch_size`, the configured
/// limit for its provider type, the configured default. A configured limit of
/// zero is treated as one, so a pass can always make progress.
#[derive(Debug, Clone, Default)]
pub struct BatchPolicy {
    config: RefreshConfig,
}
impl From<&RefreshConfig> for BatchPolicy {
    fn from(config: &RefreshConfig) -> Self {
        Self { config: config.clone() }
    }
}
impl BatchPolicy {
    pub fn limit_for(&self, provider: &Provider) -> u32 {
        match provider.max_batch_size {
            Some(limit) if limit > 0 => limit,
            _ => self.config.batch_limit_for(&provider.provider_type).max(1),
        }
    }
}
