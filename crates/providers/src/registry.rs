//! Provider registry (spec §4.7, C7).
//!
//! Builds every configured provider at startup from `LlmConfig.providers`
//! and resolves a `"tag/model"` spec to a concrete provider + effective
//! model at call time. Any tag not registered — or not naming one of the
//! two built-in kinds — is routed through the gateway provider with the
//! tag itself used as the model identifier (spec §4.7).
//!
//! Also owns the bounded, TTL'd LRU cache for `complete()` (title
//! synthesis): concurrent reads/writes under an internal lock, eviction by
//! least-recently-used (spec §9 "no global mutable state beyond... the
//! process-local LLM response cache").

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use sha2::{Digest, Sha256};

use briefing_domain::config::{LlmConfig, ProviderKind};
use briefing_domain::error::{Error, Result};
use briefing_domain::tool::Message;

use crate::anthropic::AnthropicProvider;
use crate::gateway::GatewayProvider;
use crate::openai_compat::OpenAiCompatProvider;
use crate::traits::{ChatOptions, LlmProvider};

pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn LlmProvider>>,
    /// The first configured `ProviderKind::Gateway` entry, used as the
    /// catch-all for tags that don't match a registered provider id.
    gateway: Option<Arc<dyn LlmProvider>>,
    cache: Option<Mutex<CompletionCache>>,
}

impl ProviderRegistry {
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let mut providers: HashMap<String, Arc<dyn LlmProvider>> = HashMap::new();
        let mut gateway: Option<Arc<dyn LlmProvider>> = None;

        for cfg in &config.providers {
            let provider: Result<Arc<dyn LlmProvider>> = match cfg.kind {
                ProviderKind::Anthropic => {
                    AnthropicProvider::from_config(cfg, config).map(|p| Arc::new(p) as Arc<dyn LlmProvider>)
                }
                ProviderKind::OpenaiCompat => {
                    OpenAiCompatProvider::from_config(cfg, config).map(|p| Arc::new(p) as Arc<dyn LlmProvider>)
                }
                ProviderKind::Gateway => {
                    GatewayProvider::from_config(cfg, config).map(|p| Arc::new(p) as Arc<dyn LlmProvider>)
                }
            };
            match provider {
                Ok(p) => {
                    if cfg.kind == ProviderKind::Gateway && gateway.is_none() {
                        gateway = Some(p.clone());
                    }
                    providers.insert(cfg.id.clone(), p);
                }
                Err(e) => {
                    tracing::warn!(provider_id = %cfg.id, kind = ?cfg.kind, error = %e, "failed to initialize LLM provider");
                }
            }
        }

        let cache = if config.completion_cache.enabled {
            Some(Mutex::new(CompletionCache::new(
                config.completion_cache.max_entries,
                Duration::from_secs(config.completion_cache.ttl_secs),
            )))
        } else {
            None
        };

        Ok(Self { providers, gateway, cache })
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Resolve a `"tag/model"` (or bare `"tag"`) spec into a concrete
    /// provider and the `ChatOptions.model` override to pass it.
    pub fn resolve(&self, model_spec: &str) -> Result<(Arc<dyn LlmProvider>, ChatOptions)> {
        let (tag, rest) = match model_spec.split_once('/') {
            Some((t, r)) => (t, Some(r.to_string())),
            None => (model_spec, None),
        };

        if let Some(provider) = self.providers.get(tag) {
            return Ok((provider.clone(), ChatOptions { model: rest, ..Default::default() }));
        }

        // Unregistered tag: route through the gateway provider, using the
        // tag itself (not `rest`) as the model identifier (spec §4.7).
        match &self.gateway {
            Some(gw) => {
                Ok((gw.clone(), ChatOptions { model: Some(model_spec.to_string()), ..Default::default() }))
            }
            None => Err(Error::Config(format!(
                "no provider registered for '{tag}' and no gateway provider configured"
            ))),
        }
    }

    /// `complete()` with the process-local LRU+TTL cache consulted first.
    pub async fn complete_cached(
        &self,
        provider: &Arc<dyn LlmProvider>,
        messages: &[Message],
        options: &ChatOptions,
    ) -> Result<String> {
        let key = cache_key(provider.provider_id(), messages, options);

        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.lock().get(&key) {
                return Ok(hit);
            }
        }

        let result = provider.complete(messages, options).await?;

        if let Some(cache) = &self.cache {
            cache.lock().put(key, result.clone());
        }

        Ok(result)
    }
}

fn cache_key(provider_id: &str, messages: &[Message], options: &ChatOptions) -> String {
    let mut hasher = Sha256::new();
    hasher.update(provider_id.as_bytes());
    if let Ok(serialized) = serde_json::to_vec(messages) {
        hasher.update(&serialized);
    }
    hasher.update(options.model.as_deref().unwrap_or("").as_bytes());
    if let Some(t) = options.temperature {
        hasher.update(t.to_le_bytes());
    }
    format!("{:x}", hasher.finalize())
}

/// Bounded, size- and TTL-limited LRU cache for `complete()` results.
struct CompletionCache {
    entries: lru::LruCache<String, (String, Instant)>,
    ttl: Duration,
}

impl CompletionCache {
    fn new(max_entries: usize, ttl: Duration) -> Self {
        let cap = NonZeroUsize::new(max_entries.max(1)).unwrap();
        Self { entries: lru::LruCache::new(cap), ttl }
    }

    fn get(&mut self, key: &str) -> Option<String> {
        let (value, inserted_at) = self.entries.get(key)?.clone();
        if inserted_at.elapsed() > self.ttl {
            self.entries.pop(key);
            return None;
        }
        Some(value)
    }

    fn put(&mut self, key: String, value: String) {
        self.entries.put(key, (value, Instant::now()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_cache_hits_until_ttl_expires() {
        let mut cache = CompletionCache::new(4, Duration::from_millis(20));
        cache.put("k".into(), "v".into());
        assert_eq!(cache.get("k"), Some("v".to_string()));
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn completion_cache_evicts_least_recently_used() {
        let mut cache = CompletionCache::new(2, Duration::from_secs(60));
        cache.put("a".into(), "1".into());
        cache.put("b".into(), "2".into());
        cache.get("a"); // touch a, making b the LRU entry
        cache.put("c".into(), "3".into());
        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.get("a"), Some("1".to_string()));
        assert_eq!(cache.get("c"), Some("3".to_string()));
    }

    #[test]
    fn resolve_errors_when_tag_unregistered_and_no_gateway() {
        let config = LlmConfig::default();
        let registry = ProviderRegistry::from_config(&config).unwrap();
        assert!(registry.resolve("unknown-tag/some-model").is_err());
    }
}
