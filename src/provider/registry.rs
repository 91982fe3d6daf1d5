//! Static provider catalog and availability resolution.
//!
//! The registry answers two questions: which providers are currently usable
//! (their credential resolves to a non-empty value), and which provider a
//! given request should run against. Resolution prefers the requested
//! provider when it is available and otherwise falls back to the first
//! available provider in registration order — a deliberate, deterministic
//! default rather than any load-balancing policy.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Identifier for a supported LLM provider.
///
/// A closed set: adding a provider means adding a variant here plus one
/// catalog entry and one client arm in the factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Anthropic,
    OpenAi,
    Google,
    Xai,
}

impl ProviderId {
    /// Registration order. Availability listings and the resolve fallback
    /// both follow this order.
    pub const ALL: [ProviderId; 4] = [
        ProviderId::Anthropic,
        ProviderId::OpenAi,
        ProviderId::Google,
        ProviderId::Xai,
    ];

    /// Stable lowercase tag, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Anthropic => "anthropic",
            ProviderId::OpenAi => "openai",
            ProviderId::Google => "google",
            ProviderId::Xai => "xai",
        }
    }

    /// Parses a lowercase provider tag. Returns `None` for unknown tags.
    pub fn parse(s: &str) -> Option<ProviderId> {
        match s {
            "anthropic" => Some(ProviderId::Anthropic),
            "openai" => Some(ProviderId::OpenAi),
            "google" => Some(ProviderId::Google),
            "xai" => Some(ProviderId::Xai),
            _ => None,
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct CatalogEntry {
    id: ProviderId,
    default_model: &'static str,
    credential_var: &'static str,
    base_url: &'static str,
}

/// Fixed catalog, in registration order. The xai entry points the
/// OpenAI-compatible client at the x.ai endpoint.
const CATALOG: [CatalogEntry; 4] = [
    CatalogEntry {
        id: ProviderId::Anthropic,
        default_model: "claude-sonnet-4-5",
        credential_var: "ANTHROPIC_API_KEY",
        base_url: "https://api.anthropic.com",
    },
    CatalogEntry {
        id: ProviderId::OpenAi,
        default_model: "gpt-5-mini",
        credential_var: "OPENAI_API_KEY",
        base_url: "https://api.openai.com/v1",
    },
    CatalogEntry {
        id: ProviderId::Google,
        default_model: "gemini-3-flash-preview",
        credential_var: "GOOGLE_API_KEY",
        base_url: "https://generativelanguage.googleapis.com",
    },
    CatalogEntry {
        id: ProviderId::Xai,
        default_model: "grok-4",
        credential_var: "XAI_API_KEY",
        base_url: "https://api.x.ai/v1",
    },
];

fn catalog_entry(id: ProviderId) -> &'static CatalogEntry {
    // CATALOG covers every variant, so the lookup never misses.
    CATALOG
        .iter()
        .find(|entry| entry.id == id)
        .unwrap_or(&CATALOG[0])
}

/// Static catalog of providers plus the credentials resolved for them.
///
/// Immutable after construction. Credentials are captured once — from the
/// environment via [`ProviderRegistry::from_env`], or from an explicit map
/// for tests and embedding applications.
///
/// # Examples
///
/// ```ignore
/// use omnigate::provider::ProviderRegistry;
///
/// let registry = ProviderRegistry::from_env();
/// for id in registry.available_providers() {
///     println!("{} -> {}", id, registry.default_model(id));
/// }
/// ```
pub struct ProviderRegistry {
    credentials: HashMap<ProviderId, String>,
}

impl ProviderRegistry {
    /// Builds a registry from the process environment.
    ///
    /// Loads a local `.env` file first if one exists. A provider whose
    /// credential variable is unset or empty is treated as unavailable.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let mut credentials = HashMap::new();
        for entry in &CATALOG {
            if let Ok(value) = std::env::var(entry.credential_var) {
                if !value.is_empty() {
                    credentials.insert(entry.id, value);
                }
            }
        }

        Self { credentials }
    }

    /// Builds a registry from an explicit credential map. Empty values are
    /// discarded, matching the environment path.
    pub fn with_credentials(credentials: HashMap<ProviderId, String>) -> Self {
        let credentials = credentials
            .into_iter()
            .filter(|(_, value)| !value.is_empty())
            .collect();
        Self { credentials }
    }

    /// Providers whose credential resolved, in registration order.
    pub fn available_providers(&self) -> Vec<ProviderId> {
        ProviderId::ALL
            .into_iter()
            .filter(|id| self.credentials.contains_key(id))
            .collect()
    }

    /// Whether a provider's credential resolved.
    pub fn is_available(&self, id: ProviderId) -> bool {
        self.credentials.contains_key(&id)
    }

    /// Picks the provider a request should run against.
    ///
    /// Returns `requested` when it is available, else the first available
    /// provider in registration order, else `None`.
    pub fn resolve(&self, requested: Option<ProviderId>) -> Option<ProviderId> {
        if let Some(id) = requested {
            if self.is_available(id) {
                return Some(id);
            }
        }
        self.available_providers().into_iter().next()
    }

    /// Default model name for a provider.
    pub fn default_model(&self, id: ProviderId) -> &'static str {
        catalog_entry(id).default_model
    }

    /// Environment variable holding the provider's credential.
    pub fn credential_var(&self, id: ProviderId) -> &'static str {
        catalog_entry(id).credential_var
    }

    /// Resolved credential for a provider, if any.
    pub fn credential(&self, id: ProviderId) -> Option<&str> {
        self.credentials.get(&id).map(String::as_str)
    }

    /// Endpoint base URL for a provider.
    pub fn base_url(&self, id: ProviderId) -> &'static str {
        catalog_entry(id).base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(ids: &[ProviderId]) -> ProviderRegistry {
        let credentials = ids
            .iter()
            .map(|id| (*id, format!("{}-key", id)))
            .collect::<HashMap<_, _>>();
        ProviderRegistry::with_credentials(credentials)
    }

    #[test]
    fn test_provider_id_tags() {
        assert_eq!(ProviderId::Anthropic.as_str(), "anthropic");
        assert_eq!(ProviderId::OpenAi.as_str(), "openai");
        assert_eq!(ProviderId::Google.as_str(), "google");
        assert_eq!(ProviderId::Xai.as_str(), "xai");

        for id in ProviderId::ALL {
            assert_eq!(ProviderId::parse(id.as_str()), Some(id));
        }
        assert_eq!(ProviderId::parse("mistral"), None);
    }

    #[test]
    fn test_provider_id_serde_matches_tags() {
        for id in ProviderId::ALL {
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, format!("\"{}\"", id.as_str()));
        }
    }

    #[test]
    fn test_available_providers_follow_registration_order() {
        let registry = registry_with(&[ProviderId::Xai, ProviderId::Anthropic, ProviderId::Google]);
        assert_eq!(
            registry.available_providers(),
            vec![ProviderId::Anthropic, ProviderId::Google, ProviderId::Xai]
        );
    }

    #[test]
    fn test_empty_credentials_are_discarded() {
        let mut credentials = HashMap::new();
        credentials.insert(ProviderId::OpenAi, String::new());
        let registry = ProviderRegistry::with_credentials(credentials);
        assert!(registry.available_providers().is_empty());
        assert!(!registry.is_available(ProviderId::OpenAi));
    }

    #[test]
    fn test_resolve_with_empty_registry() {
        let registry = registry_with(&[]);
        assert_eq!(registry.resolve(None), None);
        assert_eq!(registry.resolve(Some(ProviderId::OpenAi)), None);
    }

    #[test]
    fn test_resolve_with_single_provider() {
        let registry = registry_with(&[ProviderId::Google]);
        assert_eq!(registry.resolve(Some(ProviderId::Google)), Some(ProviderId::Google));
        // An unavailable request falls back to the one configured provider.
        assert_eq!(registry.resolve(Some(ProviderId::OpenAi)), Some(ProviderId::Google));
        assert_eq!(registry.resolve(None), Some(ProviderId::Google));
    }

    #[test]
    fn test_resolve_with_three_providers() {
        let registry = registry_with(&[ProviderId::OpenAi, ProviderId::Google, ProviderId::Xai]);
        // Requested and available wins.
        assert_eq!(registry.resolve(Some(ProviderId::Xai)), Some(ProviderId::Xai));
        // Unavailable request falls back to the first available in order.
        assert_eq!(registry.resolve(Some(ProviderId::Anthropic)), Some(ProviderId::OpenAi));
        // No request falls back the same way.
        assert_eq!(registry.resolve(None), Some(ProviderId::OpenAi));
    }

    #[test]
    fn test_catalog_metadata() {
        let registry = registry_with(&[]);
        assert_eq!(registry.default_model(ProviderId::Anthropic), "claude-sonnet-4-5");
        assert_eq!(registry.default_model(ProviderId::Xai), "grok-4");
        assert_eq!(registry.credential_var(ProviderId::Google), "GOOGLE_API_KEY");
        assert_eq!(registry.base_url(ProviderId::Xai), "https://api.x.ai/v1");
    }

    #[test]
    fn test_credential_lookup() {
        let registry = registry_with(&[ProviderId::OpenAi]);
        assert_eq!(registry.credential(ProviderId::OpenAi), Some("openai-key"));
        assert_eq!(registry.credential(ProviderId::Google), None);
    }
}
