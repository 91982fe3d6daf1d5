//! Maps a resolved provider id to a ready-to-use client.

use crate::error::{GatewayError, Result};
use crate::provider::client::ProviderClient;
use crate::provider::clients::{AnthropicClient, GoogleClient, OpenAiClient};
use crate::provider::registry::{ProviderId, ProviderRegistry};
use std::sync::Arc;

/// Builds the client for a provider using the registry's credential and
/// endpoint for it.
///
/// The xai arm reuses the OpenAI-compatible client; the catalog's base URL
/// points it at the x.ai endpoint. Fails with a configuration error when the
/// provider has no resolved credential — resolution normally filters those
/// out before a client is ever requested.
pub fn build_client(
    registry: &ProviderRegistry,
    id: ProviderId,
) -> Result<Arc<dyn ProviderClient>> {
    let api_key = registry.credential(id).ok_or_else(|| {
        GatewayError::ConfigError(format!(
            "no credential configured for provider '{}' (set {})",
            id,
            registry.credential_var(id)
        ))
    })?;
    let base_url = registry.base_url(id);

    let client: Arc<dyn ProviderClient> = match id {
        ProviderId::Anthropic => {
            Arc::new(AnthropicClient::with_api_key_and_base_url(api_key, base_url))
        }
        ProviderId::OpenAi | ProviderId::Xai => {
            Arc::new(OpenAiClient::with_api_key_and_base_url(api_key, base_url))
        }
        ProviderId::Google => {
            Arc::new(GoogleClient::with_api_key_and_base_url(api_key, base_url))
        }
    };

    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_build_client_for_each_available_provider() {
        let credentials = ProviderId::ALL
            .into_iter()
            .map(|id| (id, "key".to_string()))
            .collect::<HashMap<_, _>>();
        let registry = ProviderRegistry::with_credentials(credentials);

        for id in ProviderId::ALL {
            assert!(build_client(&registry, id).is_ok());
        }
    }

    #[test]
    fn test_build_client_without_credential_fails() {
        let registry = ProviderRegistry::with_credentials(HashMap::new());
        let err = build_client(&registry, ProviderId::OpenAi).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }
}
