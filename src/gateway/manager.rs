//! The gateway orchestrator.
//!
//! `GatewayManager` ties the provider registry, session memory, structured
//! decoding, and the tool protocol together behind a single `ask` call.
//! Capabilities are opt-in at construction time and compose: a manager built
//! with memory replays history, one built with tools runs the two-step tool
//! protocol, one built as structured decodes replies into JSON.
//!
//! `ask` never returns an error. Every failure mode a caller can hit, from
//! an empty registry to a provider rejection to an undecodable reply, is
//! folded into the returned [`QueryResult`] with `success: false`.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::decode::decode_structured;
use crate::error::{GatewayError, Result};
use crate::gateway::result::{QueryResult, ResponsePayload, ToolExchange, ToolStep};
use crate::gateway::templates::{self, DEFAULT_SYSTEM_PROMPT, DEFAULT_TEMPLATE};
use crate::memory::{MemoryStore, SessionKey};
use crate::message::ChatMessage;
use crate::provider::{build_client, InvokeOptions, ProviderClient, ProviderId, ProviderRegistry};
use crate::tools::ToolRegistry;

/// Per-call options for [`GatewayManager::ask`].
///
/// # Examples
///
/// ```ignore
/// use omnigate::gateway::AskOptions;
/// use omnigate::provider::ProviderId;
///
/// let options = AskOptions {
///     provider: Some(ProviderId::Anthropic),
///     temperature: 0.2,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct AskOptions {
    /// Preferred provider. `None`, or an unavailable provider, falls back
    /// to the first available provider in registration order.
    pub provider: Option<ProviderId>,
    /// Prompt template; every `{topic}` marker is replaced with the topic.
    pub template: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Conversation thread for managers built with memory.
    pub session_id: String,
}

impl Default for AskOptions {
    fn default() -> Self {
        Self {
            provider: None,
            template: DEFAULT_TEMPLATE.to_string(),
            temperature: 0.7,
            max_tokens: 1000,
            session_id: "default".to_string(),
        }
    }
}

/// Report returned by [`GatewayManager::ask_all`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AskAllReport {
    /// True when at least one provider was available to query.
    pub success: bool,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// One result per available provider, in registration order.
    pub responses: Vec<QueryResult>,
}

/// A session's stored history, as returned by [`GatewayManager::history`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionHistory {
    pub provider: ProviderId,
    pub session_id: String,
    pub turns: Vec<ChatMessage>,
    pub count: usize,
}

/// Report returned by [`GatewayManager::reset_memory`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResetReport {
    pub status: String,
    /// Removed conversation keys, or the literal `ALL` when everything went.
    pub removed: Vec<String>,
}

/// Everything resolved for one query before any wire call is made.
struct AskContext {
    provider: ProviderId,
    model: String,
    prompt: String,
    options: AskOptions,
    use_memory: bool,
}

impl AskContext {
    fn session_key(&self) -> SessionKey {
        SessionKey::new(self.provider, &self.options.session_id)
    }
}

/// A successful provider exchange: the payload for the caller plus the
/// assistant text worth remembering.
struct AskOutcome {
    payload: ResponsePayload,
    assistant_text: String,
}

/// Unified front door to every configured LLM provider.
///
/// # Examples
///
/// ```ignore
/// use omnigate::gateway::{AskOptions, GatewayManager};
/// use omnigate::provider::ProviderRegistry;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let manager = GatewayManager::new(ProviderRegistry::from_env())?;
///     let result = manager.ask("What is Rust?", &AskOptions::default()).await;
///     if result.success {
///         println!("{}", result.answer_text().unwrap_or_default());
///     } else {
///         eprintln!("{}", result.error.unwrap_or_default());
///     }
///     Ok(())
/// }
/// ```
pub struct GatewayManager {
    registry: ProviderRegistry,
    clients: HashMap<ProviderId, Arc<dyn ProviderClient>>,
    memory: Option<Arc<dyn MemoryStore>>,
    tools: Option<ToolRegistry>,
    structured: bool,
    system_prompt: String,
}

impl GatewayManager {
    /// Create a manager with no optional capabilities: plain text responses,
    /// no memory, no tools.
    pub fn new(registry: ProviderRegistry) -> Result<Self> {
        Self::builder(registry).build()
    }

    /// Create a manager builder for custom configuration.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// use std::sync::Arc;
    /// use omnigate::gateway::GatewayManager;
    /// use omnigate::memory::FileMemoryStore;
    /// use omnigate::provider::ProviderRegistry;
    /// use omnigate::tools::ToolRegistry;
    ///
    /// let manager = GatewayManager::builder(ProviderRegistry::from_env())
    ///     .memory(Arc::new(FileMemoryStore::new("./data")?))
    ///     .tools(ToolRegistry::with_defaults())
    ///     .build()?;
    /// ```
    pub fn builder(registry: ProviderRegistry) -> GatewayManagerBuilder {
        GatewayManagerBuilder::new(registry)
    }

    /// Providers the manager can currently serve, in registration order.
    pub fn available_providers(&self) -> Vec<ProviderId> {
        self.registry.available_providers()
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Ask one provider a question.
    ///
    /// This method:
    /// 1. Renders the prompt from the template and topic
    /// 2. Resolves the provider, falling back when the requested one is
    ///    unavailable
    /// 3. Replays session history when memory is enabled
    /// 4. Runs the wire call, plus the tool protocol or structured decoding
    ///    when those capabilities are enabled
    /// 5. Records the new user and assistant turns on success
    ///
    /// It never returns an error: failures come back as a [`QueryResult`]
    /// with `success: false` and the reason in `error`.
    pub async fn ask(&self, topic: &str, options: &AskOptions) -> QueryResult {
        self.ask_with(topic, options.clone(), true).await
    }

    /// Ask every available provider the same question, one independent
    /// call each, without touching session memory.
    pub async fn ask_all(&self, topic: &str, options: &AskOptions) -> AskAllReport {
        let prompt = templates::render_topic(&options.template, topic);
        let available = self.registry.available_providers();
        if available.is_empty() {
            warn!("No providers available for fan-out query");
            return AskAllReport {
                success: false,
                prompt,
                error: Some("No providers available".to_string()),
                responses: Vec::new(),
            };
        }

        info!("Fanning out query to {} providers", available.len());
        let calls = available.into_iter().map(|provider| {
            let per_provider = AskOptions {
                provider: Some(provider),
                ..options.clone()
            };
            self.ask_with(topic, per_provider, false)
        });
        let responses = futures::future::join_all(calls).await;

        AskAllReport {
            success: true,
            prompt,
            error: None,
            responses,
        }
    }

    /// Read a session's stored history.
    ///
    /// Fails when the manager was built without memory; an unseen session
    /// reads as empty.
    pub fn history(&self, provider: ProviderId, session_id: &str) -> Result<SessionHistory> {
        let memory = self.require_memory()?;
        let key = SessionKey::new(provider, session_id);
        let turns = memory.read(&key)?;
        Ok(SessionHistory {
            provider,
            session_id: key.session().to_string(),
            count: turns.len(),
            turns,
        })
    }

    /// Clear stored conversations.
    ///
    /// With no filters everything is removed. A provider filter clears every
    /// session under that provider, a session filter clears that session id
    /// across all providers, and both together clear exactly one
    /// conversation.
    pub fn reset_memory(
        &self,
        provider: Option<ProviderId>,
        session_id: Option<&str>,
    ) -> Result<ResetReport> {
        let memory = self.require_memory()?;
        let outcome = memory.reset(provider, session_id)?;
        let removed = outcome.removed_keys();
        info!("Cleared conversation memory: {}", removed.join(", "));
        Ok(ResetReport {
            status: "cleared".to_string(),
            removed,
        })
    }

    fn require_memory(&self) -> Result<&Arc<dyn MemoryStore>> {
        self.memory.as_ref().ok_or_else(|| {
            GatewayError::ConfigError("session memory is not enabled".to_string())
        })
    }

    async fn ask_with(&self, topic: &str, options: AskOptions, use_memory: bool) -> QueryResult {
        let prompt = templates::render_topic(&options.template, topic);
        let provider = match self.registry.resolve(options.provider) {
            Some(provider) => provider,
            None => {
                warn!("No providers available to serve query");
                return Self::unavailable(prompt, &options);
            }
        };
        let model = self.registry.default_model(provider).to_string();
        debug!("Dispatching query to {} ({})", provider, model);

        let ctx = AskContext {
            provider,
            model,
            prompt,
            options,
            use_memory,
        };
        let outcome = self.execute(&ctx).await;
        self.finish(ctx, outcome)
    }

    async fn execute(&self, ctx: &AskContext) -> Result<AskOutcome> {
        let client = self.clients.get(&ctx.provider).ok_or_else(|| {
            GatewayError::ConfigError(format!(
                "no client constructed for provider '{}'",
                ctx.provider
            ))
        })?;
        let invoke = InvokeOptions {
            temperature: ctx.options.temperature,
            max_tokens: ctx.options.max_tokens,
        };

        match &self.tools {
            Some(tools) if !tools.is_empty() => {
                self.run_tool_protocol(ctx, client.as_ref(), tools, &invoke).await
            }
            _ => self.run_single_shot(ctx, client.as_ref(), &invoke).await,
        }
    }

    async fn run_single_shot(
        &self,
        ctx: &AskContext,
        client: &dyn ProviderClient,
        invoke: &InvokeOptions,
    ) -> Result<AskOutcome> {
        let messages = self.conversation(ctx, &ctx.prompt)?;
        let text = client.invoke(&ctx.model, &messages, invoke).await?;

        if self.structured {
            let value = decode_structured(&text)?;
            Ok(AskOutcome {
                payload: ResponsePayload::Structured(value),
                assistant_text: text,
            })
        } else {
            Ok(AskOutcome {
                payload: ResponsePayload::Text(text.clone()),
                assistant_text: text,
            })
        }
    }

    /// Runs the two-step tool protocol: offer the catalog, execute at most
    /// one requested tool, and ask for the final answer. A tool call in the
    /// second reply is not honored; there is no chaining.
    async fn run_tool_protocol(
        &self,
        ctx: &AskContext,
        client: &dyn ProviderClient,
        tools: &ToolRegistry,
        invoke: &InvokeOptions,
    ) -> Result<AskOutcome> {
        let first_prompt = templates::render_tools_prompt(&tools.catalog_prompt(), &ctx.prompt);
        let messages = self.conversation(ctx, &first_prompt)?;
        let first_text = client.invoke(&ctx.model, &messages, invoke).await?;
        let first_value = decode_structured(&first_text)?;
        let first_step = ToolStep::parse(&first_value, &first_text)?;

        let call = match first_step.tool_call {
            None => {
                debug!("Model answered without calling a tool");
                return Ok(AskOutcome {
                    assistant_text: first_step.final_answer.clone(),
                    payload: ResponsePayload::Tool(ToolExchange {
                        tool_call: None,
                        tool_output: None,
                        final_answer: first_step.final_answer,
                    }),
                });
            }
            Some(call) => call,
        };

        info!("Executing tool '{}' requested by the model", call.name);
        let tool_output = tools.run(&call.name, &call.arguments);
        let call_json = serde_json::to_string(&call)?;
        let follow_up = templates::render_follow_up(&ctx.prompt, &call_json, &tool_output);
        let second_messages = vec![
            ChatMessage::system(&self.system_prompt),
            ChatMessage::user(follow_up),
        ];
        let second_text = client.invoke(&ctx.model, &second_messages, invoke).await?;
        let second_value = decode_structured(&second_text)?;
        let second_step = ToolStep::parse(&second_value, &second_text)?;

        let final_answer = if second_step.final_answer.is_empty() {
            first_step.final_answer
        } else {
            second_step.final_answer
        };
        Ok(AskOutcome {
            assistant_text: final_answer.clone(),
            payload: ResponsePayload::Tool(ToolExchange {
                tool_call: Some(call),
                tool_output: Some(tool_output),
                final_answer,
            }),
        })
    }

    /// Assembles the wire conversation: system prompt, stored history when
    /// memory applies, then the user prompt.
    fn conversation(&self, ctx: &AskContext, user_prompt: &str) -> Result<Vec<ChatMessage>> {
        let mut messages = vec![ChatMessage::system(&self.system_prompt)];
        if ctx.use_memory {
            if let Some(memory) = &self.memory {
                messages.extend(memory.read(&ctx.session_key())?);
            }
        }
        messages.push(ChatMessage::user(user_prompt));
        Ok(messages)
    }

    fn record_turns(&self, ctx: &AskContext, assistant_text: &str) -> Result<()> {
        if !ctx.use_memory {
            return Ok(());
        }
        if let Some(memory) = &self.memory {
            let key = ctx.session_key();
            memory.append(&key, ChatMessage::user(&ctx.prompt))?;
            memory.append(&key, ChatMessage::assistant(assistant_text))?;
            debug!("Recorded turns for {}", key);
        }
        Ok(())
    }

    /// Folds an exchange outcome into the result envelope, recording the
    /// turns on success. Decode failures are the one case where the raw
    /// model text survives into the result.
    fn finish(&self, ctx: AskContext, outcome: Result<AskOutcome>) -> QueryResult {
        match outcome {
            Ok(outcome) => {
                if let Err(err) = self.record_turns(&ctx, &outcome.assistant_text) {
                    warn!("Failed to record conversation turns: {}", err);
                    return Self::failure(&ctx, &err);
                }
                info!("Query to {} succeeded", ctx.provider);
                QueryResult {
                    success: true,
                    provider: ctx.provider.as_str().to_string(),
                    model: ctx.model,
                    prompt: ctx.prompt,
                    response: Some(outcome.payload),
                    error: None,
                    raw: None,
                    temperature: ctx.options.temperature,
                    max_tokens: ctx.options.max_tokens,
                    session_id: ctx.options.session_id,
                }
            }
            Err(err) => {
                warn!("Query to {} failed: {}", ctx.provider, err);
                Self::failure(&ctx, &err)
            }
        }
    }

    fn failure(ctx: &AskContext, err: &GatewayError) -> QueryResult {
        let raw = match err {
            GatewayError::DecodeError { raw, .. } => Some(raw.clone()),
            _ => None,
        };
        QueryResult {
            success: false,
            provider: ctx.provider.as_str().to_string(),
            model: ctx.model.clone(),
            prompt: ctx.prompt.clone(),
            response: None,
            error: Some(err.to_string()),
            raw,
            temperature: ctx.options.temperature,
            max_tokens: ctx.options.max_tokens,
            session_id: ctx.options.session_id.clone(),
        }
    }

    fn unavailable(prompt: String, options: &AskOptions) -> QueryResult {
        QueryResult {
            success: false,
            provider: QueryResult::NONE.to_string(),
            model: QueryResult::NONE.to_string(),
            prompt,
            response: None,
            error: Some("No providers available".to_string()),
            raw: None,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            session_id: options.session_id.clone(),
        }
    }
}

/// Builder for constructing a `GatewayManager` with custom configuration.
pub struct GatewayManagerBuilder {
    registry: ProviderRegistry,
    clients: HashMap<ProviderId, Arc<dyn ProviderClient>>,
    memory: Option<Arc<dyn MemoryStore>>,
    tools: Option<ToolRegistry>,
    structured: bool,
    system_prompt: String,
}

impl GatewayManagerBuilder {
    fn new(registry: ProviderRegistry) -> Self {
        Self {
            registry,
            clients: HashMap::new(),
            memory: None,
            tools: None,
            structured: false,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Enable session memory backed by the given store.
    pub fn memory(mut self, store: Arc<dyn MemoryStore>) -> Self {
        self.memory = Some(store);
        self
    }

    /// Decode every reply as JSON instead of returning plain text.
    pub fn structured(mut self) -> Self {
        self.structured = true;
        self
    }

    /// Enable the tool protocol with the given registry.
    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Set the system prompt (default: "You are a helpful AI assistant.")
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Install a client for one provider instead of constructing the real
    /// one. Used to point a provider at a custom transport.
    pub fn client(mut self, provider: ProviderId, client: Arc<dyn ProviderClient>) -> Self {
        self.clients.insert(provider, client);
        self
    }

    /// Build the manager, constructing a client for every available
    /// provider that was not installed explicitly.
    pub fn build(self) -> Result<GatewayManager> {
        let mut clients = self.clients;
        for provider in self.registry.available_providers() {
            if !clients.contains_key(&provider) {
                clients.insert(provider, build_client(&self.registry, provider)?);
            }
        }
        Ok(GatewayManager {
            registry: self.registry,
            clients,
            memory: self.memory,
            tools: self.tools,
            structured: self.structured,
            system_prompt: self.system_prompt,
        })
    }
}
