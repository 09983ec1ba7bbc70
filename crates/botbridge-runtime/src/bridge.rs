//! Bridge composition root and lifecycle.

use crate::adapter::{AdapterMap, ChannelAdapter};
use crate::backend::BackendClient;
use crate::inbound::commands::CommandService;
use crate::inbound::dedup::TelegramInboundDeduper;
use crate::inbound::pipeline::{InboundPipeline, InboundPipelineDeps};
use crate::inbound::run::RunExecutionService;
use crate::inbound::session::SessionBindingService;
use crate::outbound::OutboundDispatcher;
use crate::reporting::{RunReporter, SessionModelMap};
use crate::session_store::{InMemorySessionStore, SessionStore};
use crate::state::registry::SessionRunRegistry;
use crate::stream::coordinator::{StreamCoordinator, StreamCoordinatorRegistry};
use crate::stream::hooks::{ChannelHooks, ChannelHooksRegistry};
use crate::stream::router::{EventRouter, EventRouterDeps};
use crate::stream::telegram::TelegramStreamCoordinator;
use crate::stream::telegram_hooks::TelegramChannelHooks;
use crate::typing::TypingManager;
use botbridge_core::{BridgeConfig, BridgeError, ChannelId, InboundMessage, ModelStore, Reporter, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Builder for wiring a [`Bridge`] together.
pub struct BridgeBuilder {
    config: BridgeConfig,
    backend: Option<Arc<dyn BackendClient>>,
    adapters: AdapterMap,
    store: Option<Arc<dyn SessionStore>>,
    reporter: Option<Arc<dyn Reporter>>,
    coordinators: Vec<(ChannelId, Arc<dyn StreamCoordinator>)>,
    hooks: Vec<(ChannelId, Arc<dyn ChannelHooks>)>,
}

impl BridgeBuilder {
    /// Start a builder from a configuration snapshot.
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            backend: None,
            adapters: AdapterMap::new(),
            store: None,
            reporter: None,
            coordinators: Vec::new(),
            hooks: Vec::new(),
        }
    }

    /// Set the agent backend client. Required.
    pub fn backend(mut self, backend: Arc<dyn BackendClient>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Register a channel adapter under its own channel id.
    pub fn adapter(mut self, adapter: Arc<dyn ChannelAdapter>) -> Self {
        self.adapters.insert(adapter.channel(), adapter);
        self
    }

    /// Set the session store. Defaults to an in-memory store.
    pub fn session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the optional host reporter.
    pub fn reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Register a stream coordinator, overriding any built-in one.
    pub fn coordinator(
        mut self,
        channel: ChannelId,
        coordinator: Arc<dyn StreamCoordinator>,
    ) -> Self {
        self.coordinators.push((channel, coordinator));
        self
    }

    /// Register channel hooks, overriding any built-in ones.
    pub fn hooks(mut self, channel: ChannelId, hooks: Arc<dyn ChannelHooks>) -> Self {
        self.hooks.push((channel, hooks));
        self
    }

    /// Wire everything together.
    pub fn build(self) -> Result<Bridge> {
        let backend = self
            .backend
            .ok_or_else(|| BridgeError::Config("backend client is required".into()))?;
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(InMemorySessionStore::new()));

        let adapters = Arc::new(self.adapters);
        let registry = Arc::new(SessionRunRegistry::new());
        let outbound = Arc::new(OutboundDispatcher::new(
            Arc::clone(&adapters),
            self.reporter.clone(),
        ));
        let typing = Arc::new(TypingManager::new(Arc::clone(&adapters)));
        let model_store = Arc::new(ModelStore::new());
        let reporter = Arc::new(RunReporter::new(
            self.reporter.clone(),
            Arc::new(SessionModelMap::new()),
        ));

        let mut coordinators = StreamCoordinatorRegistry::new();
        let mut hooks = ChannelHooksRegistry::new();
        if adapters.contains_key(&ChannelId::Telegram) {
            coordinators.register(
                ChannelId::Telegram,
                Arc::new(TelegramStreamCoordinator::new(
                    Arc::clone(&registry),
                    Arc::clone(&adapters),
                )),
            );
            hooks.register(ChannelId::Telegram, Arc::new(TelegramChannelHooks));
        }
        for (channel, coordinator) in self.coordinators {
            coordinators.register(channel, coordinator);
        }
        for (channel, channel_hooks) in self.hooks {
            hooks.register(channel, channel_hooks);
        }
        let coordinators = Arc::new(coordinators);
        let hooks = Arc::new(hooks);

        let commands = Arc::new(CommandService::new(
            self.config.clone(),
            Arc::clone(&store),
            Arc::clone(&model_store),
            Arc::clone(&outbound),
        ));
        let sessions = Arc::new(SessionBindingService::new(
            Arc::clone(&backend),
            Arc::clone(&store),
            Arc::clone(&outbound),
            self.reporter.clone(),
        ));
        let runner = Arc::new(RunExecutionService::new(
            self.config.clone(),
            Arc::clone(&backend),
            Arc::clone(&registry),
            Arc::clone(&typing),
            Arc::clone(&coordinators),
            model_store,
            Arc::clone(&reporter),
            Arc::clone(&outbound),
        ));
        let pipeline = Arc::new(InboundPipeline::new(InboundPipelineDeps {
            config: self.config.clone(),
            adapters: Arc::clone(&adapters),
            store,
            registry: Arc::clone(&registry),
            deduper: Arc::new(TelegramInboundDeduper::default()),
            commands,
            sessions,
            runner,
            reporter: self.reporter.clone(),
        }));
        let router = Arc::new(EventRouter::new(EventRouterDeps {
            config: self.config,
            backend: Arc::clone(&backend),
            registry: Arc::clone(&registry),
            typing: Arc::clone(&typing),
            coordinators,
            hooks,
            outbound,
            reporter,
        }));

        Ok(Bridge {
            adapters,
            backend,
            registry,
            typing,
            pipeline,
            router,
            cancel: CancellationToken::new(),
            router_task: Mutex::new(None),
        })
    }
}

/// A running bridge instance.
///
/// Adapters hand received messages to
/// [`dispatch_inbound`](Self::dispatch_inbound); [`stop`](Self::stop)
/// drains pending session tasks and shuts everything down.
pub struct Bridge {
    adapters: Arc<AdapterMap>,
    backend: Arc<dyn BackendClient>,
    registry: Arc<SessionRunRegistry>,
    typing: Arc<TypingManager>,
    pipeline: Arc<InboundPipeline>,
    router: Arc<EventRouter>,
    cancel: CancellationToken,
    router_task: Mutex<Option<JoinHandle<()>>>,
}

impl Bridge {
    /// Start adapters and the event stream consumer.
    ///
    /// Adapter start failures are recoverable and only logged; a failure
    /// to establish the event subscription is fatal and returned.
    pub async fn start(&self) -> Result<()> {
        if self.router_task.lock().is_some() {
            return Ok(());
        }

        for (channel, adapter) in self.adapters.iter() {
            if let Err(err) = adapter.start().await {
                warn!(channel = %channel, error = %err, "adapter start failed");
            }
        }

        let stream = self.backend.subscribe(self.cancel.child_token()).await?;
        let router = Arc::clone(&self.router);
        let cancel = self.cancel.clone();
        let task = tokio::spawn(async move {
            router.run(stream, cancel).await;
        });
        *self.router_task.lock() = Some(task);

        info!(channels = self.adapters.len(), "bridge started");
        Ok(())
    }

    /// The single entry point adapters use to hand off a message.
    pub async fn dispatch_inbound(&self, message: InboundMessage) {
        self.pipeline.dispatch_inbound(message).await;
    }

    /// Graceful shutdown: stop the stream consumer, drain session tasks,
    /// stop typing loops and adapters.
    pub async fn stop(&self) {
        self.cancel.cancel();
        let task = self.router_task.lock().take();
        if let Some(task) = task {
            if let Err(err) = task.await {
                warn!(error = %err, "event stream consumer panicked");
            }
        }

        self.registry.wait_idle().await;
        self.typing.stop_all();

        for (channel, adapter) in self.adapters.iter() {
            if let Err(err) = adapter.stop().await {
                warn!(channel = %channel, error = %err, "adapter stop failed");
            }
        }
        info!("bridge stopped");
    }
}
