//! Command dispatch.
//!
//! [`CommandSender`] is the write-side counterpart of
//! [`crate::fetcher::QueryFetcher`]: same priority-ordered handler
//! resolution, same decoder chain, same profiling, but no cache - commands
//! are never served from or written to a store.
//!
//! # Example
//!
//! ```
//! use cqrs_dispatch::handler::CallbackCommandHandler;
//! use cqrs_dispatch::request::{Command, Payload};
//! use cqrs_dispatch::sender::CommandSender;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let sender = CommandSender::builder()
//!     .handler(CallbackCommandHandler)
//!     .build();
//!
//! struct TouchCommand;
//!
//! impl Command for TouchCommand {
//!     fn request_type(&self) -> &str {
//!         "callable"
//!     }
//!
//!     fn create_request(&self) -> Payload {
//!         Payload::Callback(Arc::new(|| Ok(json!("touched"))))
//!     }
//! }
//!
//! assert_eq!(sender.send(&TouchCommand).unwrap(), json!("touched"));
//! ```

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use serde_json::Value;

use crate::decoder::ResponseDecoder;
use crate::dispatch::{self, DispatchContext, NoImpureCache};
use crate::error::{DispatchError, Result};
use crate::handler::CommandHandler;
use crate::priority::{PrioritizedRegistry, PRIORITY_MEDIUM};
use crate::profiler::{ItemType, ProfilerBag};
use crate::request::{Command, Initiator};

type HandlerRegistry = PrioritizedRegistry<Arc<dyn CommandHandler>>;
type DecoderRegistry = PrioritizedRegistry<Arc<dyn ResponseDecoder>>;

/// Builder for [`CommandSender`]. Handlers and decoders default to
/// [`PRIORITY_MEDIUM`].
pub struct CommandSenderBuilder {
    handlers: HandlerRegistry,
    decoders: DecoderRegistry,
    profiler_bag: Option<Arc<ProfilerBag>>,
}

impl CommandSenderBuilder {
    fn new() -> Self {
        Self {
            handlers: PrioritizedRegistry::new(),
            decoders: PrioritizedRegistry::new(),
            profiler_bag: None,
        }
    }

    /// Register a handler at the default priority.
    pub fn handler(self, handler: impl CommandHandler + 'static) -> Self {
        self.shared_handler(Arc::new(handler), PRIORITY_MEDIUM)
    }

    /// Register a handler at an explicit priority.
    pub fn handler_with_priority(self, handler: impl CommandHandler + 'static, priority: i32) -> Self {
        self.shared_handler(Arc::new(handler), priority)
    }

    /// Register an already shared handler at an explicit priority.
    pub fn shared_handler(mut self, handler: Arc<dyn CommandHandler>, priority: i32) -> Self {
        self.handlers.add((handler, priority));
        self
    }

    /// Register a decoder at the default priority.
    pub fn decoder(self, decoder: impl ResponseDecoder + 'static) -> Self {
        self.shared_decoder(Arc::new(decoder), PRIORITY_MEDIUM)
    }

    /// Register a decoder at an explicit priority.
    pub fn decoder_with_priority(self, decoder: impl ResponseDecoder + 'static, priority: i32) -> Self {
        self.shared_decoder(Arc::new(decoder), priority)
    }

    /// Register an already shared decoder at an explicit priority.
    pub fn shared_decoder(mut self, decoder: Arc<dyn ResponseDecoder>, priority: i32) -> Self {
        self.decoders.add((decoder, priority));
        self
    }

    /// Supply a profiler bag; enables profiling for profileable commands.
    pub fn profiler_bag(mut self, profiler_bag: Arc<ProfilerBag>) -> Self {
        self.profiler_bag = Some(profiler_bag);
        self
    }

    /// Build the sender.
    pub fn build(self) -> CommandSender {
        CommandSender {
            handlers: RwLock::new(self.handlers),
            decoders: RwLock::new(self.decoders),
            profiler_bag: self.profiler_bag,
        }
    }
}

/// Dispatches commands to the first supporting handler and decodes the
/// result.
pub struct CommandSender {
    handlers: RwLock<HandlerRegistry>,
    decoders: RwLock<DecoderRegistry>,
    profiler_bag: Option<Arc<ProfilerBag>>,
}

impl CommandSender {
    /// Start building a sender.
    pub fn builder() -> CommandSenderBuilder {
        CommandSenderBuilder::new()
    }

    fn handlers(&self) -> RwLockReadGuard<'_, HandlerRegistry> {
        self.handlers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn decoders(&self) -> RwLockReadGuard<'_, DecoderRegistry> {
        self.decoders.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a handler after construction.
    pub fn add_handler(&self, handler: impl CommandHandler + 'static, priority: i32) {
        self.add_shared_handler(Arc::new(handler), priority);
    }

    /// Register an already shared handler after construction.
    pub fn add_shared_handler(&self, handler: Arc<dyn CommandHandler>, priority: i32) {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .add((handler, priority));
    }

    /// Register a decoder after construction.
    pub fn add_decoder(&self, decoder: impl ResponseDecoder + 'static, priority: i32) {
        self.add_shared_decoder(Arc::new(decoder), priority);
    }

    /// Register an already shared decoder after construction.
    pub fn add_shared_decoder(&self, decoder: Arc<dyn ResponseDecoder>, priority: i32) {
        self.decoders
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .add((decoder, priority));
    }

    /// Names of every registered handler, in priority order.
    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers().iter().map(|handler| handler.name()).collect()
    }

    /// The profiler bag this sender records into, if any.
    pub fn profiler_bag(&self) -> Option<&Arc<ProfilerBag>> {
        self.profiler_bag.as_ref()
    }

    /// Dispatch a command through the first supporting handler and decode
    /// the response.
    pub fn send(&self, command: &dyn Command) -> Result<Value> {
        let mut ctx = DispatchContext::new(Initiator::Command(command));
        let bag = self.profiler_bag.as_deref();

        // Snapshots keep the registries unlocked while handlers and
        // decoders run, so a decoder may reenter this sender.
        let handlers = self.handlers().to_vec();
        let decoders = self.decoders().to_vec();

        for handler in &handlers {
            if handler.supports(command) {
                handler.prepare(command);
            }
        }

        dispatch::start_profile(bag, &mut ctx, ItemType::Command);

        for handler in &handlers {
            if !handler.supports(command) {
                continue;
            }

            let Some(outcome) = handler.handle(command) else {
                continue;
            };

            match outcome {
                Ok(response) => ctx.record_success(handler.name(), false, response),
                Err(error) => ctx.record_error(handler.name(), false, error),
            }

            tracing::debug!(
                command = command.name(),
                handler = handler.name(),
                "command handled"
            );
            dispatch::record_handled_step(bag, &ctx);

            if ctx.error().is_none() {
                dispatch::decode_response(&mut ctx, &decoders, bag, &NoImpureCache);
            }

            dispatch::finish_profile(bag, &ctx);

            if let Some(error) = ctx.take_error() {
                return Err(DispatchError::Handler {
                    handler: handler.name().to_string(),
                    source: error,
                });
            }

            return Ok(ctx.take_response().unwrap_or(Value::Null));
        }

        Err(DispatchError::NoHandlerUsed {
            request_type: command.request_type().to_string(),
            handlers: self
                .handler_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
        })
    }
}
