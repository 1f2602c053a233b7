//! In-process validation bridge.
//!
//! Models the request/response exchange between an unprivileged consumer
//! (e.g. a UI process) and the privileged side that can read license files:
//!
//! - Only [`VALIDATE_LICENSE_REQUEST`] may be sent and only
//!   [`VALIDATE_LICENSE_RESPONSE`] may be subscribed to with
//!   [`BridgeHandle::on_receive`].
//! - [`BridgeHandle::send`] is fire-and-forget; its result goes to every
//!   sink the handle registered. [`BridgeHandle::request`] carries its own
//!   `oneshot` reply slot and is answered exactly once.
//! - The requester's [`RequestOrigin`] stays on the privileged side; the
//!   consumer only ever receives a [`ValidationResult`].

use crate::config::ValidatorConfig;
use crate::manager::{LicenseValidator, ValidationContext, ValidationResult};
use crate::protocol::version::parse_version;
use crate::storage::ArtifactPaths;
use crate::LicenseSealError;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};

/// Channel carrying validation requests (no payload).
pub const VALIDATE_LICENSE_REQUEST: &str = "ValidateLicense-Request";

/// Channel carrying validation results.
pub const VALIDATE_LICENSE_RESPONSE: &str = "ValidateLicense-Response";

/// Pending request capacity before senders wait.
const REQUEST_QUEUE_DEPTH: usize = 32;

/// The two allowlisted bridge channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Consumer to validator.
    ValidateRequest,
    /// Validator to consumer.
    ValidateResponse,
}

impl Channel {
    /// Wire name of the channel.
    pub fn name(&self) -> &'static str {
        match self {
            Channel::ValidateRequest => VALIDATE_LICENSE_REQUEST,
            Channel::ValidateResponse => VALIDATE_LICENSE_RESPONSE,
        }
    }

    /// Resolve a wire name; anything not allowlisted yields `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            VALIDATE_LICENSE_REQUEST => Some(Channel::ValidateRequest),
            VALIDATE_LICENSE_RESPONSE => Some(Channel::ValidateResponse),
            _ => None,
        }
    }
}

/// Identity of the party that sent a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOrigin {
    /// Free-form sender label, used in logs only.
    pub sender: String,
}

/// Response sinks registered through `on_receive`.
type Listeners = Arc<Mutex<Vec<mpsc::UnboundedSender<ValidationResult>>>>;

enum Reply {
    Once(oneshot::Sender<ValidationResult>),
    Listeners(Listeners),
}

struct ValidationRequest {
    origin: RequestOrigin,
    reply: Reply,
}

/// Consumer-side handle to a running bridge.
///
/// Clones share their response sinks; [`BridgeHandle::with_origin`] starts
/// a handle with none. The bridge stops once every handle is dropped.
#[derive(Clone)]
pub struct BridgeHandle {
    requests: mpsc::Sender<ValidationRequest>,
    origin: RequestOrigin,
    listeners: Listeners,
}

impl BridgeHandle {
    fn for_origin(requests: mpsc::Sender<ValidationRequest>, sender: String) -> Self {
        Self {
            requests,
            origin: RequestOrigin { sender },
            listeners: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Handle for another consumer, labelling its requests with `sender`.
    pub fn with_origin(&self, sender: impl Into<String>) -> Self {
        Self::for_origin(self.requests.clone(), sender.into())
    }

    /// Subscribe `sink` to results of this handle's [`BridgeHandle::send`]
    /// calls.
    ///
    /// # Errors
    /// `Transport` if `channel` is not the response channel.
    pub fn on_receive(
        &self,
        channel: &str,
        sink: mpsc::UnboundedSender<ValidationResult>,
    ) -> Result<(), LicenseSealError> {
        if Channel::from_name(channel) != Some(Channel::ValidateResponse) {
            return Err(LicenseSealError::Transport(format!(
                "channel '{}' is not allowed for receiving",
                channel
            )));
        }
        let mut listeners = self
            .listeners
            .lock()
            .map_err(|_| LicenseSealError::Transport("listener registry poisoned".to_string()))?;
        listeners.push(sink);
        Ok(())
    }

    /// Ask for a validation on `channel` without waiting for it.
    ///
    /// The result is delivered to the sinks registered with
    /// [`BridgeHandle::on_receive`]; with none registered it is dropped.
    ///
    /// # Errors
    /// `Transport` if the channel is not the request channel or the bridge
    /// has shut down.
    pub async fn send(&self, channel: &str) -> Result<(), LicenseSealError> {
        check_request_channel(channel)?;
        self.enqueue(Reply::Listeners(Arc::clone(&self.listeners)))
            .await
    }

    /// Request a validation and wait for its result.
    pub async fn request(&self) -> Result<ValidationResult, LicenseSealError> {
        let (reply, response) = oneshot::channel();
        self.enqueue(Reply::Once(reply)).await?;
        response.await.map_err(|_| {
            LicenseSealError::Transport("validation bridge dropped the request".to_string())
        })
    }

    async fn enqueue(&self, reply: Reply) -> Result<(), LicenseSealError> {
        let request = ValidationRequest {
            origin: self.origin.clone(),
            reply,
        };
        self.requests
            .send(request)
            .await
            .map_err(|_| LicenseSealError::Transport("validation bridge is closed".to_string()))
    }
}

fn check_request_channel(channel: &str) -> Result<(), LicenseSealError> {
    match Channel::from_name(channel) {
        Some(Channel::ValidateRequest) => Ok(()),
        _ => Err(LicenseSealError::Transport(format!(
            "channel '{}' is not allowed for sending",
            channel
        ))),
    }
}

/// Privileged side of the bridge.
pub struct ValidationBridge;

impl ValidationBridge {
    /// Start serving validation requests on the current tokio runtime.
    ///
    /// # Errors
    /// * `Config` - `config` has no artifact paths
    /// * `Transport` - Called outside a tokio runtime
    pub fn spawn(
        validator: LicenseValidator,
        config: ValidatorConfig,
    ) -> Result<BridgeHandle, LicenseSealError> {
        config.validate()?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| LicenseSealError::Transport(format!("no tokio runtime: {}", e)))?;

        let paths = config
            .paths
            .ok_or_else(|| LicenseSealError::Config("artifact paths must be set".to_string()))?;
        let context = ValidationContext::new(config.version.unwrap_or_default());

        let (requests, receiver) = mpsc::channel(REQUEST_QUEUE_DEPTH);
        runtime.spawn(serve(receiver, validator, paths, context));

        Ok(BridgeHandle::for_origin(requests, "default".to_string()))
    }
}

async fn serve(
    mut receiver: mpsc::Receiver<ValidationRequest>,
    validator: LicenseValidator,
    paths: ArtifactPaths,
    context: ValidationContext,
) {
    while let Some(ValidationRequest { origin, reply }) = receiver.recv().await {
        tracing::debug!(sender = %origin.sender, "validation requested");

        let validator = validator.clone();
        let paths = paths.clone();
        let context = context.clone();
        tokio::spawn(async move {
            let fallback_version = context.version.clone();
            let result = tokio::task::spawn_blocking(move || validator.validate_in(&paths, &context))
                .await
                .unwrap_or_else(|e| {
                    tracing::error!(error = %e, "validation task failed");
                    ValidationResult::failed(parse_version(&fallback_version))
                });
            deliver(&origin, reply, result);
        });
    }

    tracing::debug!("validation bridge stopped");
}

fn deliver(origin: &RequestOrigin, reply: Reply, result: ValidationResult) {
    match reply {
        Reply::Once(slot) => {
            // The requester may have stopped waiting.
            if slot.send(result).is_err() {
                tracing::debug!(sender = %origin.sender, "requester went away before the response");
            }
        }
        Reply::Listeners(listeners) => {
            if let Ok(mut sinks) = listeners.lock() {
                sinks.retain(|sink| sink.send(result.clone()).is_ok());
                if sinks.is_empty() {
                    tracing::debug!(sender = %origin.sender, "no receiver for validation response");
                }
            }
        }
    }
}
