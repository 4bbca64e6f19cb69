//! Wallet SDK: credential issuance and verification, DID resolution and
//! creation, exposed to a single-threaded host as promise-returning functions.

pub mod config;

use std::{collections::HashMap, sync::Arc, time::Duration};

use bridge::{
    bindings::{
        CreateDid, Interaction, IssueCredential, RequestCredentialWithPreAuth, ResolveDid, VerifyCredential,
    },
    AsyncFunction, HostError, Promise, Runner,
};
use credential::{api::DidResolver, Signer};
use eyre::Result;
use serde_json::Value;
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

pub use bridge;
pub use config::SdkConfig;
pub use credential;
pub use did_utils;

/// Installs the global tracing subscriber.
pub fn init_tracing(config: &SdkConfig) -> Result<()> {
    let tracing_layer = tracing_subscriber::fmt::layer();
    let filter = filter::Targets::new()
        .with_target("bridge", config.log_level)
        .with_target("credential", config.log_level)
        .with_default(config.log_level);

    tracing_subscriber::registry()
        .with(tracing_layer)
        .with(filter)
        .try_init()?;

    Ok(())
}

/// The functions of the SDK, callable by name from the host thread.
pub struct Sdk {
    runner: Runner,
    functions: HashMap<&'static str, AsyncFunction>,
}

impl Sdk {
    pub fn new(
        config: &SdkConfig,
        signer: Arc<Signer>,
        resolver: Arc<dyn DidResolver>,
        interaction: Arc<dyn Interaction>,
    ) -> Result<Self> {
        let runner = Runner::new(&config.runner_config())?;

        let functions: HashMap<_, _> = [
            runner.function(IssueCredential::new(signer.clone())),
            runner.function(VerifyCredential::new(signer)),
            runner.function(ResolveDid::new(resolver)),
            runner.function(CreateDid::new()),
            runner.function(RequestCredentialWithPreAuth::new(interaction)),
        ]
        .into_iter()
        .map(|function| (function.name(), function))
        .collect();

        Ok(Self { runner, functions })
    }

    /// Names of the callable functions, sorted.
    pub fn functions(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.functions.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Calls the function `name` with a named-arguments object.
    pub fn call(&self, name: &str, args: Value) -> Result<Promise, HostError> {
        let function = self
            .functions
            .get(name)
            .ok_or_else(|| HostError::invalid_argument(format!("unknown function {name}")))?;

        function.call_value(args)
    }

    /// Settles every call completed so far.
    pub fn poll(&self) -> usize {
        self.runner.poll()
    }

    /// Waits up to `timeout` for a call to complete, then settles what completed.
    pub fn wait(&self, timeout: Duration) -> usize {
        self.runner.wait(timeout)
    }

    pub fn pending(&self) -> usize {
        self.runner.pending()
    }
}
