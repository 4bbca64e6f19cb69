//! Exposes the wallet's blocking operations to a single-threaded host as
//! promise-returning functions.
//!
//! ```
//! use bridge::{bindings::CreateDid, NamedArgs, Runner, RunnerConfig};
//! use serde_json::json;
//! use std::time::Duration;
//!
//! let runner = Runner::new(&RunnerConfig::default()).unwrap();
//! let create_did = runner.function(CreateDid::new());
//!
//! let jwk = json!({ "kty": "OKP", "crv": "Ed25519", "x": "O2onvM62pC1io6jQKm8Nc2UyFXcd4kOmOsBIoYtZ2ik" });
//! let promise = create_did.call(&NamedArgs::new().with("jwk", jwk)).unwrap();
//!
//! while runner.pending() > 0 {
//!     runner.wait(Duration::from_secs(5));
//! }
//!
//! let output = promise.outcome().unwrap().unwrap();
//! assert!(output["didDocument"]["id"].as_str().unwrap().starts_with("did:jwk:"));
//! ```

pub mod bindings;
pub mod host;
mod runner;

pub use host::{HostError, HostErrorKind, HostValue, NamedArgs};
pub use runner::{AsyncFunction, BridgedOperation, Outcome, Promise, Runner, RunnerConfig};
