//! JSON-RPC ledger client.
//!
//! Reads go to a node's `condenser_api`. Votes are not signed here: each
//! request is forwarded, with the voter's credential, to an external signer
//! endpoint that builds, signs and broadcasts the transaction. The signer's
//! rejection is classified into [`SubmitError`](vanguard_client::SubmitError)
//! by [`classify`].

pub mod classify;
pub mod client;
pub mod config;
pub mod error;
pub mod wire;

pub use classify::classify;
pub use client::RpcClient;
pub use config::RpcConfig;
pub use error::RpcError;
