//! Durable storage for the session credential.
//!
//! This module provides:
//! - `TokenStore`: the key-value seam the API client persists tokens through
//! - `FileStore`: a JSON file in the storage directory (default)
//! - `KeyringStore`: OS-level storage via keyring
//! - `MemoryStore`: process-local storage for tests and throwaway sessions
//!
//! The access token lives under `ACCESS_TOKEN_KEY` and the refresh token
//! under `REFRESH_TOKEN_KEY`; at most one of each is stored.

pub mod credentials;
pub mod store;

pub use credentials::KeyringStore;
pub use store::{FileStore, MemoryStore, StoreError, TokenStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
