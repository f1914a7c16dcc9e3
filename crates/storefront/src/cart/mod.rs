//! Cart state management.
//!
//! # Architecture
//!
//! The cart lives in three places with a strict precedence order:
//!
//! 1. **In-memory** ([`CartStore`]) - authoritative for the current request.
//! 2. **Persisted blob** ([`CartStorage`]) - the session entry under the
//!    fixed key `"cart"`, overwritten wholesale on every mutation. Read
//!    once at hydration; read/write failures are logged and non-fatal.
//! 3. **Remote mirror** ([`CartMirror`]) - the per-user cart resource on
//!    the store API. Strictly advisory: pushed best-effort after adds,
//!    fetched once at hydration, and never allowed to roll back or block
//!    a local mutation.
//!
//! A store is hydrated exactly once per request
//! (`Uninitialized -> Hydrating -> Ready`); mutations that arrive before
//! hydration completes are queued and replayed in arrival order.

mod mirror;
mod storage;
mod store;

pub use mirror::{CartMirror, RemoteCartMirror};
pub use storage::{CartStorage, MemoryCartStorage, SessionCartStorage, StorageError};
pub use store::{CartLine, CartStatus, CartStore, HydrateOutcome, MutationOutcome};
