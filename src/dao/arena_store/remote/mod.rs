/// In-process stand-in for the remote REST endpoint, for tests.
#[cfg(test)]
pub mod emulator;
mod error;
mod models;
mod store;

pub use error::{RemoteDaoError, RemoteResult};
pub use store::RemoteArenaStore;
