mod error;
mod store;

pub use error::{LocalDaoError, LocalResult};
pub use store::LocalArenaStore;
