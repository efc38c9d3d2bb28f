//! Containers and plumbing shared by the map and the mapper.

mod dispatcher;
mod handle;
mod small_vec;

pub use dispatcher::Dispatcher;
pub use handle::{Handle, Store, StoreId};
pub use small_vec::{IntoIter, SmallVec, SmallVecError};
