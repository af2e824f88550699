pub mod persistence;
pub mod store;
pub mod vault;

pub use persistence::Persistence;
pub use store::{PrefStore, Record};
