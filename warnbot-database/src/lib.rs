pub mod model;
pub mod store;

pub use model::WarnRecord;
pub use store::{StoreConfig, StoreKind, WarnBackend, WarnStore};
