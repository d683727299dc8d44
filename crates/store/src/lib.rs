pub mod error;
pub mod in_process;
pub mod live;
pub mod namespace;
pub mod persistence;
pub mod redis_store;
pub mod static_data;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use in_process::InProcessStore;
pub use live::LiveData;
pub use namespace::{NamespaceConfig, NamespacePolicy};
pub use redis_store::RedisStore;
pub use static_data::{StaticData, StaticDataHandle};
pub use static_data::{load_snapshot as load_static_snapshot, write_snapshot as write_static_snapshot};
pub use traits::{Store, StoreExt};
