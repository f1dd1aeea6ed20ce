pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use common::{PurchaseId, StoreId};
pub use error::{RepositoryError, Result};
pub use memory::InMemoryPurchaseRepository;
pub use postgres::PostgresPurchaseRepository;
pub use store::{PurchaseRepository, StoreOutcome};
