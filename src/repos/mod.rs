pub mod error;
pub mod memory;
pub mod postgres;
pub mod profile_store;

pub use memory::InMemoryProfileStore;
pub use postgres::PgProfileStore;
pub use profile_store::ProfileStore;
