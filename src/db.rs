pub mod paths;
pub use paths::{Collection, CollectionPath, RecordOwner, Scope};
pub mod store;
pub use store::DocumentStore;
pub mod memory_store;
pub use memory_store::MemoryStore;
pub mod pg_store;
pub use pg_store::PgDocumentStore;
pub mod blob_store;
pub use blob_store::{BlobStore, LocalBlobStore};
pub mod records;

pub mod crm_repo;
pub use crm_repo::CrmRepository;
pub mod contracts_repo;
pub use contracts_repo::ContractsRepository;
pub mod tasks_repo;
pub use tasks_repo::TasksRepository;
pub mod partners_repo;
pub use partners_repo::PartnersRepository;
pub mod finance_repo;
pub use finance_repo::FinanceRepository;
