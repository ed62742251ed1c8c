mod contact_repo;
mod import_batch_repo;
mod import_log_repo;

pub use contact_repo::ContactRepo;
pub use import_batch_repo::ImportBatchRepo;
pub use import_log_repo::ImportLogRepo;
