pub mod auth;
pub mod record;
pub use record::Record;
pub mod crm;
pub mod contracts;
pub mod tasks;
pub mod partners;
pub mod finance;
pub mod reports;
pub mod dashboard;
