// src/services.rs

pub mod aggregation;
pub mod auth;
pub mod contract_service;
pub mod crm_service;
pub mod finance_service;
pub mod hooks;
pub mod partner_service;
pub mod report_service;
pub mod task_service;

pub use auth::SessionService;
pub use contract_service::ContractService;
pub use crm_service::CrmService;
pub use finance_service::FinanceService;
pub use partner_service::PartnerService;
pub use report_service::{ReportIssuer, ReportService};
pub use task_service::TaskService;
