// src/handlers.rs

pub mod auth;
pub mod contracts;
pub mod crm;
pub mod dashboard;
pub mod documents;
pub mod finance;
pub mod live;
pub mod partners;
pub mod reports;
pub mod tasks;
