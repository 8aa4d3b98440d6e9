// src/sync.rs

pub mod mirror;
pub mod views;
