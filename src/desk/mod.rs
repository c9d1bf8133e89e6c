// src/desk/mod.rs
pub mod account;
pub mod eligibility;
pub mod engine;
pub mod executor;
pub mod holdings;
