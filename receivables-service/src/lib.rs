//! Receivables Service - field-payment reconciliation, AR aging, and
//! delivery-exception resolution for the distribution dashboard.

pub mod config;
pub mod models;
pub mod services;
