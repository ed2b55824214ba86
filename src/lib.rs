//! Monthly transaction reports from CSV files.
//!
//! Transactions are parsed from CSV ([`csv`]), accumulated by a
//! [`handler::ReportHandler`] and summarised into a
//! [`domain::report::ReportResult`], which [`pipeline`] hands to a
//! [`notification::Notification`].

pub mod config;
pub mod csv;
pub mod domain;
pub mod error;
pub mod handler;
pub mod logging;
pub mod notification;
pub mod pipeline;
pub mod store;
