//! Core planning logic for Pennyplan.
//!
//! This crate contains the pure projection engine with no I/O: given account
//! snapshots, declared income and a rates table, it produces a month-by-month
//! projection of every account.
//!
//! # Modules
//!
//! - `planning` - Income, deduction, transfer and credit card projection

pub mod planning;
