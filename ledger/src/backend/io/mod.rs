//! # IO Module
//!
//! Interface layer between the ledger and the outside world. It translates
//! between the `shared` DTOs and domain types and holds no business logic.

pub mod rest;
