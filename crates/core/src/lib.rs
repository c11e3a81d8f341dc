//! # ShiftFlow Core
//!
//! Domain layer for the ShiftFlow scheduling service: shift templates, draft and
//! published shifts, staff assignments with their lifecycle state machine, exception
//! requests, the labor-law rule engine, and the sync event contract.
//!
//! Everything in this crate is pure: no I/O, no clocks other than values passed in,
//! no database handles. The `db` and `api` crates orchestrate; this crate decides.

pub mod availability;
pub mod errors;
pub mod models;
pub mod rules;
