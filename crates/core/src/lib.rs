//! Domain logic for the project/timesheet management backend.
//!
//! Nothing in this crate talks to PostgreSQL or HTTP directly. Storage is
//! reached through the [`allocation::CodeLedger`] and
//! [`session::SessionStore`] traits, implemented by `pms-db`.

pub mod allocation;
pub mod error;
pub mod permissions;
pub mod project_code;
pub mod roles;
pub mod session;
pub mod types;
pub mod work_report;
