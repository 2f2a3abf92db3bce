//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A create DTO for inserts
//! - An update DTO (all `Option` fields) where rows are mutable

pub mod employee;
pub mod project;
pub mod role;
pub mod session;
pub mod work_report;
