//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod employee_repo;
pub mod project_repo;
pub mod role_repo;
pub mod session_repo;
pub mod work_report_repo;

pub use employee_repo::EmployeeRepo;
pub use project_repo::ProjectRepo;
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use work_report_repo::WorkReportRepo;
