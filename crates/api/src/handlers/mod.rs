pub mod auth;
pub mod employee;
pub mod health;
pub mod project;
pub mod role;
pub mod work_report;
