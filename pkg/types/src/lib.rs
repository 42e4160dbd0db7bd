pub mod catalog;
pub mod config;
pub mod discovery;
pub mod rbac;
pub mod selection;
pub mod validate;
