pub mod auth;

pub use auth::{ArchivedAccess, WriteAccess};
