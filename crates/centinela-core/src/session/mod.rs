//! Operator session: credentials, persistence and lifecycle.

mod manager;
mod model;
mod repository;

#[cfg(test)]
mod manager_test;

pub use manager::SessionManager;
pub use model::{Credentials, Session, SessionSnapshot};
pub use repository::SessionRepository;
