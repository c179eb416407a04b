pub mod config_service;
pub mod paths;
pub mod storage;
pub mod toml_session_repository;

pub use crate::config_service::ConfigService;
pub use crate::paths::CentinelaPaths;
pub use crate::toml_session_repository::TomlSessionRepository;
