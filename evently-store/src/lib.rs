pub mod app_config;
pub mod session;

pub use app_config::Config;
pub use session::{FileBackend, MemoryBackend, Session, SessionBackend, SessionError, SessionState, Theme};
