//! Core module - cache, session, routing, and configuration

pub mod cache;
pub mod config;
pub mod entity;
pub mod invalidation;
pub mod route;
pub mod session;
pub mod storage;

pub use cache::{CacheError, CacheEvent, CacheStats, Filters, QueryCache, QueryKey};
pub use config::{Config, ConfigError};
pub use entity::{ApiFamily, Record, Relation, Resource};
pub use invalidation::{Action, Mutation};
pub use route::{guard, AuthState, Guard, Navigator, Route, Screen};
pub use session::{Session, SessionError};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
