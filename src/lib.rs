pub mod app;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod entity;
pub mod error;
pub mod fixtures;
pub mod ledger;
pub mod notify;
pub mod repository;
pub mod route;
pub mod session;
pub mod storage;
pub mod theme;
pub mod warnings;
pub mod workflow;

pub use app::AppContext;
pub use error::{Result, StockflowError};
pub use storage::LocalStorage;
