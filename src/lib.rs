// Library target holds the quiz core so integration tests and benches can
// drive it directly; the terminal front end lives in main.rs.
pub mod config;
pub mod engine;
pub mod error;
pub mod session;
pub mod speech;
pub mod store;
