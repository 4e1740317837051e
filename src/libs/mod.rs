pub mod adj;
pub mod config;
pub mod consensus;
pub mod dpi;
pub mod error;
pub mod expr;
pub mod graph;
pub mod io;
pub mod mi;
pub mod network;
pub mod stat;

pub use error::NetError;
