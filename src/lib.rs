pub mod cli;
pub mod error;
pub mod form;
pub mod render;
pub mod session;
pub mod storage;
pub mod store;
pub mod surface;
pub mod terminal;
pub mod types;
pub mod utils;
