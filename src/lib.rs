pub mod analyzer;
pub mod cli;
pub mod config;
pub mod error;
pub mod gemini;
pub mod notify;
pub mod scanner;
pub mod server;
pub mod service;
pub mod storage;
pub mod store;
