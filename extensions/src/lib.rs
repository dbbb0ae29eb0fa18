pub mod animetrace;
pub mod cli;
pub mod store;
