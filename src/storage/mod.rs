pub mod error;
pub mod file;
pub mod legacy;
pub mod manager;
pub mod memory;
pub mod snapshot;
pub mod status;
pub mod worker;
