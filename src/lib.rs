pub mod bot;
pub mod config;
pub mod feedback;
pub mod logging;
pub mod schedule;
pub mod state;
pub mod storage;
pub mod usage;
