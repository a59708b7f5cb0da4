pub mod add;
pub mod aggregate;
pub mod export;
pub mod list;
pub mod remove;
pub mod report;
pub mod update;
