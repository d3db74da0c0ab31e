pub mod config;
pub mod pin;
pub mod run;
pub mod schedule;
pub mod word;
