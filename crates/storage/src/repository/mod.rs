pub mod audit;
pub mod community;
pub mod config;
pub mod contest;
pub mod problem;
pub mod rating;
pub mod report;
pub mod target;
pub mod user;
