pub mod audit;
pub mod common;
pub mod rating;
pub mod report;
pub mod submission;
