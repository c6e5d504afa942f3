pub mod abuse;
pub mod audit;
pub mod moderation;
pub mod rating_engine;
pub mod rating_runs;
pub mod reports;
