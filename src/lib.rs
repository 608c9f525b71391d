pub mod config;
pub mod export;
pub mod grading;
pub mod ledger;
pub mod market;
pub mod matcher;
pub mod matchup;
pub mod report;
pub mod sources;
pub mod synth;
pub mod teams;
