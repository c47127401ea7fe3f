//! Data models: configuration, questionnaire profile and report records.

pub mod config;
pub mod profile;
pub mod report;
