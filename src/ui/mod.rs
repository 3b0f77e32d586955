pub mod dashboard;
pub mod notice;
pub mod wizard;
