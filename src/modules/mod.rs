pub mod analyze;
pub mod generate;
pub mod insights;
pub mod journal;
pub mod status;
