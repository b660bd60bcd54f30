pub mod diagnosis_types;
pub mod history_types;
pub mod intake_types;
