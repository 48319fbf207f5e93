pub mod resume;
pub mod resume_data;
