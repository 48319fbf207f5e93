// Resume Store: durable CRUD over the resume collection, active-resume tracking
// and debounced auto-save of live edits.
// Storage access goes through storage::ResumeRepository only.

pub mod handlers;
pub mod resume_store;
pub mod timer;

pub use resume_store::{DataSink, ResumeStore, StoreTimings};
