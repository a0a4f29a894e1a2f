//! Job postings and applications: the CRUD half of the board.

pub mod domain;
mod memory;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicationId, ApplicationInput, ApplicationStatus, BoardValidationError, Job, JobApplication,
    JobDraft, JobFilter, JobId,
};
pub use memory::InMemoryBoardRepository;
pub use repository::BoardRepository;
pub use router::board_router;
pub use service::{BoardServiceError, JobBoardService};
