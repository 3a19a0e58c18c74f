//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Methods the group workflow
//! calls inside a transaction take any [`sqlx::PgExecutor`] instead, so they
//! work with both `&PgPool` and `&mut *tx`.

pub mod candidate_repo;
pub mod class_repo;
pub mod confirmation_repo;
pub mod event_repo;
pub mod group_repo;
pub mod job_repo;
pub mod note_repo;
pub mod offer_repo;
pub mod rating_repo;
pub mod refresh_session_repo;
pub mod role_repo;
pub mod shortlist_repo;
pub mod user_repo;
pub mod vote_repo;

pub use candidate_repo::CandidateRepo;
pub use class_repo::ClassRepo;
pub use confirmation_repo::ConfirmationRepo;
pub use event_repo::EventRepo;
pub use group_repo::GroupRepo;
pub use job_repo::JobRepo;
pub use note_repo::NoteRepo;
pub use offer_repo::OfferRepo;
pub use rating_repo::RatingRepo;
pub use refresh_session_repo::RefreshSessionRepo;
pub use role_repo::RoleRepo;
pub use shortlist_repo::ShortlistRepo;
pub use user_repo::UserRepo;
pub use vote_repo::VoteRepo;
