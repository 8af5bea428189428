//! # services
//!
//! Business logic of the marketplace, written against the `domains` ports.
//! Every operation takes the acting user explicitly; there is no ambient
//! request context threaded through these calls.

pub mod ad_boards;
pub mod commands;
pub mod creatives;
pub mod media;
pub mod reconciliation;
pub mod users;
pub mod validate;

pub use ad_boards::AdBoardService;
pub use creatives::CreativeService;
pub use media::MediaService;
pub use reconciliation::ReconciliationService;
pub use users::UserService;
