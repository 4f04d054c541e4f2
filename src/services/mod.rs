//! Request orchestration: each operation validates its input, then calls the
//! backend step by step. There are no transactions; a failure part way
//! through leaves the earlier steps in place.

pub mod access_service;
pub mod comment_service;
pub mod memory_service;
pub mod validation;

pub use access_service::AccessService;
pub use comment_service::{build_threads, is_owner, CommentForm, CommentService};
pub use memory_service::{EditForm, MemoryService, UploadForm};
