//! Client-side synchronization: state, polling and the request backend.

pub mod backend;
pub mod notify;
mod request;
mod scheduler;
mod session;
mod state;

pub use backend::Backend;
pub use notify::Level;
pub use request::{BackendCommand, BackendResponse, ChatScope, Origin, Outcome, Request};
pub use scheduler::PollScheduler;
pub use session::{Session, View};
pub use state::SyncCore;
