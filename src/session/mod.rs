pub mod check;
pub mod error;
pub mod history;
pub mod layout;
pub mod scroll;
pub mod state;

pub use check::{CheckRequest, CheckState, CheckWorkflow, FailedCheckPolicy, Generation};
pub use error::SessionError;
pub use history::{Attempt, HistoryStore, SentenceStatus, SessionSummary};
pub use layout::LayoutTracker;
pub use scroll::{LayoutEvent, ScrollCoordinator};
pub use state::{Feedback, LoadTicket, SessionPhase, SessionState};
