//! The coaching protocol — phase machine, session store, and orchestration.
//!
//! A session is a scripted conversation: the user uploads a resume, the
//! coach runs a short diagnostic interview, then a menu of deliverables
//! unlocks. Which step is active, when to advance, and what reaches the
//! model at each step all live here; extraction, completion transport, and
//! presentation stay behind narrow seams.

pub mod analysis;
pub mod orchestrator;
pub mod phase;
pub mod predicates;
pub mod prompts;
pub mod routes;
pub mod session;

pub use orchestrator::{Action, Coach, Outcome};
pub use phase::Phase;
pub use routes::{CoachRouteState, session_routes};
pub use session::{
    AtsResult, CandidateProfile, Command, Eligibility, Message, MessageKind, Session, Transition,
};
