//! Internal back office: key-checked sessions and the routes they unlock.

pub mod gate;
pub mod router;

pub use gate::{GateError, StudioGate, StudioToken};
pub use router::{studio_router, StudioSession, StudioState};
