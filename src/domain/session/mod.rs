//! Recording session domain module

mod state;

pub use state::{
    InvalidStateTransition, RecordingSession, SessionSnapshot, SessionState, ALL_STATES,
};
