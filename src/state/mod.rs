//! Player-side live-play state.

pub mod machine;

pub use machine::{
    ActiveQuestion, InvalidTransition, PlayEffect, PlayEvent, PlayPhase, PlayerStateMachine,
    RevealedQuestion, SelectionError,
};
