//! Domain types for the one-and-done season engine.
//!
//! This module provides:
//! - Lossless numeric handling via Decimal wrapper
//! - Identifiers and time primitives
//! - Events, candidates, reservations, commitments and segment standings

pub mod candidate;
pub mod commitment;
pub mod decimal;
pub mod event;
pub mod primitives;
pub mod reservation;
pub mod standing;

pub use candidate::{Candidate, Tier};
pub use commitment::{Commitment, CommitmentStatus, CommitmentView, ScoredResult};
pub use decimal::Decimal;
pub use event::{validate_amounts, Event, MAX_MULTIPLIER_UNITS, MAX_PURSE_UNITS};
pub use primitives::{CandidateId, CommitmentId, EventId, FinishPosition, TimeMs, Week};
pub use reservation::{Reservation, ReservationView};
pub use standing::SegmentStanding;
