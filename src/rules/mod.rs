//! Pure scoring rules for each level.
//!
//! Nothing here touches progress or storage: each puzzle takes player actions
//! and reports an outcome that the game engine turns into keys, messages and
//! transitions.

pub mod billing;
pub mod circuit;
pub mod device;
pub mod efficiency;
pub mod formulas;
pub mod placement;
pub mod quiz_gate;

pub use billing::{BillReading, BillingOutcome, BillingPuzzle};
pub use circuit::{CableOutcome, CircuitPuzzle, TvOutcome};
pub use device::{Device, DeviceBank};
pub use efficiency::{EfficiencyOutcome, EfficiencyPuzzle, EfficiencyReading};
pub use placement::Aabb;
pub use quiz_gate::{AnswerOutcome, FeedbackOutcome, QuizPhase, QuizSession};
