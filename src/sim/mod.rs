//! Foreground simulation module
//!
//! Everything the tick thread runs:
//! - Fixed timestep only
//! - Scroll driver is the only writer of terrain scroll state
//! - Player and terrain generator share formulas, never state

pub mod clock;
pub mod driver;
pub mod player;
pub mod session;

pub use clock::FixedStepClock;
pub use driver::ScrollDriver;
pub use player::{JumpLatch, Player};
pub use session::{GamePhase, GameSession, TickInput};
