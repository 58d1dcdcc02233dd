//! Application module: the model behind the terminal UI.
//!
//! `App` mirrors what the session has broadcast plus the cursor state of the
//! track list. `PositionPoller` decides when to refresh the seek bar.

mod model;
mod poller;

pub use model::*;
pub use poller::PositionPoller;
