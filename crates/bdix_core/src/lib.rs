//! BDIX tester core: pure run state machine and view-model helpers.
mod category;
mod effect;
mod msg;
mod open;
mod state;
mod update;
mod view_model;

pub use category::{Category, ParseCategoryError};
pub use effect::{Effect, Severity};
pub use msg::Msg;
pub use open::{OpenTarget, ParseOpenTargetError};
pub use state::{AppState, RunId, RunOutcome, RunState};
pub use update::update;
pub use view_model::AppViewModel;
