//! Interactive jq previewer: reactive core, widgets and terminal runtime.

pub mod app;
pub mod editor;
pub mod effects;
pub mod event;
mod runtime;
pub mod theme;
pub mod view;
pub mod viewport;

pub use app::{App, QueryState};
pub use effects::{Command, Outcome, Scheduler};
pub use event::Msg;
pub use runtime::run;
pub use view::{view, view_plain};
