//! Screen-core for the dojo admin console.
//!
//! Each screen facade owns its state and exposes a render-ready view; the
//! binary (or any embedding UI shell) renders views and forwards intents.
//! Screens never panic on server failures: everything surfaces as data on
//! the view.

mod config;
mod endpoints;
mod report_screen;
mod roster;
mod users;
mod validate;
mod view;

pub use config::ConsoleConfig;
pub use endpoints::Endpoints;
pub use report_screen::{GenerateOutcome, ReportScreen, ScreenPhase};
pub use roster::GroupRoster;
pub use users::UserDirectory;
pub use validate::ValidationError;
pub use view::ReportView;
