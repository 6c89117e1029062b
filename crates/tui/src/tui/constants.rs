use std::time::Duration;

pub(crate) const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub(crate) const TICK_RATE: Duration = Duration::from_millis(200);
pub(crate) const STATUS_TTL: Duration = Duration::from_secs(5);

pub(crate) const ENTRY_PLACEHOLDER: &str = "What needs to be done?";
pub(crate) const EDIT_PLACEHOLDER: &str = "Delete empty todo";
pub(crate) const SPINNER_FRAMES: [&str; 4] = ["◐", "◓", "◑", "◒"];

pub(crate) const STATUS_LOADING: &str = "Loading todos…";
pub(crate) const STATUS_ENTRY_BUSY: &str = "Saving new todo…";
pub(crate) const STATUS_HELP: &str = "Keyboard reference: Enter/Esc to close";
pub(crate) const STATUS_NOTHING_SELECTED: &str = "No todo selected";
