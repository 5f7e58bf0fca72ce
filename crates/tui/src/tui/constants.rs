use std::time::Duration;

pub(crate) const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub(crate) const TICK_RATE: Duration = Duration::from_millis(200);
pub(crate) const STATUS_TTL: Duration = Duration::from_secs(5);

pub(crate) const HINT_LISTS: &str = "Enter/→ open • ↑/↓ move • r refresh • q quit";
pub(crate) const HINT_TASKS: &str =
    "Space done • Enter/s subtasks • n new • e edit • d delete • c completed • r refresh • ← back • q quit";
pub(crate) const HINT_SUBTASKS: &str =
    "Space done • n new • e edit • d delete • c completed • r refresh • ← back • q quit";
pub(crate) const HINT_EDITOR: &str = "Enter save • Esc cancel";
pub(crate) const HINT_CONFIRM: &str = "←/→ choose • Enter confirm • Esc cancel";

pub(crate) const STATUS_REFRESHED: &str = "Refreshed";
pub(crate) const STATUS_NOTHING_FOCUSED: &str = "Nothing selected";
pub(crate) const STATUS_DELETE_CANCELLED: &str = "Deletion cancelled";
