use std::any::Any;
use std::cell::Cell;
use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

thread_local! {
    static CONTAINING_PANICS: Cell<bool> = const { Cell::new(false) };
}

static QUIET_PANIC_HOOK: Once = Once::new();

/// Keep panics raised inside [`invoke`] off stderr; their message is
/// already recorded as the failure. Panics elsewhere reach the previous hook.
fn install_quiet_panic_hook() {
    QUIET_PANIC_HOOK.call_once(|| {
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if CONTAINING_PANICS.with(Cell::get) {
                tracing::debug!(%info, "contained data-source panic");
            } else {
                original_hook(info);
            }
        }));
    });
}

/// Restores the previous containment flag, even when the operation unwinds.
struct ContainGuard {
    previous: bool,
}

impl ContainGuard {
    fn enter() -> Self {
        let previous = CONTAINING_PANICS.with(|flag| flag.replace(true));
        Self { previous }
    }
}

impl Drop for ContainGuard {
    fn drop(&mut self) {
        CONTAINING_PANICS.with(|flag| flag.set(self.previous));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Succeeded { payload: String },
    Failed { message: String },
}

/// Result of invoking one data-source capability once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub source: String,
    pub outcome: ProbeOutcome,
}

impl ProbeResult {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, ProbeOutcome::Succeeded { .. })
    }
}

/// Run `operation` exactly once and fold whatever happens into a
/// [`ProbeResult`]. Both `Err` values and panics become `Failed`.
pub fn invoke<T, E, F>(source: &str, operation: F) -> ProbeResult
where
    T: Display,
    E: Display,
    F: FnOnce() -> Result<T, E>,
{
    install_quiet_panic_hook();
    let caught = {
        let _guard = ContainGuard::enter();
        panic::catch_unwind(AssertUnwindSafe(operation))
    };

    let outcome = match caught {
        Ok(Ok(payload)) => ProbeOutcome::Succeeded {
            payload: payload.to_string(),
        },
        Ok(Err(err)) => ProbeOutcome::Failed {
            message: err.to_string(),
        },
        Err(panic_err) => ProbeOutcome::Failed {
            message: format!("panicked: {}", panic_message(panic_err.as_ref())),
        },
    };

    ProbeResult {
        source: source.to_string(),
        outcome,
    }
}

fn panic_message(panic_err: &(dyn Any + Send)) -> String {
    if let Some(s) = panic_err.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_err.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
