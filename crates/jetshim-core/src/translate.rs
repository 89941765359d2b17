// ─────────────────────────────────────────────────────────────────────
// Jetshim — Error Translator
// ─────────────────────────────────────────────────────────────────────
//! Every call into the engine goes through [`guard`]. Engine errors and
//! panics both come out as `JetError::Clustering` with the message's
//! trailing whitespace removed.
//!
//! Once diagnostics are configured, panics raised inside [`guard`] no
//! longer reach the default panic hook, so nothing is printed to stderr
//! for a failure that is already reported as an error value.

use std::any::Any;
use std::cell::Cell;
use std::panic::{self, catch_unwind, AssertUnwindSafe};

use jetshim_engine::EngineError;
use jetshim_types::{JetError, JetResult};

const UNKNOWN_FAILURE: &str = "unknown error in clustering engine";

thread_local! {
    static IN_GUARD: Cell<bool> = const { Cell::new(false) };
}

/// Whether the current thread is running inside [`guard`].
pub(crate) fn in_guard() -> bool {
    IN_GUARD.with(Cell::get)
}

/// Chain a panic hook that stays silent for panics caught by [`guard`]
/// and defers to the previous hook for everything else.
pub(crate) fn install_quiet_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        if !in_guard() {
            previous(info);
        }
    }));
}

/// Copy of `message` without trailing whitespace.
pub fn rtrimmed(message: &str) -> String {
    message.trim_end().to_string()
}

/// Run an engine call and translate its failure modes.
pub fn guard<T>(f: impl FnOnce() -> Result<T, EngineError>) -> JetResult<T> {
    let outer = IN_GUARD.with(|g| g.replace(true));
    let outcome = catch_unwind(AssertUnwindSafe(f));
    IN_GUARD.with(|g| g.set(outer));
    match outcome {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(JetError::Clustering(rtrimmed(e.message()))),
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            log::error!("clustering engine panicked: {message}");
            Err(JetError::Clustering(message))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        rtrimmed(s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        rtrimmed(s)
    } else {
        UNKNOWN_FAILURE.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_passes_through() {
        assert_eq!(guard(|| Ok::<_, EngineError>(7)).unwrap(), 7);
    }

    #[test]
    fn test_engine_error_trimmed() {
        let err = guard(|| Err::<(), _>(EngineError::new("bad R \n\t "))).unwrap_err();
        assert_eq!(err, JetError::Clustering("bad R".into()));
    }

    #[test]
    fn test_str_panic_caught() {
        let err = guard::<()>(|| panic!("engine exploded  \n")).unwrap_err();
        assert_eq!(err, JetError::Clustering("engine exploded".into()));
    }

    #[test]
    fn test_string_panic_caught() {
        let err = guard::<()>(|| panic!("{} particles  ", 3)).unwrap_err();
        assert_eq!(err, JetError::Clustering("3 particles".into()));
    }

    #[test]
    fn test_opaque_panic_caught() {
        let err = guard::<()>(|| std::panic::panic_any(42_u32)).unwrap_err();
        assert_eq!(err, JetError::Clustering(UNKNOWN_FAILURE.into()));
    }

    #[test]
    fn test_guard_scope_tracked() {
        assert!(!in_guard());
        let inside = guard(|| Ok::<_, EngineError>(in_guard())).unwrap();
        assert!(inside);
        assert!(!in_guard());
    }

    #[test]
    fn test_guard_scope_restored_after_panic() {
        let nested = guard(|| {
            let inner = guard::<()>(|| panic!("inner"));
            Ok::<_, EngineError>((inner.is_err(), in_guard()))
        })
        .unwrap();
        assert_eq!(nested, (true, true));
        assert!(!in_guard());
    }

    #[test]
    fn test_quiet_hook_still_translates() {
        crate::configure_diagnostics();
        let err = guard::<()>(|| panic!("quiet failure ")).unwrap_err();
        assert_eq!(err, JetError::Clustering("quiet failure".into()));
    }

    #[test]
    fn test_rtrimmed_keeps_leading_space() {
        assert_eq!(rtrimmed("  msg \r\n"), "  msg");
    }
}
