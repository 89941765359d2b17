// ─────────────────────────────────────────────────────────────────────
// Jetshim — Diagnostics Control
// ─────────────────────────────────────────────────────────────────────

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;

use jetshim_engine::diagnostics::{set_banner_stream, set_print_errors};
use jetshim_engine::BannerSink;

use crate::translate::install_quiet_panic_hook;

static CONFIGURED: AtomicBool = AtomicBool::new(false);
static ANNOUNCE: Once = Once::new();

/// Silence the engine banner and engine error/warning printing for the
/// rest of the process, including the panic-hook output of failures
/// caught by [`guard`](crate::guard). Safe to call any number of times.
pub fn configure_diagnostics() {
    set_banner_stream(BannerSink::Silent);
    set_print_errors(false);
    CONFIGURED.store(true, Ordering::SeqCst);
    ANNOUNCE.call_once(|| {
        install_quiet_panic_hook();
        log::debug!("engine banner and error printing suppressed");
    });
}

pub fn diagnostics_configured() -> bool {
    CONFIGURED.load(Ordering::SeqCst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jetshim_engine::diagnostics::{banner_silenced, print_errors};

    #[test]
    fn test_configure_is_idempotent() {
        configure_diagnostics();
        let once = (banner_silenced(), print_errors(), diagnostics_configured());
        configure_diagnostics();
        let twice = (banner_silenced(), print_errors(), diagnostics_configured());
        assert_eq!(once, (true, false, true));
        assert_eq!(once, twice);
    }
}
