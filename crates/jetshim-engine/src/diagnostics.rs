// ─────────────────────────────────────────────────────────────────────
// Jetshim — Engine Banner and Error Printing
// ─────────────────────────────────────────────────────────────────────
//! Process-wide output switches.
//!
//! The banner is written once, when the first [`ClusterSequence`] of the
//! process is built, to whatever [`BannerSink`] is installed at that
//! moment. Engine errors and warnings go through the `log` facade while
//! error printing is enabled.
//!
//! [`ClusterSequence`]: crate::ClusterSequence

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{const_mutex, Mutex};

pub const BANNER: &str = "\
#--------------------------------------------------------------------------
#                        Jetshim clustering engine
#          generalized-kt sequential recombination, E-scheme
#--------------------------------------------------------------------------
";

/// Destination for the one-time banner.
pub enum BannerSink {
    Stdout,
    Silent,
    Writer(Box<dyn Write + Send>),
}

/// A one-shot banner and the sink it goes to.
pub(crate) struct Banner {
    sink: Mutex<BannerSink>,
    pending: AtomicBool,
}

impl Banner {
    pub(crate) const fn new() -> Self {
        Self {
            sink: const_mutex(BannerSink::Stdout),
            pending: AtomicBool::new(true),
        }
    }

    fn set_sink(&self, sink: BannerSink) {
        *self.sink.lock() = sink;
    }

    fn silenced(&self) -> bool {
        matches!(*self.sink.lock(), BannerSink::Silent)
    }

    /// Write the banner on the first call only.
    fn emit(&self) {
        if !self.pending.swap(false, Ordering::SeqCst) {
            return;
        }
        let mut sink = self.sink.lock();
        let written = match &mut *sink {
            BannerSink::Silent => Ok(()),
            BannerSink::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(BANNER.as_bytes()).and_then(|_| out.flush())
            }
            BannerSink::Writer(w) => w.write_all(BANNER.as_bytes()).and_then(|_| w.flush()),
        };
        if let Err(e) = written {
            log::warn!("could not write engine banner: {e}");
        }
    }
}

static ENGINE_BANNER: Banner = Banner::new();
static PRINT_ERRORS: AtomicBool = AtomicBool::new(true);

/// Install the banner destination. `BannerSink::Silent` suppresses it.
pub fn set_banner_stream(sink: BannerSink) {
    ENGINE_BANNER.set_sink(sink);
}

pub fn banner_silenced() -> bool {
    ENGINE_BANNER.silenced()
}

/// Enable or disable printing of engine errors and warnings.
pub fn set_print_errors(enabled: bool) {
    PRINT_ERRORS.store(enabled, Ordering::SeqCst);
}

pub fn print_errors() -> bool {
    PRINT_ERRORS.load(Ordering::SeqCst)
}

/// Write the banner if no sequence has been built yet in this process.
pub(crate) fn print_banner() {
    ENGINE_BANNER.emit();
}

/// Engine warning, subject to the error-printing switch.
pub(crate) fn warn(message: &str) {
    if print_errors() {
        log::warn!("jetshim-engine: {message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().clone()).unwrap()
        }
    }

    #[test]
    fn test_banner_written_once() {
        let banner = Banner::new();
        let buf = SharedBuf::default();
        banner.set_sink(BannerSink::Writer(Box::new(buf.clone())));
        banner.emit();
        banner.emit();
        assert_eq!(buf.text().matches("Jetshim clustering engine").count(), 1);
        assert_eq!(buf.text(), BANNER);
    }

    #[test]
    fn test_silenced_banner_writes_nothing() {
        let banner = Banner::new();
        let buf = SharedBuf::default();
        banner.set_sink(BannerSink::Writer(Box::new(buf.clone())));
        banner.set_sink(BannerSink::Silent);
        assert!(banner.silenced());
        banner.emit();
        assert!(buf.text().is_empty());
        banner.set_sink(BannerSink::Writer(Box::new(buf.clone())));
        banner.emit();
        assert!(buf.text().is_empty());
    }

    #[test]
    fn test_sequences_never_repeat_banner() {
        use crate::{ClusterSequence, JetDefinition};
        use jetshim_types::PseudoJet;

        let buf = SharedBuf::default();
        set_banner_stream(BannerSink::Writer(Box::new(buf.clone())));
        let def = JetDefinition::new(0.4, -1).unwrap();
        for _ in 0..2 {
            ClusterSequence::new(vec![PseudoJet::from_pt_y_phi(5.0, 0.0, 1.0)], def).unwrap();
        }
        assert!(buf.text().matches("Jetshim clustering engine").count() <= 1);
        assert!(!ENGINE_BANNER.pending.load(Ordering::SeqCst));
    }

    #[test]
    fn test_silent_sink_reported() {
        set_banner_stream(BannerSink::Silent);
        assert!(banner_silenced());
    }

    #[test]
    fn test_banner_mentions_algorithm() {
        assert!(BANNER.contains("generalized-kt"));
        assert!(BANNER.ends_with('\n'));
    }
}
