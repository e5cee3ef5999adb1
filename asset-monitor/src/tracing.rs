//! Structured logging setup.
//!
//! Every line written to stdout is a flat JSON object carrying a timestamp,
//! a level, the message, and the event's fields. Call sites name the event
//! with an `event` field so downstream tooling can match on it.

use tracing::Subscriber;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, MakeWriter, time::UtcTime},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

pub mod prelude {
    pub use tracing::{debug, error, info, trace, warn};
}

/// JSON formatting layer writing one flattened object per event.
pub fn json_layer<S, W>(writer: W) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt::layer()
        .json()
        .flatten_event(true)
        .with_current_span(false)
        .with_span_list(false)
        .with_target(false)
        .with_timer(UtcTime::rfc_3339())
        .with_writer(writer)
}

/// Install the global subscriber. Filtering honors `RUST_LOG` and defaults
/// to `info`.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer(std::io::stdout))
        .init();
}

#[cfg(test)]
pub(crate) mod testing {
    use std::io;
    use std::sync::Arc;

    use parking_lot::Mutex;
    use serde_json::Value;
    use tracing_subscriber::{fmt::MakeWriter, layer::SubscriberExt};

    /// In-memory writer collecting JSON log lines.
    #[derive(Clone, Default)]
    pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        /// Run `f` with a JSON subscriber writing into this buffer.
        pub fn capture<T>(&self, f: impl FnOnce() -> T) -> T {
            let subscriber = tracing_subscriber::registry().with(super::json_layer(self.clone()));
            tracing::subscriber::with_default(subscriber, f)
        }

        pub fn lines(&self) -> Vec<Value> {
            let buf = self.0.lock();
            String::from_utf8_lossy(&buf)
                .lines()
                .map(|line| serde_json::from_str(line).expect("log line is JSON"))
                .collect()
        }

        pub fn events(&self) -> Vec<String> {
            self.lines()
                .iter()
                .filter_map(|line| line["event"].as_str().map(str::to_owned))
                .collect()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }
}
