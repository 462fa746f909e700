//! In-memory capture of log events and console output.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Context as LayerContext, Layer, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;

/// One recorded log event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedEvent {
    /// Event severity.
    pub level: Level,
    /// Module path the event was emitted from.
    pub target: String,
    /// Formatted message.
    pub message: String,
    /// Fields recorded on the event itself.
    pub fields: BTreeMap<String, String>,
    /// Fields of every enclosing span, inner spans overriding outer ones.
    pub span_fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    /// Looks up `name` on the event, falling back to its spans.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .or_else(|| self.span_fields.get(name))
            .map(String::as_str)
    }
}

#[derive(Default)]
struct FieldMap(BTreeMap<String, String>);

impl Visit for FieldMap {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{value:?}"));
    }
}

/// Records `tracing` events for later assertions.
///
/// Install it as the thread's default subscriber for the duration of a test.
/// Loggers must be created after [`LogCapture::install`] so their spans are
/// registered with the capturing subscriber.
///
/// # Example
///
/// ```
/// use hermes_core::Logger;
/// use hermes_test::LogCapture;
///
/// let capture = LogCapture::new();
/// let _guard = capture.install();
///
/// Logger::current().info("hello");
/// assert_eq!(capture.messages(), vec!["hello".to_string()]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl LogCapture {
    /// Creates an empty capture.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the capture as the default subscriber, recording every level.
    #[must_use = "the capture is uninstalled when the guard is dropped"]
    pub fn install(&self) -> DefaultGuard {
        self.install_with_level(LevelFilter::TRACE)
    }

    /// Installs the capture, dropping events less severe than `level`.
    #[must_use = "the capture is uninstalled when the guard is dropped"]
    pub fn install_with_level(&self, level: LevelFilter) -> DefaultGuard {
        let subscriber = tracing_subscriber::registry()
            .with(level)
            .with(CaptureLayer {
                events: Arc::clone(&self.events),
            });
        tracing::subscriber::set_default(subscriber)
    }

    /// Returns every event recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().clone()
    }

    /// Returns the messages of every recorded event, in order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.events.lock().iter().map(|e| e.message.clone()).collect()
    }

    /// Returns the first event whose message equals `message`.
    #[must_use]
    pub fn find(&self, message: &str) -> Option<CapturedEvent> {
        self.events
            .lock()
            .iter()
            .find(|e| e.message == message)
            .cloned()
    }

    /// Counts events whose message equals `message`.
    #[must_use]
    pub fn count(&self, message: &str) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| e.message == message)
            .count()
    }

    /// Returns the events recorded at `level`.
    #[must_use]
    pub fn at_level(&self, level: Level) -> Vec<CapturedEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.level == level)
            .cloned()
            .collect()
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Forgets everything recorded so far.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

struct CaptureLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: LayerContext<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut fields = FieldMap::default();
        attrs.record(&mut fields);
        span.extensions_mut().insert(fields);
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: LayerContext<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut extensions = span.extensions_mut();
        if let Some(fields) = extensions.get_mut::<FieldMap>() {
            values.record(fields);
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: LayerContext<'_, S>) {
        let mut fields = FieldMap::default();
        event.record(&mut fields);
        let message = fields.0.remove("message").unwrap_or_default();

        let mut span_fields = BTreeMap::new();
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope.from_root() {
                if let Some(map) = span.extensions().get::<FieldMap>() {
                    span_fields.extend(map.0.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
            }
        }

        let metadata = event.metadata();
        self.events.lock().push(CapturedEvent {
            level: *metadata.level(),
            target: metadata.target().to_string(),
            message,
            fields: fields.0,
            span_fields,
        });
    }
}

/// A shared in-memory writer standing in for stdout.
///
/// Clones share the same buffer, so hand one clone to the code under test
/// and read the other.
#[derive(Debug, Clone, Default)]
pub struct ConsoleBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl ConsoleBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns everything written so far.
    #[must_use]
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock()).into_owned()
    }
}

impl io::Write for ConsoleBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_core::{Logger, RequestId};
    use std::io::Write as _;

    #[test]
    fn test_captures_message_and_fields() {
        let capture = LogCapture::new();
        let _guard = capture.install();

        tracing::info!(object = "{}", "payload");
        let event = capture.find("payload").unwrap();
        assert_eq!(event.level, Level::INFO);
        assert_eq!(event.field("object"), Some("{}"));
    }

    #[test]
    fn test_captures_span_fields() {
        let capture = LogCapture::new();
        let _guard = capture.install();

        let id = RequestId::new();
        let log = Logger::current().with_request_id(id).with_procedure("/a.B/C");
        log.info("inside");

        let event = capture.find("inside").unwrap();
        assert_eq!(event.field("request-id"), Some(id.to_string().as_str()));
        assert_eq!(event.field("procedure"), Some("/a.B/C"));
    }

    #[test]
    fn test_level_filter_drops_debug() {
        let capture = LogCapture::new();
        let _guard = capture.install_with_level(LevelFilter::INFO);

        let log = Logger::current();
        log.v(1).info("verbose");
        log.info("plain");

        assert_eq!(capture.messages(), vec!["plain".to_string()]);
    }

    #[test]
    fn test_clear() {
        let capture = LogCapture::new();
        let _guard = capture.install();
        tracing::warn!("one");
        assert!(!capture.is_empty());
        capture.clear();
        assert!(capture.is_empty());
    }

    #[test]
    fn test_console_buffer_shares_contents() {
        let buffer = ConsoleBuffer::new();
        let mut writer = buffer.clone();
        writeln!(writer, "hello").unwrap();
        assert_eq!(buffer.contents(), "hello\n");
    }
}
