//! Test logging utilities.
//!
//! [`init_test_logging`] routes `tracing` output through the test harness;
//! [`LogCapture`] records events so tests can assert on what was logged.

use std::fmt;
use std::sync::{Arc, Mutex, Once, PoisonError};

use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Initializes logging for tests (call once).
///
/// The filter comes from `RUST_LOG`. Later calls do nothing, and a
/// subscriber installed elsewhere is left alone.
///
/// # Examples
///
/// ```
/// use fixturekit_test::logging::init_test_logging;
///
/// init_test_logging();
/// tracing::info!("visible with RUST_LOG=info and --nocapture");
/// ```
pub fn init_test_logging() {
	INIT.call_once(|| {
		let _ = tracing_subscriber::fmt()
			.with_env_filter(EnvFilter::from_default_env())
			.with_test_writer()
			.try_init();
	});
}

/// One recorded event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedEvent {
	/// Event level.
	pub level: Level,
	/// Event target, usually the module path.
	pub target: String,
	/// Formatted message.
	pub message: String,
	/// Structured fields other than the message, formatted with `Debug`.
	pub fields: Vec<(String, String)>,
}

impl CapturedEvent {
	/// Whether the message or any field value contains `needle`.
	pub fn mentions(&self, needle: &str) -> bool {
		self.message.contains(needle) || self.fields.iter().any(|(_, v)| v.contains(needle))
	}

	/// Value of the field called `name`.
	pub fn field(&self, name: &str) -> Option<&str> {
		self.fields
			.iter()
			.find(|(k, _)| k == name)
			.map(|(_, v)| v.as_str())
	}
}

/// A `tracing` layer that records every event it sees.
///
/// Clones share the same record.
///
/// # Examples
///
/// ```
/// use fixturekit_test::logging::LogCapture;
///
/// let capture = LogCapture::new();
/// let _guard = capture.set_default();
/// tracing::info!(table = "CATEGORY", "Table");
///
/// assert!(capture.contains("CATEGORY"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
	events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl LogCapture {
	/// Empty capture.
	pub fn new() -> Self {
		Self::default()
	}

	/// Installs this capture as the thread's default subscriber until the
	/// guard is dropped.
	pub fn set_default(&self) -> DefaultGuard {
		tracing_subscriber::registry().with(self.clone()).set_default()
	}

	/// Recorded events, oldest first.
	pub fn events(&self) -> Vec<CapturedEvent> {
		self.events
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.clone()
	}

	/// Recorded messages, oldest first.
	pub fn messages(&self) -> Vec<String> {
		self.events().into_iter().map(|e| e.message).collect()
	}

	/// Whether any recorded event mentions `needle`.
	pub fn contains(&self, needle: &str) -> bool {
		self.events().iter().any(|e| e.mentions(needle))
	}

	/// Forgets every recorded event.
	pub fn clear(&self) {
		self.events
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.clear();
	}
}

#[derive(Default)]
struct EventVisitor {
	message: String,
	fields: Vec<(String, String)>,
}

impl Visit for EventVisitor {
	fn record_str(&mut self, field: &Field, value: &str) {
		if field.name() == "message" {
			self.message = value.to_string();
		} else {
			self.fields.push((field.name().to_string(), value.to_string()));
		}
	}

	fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
		if field.name() == "message" {
			self.message = format!("{:?}", value);
		} else {
			self.fields.push((field.name().to_string(), format!("{:?}", value)));
		}
	}
}

impl<S: Subscriber> Layer<S> for LogCapture {
	fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
		let mut visitor = EventVisitor::default();
		event.record(&mut visitor);

		let metadata = event.metadata();
		self.events
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.push(CapturedEvent {
				level: *metadata.level(),
				target: metadata.target().to_string(),
				message: visitor.message,
				fields: visitor.fields,
			});
	}
}
