//! Schema setup from DDL scripts.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::OnceCell;

use crate::datasource::DataSource;
use crate::error::{DatabaseError, DatabaseResult};

/// Executes `ddl` as a single batch.
///
/// The script is passed to the database verbatim, so it may hold several
/// statements separated by semicolons.
pub async fn init_schema(source: &DataSource, ddl: &str) -> DatabaseResult<()> {
	run_script(source, "<inline>", ddl).await
}

async fn run_script(source: &DataSource, origin: &str, ddl: &str) -> DatabaseResult<()> {
	tracing::info!(datasource = source.name(), origin, "Initializing schema");
	sqlx::raw_sql(ddl)
		.execute(source.pool())
		.await
		.map_err(|e| DatabaseError::SchemaExecution {
			origin: origin.to_string(),
			source: e,
		})?;
	Ok(())
}

/// A DDL script applied at most once.
///
/// Test groups hold one initializer and call [`ensure_schema`] from every
/// set-up; only the first successful call touches the database. A failing
/// call leaves the initializer unapplied so the error is reported again by
/// the next caller.
///
/// [`ensure_schema`]: SchemaInitializer::ensure_schema
#[derive(Debug)]
pub struct SchemaInitializer {
	origin: String,
	ddl: String,
	applied: OnceCell<()>,
}

impl SchemaInitializer {
	/// Initializer for an in-memory script.
	pub fn from_sql(ddl: impl Into<String>) -> Self {
		Self {
			origin: "<inline>".to_string(),
			ddl: ddl.into(),
			applied: OnceCell::new(),
		}
	}

	/// Initializer for the script at `path`, read eagerly.
	pub fn from_path(path: impl AsRef<Path>) -> DatabaseResult<Self> {
		let path = path.as_ref();
		let ddl = std::fs::read_to_string(path).map_err(|source| DatabaseError::SchemaRead {
			path: PathBuf::from(path),
			source,
		})?;
		Ok(Self {
			origin: path.display().to_string(),
			ddl,
			applied: OnceCell::new(),
		})
	}

	/// Script path or `<inline>`.
	pub fn origin(&self) -> &str {
		&self.origin
	}

	/// Script text.
	pub fn ddl(&self) -> &str {
		&self.ddl
	}

	/// Executes the script unless an earlier call already did.
	///
	/// Returns `true` when this call executed it. Concurrent callers wait for
	/// the first one to finish.
	pub async fn ensure_schema(&self, source: &DataSource) -> DatabaseResult<bool> {
		let executed = AtomicBool::new(false);
		let flag = &executed;
		self.applied
			.get_or_try_init(|| async move {
				run_script(source, &self.origin, &self.ddl).await?;
				flag.store(true, Ordering::SeqCst);
				Ok::<(), DatabaseError>(())
			})
			.await?;
		Ok(executed.load(Ordering::SeqCst))
	}

	/// Whether the script has been executed.
	pub fn is_applied(&self) -> bool {
		self.applied.initialized()
	}
}
