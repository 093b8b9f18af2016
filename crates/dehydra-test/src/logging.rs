//! Test logging utilities

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Initialize tracing output for tests (call once)
///
/// Output goes through the test writer so it is captured per test; the
/// level is taken from `RUST_LOG`.
///
/// # Examples
///
/// ```
/// use dehydra_test::logging::init_test_logging;
///
/// init_test_logging();
/// ```
pub fn init_test_logging() {
	INIT.call_once(|| {
		let _ = tracing_subscriber::fmt()
			.with_env_filter(EnvFilter::from_default_env())
			.with_test_writer()
			.try_init();
	});
}
