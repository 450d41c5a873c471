use std::sync::{atomic::{AtomicBool, Ordering}, Arc};

/// Exit status of a process stopped by Ctrl-C.
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Ctrl-C handling. While a statement is being evaluated Ctrl-C raises the
/// interrupt flag the evaluator polls; at any other time it ends the
/// process.
#[derive(Debug, Clone, Default)]
pub struct Signals {
	evaluating: Arc<AtomicBool>,
	interrupt: Arc<AtomicBool>,
}

impl Signals {
	pub fn install() -> Result<Self, ctrlc::Error> {
		let signals = Self::default();

		let evaluating = signals.evaluating.clone();
		let interrupt = signals.interrupt.clone();

		ctrlc::set_handler(move || {
			if evaluating.load(Ordering::SeqCst) {
				interrupt.store(true, Ordering::SeqCst);
			} else {
				std::process::exit(INTERRUPTED_EXIT_CODE);
			}
		})?;

		Ok(signals)
	}

	/// Installs the handler, falling back to inert signals when that fails.
	pub fn install_or_default() -> Self {
		Self::install().unwrap_or_else(|err| {
			tracing::warn!(%err, "Ctrl-C handler not installed");
			Self::default()
		})
	}

	pub fn interrupt(&self) -> Arc<AtomicBool> {
		self.interrupt.clone()
	}

	/// Runs `f` with Ctrl-C redirected to the interrupt flag.
	pub fn evaluating<T>(&self, f: impl FnOnce() -> T) -> T {
		self.interrupt.store(false, Ordering::SeqCst);
		self.evaluating.store(true, Ordering::SeqCst);

		let result = f();

		self.evaluating.store(false, Ordering::SeqCst);

		result
	}
}
