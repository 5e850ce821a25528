use std::sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
};

use common_error::{DdfError, DdfResult};
use tracing_chrome::{ChromeLayer, ChromeLayerBuilder, EventOrSpan, FlushGuard, TraceStyle};
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, prelude::*};

pub const LOG_FILTER_ENV: &str = "DDF_LOG";
pub const CHROME_TRACE_ENV: &str = "DDF_DEV_ENABLE_CHROME_TRACE";
const DEFAULT_LOG_FILTER: &str = "warn";

static TRACING_INIT: AtomicBool = AtomicBool::new(false);
static CHROME_GUARD: Mutex<Option<FlushGuard>> = Mutex::new(None);

pub fn should_enable_chrome_trace() -> bool {
    std::env::var(CHROME_TRACE_ENV)
        .is_ok_and(|val| matches!(val.trim().to_lowercase().as_str(), "1" | "true"))
}

pub fn is_tracing_initialized() -> bool {
    TRACING_INIT.load(Ordering::Relaxed)
}

/// A chrome layer writing to a sink until [`start_chrome_trace`] points it at a file.
fn idle_chrome_layer() -> (ChromeLayer<Registry>, FlushGuard) {
    ChromeLayerBuilder::new()
        .writer(std::io::sink())
        .trace_style(TraceStyle::Threaded)
        .name_fn(Box::new(|event_or_span| match event_or_span {
            EventOrSpan::Event(ev) => ev.metadata().name().into(),
            EventOrSpan::Span(s) => s.name().into(),
        }))
        .build()
}

/// Installs the global subscriber: a fmt layer filtered by `DDF_LOG` (default `warn`) and,
/// optionally, a chrome trace layer that stays idle until [`start_chrome_trace`] is called.
///
/// Calling this twice is an error.
pub fn init_tracing(enable_chrome_trace: bool) -> DdfResult<()> {
    if TRACING_INIT.swap(true, Ordering::Relaxed) {
        return Err(DdfError::InternalError(
            "Tracing is already initialized".to_string(),
        ));
    }

    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_filter(filter);

    let (chrome_layer, guard) = if enable_chrome_trace {
        let (layer, guard) = idle_chrome_layer();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };
    let subscriber = tracing_subscriber::registry()
        .with(chrome_layer)
        .with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber).map_err(|e| DdfError::External(e.into()))?;

    if guard.is_some() {
        *CHROME_GUARD
            .lock()
            .map_err(|_| DdfError::InternalError("Chrome trace guard poisoned".to_string()))? = guard;
    }
    Ok(())
}

/// Runs `f` on the chrome flush guard, if chrome tracing was enabled.
fn with_chrome_guard(f: impl FnOnce(&mut FlushGuard)) -> bool {
    let Ok(mut guard) = CHROME_GUARD.lock() else {
        return false;
    };
    guard.as_mut().map(f).is_some()
}

/// Starts writing chrome trace events to a new file. Returns false when chrome tracing is off.
pub fn start_chrome_trace() -> bool {
    with_chrome_guard(|guard| guard.start_new(None))
}

/// Closes the current chrome trace file. Returns false when chrome tracing is off.
pub fn finish_chrome_trace() -> bool {
    // Swapping in a sink closes the file; flushing alone does not.
    with_chrome_guard(|guard| guard.start_new(Some(Box::new(std::io::sink()))))
}
