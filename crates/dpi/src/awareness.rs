//! Thread DPI-awareness contexts

use std::fmt;

use crate::bridge::{DpiBridge, DpiFunctions};

/// A `DPI_AWARENESS_CONTEXT` handle value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DpiAwarenessContext(pub isize);

impl DpiAwarenessContext {
    pub const UNAWARE: Self = Self(-1);
    pub const SYSTEM_AWARE: Self = Self(-2);
    pub const PER_MONITOR_AWARE: Self = Self(-3);
    pub const PER_MONITOR_AWARE_V2: Self = Self(-4);
    pub const UNAWARE_GDISCALED: Self = Self(-5);
}

impl fmt::Display for DpiAwarenessContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::UNAWARE => f.write_str("unaware"),
            Self::SYSTEM_AWARE => f.write_str("system aware"),
            Self::PER_MONITOR_AWARE => f.write_str("per-monitor aware"),
            Self::PER_MONITOR_AWARE_V2 => f.write_str("per-monitor aware v2"),
            Self::UNAWARE_GDISCALED => f.write_str("unaware (GDI scaled)"),
            Self(raw) => write!(f, "context {raw:#x}"),
        }
    }
}

/// Switches the calling thread's DPI awareness and switches it back exactly
/// once, on [`restore`](Self::restore) or on drop.
pub struct ThreadDpiAwarenessContext<'a, F: DpiFunctions> {
    bridge: &'a DpiBridge<F>,
    previous: DpiAwarenessContext,
    pending: bool,
}

impl<'a, F: DpiFunctions> ThreadDpiAwarenessContext<'a, F> {
    /// Per-monitor v2 falls back to per-monitor when the system doesn't
    /// recognise it.
    pub fn new(bridge: &'a DpiBridge<F>, context: DpiAwarenessContext) -> Self {
        let context = if context == DpiAwarenessContext::PER_MONITOR_AWARE_V2
            && !bridge.is_valid_awareness_context(context)
        {
            DpiAwarenessContext::PER_MONITOR_AWARE
        } else {
            context
        };

        let previous = bridge.set_thread_awareness_context(context);
        tracing::trace!(?context, ?previous, "thread DPI awareness switched");

        Self {
            bridge,
            previous,
            pending: true,
        }
    }

    pub fn per_monitor(bridge: &'a DpiBridge<F>, use_per_monitor_awareness: bool) -> Self {
        let context = if use_per_monitor_awareness {
            DpiAwarenessContext::PER_MONITOR_AWARE
        } else {
            DpiAwarenessContext::SYSTEM_AWARE
        };
        Self::new(bridge, context)
    }

    /// The context that will be put back.
    pub fn previous(&self) -> DpiAwarenessContext {
        self.previous
    }

    pub fn restore(&mut self) {
        if self.pending {
            self.bridge.set_thread_awareness_context(self.previous);
            self.pending = false;
        }
    }
}

impl<F: DpiFunctions> Drop for ThreadDpiAwarenessContext<'_, F> {
    fn drop(&mut self) {
        self.restore();
    }
}
