//! Quiet-mode aware user-facing output. When VENVSTRAP_QUIET=1 progress lines
//! on stderr are suppressed; tracing output is filtered separately.

#[macro_export]
macro_rules! progress {
    ($($arg:tt)*) => {{
        if !$crate::log::is_quiet() {
            eprintln!($($arg)*);
        }
    }};
}

pub fn is_quiet() -> bool {
    venvstrap_core::observability::is_quiet()
}
