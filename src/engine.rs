//! Binding to the native pdfium library.
//!
//! `pdfium-render` loads pdfium dynamically. Resolution order (first match wins):
//!
//! 1. `PDFIUM_LIB_PATH` — a library file, or a directory containing one.
//! 2. The platform library name in the current working directory.
//! 3. The system library search path.
//!
//! Each blocking stage binds on its own thread inside [`run_blocking`], so
//! nothing pdfium-related crosses an `.await`.

use crate::error::PaperworkError;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use tracing::debug;

/// Environment variable naming an explicit pdfium library location.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Bind to pdfium, trying every location in order.
pub fn bind() -> Result<Pdfium, PaperworkError> {
    let mut failures = Vec::new();

    if let Some(path) = env_library_path() {
        match Pdfium::bind_to_library(&path) {
            Ok(bindings) => {
                debug!("Bound pdfium from {}", path.display());
                return Ok(Pdfium::new(bindings));
            }
            Err(e) => failures.push(format!("{}: {e}", path.display())),
        }
    }

    let local = Pdfium::pdfium_platform_library_name_at_path("./");
    match Pdfium::bind_to_library(&local) {
        Ok(bindings) => {
            debug!("Bound pdfium from working directory");
            return Ok(Pdfium::new(bindings));
        }
        Err(e) => failures.push(format!("./: {e}")),
    }

    match Pdfium::bind_to_system_library() {
        Ok(bindings) => {
            debug!("Bound system pdfium");
            Ok(Pdfium::new(bindings))
        }
        Err(e) => {
            failures.push(format!("system: {e}"));
            Err(PaperworkError::PdfiumBindingFailed(failures.join("; ")))
        }
    }
}

/// `true` when some pdfium library can be bound. Used by tests to skip.
pub fn is_available() -> bool {
    bind().is_ok()
}

fn env_library_path() -> Option<PathBuf> {
    let raw = std::env::var(PDFIUM_LIB_PATH_ENV).ok()?;
    if raw.trim().is_empty() {
        return None;
    }
    let path = PathBuf::from(raw);
    if path.is_dir() {
        let dir = path.to_string_lossy().into_owned();
        Some(PathBuf::from(Pdfium::pdfium_platform_library_name_at_path(&dir)))
    } else {
        Some(path)
    }
}

/// Run pdfium work on tokio's blocking pool.
///
/// pdfium keeps thread-local state and its calls are CPU-bound, so every
/// stage that touches it goes through here rather than running on a worker
/// thread. `what` names the stage in the panic message.
pub async fn run_blocking<T, F>(what: &str, f: F) -> Result<T, PaperworkError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, PaperworkError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| PaperworkError::Internal(format!("{what} task panicked: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocking_result_is_passed_through() {
        let n = tokio_test::block_on(run_blocking("Sum", || Ok(2 + 2))).unwrap();
        assert_eq!(n, 4);
    }

    #[tokio::test]
    async fn blocking_panic_becomes_internal_error() {
        let err = run_blocking::<(), _>("Paint", || panic!("boom")).await.unwrap_err();
        assert!(matches!(err, PaperworkError::Internal(ref msg) if msg.contains("Paint task panicked")));
    }
}
