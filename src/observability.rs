//! Logging setup and the structured `log_metric!` hook.
//!
//! The codec logs through the `log` facade. Hosts that already install a logger
//! get our records for free; hosts that don't can call [`init_logging`].

use log::LevelFilter;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Once;

use crate::error::PhotonError;

/// Logs a structured key-value metric line at debug level.
///
/// # Example
/// ```
/// use photon_codecs::log_metric;
/// let chunks = 3;
/// log_metric!("event"="write_array", "chunks"=&chunks);
/// ```
#[macro_export]
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        if $crate::__log::log_enabled!($crate::__log::Level::Debug) {
            let mut parts = Vec::new();
            $(
                parts.push(format!("\"{}\": \"{}\"", $key, $value));
            )+
            $crate::__log::debug!("PHOTON_METRIC: {{ {} }}", parts.join(", "));
        }
    };
}

static INIT_LOGGER: Once = Once::new();

/// Installs an `env_logger` writing `[LEVEL] message` lines at `level`.
///
/// With `log_file` set, records are appended to that file instead of stderr.
/// Only the first call has any effect; a logger installed by the host is left
/// in place.
pub fn init_logging(level: LevelFilter, log_file: Option<PathBuf>) -> Result<(), PhotonError> {
    // Open outside the Once so a bad path is reported on every attempt.
    let file = match log_file {
        Some(path) => Some(OpenOptions::new().append(true).create(true).open(path)?),
        None => None,
    };

    INIT_LOGGER.call_once(|| {
        let mut builder = env_logger::Builder::new();
        builder.is_test(false);
        builder.filter_level(level);

        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "[{}] {}", record.level(), record.args())?;
            buf.flush()?;
            Ok(())
        });

        if let Some(file) = file {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }

        let _ = builder.try_init();
    });
    Ok(())
}
