//! Logger setup for the report binary and for tests

use std::sync::Once;

use env_logger::Builder;
use log::LevelFilter;

/// Log targets that report at `Info`; everything else stays at `Warn`
const VERBOSE_TARGETS: [&str; 2] = ["probing_table", "probe_report"];

/// Guards the one-time builder setup
static INIT: Once = Once::new();

/// Installs an `env_logger` backend for the `log` facade.
///
/// Dependencies log at `Warn` and up, this crate and the report binary at
/// `Info`; `RUST_LOG` overrides both. Safe to call more than once.
pub fn initialize_logger() {
    INIT.call_once_force(|_| {
        let mut builder = Builder::new();
        builder.filter_level(LevelFilter::Warn);
        for target in VERBOSE_TARGETS {
            builder.filter_module(target, LevelFilter::Info);
        }
        builder.format_timestamp_millis().parse_default_env();

        // An embedding program may have installed its own logger first.
        if let Err(err) = builder.try_init() {
            log::debug!("keeping existing logger: {err}");
        }
    });
}
