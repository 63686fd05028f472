use std::io::Write;
use std::sync::Once;

pub use log::LevelFilter;

static INIT: Once = Once::new();

/// Initializes `env_logger` once, at Info unless `RUST_LOG` says otherwise.
///
/// Messages from this crate are printed without a module prefix; messages
/// from dependencies carry their crate name.
pub fn init() {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        builder.filter_level(LevelFilter::Info);
        builder.parse_default_env();

        builder
            .format(|buf, record| {
                let (color, level_str) = match record.level() {
                    log::Level::Error => ("\x1b[31m", "ERROR"),
                    log::Level::Warn => ("\x1b[33m", "WARN"),
                    log::Level::Info => ("\x1b[32m", "INFO"),
                    log::Level::Debug => ("\x1b[36m", "DEBUG"),
                    log::Level::Trace => ("\x1b[35m", "TRACE"),
                };
                let reset = "\x1b[0m";

                let crate_name = record
                    .module_path()
                    .and_then(|path| path.split("::").next())
                    .unwrap_or("unknown");

                if crate_name == "sirchange" || crate_name == "sirsim" || crate_name == "sirstan" {
                    writeln!(buf, "{}{}{} {}", color, level_str, reset, record.args())
                }
                else {
                    writeln!(buf, "{}{}{} [{}] {}", color, level_str, reset, crate_name, record.args())
                }
            })
            .init();
    });
}
