use anyhow::Context;
use env_logger::{Builder, Target};
use log::{Level, debug};
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub const LOG_LEVEL_ENV: &str = "PICKY_LOG_LEVEL";

pub fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "error",
        1 => "warn",
        2 => "info",
        _ => "debug",
    }
}

/// Sends log output to stderr, or to `log_file` so it stays out of the
/// terminal UI.
pub fn setup_logger(verbosity: u8, log_file: Option<&Path>) -> anyhow::Result<()> {
    let env = env_logger::Env::default().filter_or(LOG_LEVEL_ENV, level_for_verbosity(verbosity));
    let mut builder = Builder::from_env(env);

    let colored = match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create log file {}", path.display()))?;
            builder.target(Target::Pipe(Box::new(file)));
            false
        }
        None => true,
    };

    builder
        .format(move |buf, record| {
            if !colored {
                return writeln!(
                    buf,
                    "[{}] [{}] {}",
                    record.level(),
                    buf.timestamp(),
                    record.args()
                );
            }

            let level_color = match record.level() {
                Level::Error => "31", // Red
                Level::Warn => "33",  // Yellow
                Level::Info => "32",  // Green
                Level::Debug => "36", // Cyan
                Level::Trace => "35", // Magenta
            };

            writeln!(
                buf,
                "\x1B[{}m[{}]\x1B[0m [{}] {}",
                level_color,
                record.level(),
                buf.timestamp(),
                record.args()
            )
        })
        .format_timestamp_secs()
        .try_init()?;

    debug!("Logger initialized at verbosity {}", verbosity);
    Ok(())
}
