use crate::Utils::plots::{PlotError, PlotSamples};
use chrono::Local;
use csv::Writer;
use simplelog::*;
use std::fs::File;
use std::path::{Path, PathBuf};

/// name like `log_2025-01-31_12-00-00.txt` for a log file of this run
pub fn timestamped_log_name() -> PathBuf {
    let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
    PathBuf::from(format!("log_{}.txt", date_and_time))
}

/// Installs a terminal logger and, when `log_file` is given, a file logger with the same level.
///
/// Returns false if a logger was already installed; the earlier one stays active.
pub fn init_logger(level: LevelFilter, log_file: Option<&Path>) -> bool {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(path) = log_file {
        match File::create(path) {
            Ok(file) => loggers.push(WriteLogger::new(level, Config::default(), file)),
            Err(e) => eprintln!("cannot create log file {}: {}", path.display(), e),
        }
    }
    CombinedLogger::init(loggers).is_ok()
}

/// Writes sampled bounds as columns `n, f, upper, lower`; masked points are left empty.
pub fn save_samples_to_csv(
    samples: &PlotSamples,
    filename: impl AsRef<Path>,
) -> Result<(), PlotError> {
    let mut writer = Writer::from_path(filename)?;
    writer.write_record(["n", "f", "upper", "lower"])?;
    let cell = |v: f64| if v.is_finite() { v.to_string() } else { String::new() };
    for (i, n) in samples.n.iter().enumerate() {
        writer.write_record([
            n.to_string(),
            cell(samples.f[i]),
            cell(samples.upper[i]),
            cell(samples.lower[i]),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
