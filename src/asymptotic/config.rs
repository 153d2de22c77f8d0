use crate::Utils::task_parser::{DocumentMap, Value, parse_document_as};
use crate::symbolic::parse_expr::Vocabulary;
use crate::symbolic::symbolic_limits::DEFAULT_STEP_BUDGET;
use log::{LevelFilter, warn};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Domain over which the bounds are sampled for plotting.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSettings {
    pub start: f64,
    pub end: f64,
    pub points: usize,
}

impl Default for PlotSettings {
    fn default() -> Self {
        Self {
            start: 1.0,
            end: 80.0,
            points: 400,
        }
    }
}

/// Settings of one analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// point at which terms are compared numerically when the symbolic limit fails
    pub sample_point: f64,
    /// reduction steps one limit computation may take
    pub max_limit_steps: usize,
    pub vocabulary: Vocabulary,
    pub plot: PlotSettings,
    pub log_level: LevelFilter,
    /// also write the log into a timestamped file
    pub log_to_file: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_point: 1e6,
            max_limit_steps: DEFAULT_STEP_BUDGET,
            vocabulary: Vocabulary::Strict,
            plot: PlotSettings::default(),
            log_level: LevelFilter::Info,
            log_to_file: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config document: {0}")]
    Document(String),
    #[error("invalid value for {section}.{key}: {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },
}

const KNOWN_KEYS: [(&str, &[&str]); 3] = [
    ("analysis", &["sample_point", "max_limit_steps", "vocabulary"]),
    ("plot", &["start", "end", "points"]),
    ("logging", &["level", "to_file"]),
];

struct Reader<'a> {
    doc: &'a DocumentMap,
}

impl<'a> Reader<'a> {
    fn invalid(section: &str, key: &str, message: impl Into<String>) -> ConfigError {
        ConfigError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            message: message.into(),
        }
    }

    fn value(&self, section: &str, key: &str) -> Result<Option<&'a Value>, ConfigError> {
        let Some(values) = self.doc.get(section).and_then(|s| s.get(key)) else {
            return Ok(None);
        };
        match values.as_slice() {
            [single] => Ok(Some(single)),
            _ => Err(Self::invalid(section, key, "expected exactly one value")),
        }
    }

    fn float(&self, section: &str, key: &str) -> Result<Option<f64>, ConfigError> {
        self.value(section, key)?
            .map(|v| {
                v.as_float()
                    .ok_or_else(|| Self::invalid(section, key, format!("'{}' is not a number", v)))
            })
            .transpose()
    }

    fn count(&self, section: &str, key: &str) -> Result<Option<usize>, ConfigError> {
        self.value(section, key)?
            .map(|v| {
                v.as_integer()
                    .and_then(|i| usize::try_from(i).ok())
                    .ok_or_else(|| {
                        Self::invalid(section, key, format!("'{}' is not a non-negative integer", v))
                    })
            })
            .transpose()
    }

    fn boolean(&self, section: &str, key: &str) -> Result<Option<bool>, ConfigError> {
        self.value(section, key)?
            .map(|v| {
                v.as_boolean()
                    .ok_or_else(|| Self::invalid(section, key, format!("'{}' is not a boolean", v)))
            })
            .transpose()
    }

    fn parsed<T: FromStr>(&self, section: &str, key: &str) -> Result<Option<T>, ConfigError> {
        self.value(section, key)?
            .map(|v| {
                v.to_string()
                    .parse::<T>()
                    .map_err(|_| Self::invalid(section, key, format!("unknown option '{}'", v)))
            })
            .transpose()
    }
}

impl AnalysisConfig {
    /// Reads settings from a task document; missing sections and keys keep their defaults.
    pub fn from_document(input: &str) -> Result<Self, ConfigError> {
        let doc = parse_document_as(input).map_err(ConfigError::Document)?;
        for (title, section) in &doc {
            match KNOWN_KEYS.iter().find(|(known, _)| *known == title.as_str()) {
                None => warn!("config: unknown section '{}' ignored", title),
                Some((_, keys)) => {
                    for key in section.keys().filter(|k| !keys.contains(&k.as_str())) {
                        warn!("config: unknown key '{}.{}' ignored", title, key);
                    }
                }
            }
        }

        let reader = Reader { doc: &doc };
        let mut config = AnalysisConfig::default();
        if let Some(v) = reader.float("analysis", "sample_point")? {
            config.sample_point = v;
        }
        if let Some(v) = reader.count("analysis", "max_limit_steps")? {
            config.max_limit_steps = v;
        }
        if let Some(v) = reader.parsed::<Vocabulary>("analysis", "vocabulary")? {
            config.vocabulary = v;
        }
        if let Some(v) = reader.float("plot", "start")? {
            config.plot.start = v;
        }
        if let Some(v) = reader.float("plot", "end")? {
            config.plot.end = v;
        }
        if let Some(v) = reader.count("plot", "points")? {
            config.plot.points = v;
        }
        if let Some(v) = reader.parsed::<LevelFilter>("logging", "level")? {
            config.log_level = v;
        }
        if let Some(v) = reader.boolean("logging", "to_file")? {
            config.log_to_file = v;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_document(&content)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sample_point.is_finite() && self.sample_point > 0.0) {
            return Err(Reader::invalid("analysis", "sample_point", "must be a positive number"));
        }
        if self.max_limit_steps == 0 {
            return Err(Reader::invalid("analysis", "max_limit_steps", "must be positive"));
        }
        if !(self.plot.start.is_finite() && self.plot.end.is_finite() && self.plot.start < self.plot.end)
        {
            return Err(Reader::invalid("plot", "end", "plot domain must satisfy start < end"));
        }
        if self.plot.points < 2 {
            return Err(Reader::invalid("plot", "points", "at least 2 points are needed"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.sample_point, 1e6);
        assert_eq!(config.max_limit_steps, 10_000);
        assert_eq!(config.vocabulary, Vocabulary::Strict);
        assert_eq!(config.plot, PlotSettings { start: 1.0, end: 80.0, points: 400 });
        assert_eq!(AnalysisConfig::from_document("").unwrap(), config);
    }

    #[test]
    fn test_full_document() {
        let doc = "analysis\n  sample_point: 1000\n  max_limit_steps: 500\n  vocabulary: extended\nplot\n  start: 2\n  end: 20.5\n  points: 50\nlogging\n  level: debug\n  to_file: true\n";
        let config = AnalysisConfig::from_document(doc).unwrap();
        assert_eq!(config.sample_point, 1000.0);
        assert_eq!(config.max_limit_steps, 500);
        assert_eq!(config.vocabulary, Vocabulary::Extended);
        assert_eq!(config.plot, PlotSettings { start: 2.0, end: 20.5, points: 50 });
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert!(config.log_to_file);
    }

    #[test]
    fn test_partial_document_keeps_defaults() {
        let config = AnalysisConfig::from_document("plot\n  points: 100").unwrap();
        assert_eq!(config.plot.points, 100);
        assert_eq!(config.plot.end, 80.0);
        assert_eq!(config.sample_point, 1e6);
    }

    #[test]
    fn test_invalid_values() {
        let err = AnalysisConfig::from_document("analysis\n  vocabulary: greek").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "vocabulary"));
        let err = AnalysisConfig::from_document("plot\n  points: many").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        let err = AnalysisConfig::from_document("plot\n  start: 10\n  end: 5").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        let err = AnalysisConfig::from_document("analysis\n  sample_point: 1, 2").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "analysis\n  sample_point: 5e5").unwrap();
        let config = AnalysisConfig::from_file(file.path()).unwrap();
        assert_eq!(config.sample_point, 5e5);
        assert!(matches!(
            AnalysisConfig::from_file("/nonexistent/compass.task"),
            Err(ConfigError::Io { .. })
        ));
    }
}
