use crate::asymptotic::classifier::{ClassificationResult, check_asymptotic_definitions};
use crate::asymptotic::config::AnalysisConfig;
use crate::asymptotic::dominant_term::dominant_term;
use crate::symbolic::parse_expr::{ParseError, parse_function};
use crate::symbolic::symbolic_engine::Expr;
use log::info;

/// One completed analysis: the parsed function, its reference function and the verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub input: String,
    pub f: Expr,
    pub g: Expr,
    pub result: ClassificationResult,
}

/// Parses `input`, picks its dominant term as `g` and classifies `f` against `g`.
///
/// Only invalid syntax is an error; analyses the engine cannot decide come back
/// with an undefined result.
/// # Example
/// ```
/// use ComplexityCompass::asymptotic::analysis::analyze;
/// use ComplexityCompass::asymptotic::config::AnalysisConfig;
/// let analysis = analyze("n^2 + 3*n*log(n) + 5", &AnalysisConfig::default()).unwrap();
/// assert_eq!(analysis.g.to_string(), "n^2");
/// assert!(analysis.result.big_theta);
/// ```
pub fn analyze(input: &str, config: &AnalysisConfig) -> Result<Analysis, ParseError> {
    let f = parse_function(input, config.vocabulary)?;
    let g = dominant_term(&f, config);
    let result = check_asymptotic_definitions(&f, &g, config);
    info!(
        "f(n) = {}, g(n) = {}: O {}, Omega {}, Theta {} (c = {})",
        f, g, result.big_o, result.big_omega, result.big_theta, result.c_o
    );
    Ok(Analysis {
        input: input.to_string(),
        f,
        g,
        result,
    })
}

/// History of submitted functions; only the latest successful analysis is kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisSession {
    last: Option<Analysis>,
    analyses: usize,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&Analysis> {
        self.last.as_ref()
    }

    /// number of successful analyses so far
    pub fn analyses(&self) -> usize {
        self.analyses
    }

    /// Analyzes `input` into a new session; on a parse error `self` is left as it was.
    pub fn submit(&self, input: &str, config: &AnalysisConfig) -> Result<AnalysisSession, ParseError> {
        let analysis = analyze(input, config)?;
        Ok(AnalysisSession {
            last: Some(analysis),
            analyses: self.analyses + 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::parse_expr::Vocabulary;

    #[test]
    fn test_analyze_polynomial() {
        let analysis = analyze("n^2 + 3*n*log(n) + 5", &AnalysisConfig::default()).unwrap();
        assert_eq!(analysis.input, "n^2 + 3*n*log(n) + 5");
        assert_eq!(analysis.g.to_string(), "n^2");
        assert!(analysis.result.big_o && analysis.result.big_omega && analysis.result.big_theta);
        assert_eq!(analysis.result.c_o, "1");
    }

    #[test]
    fn test_analyze_rejects_invalid_syntax() {
        let config = AnalysisConfig::default();
        assert!(analyze("n^^2", &config).is_err());
        assert!(analyze("", &config).is_err());
        assert!(matches!(analyze("x + 1", &config), Err(ParseError::UnknownSymbol(_))));
        assert!(analyze("sin(n)", &config).is_err());
    }

    #[test]
    fn test_extended_vocabulary_gives_undefined_result() {
        let config = AnalysisConfig {
            vocabulary: Vocabulary::Extended,
            ..AnalysisConfig::default()
        };
        let analysis = analyze("n + n*sin(n)", &config).unwrap();
        assert!(analysis.result.is_undefined());
    }

    #[test]
    fn test_session_keeps_previous_analysis_on_error() {
        let config = AnalysisConfig::default();
        let session = AnalysisSession::new();
        assert!(session.last().is_none());

        let session = session.submit("n*log(n) + n", &config).unwrap();
        assert_eq!(session.analyses(), 1);
        assert!(session.submit("n +* 2", &config).is_err());
        assert_eq!(session.last().unwrap().input, "n*log(n) + n");

        let session = session.submit("2^n + n^3", &config).unwrap();
        assert_eq!(session.analyses(), 2);
        assert_eq!(session.last().unwrap().g.to_string(), "2^n");
    }
}
