//! Extraction of the dominant (fastest-growing) additive term of a growth function.
//!
//! The function is simplified and expanded into a canonical sum. Its terms are scanned in
//! order, and a candidate replaces the current dominant term when the limit of
//! `candidate / dominant` at infinity is infinite. When the symbolic limit fails, both terms
//! are evaluated at a large sample point and compared as floating-point numbers, infinities
//! included; when either value is NaN the current dominant term is kept.

use crate::asymptotic::config::AnalysisConfig;
use crate::symbolic::parse_expr::VARIABLE;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_limits::limit_at_infinity;
use log::debug;
use strum_macros::Display;

/// How a comparison between two terms was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Strategy {
    Symbolic,
    Numeric,
}

/// Outcome of comparing a candidate term against the current dominant term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermComparison {
    Dominates(Strategy),
    DoesNotDominate(Strategy),
    /// neither the limit nor the numeric values could decide
    Indeterminate,
}

/// Compares `candidate` against `dominant`; never fails.
pub fn compare_terms(candidate: &Expr, dominant: &Expr, config: &AnalysisConfig) -> TermComparison {
    let ratio = (candidate.clone() / dominant.clone()).simplify();
    match limit_at_infinity(&ratio, VARIABLE, config.max_limit_steps) {
        Ok(limit) if limit.is_infinite() => TermComparison::Dominates(Strategy::Symbolic),
        Ok(_) => TermComparison::DoesNotDominate(Strategy::Symbolic),
        Err(err) => {
            debug!(
                "symbolic comparison of {} against {} failed ({}), sampling at n = {}",
                candidate, dominant, err, config.sample_point
            );
            // overflow to +-inf still orders the two terms, NaN does not
            let c = candidate.eval_expression(VARIABLE, config.sample_point);
            let d = dominant.eval_expression(VARIABLE, config.sample_point);
            if c.is_nan() || d.is_nan() {
                TermComparison::Indeterminate
            } else if c > d {
                TermComparison::Dominates(Strategy::Numeric)
            } else {
                TermComparison::DoesNotDominate(Strategy::Numeric)
            }
        }
    }
}

/// Dominant additive term of `f`; a function that is not a sum is returned simplified.
///
/// # Example
/// ```
/// use ComplexityCompass::asymptotic::config::AnalysisConfig;
/// use ComplexityCompass::asymptotic::dominant_term::dominant_term;
/// use ComplexityCompass::symbolic::symbolic_engine::Expr;
/// let f = Expr::parse_expression("n^2 + 3*n*log(n) + 5").unwrap();
/// let g = dominant_term(&f, &AnalysisConfig::default());
/// assert_eq!(g.to_string(), "n^2");
/// ```
pub fn dominant_term(f: &Expr, config: &AnalysisConfig) -> Expr {
    let expanded = f.simplify().expand();
    if !expanded.is_sum() {
        return expanded.simplify();
    }
    let mut terms = expanded.additive_terms().into_iter();
    let Some(mut dominant) = terms.next() else {
        return expanded;
    };
    for candidate in terms {
        let outcome = compare_terms(&candidate, &dominant, config);
        debug!("{} vs {}: {:?}", candidate, dominant, outcome);
        if let TermComparison::Dominates(_) = outcome {
            dominant = candidate;
        }
    }
    dominant.simplify()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dominant(input: &str) -> String {
        let f = Expr::parse_expression(input).unwrap();
        dominant_term(&f, &AnalysisConfig::default()).to_string()
    }

    #[test]
    fn test_single_term_is_returned_simplified() {
        assert_eq!(dominant("n*n"), "n^2");
        assert_eq!(dominant("3*n"), "3*n");
        assert_eq!(dominant("7"), "7");
    }

    #[test]
    fn test_polynomials_and_logs() {
        assert_eq!(dominant("n^2 + n"), "n^2");
        assert_eq!(dominant("n + n^2"), "n^2");
        assert_eq!(dominant("n*log(n) + n"), "n*ln(n)");
        assert_eq!(dominant("log(n) + sqrt(n)"), "n^0.5");
        assert_eq!(dominant("(n + 1)^2"), "n^2");
    }

    #[test]
    fn test_exponential_beats_polynomial() {
        assert_eq!(dominant("2^n + n^100"), "2^n");
        assert_eq!(dominant("n^100 + 2^n"), "2^n");
    }

    #[test]
    fn test_negative_leading_term_keeps_its_sign() {
        assert_eq!(dominant("5 - n^2"), "-n^2");
    }

    #[test]
    fn test_compare_terms_strategies() {
        let config = AnalysisConfig::default();
        let n2 = Expr::parse_expression("n^2").unwrap();
        let n = Expr::var("n");
        assert_eq!(
            compare_terms(&n2, &n, &config),
            TermComparison::Dominates(Strategy::Symbolic)
        );
        assert_eq!(
            compare_terms(&n, &n2, &config),
            TermComparison::DoesNotDominate(Strategy::Symbolic)
        );
    }

    #[test]
    fn test_numeric_fallback_and_indeterminate() {
        let config = AnalysisConfig {
            max_limit_steps: 0,
            ..AnalysisConfig::default()
        };
        let n2 = Expr::parse_expression("n^2").unwrap();
        let n = Expr::var("n");
        assert_eq!(
            compare_terms(&n2, &n, &config),
            TermComparison::Dominates(Strategy::Numeric)
        );
        let huge = Expr::parse_expression("2^n").unwrap();
        assert_eq!(
            compare_terms(&huge, &n, &config),
            TermComparison::Dominates(Strategy::Numeric)
        );
        assert_eq!(
            compare_terms(&n, &huge, &config),
            TermComparison::DoesNotDominate(Strategy::Numeric)
        );
        let negative_log = Expr::parse_expression("log(0 - n)").unwrap();
        assert_eq!(
            compare_terms(&negative_log, &n, &config),
            TermComparison::Indeterminate
        );
    }

    #[test]
    fn test_triple_logarithm_dominates_constant() {
        assert_eq!(dominant("log(log(log(n))) + 1"), "ln(ln(ln(n)))");
        assert_eq!(dominant("1 + log(log(log(n)))"), "ln(ln(ln(n)))");
    }
}
