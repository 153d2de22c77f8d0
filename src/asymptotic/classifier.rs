//! Classification of `f` against a reference function `g` through the limit of `f/g`.
//!
//! | limit of f/g | Big-O | Big-Omega | Big-Theta |
//! |--------------|-------|-----------|-----------|
//! | 0            | true  | false     | false     |
//! | ±∞           | false | true      | false     |
//! | finite ≠ 0   | true  | true      | true      |
//!
//! When the limit cannot be computed every flag is false and the witnesses read `undefined`.

use crate::asymptotic::config::AnalysisConfig;
use crate::symbolic::parse_expr::VARIABLE;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_limits::{LimitValue, limit_at_infinity};
use log::debug;

pub const UNDEFINED: &str = "undefined";
/// marker for a threshold that follows from the limit but is not computed
pub const SYMBOLIC_THRESHOLD: &str = "symbolic";

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub big_o: bool,
    pub big_omega: bool,
    pub big_theta: bool,
    /// witness constant for the upper bound, the limit rendered as text
    pub c_o: String,
    pub c_omega: String,
    pub n0: String,
}

impl ClassificationResult {
    pub fn undefined() -> Self {
        Self {
            big_o: false,
            big_omega: false,
            big_theta: false,
            c_o: UNDEFINED.to_string(),
            c_omega: UNDEFINED.to_string(),
            n0: UNDEFINED.to_string(),
        }
    }

    fn from_limit(limit: LimitValue) -> Self {
        let (big_o, big_omega, big_theta) = if limit.is_zero() {
            (true, false, false)
        } else if limit.is_infinite() {
            (false, true, false)
        } else {
            (true, true, true)
        };
        Self {
            big_o,
            big_omega,
            big_theta,
            c_o: limit.to_string(),
            c_omega: limit.to_string(),
            n0: SYMBOLIC_THRESHOLD.to_string(),
        }
    }

    pub fn is_undefined(&self) -> bool {
        self.n0 == UNDEFINED
    }

    /// limit of f/g read back from the witness text, `None` for an undefined result
    pub fn limit(&self) -> Option<LimitValue> {
        match self.c_o.as_str() {
            UNDEFINED => None,
            "oo" => Some(LimitValue::PosInfinity),
            "-oo" => Some(LimitValue::NegInfinity),
            text => text.parse::<f64>().ok().map(LimitValue::Finite),
        }
    }
}

/// Classifies `f` against `g` from the limit of `f/g` as n tends to infinity.
///
/// A zero limit is reported with Big-O true and Big-Omega false; Big-Theta needs a
/// finite non-zero limit.
/// # Example
/// ```
/// use ComplexityCompass::asymptotic::classifier::check_asymptotic_definitions;
/// use ComplexityCompass::asymptotic::config::AnalysisConfig;
/// use ComplexityCompass::symbolic::symbolic_engine::Expr;
/// let f = Expr::parse_expression("3*n^2 + n").unwrap();
/// let g = Expr::parse_expression("n^2").unwrap();
/// let result = check_asymptotic_definitions(&f, &g, &AnalysisConfig::default());
/// assert!(result.big_theta);
/// assert_eq!(result.c_o, "3");
/// ```
pub fn check_asymptotic_definitions(
    f: &Expr,
    g: &Expr,
    config: &AnalysisConfig,
) -> ClassificationResult {
    let ratio = (f.clone() / g.clone()).simplify();
    match limit_at_infinity(&ratio, VARIABLE, config.max_limit_steps) {
        Ok(limit) => {
            if limit.is_zero() {
                debug!("{} / {} tends to 0, g grows strictly faster", f, g);
            }
            ClassificationResult::from_limit(limit)
        }
        Err(err) => {
            debug!("classification of {} against {} failed: {}", f, g, err);
            ClassificationResult::undefined()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::parse_expr::{Vocabulary, parse_function};

    fn classify(f: &str, g: &str) -> ClassificationResult {
        let f = parse_function(f, Vocabulary::Extended).unwrap();
        let g = parse_function(g, Vocabulary::Extended).unwrap();
        check_asymptotic_definitions(&f, &g, &AnalysisConfig::default())
    }

    #[test]
    fn test_finite_nonzero_limit_is_theta() {
        let result = classify("3*n^2 + n", "n^2");
        assert!(result.big_o && result.big_omega && result.big_theta);
        assert_eq!(result.c_o, "3");
        assert_eq!(result.c_omega, "3");
        assert_eq!(result.n0, SYMBOLIC_THRESHOLD);
        assert_eq!(result.limit(), Some(LimitValue::Finite(3.0)));
    }

    #[test]
    fn test_zero_limit() {
        let result = classify("n", "n^2");
        assert!(result.big_o);
        assert!(!result.big_omega);
        assert!(!result.big_theta);
        assert_eq!(result.c_o, "0");
    }

    #[test]
    fn test_infinite_limit() {
        let result = classify("2^n", "n^3");
        assert!(!result.big_o);
        assert!(result.big_omega);
        assert!(!result.big_theta);
        assert_eq!(result.c_o, "oo");
        assert_eq!(result.limit(), Some(LimitValue::PosInfinity));
    }

    #[test]
    fn test_oscillating_ratio_is_undefined() {
        let result = classify("n*sin(n)", "n");
        assert_eq!(result, ClassificationResult::undefined());
        assert!(result.is_undefined());
        assert_eq!(result.limit(), None);
    }

    #[test]
    fn test_budget_exhaustion_is_undefined() {
        let f = Expr::parse_expression("n^2").unwrap();
        let config = AnalysisConfig {
            max_limit_steps: 0,
            ..AnalysisConfig::default()
        };
        assert!(check_asymptotic_definitions(&f, &f, &config).is_undefined());
    }
}
