use ComplexityCompass::asymptotic::analysis::{AnalysisSession, analyze};
use ComplexityCompass::asymptotic::classifier::{ClassificationResult, check_asymptotic_definitions};
use ComplexityCompass::asymptotic::config::AnalysisConfig;
use ComplexityCompass::asymptotic::dominant_term::dominant_term;
use ComplexityCompass::symbolic::parse_expr::{ParseError, Vocabulary, parse_function};
use ComplexityCompass::symbolic::symbolic_engine::Expr;
use ComplexityCompass::symbolic::symbolic_limits::LimitValue;

fn parse(input: &str) -> Expr {
    Expr::parse_expression(input).unwrap()
}

fn dominant(input: &str) -> Expr {
    dominant_term(&parse(input), &AnalysisConfig::default())
}

#[test]
fn monomial_is_its_own_dominant_term() {
    for input in ["n", "n^2", "n**3", "n^7", "n^(1/2)", "n^(3/2)", "n^0.25"] {
        let f = parse(input);
        assert_eq!(dominant(input), f.simplify(), "{}", input);
    }
}

#[test]
fn polynomial_dominance() {
    assert_eq!(dominant("n**2 + n"), parse("n^2").simplify());
    assert_eq!(dominant("n + n**2 + 1"), parse("n^2").simplify());
}

#[test]
fn linearithmic_dominates_linear() {
    assert_eq!(dominant("n*log(n) + n"), parse("n*log(n)").simplify());
}

#[test]
fn exponential_dominates_polynomial() {
    assert_eq!(dominant("2**n + n**100"), parse("2^n").simplify());
}

#[test]
fn function_against_itself_is_theta_with_unit_witnesses() {
    let config = AnalysisConfig::default();
    for input in ["n^2 + n", "n*log(n)", "2^n + n^100", "sqrt(n) + log(n)", "exp(n)/n", "5"] {
        let f = parse(input);
        let result = check_asymptotic_definitions(&f, &f, &config);
        assert!(result.big_o && result.big_omega && result.big_theta, "{}", input);
        assert_eq!(result.c_o, "1", "{}", input);
        assert_eq!(result.c_omega, "1", "{}", input);
        assert_eq!(result.limit(), Some(LimitValue::Finite(1.0)));
    }
}

#[test]
fn slower_function_against_forced_faster_reference() {
    let result = check_asymptotic_definitions(&parse("n"), &parse("n**2"), &AnalysisConfig::default());
    assert!(result.big_o);
    assert!(!result.big_omega);
    assert!(!result.big_theta);
}

#[test]
fn faster_function_against_slower_reference() {
    let result = check_asymptotic_definitions(&parse("n**3"), &parse("n"), &AnalysisConfig::default());
    assert!(!result.big_o);
    assert!(result.big_omega);
    assert!(!result.big_theta);
    assert_eq!(result.c_o, "oo");
}

#[test]
fn invalid_input_keeps_previous_state() {
    let config = AnalysisConfig::default();
    let session = AnalysisSession::new().submit("n^2 + n", &config).unwrap();
    for bad in ["(n + 1", "n + x", "n # 2", "sin(n)", "n^^2", ""] {
        assert!(session.submit(bad, &config).is_err(), "{}", bad);
        assert!(analyze(bad, &config).is_err(), "{}", bad);
    }
    assert_eq!(session.last().unwrap().input, "n^2 + n");
    assert_eq!(session.analyses(), 1);
    assert_eq!(
        analyze("(n + 1", &config).unwrap_err(),
        ParseError::UnbalancedBrackets
    );
}

#[test]
fn unresolvable_ratio_is_undefined() {
    let config = AnalysisConfig::default();
    let f = parse_function("n*sin(n)", Vocabulary::Extended).unwrap();
    let g = parse("n");
    assert_eq!(
        check_asymptotic_definitions(&f, &g, &config),
        ClassificationResult::undefined()
    );
    let alternating = parse("(-1)^n*n");
    let result = check_asymptotic_definitions(&alternating, &g, &config);
    assert!(!result.big_o && !result.big_omega && !result.big_theta);
    assert_eq!(result.c_o, "undefined");
    assert_eq!(result.n0, "undefined");
}

#[test]
fn full_pipeline_examples() {
    let config = AnalysisConfig::default();
    let analysis = analyze("3*n^2 + 2*n + 7", &config).unwrap();
    assert_eq!(analysis.g.to_string(), "3*n^2");
    assert!(analysis.result.big_theta);

    let analysis = analyze("n^3 + 2^n", &config).unwrap();
    assert_eq!(analysis.g.to_string(), "2^n");
    assert_eq!(analysis.result.c_o, "1");

    let analysis = analyze("log(n) + 10", &config).unwrap();
    assert_eq!(analysis.g.to_string(), "ln(n)");
    assert!(analysis.result.big_theta);
}

#[test]
fn differences_that_cancel_at_the_leading_order_are_big_o_of_their_terms() {
    let config = AnalysisConfig::default();
    for input in [
        "sqrt(n+1) - sqrt(n)",
        "n - sqrt(n^2 + 1)",
        "log(n+1) - log(n)",
        "n*log(n) - n*log(n+1)",
    ] {
        let analysis = analyze(input, &config).unwrap();
        let result = &analysis.result;
        assert_eq!(result.limit(), Some(LimitValue::Finite(0.0)), "{}", input);
        assert!(result.big_o, "{}", input);
        assert!(!result.big_omega, "{}", input);
        assert!(!result.big_theta, "{}", input);
        assert_eq!(result.n0, "symbolic", "{}", input);
    }
}

#[test]
fn even_powers_of_sums_keep_their_sign() {
    let config = AnalysisConfig::default();
    let root = analyze("sqrt((1-n)^2)", &config).unwrap();
    assert!((root.g.eval_at("n", 10.0).unwrap() - 9.0).abs() < 1e-9);
    assert!(root.result.big_theta);
    assert_eq!(root.result.c_o, "1");

    let log = analyze("log((1-n)^2)", &config).unwrap();
    assert!((log.g.eval_at("n", 10.0).unwrap() - 81f64.ln()).abs() < 1e-9);
    assert!(log.result.big_theta);
}

#[test]
fn triple_logarithm_is_theta_of_itself_plus_one() {
    let analysis = analyze("log(log(log(n))) + 1", &AnalysisConfig::default()).unwrap();
    assert_eq!(analysis.g.to_string(), "ln(ln(ln(n)))");
    assert!(analysis.result.big_o && analysis.result.big_omega && analysis.result.big_theta);
    assert_eq!(analysis.result.limit(), Some(LimitValue::Finite(1.0)));
}
