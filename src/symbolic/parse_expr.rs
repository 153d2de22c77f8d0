use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::utils::{
    brackets_balanced, enclosed_in_brackets, find_char_positions_outside_brackets,
    find_pair_to_this_bracket,
};
use regex::Regex;
use std::sync::LazyLock;
use strum_macros::{Display, EnumString};
use thiserror::Error;
/// a module turns a String with a growth function of `n` into a symbolic expression
///# Example
/// ```
/// use ComplexityCompass::symbolic::parse_expr::{parse_function, Vocabulary};
/// let parsed = parse_function("n**2 + 3*n*log(n)", Vocabulary::Strict).unwrap();
/// assert_eq!(parsed.to_string(), "n^2 + 3*n*ln(n)");
/// ```
//                  search recursion diagram
//                "n^2+3*n*log(n)-sqrt(n)"          |
//                |       left  | right             |
//                |_________________________________|
//                |    div by rightmost + or -      |
//                |_________________________________|
//                | n^2+3*n*log(n)  |   sqrt(n)     |
//                |       |         |      |        |
//                |_____ \|/        |      |        |
//                |    div by +     | function call |
//                |_________________|_____\|/_______|
//                |  n^2 | 3*n*log(n)     n^0.5     |
//                |   |  |     |                    |
//                |  \|/ |    \|/                   |
//                | div ^| div by rightmost *       |
//                |______|__________________________|
//                  etc...

/// the only free variable a growth function may use
pub const VARIABLE: &str = "n";

/// functions every vocabulary accepts; `log` is the natural logarithm
pub const ALLOWED_FUNCTIONS: [&str; 4] = ["log", "ln", "exp", "sqrt"];

/// functions only the extended vocabulary accepts
pub const OSCILLATING_FUNCTIONS: [&str; 2] = ["sin", "cos"];

/// the warning shown to a user whose input was rejected
pub const INVALID_SYNTAX_WARNING: &str =
    "Invalid function syntax. Use allowed symbols: n, +, -, *, /, ^, log, ln, sqrt, exp";

const MAX_INPUT_LEN: usize = 4096;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());
static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?$").unwrap());
// mantissa of a number in scientific notation, the sign after it belongs to the exponent
static EXPONENT_MANTISSA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^A-Za-z0-9_.])(?:\d+\.?\d*|\.\d+)[eE]$").unwrap());

/// which function names the parser accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Vocabulary {
    /// n, numbers, + - * / ^ **, log, ln, exp, sqrt
    #[default]
    Strict,
    /// the strict set plus sin and cos
    Extended,
}

impl Vocabulary {
    pub fn accepts(&self, function: &str) -> bool {
        ALLOWED_FUNCTIONS.contains(&function)
            || (*self == Vocabulary::Extended && OSCILLATING_FUNCTIONS.contains(&function))
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("empty input")]
    Empty,
    #[error("unbalanced brackets")]
    UnbalancedBrackets,
    #[error("unknown symbol '{0}', the only variable is n")]
    UnknownSymbol(String),
    #[error("unknown function '{0}'")]
    UnknownFunction(String),
    #[error("invalid character '{0}'")]
    InvalidCharacter(char),
    #[error("malformed expression '{0}'")]
    Malformed(String),
}

/// Parses a growth function of `n`.
///
/// Whitespace is ignored and `**` is read as `^`. The returned tree is not simplified.
pub fn parse_function(input: &str, vocabulary: Vocabulary) -> Result<Expr, ParseError> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(ParseError::Empty);
    }
    if compact.len() > MAX_INPUT_LEN {
        return Err(ParseError::Malformed(format!(
            "input longer than {} characters",
            MAX_INPUT_LEN
        )));
    }
    if let Some(c) = compact
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || "+-*/^()._".contains(*c)))
    {
        return Err(ParseError::InvalidCharacter(c));
    }
    if !brackets_balanced(&compact) {
        return Err(ParseError::UnbalancedBrackets);
    }
    let normalized = compact.replace("**", "^");
    parse_expression_func(&normalized, vocabulary)
}

impl Expr {
    /// Parses with the strict vocabulary.
    pub fn parse_expression(input: &str) -> Result<Expr, ParseError> {
        parse_function(input, Vocabulary::Strict)
    }
}

// a sign is binary only if something that can end an operand stands on its left
fn is_binary_sign(input: &str, pos: usize) -> bool {
    if pos == 0 {
        return false;
    }
    let prev = input.as_bytes()[pos - 1] as char;
    if "+-*/^(".contains(prev) {
        return false;
    }
    !EXPONENT_MANTISSA.is_match(&input[..pos])
}

fn operand<'a>(input: &'a str, side: &str) -> Result<&'a str, ParseError> {
    if input.is_empty() {
        Err(ParseError::Malformed(format!("missing {} operand", side)))
    } else {
        Ok(input)
    }
}

/// recursive descent by splitting on the weakest operator outside brackets;
/// the input must already be validated and stripped of whitespace
pub fn parse_expression_func(input: &str, vocabulary: Vocabulary) -> Result<Expr, ParseError> {
    if input.is_empty() {
        return Err(ParseError::Malformed("empty operand".to_string()));
    }
    if enclosed_in_brackets(input) {
        return parse_expression_func(&input[1..input.len() - 1], vocabulary);
    }

    // addition and subtraction: rightmost binary sign, left associative
    if let Some((pos, op)) = find_char_positions_outside_brackets(input, &['+', '-'])
        .into_iter()
        .filter(|(pos, _)| is_binary_sign(input, *pos))
        .last()
    {
        let left = parse_expression_func(operand(&input[..pos], "left")?, vocabulary)?;
        let right = parse_expression_func(operand(&input[pos + 1..], "right")?, vocabulary)?;
        return Ok(match op {
            '+' => Expr::Add(Box::new(left), Box::new(right)),
            _ => Expr::Sub(Box::new(left), Box::new(right)),
        });
    }

    // multiplication and division: rightmost operator, left associative
    if let Some((pos, op)) = find_char_positions_outside_brackets(input, &['*', '/'])
        .into_iter()
        .last()
    {
        let left = parse_expression_func(operand(&input[..pos], "left")?, vocabulary)?;
        let right = parse_expression_func(operand(&input[pos + 1..], "right")?, vocabulary)?;
        return Ok(match op {
            '*' => Expr::Mul(Box::new(left), Box::new(right)),
            _ => Expr::Div(Box::new(left), Box::new(right)),
        });
    }

    // unary signs bind weaker than powers: -n^2 = -(n^2)
    if let Some(rest) = input.strip_prefix('-') {
        let inner = parse_expression_func(operand(rest, "right")?, vocabulary)?;
        return Ok(match inner {
            Expr::Const(value) => Expr::Const(-value),
            other => -other,
        });
    }
    if let Some(rest) = input.strip_prefix('+') {
        return parse_expression_func(operand(rest, "right")?, vocabulary);
    }

    // powers: leftmost operator, right associative
    if let Some((pos, _)) = find_char_positions_outside_brackets(input, &['^']).first() {
        let base = parse_expression_func(operand(&input[..*pos], "left")?, vocabulary)?;
        let exponent = parse_expression_func(operand(&input[pos + 1..], "right")?, vocabulary)?;
        return Ok(Expr::Pow(Box::new(base), Box::new(exponent)));
    }

    // function calls
    if let Some(open) = input.find('(') {
        let name = &input[..open];
        if !IDENTIFIER.is_match(name) || find_pair_to_this_bracket(input, open) != Some(input.len() - 1)
        {
            return Err(ParseError::Malformed(input.to_string()));
        }
        if !vocabulary.accepts(name) {
            return Err(ParseError::UnknownFunction(name.to_string()));
        }
        let inner = parse_expression_func(&input[open + 1..input.len() - 1], vocabulary)?;
        return Ok(match name {
            "log" | "ln" => Expr::Ln(Box::new(inner)),
            "exp" => Expr::Exp(Box::new(inner)),
            "sqrt" => inner.sqrt(),
            "sin" => Expr::sin(Box::new(inner)),
            _ => Expr::cos(Box::new(inner)),
        });
    }

    // constants and the variable
    if NUMBER.is_match(input) {
        return input
            .parse::<f64>()
            .map(Expr::Const)
            .map_err(|_| ParseError::Malformed(input.to_string()));
    }
    if IDENTIFIER.is_match(input) {
        return if input == VARIABLE {
            Ok(Expr::Var(input.to_string()))
        } else {
            Err(ParseError::UnknownSymbol(input.to_string()))
        };
    }
    Err(ParseError::Malformed(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n() -> Expr {
        Expr::Var("n".to_string())
    }

    fn parse(input: &str) -> Result<Expr, ParseError> {
        parse_function(input, Vocabulary::Strict)
    }

    #[test]
    fn test_parse_constant_and_variable() {
        assert_eq!(parse("42").unwrap(), Expr::Const(42.0));
        assert_eq!(parse("2.5").unwrap(), Expr::Const(2.5));
        assert_eq!(parse("1e-3").unwrap(), Expr::Const(1e-3));
        assert_eq!(parse(" n ").unwrap(), n());
    }

    #[test]
    fn test_parse_addition_is_left_associative() {
        let expr = parse("n - 2 + 1").unwrap();
        assert_eq!(expr, (n() - Expr::Const(2.0)) + Expr::Const(1.0));
    }

    #[test]
    fn test_parse_products_and_quotients() {
        let expr = parse("n / 2 * 3").unwrap();
        assert_eq!(expr, (n() / Expr::Const(2.0)) * Expr::Const(3.0));
    }

    #[test]
    fn test_parse_power_right_associative_and_double_star() {
        let expr = parse("2^3^n").unwrap();
        assert_eq!(expr, Expr::Const(2.0).pow(Expr::Const(3.0).pow(n())));
        assert_eq!(parse("n**2").unwrap(), parse("n^2").unwrap());
    }

    #[test]
    fn test_parse_unary_minus() {
        assert_eq!(parse("-n^2").unwrap(), -(n().pow(Expr::Const(2.0))));
        assert_eq!(parse("n^-1").unwrap(), n().pow(Expr::Const(-1.0)));
        assert_eq!(parse("(-1)^n").unwrap(), Expr::Const(-1.0).pow(n()));
        assert_eq!(parse("n*-2").unwrap(), n() * Expr::Const(-2.0));
        assert_eq!(parse("2e-3*n").unwrap(), Expr::Const(2e-3) * n());
    }

    #[test]
    fn test_parse_functions() {
        assert_eq!(parse("log(n)").unwrap(), n().ln());
        assert_eq!(parse("ln(n)").unwrap(), n().ln());
        assert_eq!(parse("exp(n)").unwrap(), n().exp());
        assert_eq!(parse("sqrt(n)").unwrap(), n().pow(Expr::Const(0.5)));
        assert_eq!(
            parse("n*log(n+1)").unwrap(),
            n() * (n() + Expr::Const(1.0)).ln()
        );
        assert_eq!(
            parse("(n+1)*(n-1)").unwrap(),
            (n() + Expr::Const(1.0)) * (n() - Expr::Const(1.0))
        );
    }

    #[test]
    fn test_vocabulary() {
        assert_eq!(
            parse("sin(n)"),
            Err(ParseError::UnknownFunction("sin".to_string()))
        );
        assert_eq!(
            parse_function("sin(n)", Vocabulary::Extended).unwrap(),
            Expr::sin(Box::new(n()))
        );
        assert_eq!("extended".parse::<Vocabulary>().unwrap(), Vocabulary::Extended);
        assert_eq!(Vocabulary::Strict.to_string(), "strict");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse("   "), Err(ParseError::Empty));
        assert_eq!(parse("n +* 2").map_err(|e| matches!(e, ParseError::Malformed(_))), Err(true));
        assert_eq!(parse("(n+1"), Err(ParseError::UnbalancedBrackets));
        assert_eq!(parse("x^2"), Err(ParseError::UnknownSymbol("x".to_string())));
        assert_eq!(parse("n$2"), Err(ParseError::InvalidCharacter('$')));
        assert!(matches!(parse("n^"), Err(ParseError::Malformed(_))));
        assert!(matches!(parse("log()"), Err(ParseError::Malformed(_))));
        assert!(matches!(parse("2(n)"), Err(ParseError::Malformed(_))));
        assert!(matches!(parse("inf"), Err(ParseError::UnknownSymbol(_))));
    }
}
