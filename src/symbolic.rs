/// a module turns a String growth function of n into a symbolic expression
///
///# Example
/// ```
/// use ComplexityCompass::symbolic::symbolic_engine::Expr;
/// let input = "n^2 + 3*n*log(n) + 5";
/// let parsed_expression = Expr::parse_expression(input).unwrap();
/// println!(" parsed_expression {}", parsed_expression);
/// let parsed_function = parsed_expression.lambdify1D();
/// println!("{}, Rust function: {}  \n", input, parsed_function(1.0));
/// ```
/// ________________________________________________________________________________________________________________________________
pub mod parse_expr;
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// a module
/// 1) keeps a symbolic expression of one variable as a tree
/// 2) builds expressions with the usual arithmetic operators
/// 3) turns a symbolic expression into a string expression for printing and control results
///# Example#
/// ```
/// use ComplexityCompass::symbolic::symbolic_engine::Expr;
/// let n = Expr::var("n");
/// let f = n.clone() * n.clone().ln() + Expr::Const(2.0) * n;
/// assert_eq!(f.to_string(), "n*ln(n) + 2*n");
/// assert_eq!(f.variables(), vec!["n".to_string()]);
/// ```
/// ________________________________________________________________________________________________________________________________________________
pub mod symbolic_engine;
///________________________________________________________________________________________________________________________________________________
/// turns a symbolic expression into a Rust function and evaluates it
pub mod symbolic_lambdify;
///________________________________________________________________________________________________________________________________________________
/// limits at infinity by leading asymptotic scales
/// # Example
/// ```
/// use ComplexityCompass::symbolic::symbolic_engine::Expr;
/// use ComplexityCompass::symbolic::symbolic_limits::{limit_at_infinity, LimitValue};
/// let ratio = Expr::parse_expression("2^n/n^3").unwrap();
/// assert_eq!(limit_at_infinity(&ratio, "n", 10_000), Ok(LimitValue::PosInfinity));
/// ```
pub mod symbolic_limits;
///________________________________________________________________________________________________________________________________________________
/// canonical sum-of-products form, simplification and expansion
/// # Example
/// ```
/// use ComplexityCompass::symbolic::symbolic_engine::Expr;
/// let f = Expr::parse_expression("(n + 1)^2 - n").unwrap();
/// assert_eq!(f.expand().to_string(), "n^2 + n + 1");
/// ```
pub mod symbolic_simplify;
///______________________________________________________________________________________________________________________________________________
/// the collection of utility functions mainly for bracket parsing and proceeding
/// _____________________________________________________________________________________________________________________________________________
pub mod utils;
