//! # Symbolic Engine Module
//!
//! Core expression tree used by the asymptotic analysis. An expression is a function of a
//! single positive real variable (conventionally `n`) built from numeric constants, the
//! arithmetic operators and the elementary functions `exp` and `ln` (square roots are
//! represented as powers with exponent `0.5`).
//!
//! ## Main Structures and Methods
//!
//! ### `Expr` Enum
//! - **Variables**: `Var(String)`
//! - **Constants**: `Const(f64)`
//! - **Operations**: `Add`, `Sub`, `Mul`, `Div`, `Pow`
//! - **Functions**: `Exp`, `Ln`, and the oscillating `sin`, `cos` accepted by the extended vocabulary
//!
//! ### Key Methods
//! - `set_variable(var, value)` - substitute a number for a variable
//! - `contains_variable(var)` - structural search
//! - `simplify()` / `expand()` / `additive_terms()` - see `symbolic_simplify`
//! - `eval_at(var, value)` / `lambdify1D()` - see `symbolic_lambdify`
//!
//! Operator overloading (`+ - * /` and unary `-`) builds trees without simplification, so
//! `f.clone() / g.clone()` is the raw symbolic ratio of two expressions.

#![allow(non_camel_case_types)]

use std::fmt;

/// Symbolic expression tree over a single free variable.
///
/// # Examples
/// ```rust, ignore
/// use ComplexityCompass::symbolic::symbolic_engine::Expr;
/// let n = Expr::var("n");
/// let f = n.clone().pow(Expr::Const(2.0)) + n; // n^2 + n
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Symbolic variable with a name
    Var(String),
    /// Numerical constant value
    Const(f64),
    /// Addition operation: left + right
    Add(Box<Expr>, Box<Expr>),
    /// Subtraction operation: left - right
    Sub(Box<Expr>, Box<Expr>),
    /// Multiplication operation: left * right
    Mul(Box<Expr>, Box<Expr>),
    /// Division operation: left / right
    Div(Box<Expr>, Box<Expr>),
    /// Power operation: base ^ exponent
    Pow(Box<Expr>, Box<Expr>),
    /// Exponential function: e^x
    Exp(Box<Expr>),
    /// Natural logarithm: ln(x)
    Ln(Box<Expr>),
    /// Sine function: sin(x)
    sin(Box<Expr>),
    /// Cosine function: cos(x)
    cos(Box<Expr>),
}

impl Expr {
    /// Binding strength used by `Display` to decide where parentheses are needed.
    fn precedence(&self) -> u8 {
        match self {
            Expr::Add(_, _) | Expr::Sub(_, _) => 1,
            Expr::Mul(_, _) | Expr::Div(_, _) => 2,
            Expr::Const(c) if *c < 0.0 => 2,
            Expr::Pow(_, _) => 4,
            _ => 5,
        }
    }

    fn fmt_child(&self, f: &mut fmt::Formatter, min_precedence: u8) -> fmt::Result {
        if self.precedence() < min_precedence {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

/// Infix rendering with the minimal set of parentheses, e.g. `n^2 + 3*n*ln(n)`.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Const(val) => write!(f, "{}", val),
            Expr::Add(lhs, rhs) => {
                lhs.fmt_child(f, 1)?;
                write!(f, " + ")?;
                rhs.fmt_child(f, 1)
            }
            Expr::Sub(lhs, rhs) => {
                lhs.fmt_child(f, 1)?;
                write!(f, " - ")?;
                rhs.fmt_child(f, 2)
            }
            Expr::Mul(lhs, rhs) => {
                if let Expr::Const(c) = lhs.as_ref() {
                    if *c == -1.0 {
                        write!(f, "-")?;
                        return rhs.fmt_child(f, 3);
                    }
                }
                lhs.fmt_child(f, 2)?;
                write!(f, "*")?;
                rhs.fmt_child(f, 2)
            }
            Expr::Div(lhs, rhs) => {
                lhs.fmt_child(f, 2)?;
                write!(f, "/")?;
                rhs.fmt_child(f, 3)
            }
            Expr::Pow(base, exp) => {
                base.fmt_child(f, 5)?;
                write!(f, "^")?;
                exp.fmt_child(f, 4)
            }
            Expr::Exp(expr) => write!(f, "exp({})", expr),
            Expr::Ln(expr) => write!(f, "ln({})", expr),
            Expr::sin(expr) => write!(f, "sin({})", expr),
            Expr::cos(expr) => write!(f, "cos({})", expr),
        }
    }
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::Add(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::Sub(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::Mul(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Expr::Div(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(self))
    }
}

impl Expr {
    /// Creates a variable expression.
    pub fn var(name: &str) -> Expr {
        Expr::Var(name.to_string())
    }

    /// Substitutes a variable with a constant value throughout the expression.
    ///
    /// # Arguments
    /// * `var` - Name of the variable to substitute
    /// * `value` - Numerical value to substitute for the variable
    ///
    /// # Returns
    /// New expression with the variable substituted
    pub fn set_variable(&self, var: &str, value: f64) -> Expr {
        match self {
            Expr::Var(name) if name == var => Expr::Const(value),
            Expr::Add(lhs, rhs) => Expr::Add(
                Box::new(lhs.set_variable(var, value)),
                Box::new(rhs.set_variable(var, value)),
            ),
            Expr::Sub(lhs, rhs) => Expr::Sub(
                Box::new(lhs.set_variable(var, value)),
                Box::new(rhs.set_variable(var, value)),
            ),
            Expr::Mul(lhs, rhs) => Expr::Mul(
                Box::new(lhs.set_variable(var, value)),
                Box::new(rhs.set_variable(var, value)),
            ),
            Expr::Div(lhs, rhs) => Expr::Div(
                Box::new(lhs.set_variable(var, value)),
                Box::new(rhs.set_variable(var, value)),
            ),
            Expr::Pow(base, exp) => Expr::Pow(
                Box::new(base.set_variable(var, value)),
                Box::new(exp.set_variable(var, value)),
            ),
            Expr::Exp(expr) => Expr::Exp(Box::new(expr.set_variable(var, value))),
            Expr::Ln(expr) => Expr::Ln(Box::new(expr.set_variable(var, value))),
            Expr::sin(expr) => Expr::sin(Box::new(expr.set_variable(var, value))),
            Expr::cos(expr) => Expr::cos(Box::new(expr.set_variable(var, value))),
            _ => self.clone(),
        }
    }

    /// check if the expression contains a variable
    pub fn contains_variable(&self, var_name: &str) -> bool {
        match self {
            Expr::Var(name) => name == var_name,
            Expr::Const(_) => false,
            Expr::Add(left, right)
            | Expr::Sub(left, right)
            | Expr::Mul(left, right)
            | Expr::Div(left, right)
            | Expr::Pow(left, right) => {
                left.contains_variable(var_name) || right.contains_variable(var_name)
            }
            Expr::Exp(expr) | Expr::Ln(expr) | Expr::sin(expr) | Expr::cos(expr) => {
                expr.contains_variable(var_name)
            }
        }
    }

    /// Names of all variables occurring in the expression, sorted and deduplicated.
    pub fn variables(&self) -> Vec<String> {
        fn walk(expr: &Expr, out: &mut Vec<String>) {
            match expr {
                Expr::Var(name) => out.push(name.clone()),
                Expr::Const(_) => {}
                Expr::Add(l, r)
                | Expr::Sub(l, r)
                | Expr::Mul(l, r)
                | Expr::Div(l, r)
                | Expr::Pow(l, r) => {
                    walk(l, out);
                    walk(r, out);
                }
                Expr::Exp(e) | Expr::Ln(e) | Expr::sin(e) | Expr::cos(e) => walk(e, out),
            }
        }
        let mut vars = Vec::new();
        walk(self, &mut vars);
        vars.sort();
        vars.dedup();
        vars
    }

    /// Convenience method to wrap expression in Box for recursive structures.
    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    /// Creates exponential function e^(self).
    pub fn exp(self) -> Expr {
        Expr::Exp(self.boxed())
    }

    /// Creates natural logarithm ln(self).
    pub fn ln(self) -> Expr {
        Expr::Ln(self.boxed())
    }

    /// Creates square root as self^0.5.
    pub fn sqrt(self) -> Expr {
        Expr::Pow(self.boxed(), Box::new(Expr::Const(0.5)))
    }

    /// Creates power expression self^rhs.
    pub fn pow(self, rhs: Expr) -> Expr {
        Expr::Pow(self.boxed(), rhs.boxed())
    }

    /// Checks if expression is exactly zero (constant 0.0).
    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Const(val) if *val == 0.0)
    }

    /// Returns the value of a constant node.
    pub fn as_const(&self) -> Option<f64> {
        match self {
            Expr::Const(val) => Some(*val),
            _ => None,
        }
    }
}
