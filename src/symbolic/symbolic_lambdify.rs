use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::utils::linspace;

impl Expr {
    /// Compiles the expression into a closure of its single variable.
    ///
    /// Every variable is bound to the closure argument, so the expression is expected to
    /// depend on one variable at most. Non-finite results (overflow, `0/0`, `ln` of a
    /// negative number) are returned as they come out of f64 arithmetic.
    /// # Example
    /// ```
    /// use ComplexityCompass::symbolic::symbolic_engine::Expr;
    /// let f = Expr::parse_expression("n^2 + 1").unwrap();
    /// let func = f.lambdify1D();
    /// assert_eq!(func(3.0), 10.0);
    /// ```
    pub fn lambdify1D(&self) -> Box<dyn Fn(f64) -> f64> {
        match self {
            Expr::Var(_) => Box::new(|x| x),
            Expr::Const(val) => {
                let val = *val;
                Box::new(move |_| val)
            }
            Expr::Add(lhs, rhs) => {
                let lhs_fn = lhs.lambdify1D();
                let rhs_fn = rhs.lambdify1D();
                Box::new(move |x| lhs_fn(x) + rhs_fn(x))
            }
            Expr::Sub(lhs, rhs) => {
                let lhs_fn = lhs.lambdify1D();
                let rhs_fn = rhs.lambdify1D();
                Box::new(move |x| lhs_fn(x) - rhs_fn(x))
            }
            Expr::Mul(lhs, rhs) => {
                let lhs_fn = lhs.lambdify1D();
                let rhs_fn = rhs.lambdify1D();
                Box::new(move |x| lhs_fn(x) * rhs_fn(x))
            }
            Expr::Div(lhs, rhs) => {
                let lhs_fn = lhs.lambdify1D();
                let rhs_fn = rhs.lambdify1D();
                Box::new(move |x| lhs_fn(x) / rhs_fn(x))
            }
            Expr::Pow(base, exp) => {
                let base_fn = base.lambdify1D();
                let exp_fn = exp.lambdify1D();
                Box::new(move |x| base_fn(x).powf(exp_fn(x)))
            }
            Expr::Exp(expr) => {
                let expr_fn = expr.lambdify1D();
                Box::new(move |x| expr_fn(x).exp())
            }
            Expr::Ln(expr) => {
                let expr_fn = expr.lambdify1D();
                Box::new(move |x| expr_fn(x).ln())
            }
            Expr::sin(expr) => {
                let expr_fn = expr.lambdify1D();
                Box::new(move |x| expr_fn(x).sin())
            }
            Expr::cos(expr) => {
                let expr_fn = expr.lambdify1D();
                Box::new(move |x| expr_fn(x).cos())
            }
        }
    } // end of lambdify1D

    /// evaluates the expression with `var` set to `value`, other variables make the result NaN
    pub fn eval_expression(&self, var: &str, value: f64) -> f64 {
        match self {
            Expr::Var(name) if name == var => value,
            Expr::Var(_) => f64::NAN,
            Expr::Const(val) => *val,
            Expr::Add(lhs, rhs) => lhs.eval_expression(var, value) + rhs.eval_expression(var, value),
            Expr::Sub(lhs, rhs) => lhs.eval_expression(var, value) - rhs.eval_expression(var, value),
            Expr::Mul(lhs, rhs) => lhs.eval_expression(var, value) * rhs.eval_expression(var, value),
            Expr::Div(lhs, rhs) => lhs.eval_expression(var, value) / rhs.eval_expression(var, value),
            Expr::Pow(base, exp) => base
                .eval_expression(var, value)
                .powf(exp.eval_expression(var, value)),
            Expr::Exp(expr) => expr.eval_expression(var, value).exp(),
            Expr::Ln(expr) => expr.eval_expression(var, value).ln(),
            Expr::sin(expr) => expr.eval_expression(var, value).sin(),
            Expr::cos(expr) => expr.eval_expression(var, value).cos(),
        }
    }

    /// Numeric value at a point, `None` unless the value is a finite real number.
    pub fn eval_at(&self, var: &str, value: f64) -> Option<f64> {
        let result = self.eval_expression(var, value);
        result.is_finite().then_some(result)
    }

    /// Value of a variable-free expression, `None` if it is not a finite number.
    pub fn eval_constant(&self) -> Option<f64> {
        if !self.variables().is_empty() {
            return None;
        }
        self.eval_at("", 0.0)
    }

    /// samples the expression on an evenly spaced grid
    pub fn lambdify1D_from_linspace(&self, start: f64, end: f64, num_values: usize) -> Vec<f64> {
        let func = self.lambdify1D();
        linspace(start, end, num_values)
            .into_iter()
            .map(|x| func(x))
            .collect()
    }
}
