//! Limits of expressions as the variable tends to +∞.
//!
//! Every sub-expression is expanded into a truncated asymptotic series: a short list of
//! scales
//!
//! `c · exp(E) · n^p0 · ln(n)^p1 · ln(ln(n))^p2 · ...`
//!
//! ordered from the fastest-growing one down, followed by an order term `O(s)` that bounds
//! whatever was cut off. `E` is an expression that tends to ±∞ (or is absent) and the
//! iterated logarithms may be nested to any depth. Two scales are ordered by the limit of
//! the difference of their logarithms. Sums merge the lists, so leading terms that cancel
//! expose the next ones; powers, logarithms, exponentials and the periodic functions go
//! through the binomial, `ln(1 + r)`, `exp(r)` and Taylor expansions of the part that
//! tends to zero. The limit is read off the first scale of the series. When cancellation
//! has used up every known scale only the order term is left, and the limit is reported
//! as undecidable.
//!
//! Each expansion step consumes one unit of an explicit step budget so the computation
//! always terminates; running out is reported as [`LimitError::BudgetExhausted`].

use crate::symbolic::symbolic_engine::Expr;
use log::trace;
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// Default number of expansion steps a single limit may take.
pub const DEFAULT_STEP_BUDGET: usize = 10_000;

// relative size below which a sum of like coefficients is treated as exact cancellation
const CANCELLATION_TOLERANCE: f64 = 1e-12;

// scales kept in a series, also the order of every expansion
const SERIES_TERMS: usize = 4;

/// Value of a limit at infinity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LimitValue {
    Finite(f64),
    PosInfinity,
    NegInfinity,
}

impl LimitValue {
    pub fn is_infinite(&self) -> bool {
        matches!(self, LimitValue::PosInfinity | LimitValue::NegInfinity)
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, LimitValue::Finite(v) if *v == 0.0)
    }
}

/// `1`, `0.5`, `oo`, `-oo`
impl fmt::Display for LimitValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LimitValue::Finite(v) => write!(f, "{}", v),
            LimitValue::PosInfinity => write!(f, "oo"),
            LimitValue::NegInfinity => write!(f, "-oo"),
        }
    }
}

/// Errors that can occur during limit computation.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum LimitError {
    #[error("the expression oscillates without a limit")]
    Oscillating,

    #[error("limit does not exist or cannot be decided: {0}")]
    DoesNotExist(String),

    #[error("expression is undefined: {0}")]
    Undefined(String),

    #[error("limit not supported: {0}")]
    Unsupported(String),

    #[error("step budget of {0} exhausted")]
    BudgetExhausted(usize),
}

#[derive(Clone, Debug, PartialEq)]
struct Scale {
    coeff: f64,
    exp_arg: Option<Expr>,
    /// `powers[i]` is the exponent of the i-times iterated logarithm, `powers[0]` that of n
    powers: Vec<f64>,
}

impl Scale {
    fn constant(coeff: f64) -> Scale {
        Scale {
            coeff,
            exp_arg: None,
            powers: Vec::new(),
        }
    }

    /// `coeff * ln(...ln(n))` with `depth` logarithms
    fn iterated_log(coeff: f64, depth: usize) -> Scale {
        let mut powers = vec![0.0; depth + 1];
        powers[depth] = 1.0;
        Scale {
            coeff,
            exp_arg: None,
            powers,
        }
    }

    fn power(&self, depth: usize) -> f64 {
        self.powers.get(depth).copied().unwrap_or(0.0)
    }

    fn is_constant(&self) -> bool {
        self.exp_arg.is_none() && self.powers.iter().all(|p| *p == 0.0)
    }

    fn same_shape(&self, other: &Scale) -> bool {
        let depth = self.powers.len().max(other.powers.len());
        self.exp_arg == other.exp_arg && (0..depth).all(|i| self.power(i) == other.power(i))
    }

    fn scaled(mut self, k: f64) -> Scale {
        self.coeff *= k;
        self
    }

    fn unit(&self) -> Scale {
        Scale {
            coeff: 1.0,
            ..self.clone()
        }
    }
}

fn trimmed(mut powers: Vec<f64>) -> Vec<f64> {
    while powers.last() == Some(&0.0) {
        powers.pop();
    }
    powers
}

fn combined_powers(a: &Scale, b: &Scale, op: impl Fn(f64, f64) -> f64) -> Vec<f64> {
    let depth = a.powers.len().max(b.powers.len());
    trimmed((0..depth).map(|i| op(a.power(i), b.power(i))).collect())
}

// depth i when the scale is `c * ln(...ln(n))` with i logarithms
fn iterated_log_depth(scale: &Scale) -> Option<usize> {
    if scale.exp_arg.is_some() {
        return None;
    }
    let mut nonzero = scale.powers.iter().enumerate().filter(|(_, p)| **p != 0.0);
    match (nonzero.next(), nonzero.next()) {
        (Some((depth, p)), None) if *p == 1.0 => Some(depth),
        _ => None,
    }
}

/// Truncated asymptotic series: known scales, fastest first, and the order of the rest.
#[derive(Clone, Debug)]
struct Series {
    terms: Vec<Scale>,
    order: Option<Scale>,
}

impl Series {
    fn zero() -> Series {
        Series {
            terms: Vec::new(),
            order: None,
        }
    }

    fn exact(scale: Scale) -> Series {
        Series {
            terms: vec![scale],
            order: None,
        }
    }

    fn constant(c: f64) -> Series {
        if c == 0.0 {
            Series::zero()
        } else {
            Series::exact(Scale::constant(c))
        }
    }

    fn is_zero(&self) -> bool {
        self.terms.is_empty() && self.order.is_none()
    }

    /// leading scale, or the order term when no scale is known
    fn magnitude(&self) -> Option<&Scale> {
        self.terms.first().or(self.order.as_ref())
    }

    fn scaled(self, k: f64) -> Series {
        if k == 0.0 {
            return Series::zero();
        }
        Series {
            terms: self.terms.into_iter().map(|t| t.scaled(k)).collect(),
            order: self.order,
        }
    }
}

enum Dominance {
    Left,
    Right,
    /// the two scales differ by a factor with a finite nonzero limit
    Comparable,
}

fn normalize_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

fn undefined(reason: &str) -> LimitError {
    LimitError::Undefined(reason.to_string())
}

/// Context of one limit computation: the variable and the remaining step budget.
pub struct LimitContext<'a> {
    var: &'a str,
    steps: usize,
    budget: usize,
}

impl<'a> LimitContext<'a> {
    pub fn new(var: &'a str, budget: usize) -> Self {
        Self {
            var,
            steps: 0,
            budget,
        }
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    fn tick(&mut self) -> Result<(), LimitError> {
        self.steps += 1;
        if self.steps > self.budget {
            Err(LimitError::BudgetExhausted(self.budget))
        } else {
            Ok(())
        }
    }

    fn iterated_log_expr(&self, depth: usize) -> Expr {
        (0..depth).fold(Expr::Var(self.var.to_string()), |acc, _| acc.ln())
    }

    // E + p0 ln n + p1 ln ln n + ...
    fn log_magnitude(&self, scale: &Scale) -> Expr {
        scale
            .exp_arg
            .iter()
            .cloned()
            .chain(
                scale
                    .powers
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| **p != 0.0)
                    .map(|(i, p)| Expr::Const(*p) * self.iterated_log_expr(i + 1)),
            )
            .reduce(|acc, term| acc + term)
            .unwrap_or(Expr::Const(0.0))
    }

    fn scale_expr(&self, scale: &Scale) -> Expr {
        let mut expr = Expr::Const(scale.coeff);
        if let Some(arg) = &scale.exp_arg {
            expr = expr * arg.clone().exp();
        }
        for (i, p) in scale.powers.iter().enumerate().filter(|(_, p)| **p != 0.0) {
            expr = expr * self.iterated_log_expr(i).pow(Expr::Const(*p));
        }
        expr
    }

    /// Limit of `expr` as the context variable tends to +∞.
    pub fn limit(&mut self, expr: &Expr) -> Result<LimitValue, LimitError> {
        let series = self.series(expr)?;
        match (series.terms.first(), &series.order) {
            (Some(leading), _) => self.limit_of_scale(leading),
            (None, Some(order)) => Err(LimitError::DoesNotExist(format!(
                "every known term cancels, the rest is O({})",
                self.scale_expr(order)
            ))),
            (None, None) => Ok(LimitValue::Finite(0.0)),
        }
    }

    fn limit_of_scale(&mut self, scale: &Scale) -> Result<LimitValue, LimitError> {
        let direction = if scale.exp_arg.is_some() {
            let magnitude = self.log_magnitude(scale).expand();
            match self.limit(&magnitude)? {
                LimitValue::PosInfinity => Ordering::Greater,
                LimitValue::NegInfinity => Ordering::Less,
                LimitValue::Finite(d) => {
                    return Ok(LimitValue::Finite(normalize_zero(scale.coeff * d.exp())));
                }
            }
        } else {
            match scale.powers.iter().find(|p| **p != 0.0) {
                Some(p) if *p > 0.0 => Ordering::Greater,
                Some(_) => Ordering::Less,
                None => Ordering::Equal,
            }
        };
        Ok(match direction {
            Ordering::Greater if scale.coeff > 0.0 => LimitValue::PosInfinity,
            Ordering::Greater => LimitValue::NegInfinity,
            Ordering::Less => LimitValue::Finite(0.0),
            Ordering::Equal => LimitValue::Finite(normalize_zero(scale.coeff)),
        })
    }

    fn series(&mut self, expr: &Expr) -> Result<Series, LimitError> {
        self.tick()?;
        match expr {
            Expr::Const(c) if !c.is_finite() => {
                Err(LimitError::Undefined(format!("non-finite constant {}", c)))
            }
            Expr::Const(c) => Ok(Series::constant(*c)),
            Expr::Var(name) if name == self.var => Ok(Series::exact(Scale {
                powers: vec![1.0],
                ..Scale::constant(1.0)
            })),
            Expr::Var(name) => Err(LimitError::Undefined(format!("free symbol {}", name))),
            Expr::Add(lhs, rhs) => {
                let lhs = self.series(lhs)?;
                let rhs = self.series(rhs)?;
                self.add(lhs, rhs)
            }
            Expr::Sub(lhs, rhs) => {
                let lhs = self.series(lhs)?;
                let rhs = self.series(rhs)?.scaled(-1.0);
                self.add(lhs, rhs)
            }
            Expr::Mul(lhs, rhs) => {
                let lhs = self.series(lhs)?;
                let rhs = self.series(rhs)?;
                self.mul(&lhs, &rhs)
            }
            Expr::Div(lhs, rhs) => {
                let den = self.series(rhs)?;
                if den.is_zero() {
                    return Err(undefined("division by zero"));
                }
                let num = self.series(lhs)?;
                let inverse = self.power(&den, -1.0)?;
                self.mul(&num, &inverse)
            }
            Expr::Pow(base, exponent) => self.series_of_power(base, exponent),
            Expr::Exp(arg) => {
                let arg = self.series(arg)?;
                self.exponential(&arg)
            }
            Expr::Ln(arg) => {
                let arg = self.series(arg)?;
                self.logarithm(&arg)
            }
            Expr::sin(arg) => {
                let arg = self.series(arg)?;
                self.periodic(&arg, true)
            }
            Expr::cos(arg) => {
                let arg = self.series(arg)?;
                self.periodic(&arg, false)
            }
        }
    }

    fn series_of_power(&mut self, base: &Expr, exponent: &Expr) -> Result<Series, LimitError> {
        if !exponent.contains_variable(self.var) {
            let k = exponent
                .eval_constant()
                .ok_or_else(|| LimitError::Undefined(format!("exponent {}", exponent)))?;
            let base = self.series(base)?;
            return self.power(&base, k);
        }
        if !base.contains_variable(self.var) {
            let c = base
                .eval_constant()
                .ok_or_else(|| LimitError::Undefined(format!("base {}", base)))?;
            return if c < 0.0 {
                Err(LimitError::Oscillating)
            } else if c == 0.0 {
                Ok(Series::zero())
            } else if c == 1.0 {
                Ok(Series::constant(1.0))
            } else {
                self.series(&(exponent.clone() * Expr::Const(c.ln())).exp())
            };
        }
        // b^e = exp(e ln b)
        self.series(&(exponent.clone() * base.clone().ln()).exp())
    }

    fn compare(&mut self, a: &Scale, b: &Scale) -> Result<Dominance, LimitError> {
        if a.exp_arg == b.exp_arg {
            let depth = a.powers.len().max(b.powers.len());
            for i in 0..depth {
                match a.power(i).partial_cmp(&b.power(i)) {
                    Some(Ordering::Greater) => return Ok(Dominance::Left),
                    Some(Ordering::Less) => return Ok(Dominance::Right),
                    _ => {}
                }
            }
            return Ok(Dominance::Comparable);
        }
        let delta = (self.log_magnitude(a) - self.log_magnitude(b)).expand();
        Ok(match self.limit(&delta)? {
            LimitValue::PosInfinity => Dominance::Left,
            LimitValue::NegInfinity => Dominance::Right,
            LimitValue::Finite(_) => Dominance::Comparable,
        })
    }

    /// Sorts and merges the scales, drops those not above the order term and truncates.
    fn normalize(&mut self, terms: Vec<Scale>, order: Option<Scale>) -> Result<Series, LimitError> {
        let mut merged: Vec<Scale> = Vec::with_capacity(terms.len());
        'terms: for term in terms {
            let mut position = merged.len();
            for (i, known) in merged.iter_mut().enumerate() {
                match self.compare(known, &term)? {
                    Dominance::Left => {}
                    Dominance::Right => {
                        position = i;
                        break;
                    }
                    Dominance::Comparable if known.same_shape(&term) => {
                        let sum = known.coeff + term.coeff;
                        let size = known.coeff.abs().max(term.coeff.abs());
                        known.coeff = if sum.abs() <= CANCELLATION_TOLERANCE * size {
                            0.0
                        } else {
                            sum
                        };
                        continue 'terms;
                    }
                    Dominance::Comparable => {
                        return Err(LimitError::Unsupported(format!(
                            "scales {} and {} differ by a bounded factor",
                            self.scale_expr(known),
                            self.scale_expr(&term)
                        )));
                    }
                }
            }
            merged.insert(position, term);
        }
        merged.retain(|t| t.coeff != 0.0);

        let mut order = order;
        if let Some(bound) = &order {
            let mut kept = 0;
            while kept < merged.len() {
                match self.compare(&merged[kept], bound)? {
                    Dominance::Left => kept += 1,
                    _ => break,
                }
            }
            merged.truncate(kept);
        }
        if merged.len() > SERIES_TERMS {
            order = Some(merged[SERIES_TERMS].unit());
            merged.truncate(SERIES_TERMS);
        }
        Ok(Series {
            terms: merged,
            order,
        })
    }

    fn larger(&mut self, a: Option<Scale>, b: Option<Scale>) -> Result<Option<Scale>, LimitError> {
        Ok(match (a, b) {
            (Some(a), Some(b)) => match self.compare(&a, &b)? {
                Dominance::Right => Some(b),
                _ => Some(a),
            },
            (a, None) => a,
            (None, b) => b,
        })
    }

    fn add(&mut self, x: Series, y: Series) -> Result<Series, LimitError> {
        let order = self.larger(x.order, y.order)?;
        let terms = x.terms.into_iter().chain(y.terms).collect();
        self.normalize(terms, order)
    }

    fn mul(&mut self, x: &Series, y: &Series) -> Result<Series, LimitError> {
        if x.is_zero() || y.is_zero() {
            return Ok(Series::zero());
        }
        let mut terms = Vec::with_capacity(x.terms.len() * y.terms.len());
        for a in &x.terms {
            for b in &y.terms {
                terms.push(self.mul_scales(a, b));
            }
        }
        // O(a) * y and x * O(b)
        let left = match (x.magnitude(), &y.order) {
            (Some(m), Some(o)) => Some(self.mul_scales(m, o).unit()),
            _ => None,
        };
        let right = match (&x.order, y.magnitude()) {
            (Some(o), Some(m)) => Some(self.mul_scales(o, m).unit()),
            _ => None,
        };
        let order = self.larger(left, right)?;
        self.normalize(terms, order)
    }

    /// `r` in `s = L (1 + r)`, where `L` is the leading scale of `s`
    fn relative_rest(&mut self, s: &Series) -> Result<Series, LimitError> {
        let Some(leading) = s.terms.first() else {
            return Ok(Series::zero());
        };
        let inverse = Series::exact(self.reciprocal(leading));
        let rest = Series {
            terms: s.terms[1..].to_vec(),
            order: s.order.clone(),
        };
        self.mul(&rest, &inverse)
    }

    /// order of the first term an expansion in powers of `r` leaves out
    fn truncation(&self, r: &Series) -> Result<Series, LimitError> {
        let Some(magnitude) = r.magnitude() else {
            return Ok(Series::zero());
        };
        let bound = self.power_scale(&magnitude.unit(), (SERIES_TERMS + 1) as f64)?;
        Ok(Series {
            terms: Vec::new(),
            order: Some(bound),
        })
    }

    /// `s^k` for a constant `k`, as `L^k (1 + r)^k` expanded by the binomial series
    fn power(&mut self, s: &Series, k: f64) -> Result<Series, LimitError> {
        if k == 0.0 {
            return Ok(Series::constant(1.0));
        }
        if k == 1.0 {
            return Ok(s.clone());
        }
        let Some(leading) = s.terms.first() else {
            return match s.order {
                None if k > 0.0 => Ok(Series::zero()),
                None => Err(undefined("zero raised to a non-positive power")),
                Some(_) => Err(LimitError::DoesNotExist(
                    "power of a base with no known leading term".to_string(),
                )),
            };
        };
        let leading_power = Series::exact(self.power_scale(leading, k)?);
        let rest = self.relative_rest(s)?;
        if rest.is_zero() {
            return Ok(leading_power);
        }
        let mut sum = Series::constant(1.0);
        let mut rest_power = Series::constant(1.0);
        let mut binomial = 1.0;
        let mut exact = false;
        for j in 1..=SERIES_TERMS {
            binomial *= (k - (j - 1) as f64) / j as f64;
            if binomial == 0.0 {
                exact = true;
                break;
            }
            rest_power = self.mul(&rest_power, &rest)?;
            sum = self.add(sum, rest_power.clone().scaled(binomial))?;
        }
        if !exact {
            let truncation = self.truncation(&rest)?;
            sum = self.add(sum, truncation)?;
        }
        self.mul(&leading_power, &sum)
    }

    /// `ln(c exp(E) n^p0 ...) + ln(1 + r)`
    fn logarithm(&mut self, s: &Series) -> Result<Series, LimitError> {
        let Some(leading) = s.terms.first().cloned() else {
            return Err(match s.order {
                None => undefined("logarithm of zero"),
                Some(_) => LimitError::DoesNotExist(
                    "logarithm of a quantity with no known leading term".to_string(),
                ),
            });
        };
        if leading.coeff < 0.0 {
            return Err(undefined("logarithm of a negative quantity"));
        }
        let mut terms: Vec<Scale> = leading
            .powers
            .iter()
            .enumerate()
            .filter(|(_, p)| **p != 0.0)
            .map(|(i, p)| Scale::iterated_log(*p, i + 1))
            .collect();
        terms.push(Scale::constant(leading.coeff.ln()));
        let mut result = self.normalize(terms, None)?;
        if let Some(arg) = &leading.exp_arg {
            let arg = self.series(arg)?;
            result = self.add(result, arg)?;
        }

        let rest = self.relative_rest(s)?;
        if rest.is_zero() {
            return Ok(result);
        }
        // ln(1 + r) = r - r^2/2 + r^3/3 - ...
        let mut rest_power = Series::constant(1.0);
        for j in 1..=SERIES_TERMS {
            rest_power = self.mul(&rest_power, &rest)?;
            let sign = if j % 2 == 1 { 1.0 } else { -1.0 };
            result = self.add(result, rest_power.clone().scaled(sign / j as f64))?;
        }
        let truncation = self.truncation(&rest)?;
        self.add(result, truncation)
    }

    /// splits the argument into growing, constant and vanishing parts
    fn exponential(&mut self, s: &Series) -> Result<Series, LimitError> {
        let mut constant = 0.0;
        let mut powers: Vec<f64> = Vec::new();
        let mut growing: Vec<Expr> = Vec::new();
        let mut vanishing: Vec<Scale> = Vec::new();
        for term in &s.terms {
            if term.is_constant() {
                constant += term.coeff;
                continue;
            }
            match self.limit_of_scale(term)? {
                LimitValue::Finite(v) if v == 0.0 => vanishing.push(term.clone()),
                LimitValue::Finite(v) => {
                    return Err(LimitError::Unsupported(format!(
                        "exponent term {} tending to {}",
                        self.scale_expr(term),
                        v
                    )));
                }
                // exp(c ln(...ln(n))) = ln(...ln(n))^c with one logarithm less
                _ => match iterated_log_depth(term) {
                    Some(depth) if depth > 0 => {
                        if powers.len() < depth {
                            powers.resize(depth, 0.0);
                        }
                        powers[depth - 1] += term.coeff;
                    }
                    _ => growing.push(self.scale_expr(term)),
                },
            }
        }
        if let Some(order) = &s.order {
            if !self.limit_of_scale(order)?.is_zero() {
                return Err(LimitError::DoesNotExist(
                    "exponent known only up to a term that does not vanish".to_string(),
                ));
            }
        }
        let coeff = constant.exp();
        if !coeff.is_finite() {
            return Err(LimitError::Undefined(format!("exp({}) overflows", constant)));
        }
        let leading = Series::exact(Scale {
            coeff,
            exp_arg: growing.into_iter().reduce(|acc, e| acc + e).map(|e| e.expand()),
            powers: trimmed(powers),
        });
        let small = Series {
            terms: vanishing,
            order: s.order.clone(),
        };
        if small.is_zero() {
            return Ok(leading);
        }
        // exp(v) = 1 + v + v^2/2 + ...
        let mut sum = Series::constant(1.0);
        let mut small_power = Series::constant(1.0);
        let mut factorial = 1.0;
        for j in 1..=SERIES_TERMS {
            factorial *= j as f64;
            small_power = self.mul(&small_power, &small)?;
            sum = self.add(sum, small_power.clone().scaled(1.0 / factorial))?;
        }
        let truncation = self.truncation(&small)?;
        sum = self.add(sum, truncation)?;
        self.mul(&leading, &sum)
    }

    /// `sin` or `cos` of an argument that tends to a constant
    fn periodic(&mut self, s: &Series, sine: bool) -> Result<Series, LimitError> {
        let mut phase = 0.0;
        let mut vanishing = Vec::new();
        for term in &s.terms {
            if term.is_constant() {
                phase += term.coeff;
            } else if self.limit_of_scale(term)?.is_zero() {
                vanishing.push(term.clone());
            } else {
                return Err(LimitError::Oscillating);
            }
        }
        if let Some(order) = &s.order {
            if !self.limit_of_scale(order)?.is_zero() {
                return Err(LimitError::DoesNotExist(
                    "argument known only up to a term that does not vanish".to_string(),
                ));
            }
        }
        let small = Series {
            terms: vanishing,
            order: s.order.clone(),
        };
        let (cos_small, sin_small) = self.cos_sin(&small)?;
        // sin(a + v) = sin a cos v + cos a sin v, cos(a + v) = cos a cos v - sin a sin v
        let (with_cos, with_sin) = if sine {
            (phase.sin(), phase.cos())
        } else {
            (phase.cos(), -phase.sin())
        };
        self.add(cos_small.scaled(with_cos), sin_small.scaled(with_sin))
    }

    fn cos_sin(&mut self, v: &Series) -> Result<(Series, Series), LimitError> {
        if v.is_zero() {
            return Ok((Series::constant(1.0), Series::zero()));
        }
        let mut cos_v = Series::constant(1.0);
        let mut sin_v = Series::zero();
        let mut v_power = Series::constant(1.0);
        let mut factorial = 1.0;
        for j in 1..=SERIES_TERMS {
            factorial *= j as f64;
            v_power = self.mul(&v_power, v)?;
            let sign = if (j / 2) % 2 == 0 { 1.0 } else { -1.0 };
            let term = v_power.clone().scaled(sign / factorial);
            if j % 2 == 1 {
                sin_v = self.add(sin_v, term)?;
            } else {
                cos_v = self.add(cos_v, term)?;
            }
        }
        let truncation = self.truncation(v)?;
        cos_v = self.add(cos_v, truncation.clone())?;
        sin_v = self.add(sin_v, truncation)?;
        Ok((cos_v, sin_v))
    }

    fn mul_scales(&self, a: &Scale, b: &Scale) -> Scale {
        let (coeff, exp_arg) = match (&a.exp_arg, &b.exp_arg) {
            (None, None) => (a.coeff * b.coeff, None),
            (Some(e), None) | (None, Some(e)) => (a.coeff * b.coeff, Some(e.clone())),
            (Some(x), Some(y)) => {
                let sum = (x.clone() + y.clone()).expand();
                match sum.as_const() {
                    Some(c) => (a.coeff * b.coeff * c.exp(), None),
                    None => (a.coeff * b.coeff, Some(sum)),
                }
            }
        };
        Scale {
            coeff: normalize_zero(coeff),
            exp_arg,
            powers: combined_powers(a, b, |x, y| x + y),
        }
    }

    fn reciprocal(&self, s: &Scale) -> Scale {
        Scale {
            coeff: 1.0 / s.coeff,
            exp_arg: s.exp_arg.as_ref().map(|e| (-e.clone()).expand()),
            powers: s.powers.iter().map(|p| -p).collect(),
        }
    }

    fn power_scale(&self, s: &Scale, k: f64) -> Result<Scale, LimitError> {
        if s.coeff < 0.0 && k.fract() != 0.0 {
            return Err(undefined("fractional power of a negative quantity"));
        }
        Ok(Scale {
            coeff: s.coeff.powf(k),
            exp_arg: s
                .exp_arg
                .as_ref()
                .map(|e| (Expr::Const(k) * e.clone()).expand()),
            powers: trimmed(s.powers.iter().map(|p| p * k).collect()),
        })
    }
}

/// Limit of `expr` as `var` tends to +∞, computed within `budget` reduction steps.
///
/// The expression is simplified first, so exact cancellations such as `n - n` are seen
/// before the series expansion.
/// # Example
/// ```
/// use ComplexityCompass::symbolic::symbolic_engine::Expr;
/// use ComplexityCompass::symbolic::symbolic_limits::{limit_at_infinity, LimitValue};
/// let ratio = Expr::parse_expression("(3*n^2 + n)/n^2").unwrap();
/// assert_eq!(limit_at_infinity(&ratio, "n", 10_000), Ok(LimitValue::Finite(3.0)));
/// ```
pub fn limit_at_infinity(expr: &Expr, var: &str, budget: usize) -> Result<LimitValue, LimitError> {
    let mut context = LimitContext::new(var, budget);
    let result = context.limit(&expr.simplify());
    trace!(
        "limit of {} as {} -> oo: {:?} after {} steps",
        expr,
        var,
        result,
        context.steps()
    );
    result
}
