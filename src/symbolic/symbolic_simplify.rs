//! # Symbolic Expression Simplification Module
//!
//! Brings expressions of one variable into a canonical sum-of-products form: a sum of
//! [`Term`]s, each a numeric coefficient times a product of atoms raised to numeric powers.
//!
//! ## Simplification Strategy
//!
//! 1. **Constant Folding**: arithmetic on numerical constants is evaluated
//! 2. **Like Term Collection**: `3*n + 2*n = 5*n`, `n*n^2 = n^3`
//! 3. **Distribution**: numeric coefficients and single terms are distributed over sums
//! 4. **Exponential / Logarithm Rules**: `exp(k*ln(x)) = x^k`, `ln(c*x^k) = ln(c) + k*ln(x)`,
//!    `exp(a + k) = e^k*exp(a)`, `c^(a + k) = c^k*c^a`
//! 5. **Sign Guard**: `(x^a)^k = x^(a*k)` and `ln(x^a) = a*ln(x)` are applied only when no
//!    even power can hide the sign of `x`. The variable, exponentials and positive constants
//!    are positive; a sum such as `1 - n` is not, so `sqrt((1 - n)^2)` stays as it is
//! 6. **Expansion** (only in [`Expr::expand`]): products of sums and integer powers of sums
//!    up to [`MAX_EXPANDED_POWER`] are multiplied out
//!
//! Atoms are the variable, logarithms, exponentials, powers with a non-numeric exponent,
//! sums that could not be distributed, and the periodic functions. They are ordered
//! variable first, then powers, logarithms, exponentials, sums and periodic functions, so
//! `n*ln(n)` always rebuilds in that order.
//!
//! Division by an expression that folds to zero yields a `NaN` constant; everything built
//! on it stays `NaN`, which the limit engine reports as undefined.

use crate::symbolic::symbolic_engine::Expr;
use itertools::Itertools;
use std::cmp::Ordering;

/// Largest integer power of a sum that `expand` multiplies out.
pub const MAX_EXPANDED_POWER: f64 = 12.0;

/// One addend of the canonical form: `coeff * Π base^power`.
///
/// Factors are kept merged (a base appears at most once) and sorted, so two terms are
/// like terms exactly when their factor lists are equal.
#[derive(Clone, Debug, PartialEq)]
struct Term {
    coeff: f64,
    factors: Vec<(Expr, f64)>,
}

type Terms = Vec<Term>;

impl Term {
    fn constant(coeff: f64) -> Term {
        Term {
            coeff,
            factors: Vec::new(),
        }
    }

    fn atom(base: Expr, power: f64) -> Term {
        Term {
            coeff: 1.0,
            factors: vec![(base, power)],
        }
        .normalized()
    }

    fn is_constant(&self) -> bool {
        self.factors.is_empty()
    }

    fn normalized(mut self) -> Term {
        self.factors.retain(|(_, power)| *power != 0.0);
        self.factors.sort_by(|a, b| factor_order(&a.0, &b.0));
        self
    }

    fn mul(&self, other: &Term) -> Term {
        let mut factors = self.factors.clone();
        for (base, power) in &other.factors {
            match factors.iter_mut().find(|slot| slot.0 == *base) {
                Some(slot) => slot.1 += power,
                None => factors.push((base.clone(), *power)),
            }
        }
        Term {
            coeff: self.coeff * other.coeff,
            factors,
        }
        .normalized()
    }

    /// None when the power cannot be distributed over the factors without changing the value
    fn powf(&self, k: f64) -> Option<Term> {
        if k.fract() != 0.0 && (self.coeff < 0.0 || self.hides_sign()) {
            return None;
        }
        Some(
            Term {
                coeff: self.coeff.powf(k),
                factors: self
                    .factors
                    .iter()
                    .map(|(base, power)| (base.clone(), power * k))
                    .collect(),
            }
            .normalized(),
        )
    }

    // more than one factor of unknown sign, or one raised to an even power
    fn hides_sign(&self) -> bool {
        let mut signed = self.factors.iter().filter(|(base, _)| !is_positive(base));
        match (signed.next(), signed.next()) {
            (None, _) => false,
            (Some((_, p)), None) => p.fract() == 0.0 && p % 2.0 == 0.0,
            _ => true,
        }
    }

    /// a lone sum raised to the first power, which belongs back in the enclosing sum
    fn sum_factor(&self) -> Option<&Expr> {
        match self.factors.as_slice() {
            [(base @ (Expr::Add(_, _) | Expr::Sub(_, _)), p)] if *p == 1.0 => Some(base),
            _ => None,
        }
    }

    fn scaled(mut self, k: f64) -> Term {
        self.coeff *= k;
        self
    }
}

/// positive for every positive value of the variable
fn is_positive(expr: &Expr) -> bool {
    match expr {
        Expr::Var(_) | Expr::Exp(_) => true,
        Expr::Const(c) => *c > 0.0,
        Expr::Pow(base, _) => is_positive(base),
        Expr::Add(lhs, rhs) | Expr::Mul(lhs, rhs) | Expr::Div(lhs, rhs) => {
            is_positive(lhs) && is_positive(rhs)
        }
        _ => false,
    }
}

fn factor_rank(base: &Expr) -> u8 {
    match base {
        Expr::Var(_) => 0,
        Expr::Pow(_, _) => 1,
        Expr::Ln(_) => 2,
        Expr::Exp(_) => 3,
        Expr::Add(_, _) | Expr::Sub(_, _) => 4,
        Expr::sin(_) | Expr::cos(_) => 5,
        _ => 6,
    }
}

fn factor_order(a: &Expr, b: &Expr) -> Ordering {
    factor_rank(a)
        .cmp(&factor_rank(b))
        .then_with(|| a.to_string().cmp(&b.to_string()))
}

// (growing exponential atoms, power of n, power of ln) used to list faster terms first
fn growth_hint(term: &Term) -> (usize, f64, f64) {
    let mut exponentials = 0;
    let mut n_power = 0.0;
    let mut ln_power = 0.0;
    for (base, power) in &term.factors {
        match base {
            Expr::Var(_) => n_power += power,
            Expr::Ln(_) => ln_power += power,
            Expr::Exp(_) | Expr::Pow(_, _) if *power > 0.0 => exponentials += 1,
            _ => {}
        }
    }
    (exponentials, n_power, ln_power)
}

fn term_order(a: &Term, b: &Term) -> Ordering {
    let (exp_a, n_a, ln_a) = growth_hint(a);
    let (exp_b, n_b, ln_b) = growth_hint(b);
    exp_b
        .cmp(&exp_a)
        .then_with(|| n_b.partial_cmp(&n_a).unwrap_or(Ordering::Equal))
        .then_with(|| ln_b.partial_cmp(&ln_a).unwrap_or(Ordering::Equal))
        .then_with(|| {
            rebuild_term(a)
                .to_string()
                .cmp(&rebuild_term(b).to_string())
        })
}

fn undefined() -> Terms {
    vec![Term::constant(f64::NAN)]
}

fn is_undefined(terms: &[Term]) -> bool {
    terms.iter().any(|t| !t.coeff.is_finite())
}

fn constant_terms(c: f64) -> Terms {
    if c == 0.0 {
        Vec::new()
    } else {
        vec![Term::constant(c)]
    }
}

fn constant_value(terms: &[Term]) -> Option<f64> {
    match terms {
        [] => Some(0.0),
        [single] if single.is_constant() => Some(single.coeff),
        _ => None,
    }
}

fn split_constant(terms: &[Term]) -> (f64, Terms) {
    let (constant, rest): (Vec<&Term>, Vec<&Term>) = terms.iter().partition(|t| t.is_constant());
    (
        constant.iter().map(|t| t.coeff).sum(),
        rest.into_iter().cloned().collect(),
    )
}

/// merges like terms, drops zeros and sorts; any non-finite coefficient makes the whole sum undefined
fn collect(terms: impl IntoIterator<Item = Term>) -> Terms {
    let mut out: Terms = Vec::new();
    let spliced = terms.into_iter().flat_map(|term| match term.sum_factor() {
        Some(sum) => canonical(sum, false)
            .into_iter()
            .map(|t| t.scaled(term.coeff))
            .collect::<Terms>(),
        None => vec![term],
    });
    for term in spliced {
        match out.iter_mut().find(|t| t.factors == term.factors) {
            Some(slot) => slot.coeff += term.coeff,
            None => out.push(term),
        }
    }
    if is_undefined(&out) {
        return undefined();
    }
    out.retain(|t| t.coeff != 0.0);
    out.sort_by(term_order);
    out
}

fn negate(terms: Terms) -> Terms {
    terms.into_iter().map(|t| t.scaled(-1.0)).collect()
}

// a sum met again as a factor of a single term is merged with it: (a+b) * (a+b)^-1 = 1
fn absorb(group: &[Term], other: &[Term]) -> Option<Terms> {
    if group.len() < 2 || other.len() != 1 {
        return None;
    }
    let base = rebuild(group);
    if other[0].factors.iter().any(|(b, _)| *b == base) {
        Some(collect([other[0].mul(&Term::atom(base, 1.0))]))
    } else {
        None
    }
}

fn multiply(lhs: &[Term], rhs: &[Term], expand: bool) -> Terms {
    if lhs.is_empty() || rhs.is_empty() {
        return if is_undefined(lhs) || is_undefined(rhs) {
            undefined()
        } else {
            Vec::new()
        };
    }
    if let Some(absorbed) = absorb(lhs, rhs).or_else(|| absorb(rhs, lhs)) {
        return absorbed;
    }
    if lhs.len() == 1 || rhs.len() == 1 || expand {
        return collect(
            lhs.iter()
                .cartesian_product(rhs.iter())
                .map(|(a, b)| a.mul(b)),
        );
    }
    vec![Term::atom(rebuild(lhs), 1.0).mul(&Term::atom(rebuild(rhs), 1.0))]
}

fn reciprocal(den: &[Term]) -> Terms {
    match den {
        [] => undefined(),
        [single] => match single.powf(-1.0) {
            Some(term) => vec![term],
            None => vec![Term::atom(rebuild(den), -1.0)],
        },
        _ => vec![Term::atom(rebuild(den), -1.0)],
    }
}

fn power(base: &[Term], exponent: &[Term], expand: bool) -> Terms {
    if is_undefined(base) || is_undefined(exponent) {
        return undefined();
    }
    let Some(k) = constant_value(exponent) else {
        return variable_power(base, exponent);
    };
    if k == 0.0 {
        return vec![Term::constant(1.0)];
    }
    if k == 1.0 {
        return base.to_vec();
    }
    match base {
        [] if k > 0.0 => Vec::new(),
        [] => undefined(),
        [single] => match single.powf(k) {
            Some(term) => collect([term]),
            None => vec![Term::atom(rebuild(base), k)],
        },
        _ if expand && k > 0.0 && k.fract() == 0.0 && k <= MAX_EXPANDED_POWER => {
            let mut acc = base.to_vec();
            for _ in 1..(k as usize) {
                acc = multiply(&acc, base, true);
            }
            acc
        }
        _ => vec![Term::atom(rebuild(base), k)],
    }
}

fn variable_power(base: &[Term], exponent: &[Term]) -> Terms {
    match constant_value(base) {
        Some(c) if c == 1.0 => vec![Term::constant(1.0)],
        Some(c) if c == 0.0 => Vec::new(),
        Some(c) if c > 0.0 => {
            let (k, rest) = split_constant(exponent);
            let atom = Expr::Pow(Box::new(Expr::Const(c)), Box::new(rebuild(&rest)));
            vec![Term::atom(atom, 1.0).scaled(c.powf(k))]
        }
        _ => {
            let atom = Expr::Pow(Box::new(rebuild(base)), Box::new(rebuild(exponent)));
            vec![Term::atom(atom, 1.0)]
        }
    }
}

fn exponential(arg: &[Term], expand: bool) -> Terms {
    if is_undefined(arg) {
        return undefined();
    }
    let (k, rest) = split_constant(arg);
    let (logs, others): (Terms, Terms) = rest.into_iter().partition(
        |t| matches!(t.factors.as_slice(), [(Expr::Ln(_), power)] if *power == 1.0),
    );
    let mut result = vec![Term::constant(k.exp())];
    for term in logs {
        if let Some((Expr::Ln(inner), _)) = term.factors.first() {
            let raised = power(&canonical(inner, expand), &constant_terms(term.coeff), expand);
            result = multiply(&result, &raised, expand);
        }
    }
    if !others.is_empty() {
        let atom = Term::atom(Expr::Exp(Box::new(rebuild(&others))), 1.0);
        result = multiply(&result, &[atom], expand);
    }
    result
}

fn logarithm(arg: &[Term], expand: bool) -> Terms {
    if is_undefined(arg) {
        return undefined();
    }
    match arg {
        [] => vec![Term::constant(f64::NEG_INFINITY)],
        [single] if single.coeff > 0.0 && !single.hides_sign() => {
            let mut terms = constant_terms(single.coeff.ln());
            for (base, p) in &single.factors {
                let log_of_base = match base {
                    Expr::Exp(inner) => canonical(inner, expand),
                    Expr::Pow(b, e) => multiply(
                        &canonical(e, expand),
                        &logarithm(&canonical(b, expand), expand),
                        expand,
                    ),
                    _ => vec![Term::atom(Expr::Ln(Box::new(base.clone())), 1.0)],
                };
                terms = collect(
                    terms
                        .into_iter()
                        .chain(log_of_base.into_iter().map(|t| t.scaled(*p))),
                );
            }
            terms
        }
        _ => vec![Term::atom(Expr::Ln(Box::new(rebuild(arg))), 1.0)],
    }
}

fn periodic(arg: &[Term], eval: fn(f64) -> f64, wrap: fn(Box<Expr>) -> Expr) -> Terms {
    if is_undefined(arg) {
        return undefined();
    }
    match constant_value(arg) {
        Some(c) => constant_terms(eval(c)),
        None => vec![Term::atom(wrap(Box::new(rebuild(arg))), 1.0)],
    }
}

/// canonical sum-of-products of an expression
fn canonical(expr: &Expr, expand: bool) -> Terms {
    match expr {
        Expr::Const(c) if c.is_finite() => constant_terms(*c),
        Expr::Const(_) => undefined(),
        Expr::Var(_) => vec![Term::atom(expr.clone(), 1.0)],
        Expr::Add(lhs, rhs) => collect(
            canonical(lhs, expand)
                .into_iter()
                .chain(canonical(rhs, expand)),
        ),
        Expr::Sub(lhs, rhs) => collect(
            canonical(lhs, expand)
                .into_iter()
                .chain(negate(canonical(rhs, expand))),
        ),
        Expr::Mul(lhs, rhs) => multiply(&canonical(lhs, expand), &canonical(rhs, expand), expand),
        Expr::Div(lhs, rhs) => {
            let den = reciprocal(&canonical(rhs, expand));
            multiply(&canonical(lhs, expand), &den, expand)
        }
        Expr::Pow(base, exponent) => power(
            &canonical(base, expand),
            &canonical(exponent, expand),
            expand,
        ),
        Expr::Exp(arg) => exponential(&canonical(arg, expand), expand),
        Expr::Ln(arg) => logarithm(&canonical(arg, expand), expand),
        Expr::sin(arg) => periodic(&canonical(arg, expand), f64::sin, Expr::sin),
        Expr::cos(arg) => periodic(&canonical(arg, expand), f64::cos, Expr::cos),
    }
}

fn rebuild_power(base: &Expr, power: f64) -> Expr {
    if power == 1.0 {
        base.clone()
    } else {
        Expr::Pow(Box::new(base.clone()), Box::new(Expr::Const(power)))
    }
}

fn product(factors: impl Iterator<Item = Expr>) -> Option<Expr> {
    factors.reduce(|acc, factor| Expr::Mul(Box::new(acc), Box::new(factor)))
}

/// expression of a single term; negative powers go to the denominator
fn rebuild_term(term: &Term) -> Expr {
    let numerator = product(
        term.factors
            .iter()
            .filter(|(_, p)| *p > 0.0)
            .map(|(base, p)| rebuild_power(base, *p)),
    );
    let denominator = product(
        term.factors
            .iter()
            .filter(|(_, p)| *p < 0.0)
            .map(|(base, p)| rebuild_power(base, -p)),
    );
    let scaled = match numerator {
        None => Expr::Const(term.coeff),
        Some(num) if term.coeff == 1.0 => num,
        Some(num) => Expr::Mul(Box::new(Expr::Const(term.coeff)), Box::new(num)),
    };
    match denominator {
        None => scaled,
        Some(den) => Expr::Div(Box::new(scaled), Box::new(den)),
    }
}

fn rebuild(terms: &[Term]) -> Expr {
    let mut iter = terms.iter();
    let Some(first) = iter.next() else {
        return Expr::Const(0.0);
    };
    iter.fold(rebuild_term(first), |acc, term| {
        if term.coeff < 0.0 {
            let positive = term.clone().scaled(-1.0);
            Expr::Sub(Box::new(acc), Box::new(rebuild_term(&positive)))
        } else {
            Expr::Add(Box::new(acc), Box::new(rebuild_term(term)))
        }
    })
}

impl Expr {
    //___________________________________SIMPLIFICATION____________________________________

    /// Canonical form without multiplying sums together.
    pub fn simplify(&self) -> Expr {
        rebuild(&canonical(self, false))
    }

    /// Canonical form with products of sums and small integer powers of sums multiplied out.
    pub fn expand(&self) -> Expr {
        rebuild(&canonical(self, true))
    }

    pub fn is_sum(&self) -> bool {
        matches!(self, Expr::Add(_, _) | Expr::Sub(_, _))
    }

    /// Ordered addends of the canonical sum, each carrying its own sign.
    /// Faster-growing terms come first; a non-sum gives a single element.
    pub fn additive_terms(&self) -> Vec<Expr> {
        let terms = canonical(self, false);
        if terms.is_empty() {
            return vec![Expr::Const(0.0)];
        }
        terms.iter().map(rebuild_term).collect()
    }
}
