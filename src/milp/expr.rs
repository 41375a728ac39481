//! Linear expressions and named constraints.
//!
//! The formulation is held in the crate's own solver-independent form:
//! expressions are sums of `(VarId, coefficient)` terms plus a constant,
//! constraints compare an expression to a right-hand side. The model
//! assembler translates this form into the external solver's types; no
//! other component touches the solver.

use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use super::var::VarId;

/// A linear expression: `Σ coefᵢ · varᵢ + constant`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinExpr {
    terms: Vec<(VarId, f64)>,
    constant: f64,
}

impl LinExpr {
    /// The zero expression.
    pub fn new() -> Self {
        Self::default()
    }

    /// A single variable with coefficient 1.
    pub fn var(id: VarId) -> Self {
        Self::term(id, 1.0)
    }

    /// A single scaled variable.
    pub fn term(id: VarId, coef: f64) -> Self {
        Self {
            terms: vec![(id, coef)],
            constant: 0.0,
        }
    }

    /// A constant expression.
    pub fn constant(value: f64) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    /// `1 − var`, the complement of a binary indicator.
    pub fn one_minus(id: VarId) -> Self {
        Self {
            terms: vec![(id, -1.0)],
            constant: 1.0,
        }
    }

    /// Sum of variables, each with coefficient 1.
    pub fn sum<I: IntoIterator<Item = VarId>>(ids: I) -> Self {
        Self {
            terms: ids.into_iter().map(|id| (id, 1.0)).collect(),
            constant: 0.0,
        }
    }

    /// The `(VarId, coefficient)` terms.
    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    /// The constant part.
    pub fn constant_part(&self) -> f64 {
        self.constant
    }
}

impl From<VarId> for LinExpr {
    fn from(id: VarId) -> Self {
        Self::var(id)
    }
}

impl Add for LinExpr {
    type Output = LinExpr;

    fn add(mut self, rhs: LinExpr) -> LinExpr {
        self.terms.extend(rhs.terms);
        self.constant += rhs.constant;
        self
    }
}

impl Add<f64> for LinExpr {
    type Output = LinExpr;

    fn add(mut self, rhs: f64) -> LinExpr {
        self.constant += rhs;
        self
    }
}

impl Sub for LinExpr {
    type Output = LinExpr;

    fn sub(self, rhs: LinExpr) -> LinExpr {
        self + -rhs
    }
}

impl Sub<f64> for LinExpr {
    type Output = LinExpr;

    fn sub(mut self, rhs: f64) -> LinExpr {
        self.constant -= rhs;
        self
    }
}

impl Neg for LinExpr {
    type Output = LinExpr;

    fn neg(mut self) -> LinExpr {
        for (_, coef) in &mut self.terms {
            *coef = -*coef;
        }
        self.constant = -self.constant;
        self
    }
}

impl Mul<f64> for LinExpr {
    type Output = LinExpr;

    fn mul(mut self, rhs: f64) -> LinExpr {
        for (_, coef) in &mut self.terms {
            *coef *= rhs;
        }
        self.constant *= rhs;
        self
    }
}

/// Comparison direction of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sense {
    /// `expr ≤ rhs`
    Le,
    /// `expr ≥ rhs`
    Ge,
    /// `expr = rhs`
    Eq,
}

/// A named linear constraint: `expr sense rhs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinConstraint {
    /// Stable constraint name, for audit and diagnostics.
    pub name: String,
    /// Left-hand side.
    pub expr: LinExpr,
    /// Comparison direction.
    pub sense: Sense,
    /// Right-hand side.
    pub rhs: f64,
}

impl LinConstraint {
    /// `expr ≤ rhs`
    pub fn le(name: impl Into<String>, expr: LinExpr, rhs: f64) -> Self {
        Self {
            name: name.into(),
            expr,
            sense: Sense::Le,
            rhs,
        }
    }

    /// `expr ≥ rhs`
    pub fn ge(name: impl Into<String>, expr: LinExpr, rhs: f64) -> Self {
        Self {
            name: name.into(),
            expr,
            sense: Sense::Ge,
            rhs,
        }
    }

    /// `expr = rhs`
    pub fn eq(name: impl Into<String>, expr: LinExpr, rhs: f64) -> Self {
        Self {
            name: name.into(),
            expr,
            sense: Sense::Eq,
            rhs,
        }
    }

    /// Evaluates the left-hand side under an assignment lookup.
    ///
    /// Used by tests to check that a candidate assignment satisfies the
    /// emitted constraint set without involving a solver.
    pub fn lhs_value<F: Fn(&VarId) -> f64>(&self, value_of: &F) -> f64 {
        self.expr
            .terms()
            .iter()
            .map(|(id, coef)| coef * value_of(id))
            .sum::<f64>()
            + self.expr.constant_part()
    }

    /// Whether an assignment satisfies this constraint.
    pub fn satisfied_by<F: Fn(&VarId) -> f64>(&self, value_of: &F) -> bool {
        let lhs = self.lhs_value(value_of);
        match self.sense {
            Sense::Le => lhs <= self.rhs + 1e-6,
            Sense::Ge => lhs >= self.rhs - 1e-6,
            Sense::Eq => (lhs - self.rhs).abs() <= 1e-6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(job: &str, task: usize) -> VarId {
        VarId::Start {
            job: job.into(),
            task,
        }
    }

    #[test]
    fn test_expr_algebra() {
        let e = LinExpr::var(start("A1", 0)) + LinExpr::term(start("A1", 1), -1.0) + 15.0;
        assert_eq!(e.terms().len(), 2);
        assert_eq!(e.constant_part(), 15.0);

        let neg = -e.clone();
        assert_eq!(neg.constant_part(), -15.0);
        assert_eq!(neg.terms()[0].1, -1.0);

        let scaled = e * 2.0;
        assert_eq!(scaled.constant_part(), 30.0);
        assert_eq!(scaled.terms()[1].1, -2.0);
    }

    #[test]
    fn test_one_minus() {
        let e = LinExpr::one_minus(VarId::Peak);
        assert_eq!(e.constant_part(), 1.0);
        assert_eq!(e.terms(), &[(VarId::Peak, -1.0)]);
    }

    #[test]
    fn test_sum() {
        let e = LinExpr::sum(vec![start("A1", 0), start("A2", 0)]);
        assert_eq!(e.terms().len(), 2);
        assert!(e.terms().iter().all(|(_, c)| *c == 1.0));
    }

    #[test]
    fn test_satisfied_by() {
        // start[0] + 15 <= start[1]  ⇔  start[0] - start[1] <= -15
        let c = LinConstraint::le(
            "ord",
            LinExpr::var(start("A1", 0)) - LinExpr::var(start("A1", 1)),
            -15.0,
        );
        let ok = |id: &VarId| match id {
            VarId::Start { task: 0, .. } => 0.0,
            VarId::Start { task: 1, .. } => 15.0,
            _ => 0.0,
        };
        assert!(c.satisfied_by(&ok));

        let bad = |id: &VarId| match id {
            VarId::Start { task: 0, .. } => 10.0,
            VarId::Start { task: 1, .. } => 15.0,
            _ => 0.0,
        };
        assert!(!c.satisfied_by(&bad));
    }
}
