//! Big-M branch selection.
//!
//! Disjunctive machine exclusion, calendar interval membership, the
//! occupancy threshold indicators, and the feed-start minimum are all the
//! same pattern: a family of half-space bounds of which exactly one (or a
//! fixed one) must be active, the rest relaxed away by a big constant.
//! This module is the only place that algebra is written down.

use crate::milp::builder::ModelBuilder;
use crate::milp::expr::{LinConstraint, LinExpr};
use crate::milp::var::VarId;

/// Posts `value ≥ lo` and/or `value ≤ hi`, enforced only when the 0/1
/// expression `active` equals 1.
///
/// The relaxed forms are `value − M·active ≥ lo − M` and
/// `value + M·active ≤ hi + M`: at `active = 1` the bound is tight, at
/// `active = 0` it is slack by `M`, which exceeds every time difference
/// representable in the model.
pub fn guarded_bounds(
    builder: &mut ModelBuilder,
    name: &str,
    active: &LinExpr,
    value: &LinExpr,
    lo: Option<f64>,
    hi: Option<f64>,
) {
    let m = builder.big_m();
    if let Some(lo) = lo {
        builder.push(LinConstraint::ge(
            format!("{name}/lo"),
            value.clone() - active.clone() * m,
            lo - m,
        ));
    }
    if let Some(hi) = hi {
        builder.push(LinConstraint::le(
            format!("{name}/hi"),
            value.clone() + active.clone() * m,
            hi + m,
        ));
    }
}

/// Posts the cardinality side of a branch family: `Σ indicators = 1`.
pub fn exactly_one(builder: &mut ModelBuilder, name: &str, indicators: Vec<VarId>) {
    builder.push(LinConstraint::eq(
        format!("{name}/one"),
        LinExpr::sum(indicators),
        1.0,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::milp::expr::Sense;
    use crate::milp::var::VarKind;

    fn setup() -> (ModelBuilder, VarId, VarId) {
        let mut b = ModelBuilder::new(1000, 10);
        let start = VarId::Start {
            job: "A1".into(),
            task: 0,
        };
        let sel = VarId::IntervalChoice {
            resource: "DEB".into(),
            job: "A1".into(),
            task: 0,
            interval: 0,
        };
        b.add_var(
            start.clone(),
            VarKind::Integer {
                lb: 0.0,
                ub: 1000.0,
            },
        )
        .unwrap();
        b.add_var(sel.clone(), VarKind::Binary).unwrap();
        (b, start, sel)
    }

    #[test]
    fn test_guarded_bounds_algebra() {
        let (mut b, start, sel) = setup();
        let m = b.big_m();
        guarded_bounds(
            &mut b,
            "cal",
            &LinExpr::var(sel.clone()),
            &LinExpr::var(start.clone()),
            Some(100.0),
            Some(480.0),
        );
        assert_eq!(b.constraints().len(), 2);

        let lo = &b.constraints()[0];
        assert_eq!(lo.sense, Sense::Ge);
        assert_eq!(lo.rhs, 100.0 - m);

        // Active branch: bound binds.
        let tight = |id: &VarId| if *id == sel { 1.0 } else { 99.0 };
        assert!(!lo.satisfied_by(&tight)); // 99 < 100 when active
        let ok = |id: &VarId| if *id == sel { 1.0 } else { 100.0 };
        assert!(lo.satisfied_by(&ok));

        // Inactive branch: any start value passes.
        let slack = |_: &VarId| 0.0;
        assert!(lo.satisfied_by(&slack));

        let hi = &b.constraints()[1];
        assert_eq!(hi.sense, Sense::Le);
        let over = |id: &VarId| if *id == sel { 1.0 } else { 481.0 };
        assert!(!hi.satisfied_by(&over));
        let under = |id: &VarId| if *id == sel { 1.0 } else { 480.0 };
        assert!(hi.satisfied_by(&under));
    }

    #[test]
    fn test_complement_activation() {
        // Guarding on 1−δ flips which assignment binds.
        let (mut b, start, sel) = setup();
        guarded_bounds(
            &mut b,
            "flip",
            &LinExpr::one_minus(sel.clone()),
            &LinExpr::var(start.clone()),
            Some(200.0),
            None,
        );
        let c = &b.constraints()[0];

        let active = |id: &VarId| if *id == sel { 0.0 } else { 150.0 };
        assert!(!c.satisfied_by(&active));
        let inactive = |id: &VarId| if *id == sel { 1.0 } else { 150.0 };
        assert!(c.satisfied_by(&inactive));
    }

    #[test]
    fn test_exactly_one() {
        let (mut b, _, sel) = setup();
        let other = VarId::IntervalChoice {
            resource: "DEB".into(),
            job: "A1".into(),
            task: 0,
            interval: 1,
        };
        b.add_var(other.clone(), VarKind::Binary).unwrap();
        exactly_one(&mut b, "cal", vec![sel.clone(), other.clone()]);

        let c = b.constraints().last().unwrap();
        assert_eq!(c.sense, Sense::Eq);
        assert_eq!(c.rhs, 1.0);

        let one_hot = |id: &VarId| if *id == sel { 1.0 } else { 0.0 };
        assert!(c.satisfied_by(&one_hot));
        let both = |_: &VarId| 1.0;
        assert!(!c.satisfied_by(&both));
    }
}
