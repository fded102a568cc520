#![forbid(unsafe_code)]

//! Property tests for [`CompositeAction`].
//!
//! Validates:
//! - A child failing part-way through `apply` leaves the document as it was
//!   before the pass.
//! - A child failing part-way through `revert` leaves the document as it was
//!   after the last successful apply.
//! - Absorbing open composites flattens them without changing replay order.

use std::cell::RefCell;
use std::rc::Rc;

use proptest::prelude::*;

use rewind_core::{Action, ActionError, CompositeAction, FnAction};

type Doc = Rc<RefCell<Vec<i64>>>;

/// Pushes `value` on apply and pops it on revert. The failing side returns
/// an error without touching the document.
fn push(doc: &Doc, value: i64, fail_apply: bool, fail_revert: bool) -> Box<dyn Action> {
    let (d1, d2) = (doc.clone(), doc.clone());
    Box::new(FnAction::new(
        "push",
        format!("push {value}"),
        move || {
            if fail_apply {
                return Err(ActionError::other("apply refused"));
            }
            d1.borrow_mut().push(value);
            Ok(())
        },
        move || {
            if fail_revert {
                return Err(ActionError::other("revert refused"));
            }
            d2.borrow_mut().pop();
            Ok(())
        },
    ))
}

fn values_and_index() -> impl Strategy<Value = (Vec<i64>, usize)> {
    prop::collection::vec(any::<i64>(), 1..16).prop_flat_map(|values| {
        let len = values.len();
        (Just(values), 0..len)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn failed_apply_restores_prior_state((values, fail_at) in values_and_index()) {
        let doc = Doc::default();
        doc.borrow_mut().push(-1);
        let mut group = CompositeAction::new("push", "group");
        for (i, v) in values.iter().enumerate() {
            group.push(push(&doc, *v, i == fail_at, false));
        }

        let err = group.apply().unwrap_err();
        prop_assert_eq!(err, ActionError::other("apply refused"));
        prop_assert_eq!(&*doc.borrow(), &vec![-1]);
    }

    #[test]
    fn failed_revert_restores_applied_state((values, fail_at) in values_and_index()) {
        let doc = Doc::default();
        let mut group = CompositeAction::new("push", "group");
        for (i, v) in values.iter().enumerate() {
            group.push(push(&doc, *v, false, i == fail_at));
        }
        group.apply().unwrap();

        let err = group.revert().unwrap_err();
        prop_assert_eq!(err, ActionError::other("revert refused"));
        prop_assert_eq!(&*doc.borrow(), &values);
    }

    #[test]
    fn absorb_flattens_without_reordering(
        first in prop::collection::vec(any::<i64>(), 1..8),
        second in prop::collection::vec(any::<i64>(), 1..8),
    ) {
        let doc = Doc::default();
        let mut a = CompositeAction::new("push", "a");
        for v in &first {
            a.push(push(&doc, *v, false, false));
        }
        let mut b = CompositeAction::new("push", "b");
        for v in &second {
            b.push(push(&doc, *v, false, false));
        }
        a.absorb(Box::new(b));
        prop_assert_eq!(a.len(), first.len() + second.len());

        a.apply().unwrap();
        let expected: Vec<i64> = first.iter().chain(&second).copied().collect();
        prop_assert_eq!(&*doc.borrow(), &expected);
        a.revert().unwrap();
        prop_assert!(doc.borrow().is_empty());
    }
}
