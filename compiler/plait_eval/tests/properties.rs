//! Property-based tests for list collapsing, operator grouping and partial
//! application.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]
#![allow(
    clippy::redundant_closure_for_method_calls,
    reason = "Proptest macros generate code with these patterns"
)]

mod common;

use common::Engine;
use plait_eval::Node;
use proptest::prelude::*;

fn small_int() -> impl Strategy<Value = i32> {
    -1000i32..1000
}

fn source_list(values: &[i32]) -> String {
    let inner: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!("[{}]", inner.join(" "))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Empty data is nil, one atom is the atom, anything longer is kept.
    #[test]
    fn data_collapses_by_length(values in prop::collection::vec(small_int(), 0..8)) {
        let mut e = Engine::new();
        let shown = e.show(&source_list(&values));
        let expected = match values.as_slice() {
            [] => "()".to_owned(),
            [one] => one.to_string(),
            many => {
                let inner: Vec<String> = many.iter().map(|v| v.to_string()).collect();
                format!("[ {} ]", inner.join(" "))
            }
        };
        prop_assert_eq!(shown, expected);
    }

    #[test]
    fn products_group_before_sums(a in small_int(), b in small_int(), c in small_int()) {
        let mut e = Engine::new();
        prop_assert_eq!(e.show(&format!("({a} + {b} * {c})")), (a + b * c).to_string());
        prop_assert_eq!(e.show(&format!("({a} * {b} + {c})")), (a * b + c).to_string());
        prop_assert_eq!(e.show(&format!("({a} - {b} - {c})")), (a - b - c).to_string());
    }

    /// The missing left operand of a partial application comes first.
    #[test]
    fn steps_fill_the_prefix_hole(a in small_int(), b in small_int()) {
        let mut e = Engine::new();
        for (op, expected) in [("+", b + a), ("-", b - a)] {
            let step = e.reduce(&format!("({op} {a})")).unwrap();
            let filled = step.step_with(&mut e.ctx, &Node::int(b)).unwrap();
            prop_assert_eq!(e.ctx.reduce(&filled).unwrap().to_string(), expected.to_string());
        }
    }

    /// A pipeline sees its own arguments on every call.
    #[test]
    fn calls_do_not_share_arguments(values in prop::collection::vec(small_int(), 1..6)) {
        let mut e = Engine::new();
        e.bind("(define twice ((pipeline (#args n)) (n + n)))").unwrap();
        for v in values {
            prop_assert_eq!(e.show(&format!("(twice {v})")), (v + v).to_string());
        }
    }
}
