//! Forked contexts on separate threads over one runtime.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

mod common;

use std::sync::Barrier;
use std::thread;

use common::Engine;
use plait_eval::EvalErrorKind;
use pretty_assertions::assert_eq;

const THREADS: usize = 8;

#[test]
fn forked_contexts_share_the_namespace_tree() {
    let e = Engine::new();
    let define = e.read("(define dup 1)").unwrap();
    let sum = e.read("(dup + 6)").unwrap();
    let private = e.read("(push-private-namespace (define t 5) t)").unwrap();
    let barrier = Barrier::new(THREADS);

    let results: Vec<(bool, String, String)> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let mut ctx = e.ctx.fork();
                let (define, sum, private, barrier) = (&define, &sum, &private, &barrier);
                scope.spawn(move || {
                    let won = match ctx.bind(define) {
                        Ok(_) => true,
                        Err(err) => {
                            assert!(err
                                .related
                                .iter()
                                .any(|r| matches!(r.kind, EvalErrorKind::DuplicateName { .. })));
                            false
                        }
                    };
                    barrier.wait();
                    let bound = ctx.bind(sum).unwrap();
                    let total = ctx.reduce(&bound).unwrap().to_string();
                    let bound = ctx.bind(private).unwrap();
                    let local = ctx.reduce(&bound).unwrap().to_string();
                    assert_eq!(ctx.flow_depth(), 0);
                    (won, total, local)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results.iter().filter(|(won, _, _)| *won).count(), 1);
    for (_, total, local) in &results {
        assert_eq!(total, "7");
        assert_eq!(local, "[ 5 5 ]");
    }
    // private definitions never reach the shared tree
    let t = e.runtime.intern("t");
    assert!(!e.runtime.core().check_local_bind(t));
    assert!(e.runtime.pool().available() <= e.runtime.config().pool_capacity);
}
