//! Property-based tests for scripts and conversations using proptest

use super::*;
use proptest::prelude::*;
use std::sync::Arc;

fn state_name(i: usize) -> String {
    format!("s{i}")
}

/// Chain of `len` states. "next" advances one step, "reset" returns to s0
/// from anywhere (a self-loop when already there), and every state's entry
/// action speaks its own name.
fn chain_script(len: usize) -> Arc<Script> {
    let mut builder = Script::builder("chain").initial_state(state_name(0));
    for i in 1..len {
        builder = builder.state(state_name(i));
    }
    for i in 0..len {
        let label = state_name(i);
        builder = builder.on_enter(state_name(i), move |_, _| {
            StateEntry::new(vec![Directive::speak(label.clone())])
        });
    }
    for i in 0..len - 1 {
        builder = builder.transition("next", state_name(i), state_name(i + 1));
    }
    for i in 0..len {
        builder = builder.transition("reset", state_name(i), state_name(0));
    }
    Arc::new(builder.build().unwrap())
}

fn arb_event() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("next"), Just("reset"), Just("bogus")]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// Every accepted event lands in a declared state whose entry output is
    /// both returned and stored; every rejected event changes nothing.
    #[test]
    fn prop_walk_preserves_entry_invariants(
        len in 2usize..6,
        events in prop::collection::vec(arb_event(), 0..12),
    ) {
        let script = chain_script(len);
        let mut conv = Conversation::new("prop", script.clone(), CallParams::new());
        let mut expected = 0usize;

        // Creation already ran the initial state's entry action.
        prop_assert_eq!(
            conv.directives().to_vec(),
            vec![Directive::speak(state_name(0))]
        );

        for event in events {
            let state_before = conv.current_state().to_string();
            let directives_before = conv.directives().to_vec();

            match conv.fire(event, &EventArgs::new()) {
                Ok(directives) => {
                    match event {
                        "next" => expected += 1,
                        "reset" => expected = 0,
                        other => prop_assert!(false, "event {} must not succeed", other),
                    }
                    prop_assert_eq!(
                        directives.clone(),
                        vec![Directive::speak(state_name(expected))]
                    );
                    prop_assert_eq!(conv.directives().to_vec(), directives);
                }
                Err(TransitionError::UnknownEvent { .. }) => {
                    prop_assert_eq!(event, "bogus");
                    prop_assert_eq!(conv.current_state(), state_before.as_str());
                    prop_assert_eq!(conv.directives().to_vec(), directives_before);
                }
                Err(TransitionError::UnknownTransition { .. }) => {
                    // Only "next" from the end of the chain lands here.
                    prop_assert_eq!(event, "next");
                    prop_assert_eq!(expected, len - 1);
                    prop_assert_eq!(conv.current_state(), state_before.as_str());
                    prop_assert_eq!(conv.directives().to_vec(), directives_before);
                }
            }

            let expected_name = state_name(expected);
            prop_assert_eq!(conv.current_state(), expected_name.as_str());
            prop_assert!(
                script.has_state(conv.current_state()),
                "landed in an undeclared state"
            );
        }
    }

    /// Two conversations fed the same events stay in lockstep.
    #[test]
    fn prop_identical_runs_produce_identical_output(
        len in 2usize..6,
        events in prop::collection::vec(arb_event(), 0..12),
    ) {
        let script = chain_script(len);
        let mut first = Conversation::new("first", script.clone(), CallParams::new());
        let mut second = Conversation::new("second", script, CallParams::new());

        for event in events {
            let a = first.fire(event, &EventArgs::new());
            let b = second.fire(event, &EventArgs::new());
            match (a, b) {
                (Ok(da), Ok(db)) => prop_assert_eq!(da, db),
                (Err(_), Err(_)) => {}
                (a, b) => prop_assert!(false, "runs diverged: {:?} vs {:?}", a, b),
            }
            prop_assert_eq!(first.current_state(), second.current_state());
        }
    }

    /// Registering the same event twice from one state fails no matter
    /// where the second registration points.
    #[test]
    fn prop_duplicate_event_from_state_rejected(
        len in 2usize..6,
        target in 0usize..6,
    ) {
        let target = target % len;
        let mut builder = Script::builder("dup").initial_state(state_name(0));
        for i in 1..len {
            builder = builder.state(state_name(i));
        }
        let result = builder
            .transition("next", state_name(0), state_name(1))
            .transition("next", state_name(0), state_name(target))
            .build();
        prop_assert!(
            matches!(result, Err(ScriptError::DuplicateTransition { .. })),
            "expected DuplicateTransition error"
        );
    }

    /// Any number of extra initial declarations is rejected.
    #[test]
    fn prop_second_initial_state_rejected(extra in 1usize..4) {
        let mut builder = Script::builder("multi").initial_state(state_name(0));
        for i in 1..=extra {
            builder = builder.initial_state(state_name(i));
        }
        prop_assert!(
            matches!(builder.build(), Err(ScriptError::MultipleInitialStates { .. })),
            "expected MultipleInitialStates error"
        );
    }
}
