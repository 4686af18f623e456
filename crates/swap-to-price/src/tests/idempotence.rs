use {
    super::*,
    crate::{domain::executor::Outcome, infra::observe::metrics},
};

#[test]
fn on_target_pool_is_left_alone() {
    let setup = metals();

    assert_eq!(
        setup.swap(&request(gold(), silver(), 1, 100)),
        Ok(Outcome::NoOp)
    );
    assert_eq!(
        setup.swap(&request(silver(), gold(), 100, 1)),
        Ok(Outcome::NoOp)
    );
    assert_eq!(setup.reserves(), (10u64.eth(), 1000u64.eth()));
    assert_eq!(setup.balance(gold(), OWNER), 49_990u64.eth());
}

#[test]
fn second_call_is_a_noop() {
    for (numerator, denominator) in [(1, 90), (1, 110), (3, 250), (7, 1000)] {
        let setup = metals();
        let request = request(gold(), silver(), numerator, denominator);

        assert!(matches!(setup.swap(&request), Ok(Outcome::Swapped(_))));
        let reserves = setup.reserves();
        let balances = (
            setup.balance(gold(), OWNER),
            setup.balance(silver(), OWNER),
        );

        assert_eq!(setup.swap(&request), Ok(Outcome::NoOp));
        assert_eq!(setup.reserves(), reserves);
        assert_eq!(
            (
                setup.balance(gold(), OWNER),
                setup.balance(silver(), OWNER),
            ),
            balances
        );
    }
}

#[test]
fn outcomes_are_counted() {
    let setup = metals();
    let noops = || metrics::get().swaps.with_label_values(&["noop"]).get();
    let zero_prices = || {
        metrics::get()
            .swap_errors
            .with_label_values(&["zero_price"])
            .get()
    };

    // Other tests run concurrently, so counters only ever grow.
    let (noops_before, zero_prices_before) = (noops(), zero_prices());
    setup.swap(&request(gold(), silver(), 1, 100)).unwrap();
    setup.swap(&request(gold(), silver(), 0, 100)).unwrap_err();
    assert!(noops() > noops_before);
    assert!(zero_prices() > zero_prices_before);
}

#[test]
fn executor_exposes_its_configuration() {
    let setup = metals();
    assert_eq!(setup.executor.address(), EXECUTOR);
    assert_eq!(setup.executor.factory(), FACTORY);
    assert_eq!(setup.executor.router(), ROUTER);
}
