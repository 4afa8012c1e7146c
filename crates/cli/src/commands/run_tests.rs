use super::*;

fn args(capacity: Option<usize>, interval_ms: Option<u64>) -> RunArgs {
    RunArgs {
        capacity,
        interval_ms,
        producers: 2,
        items: 10,
        wait_timeout_ms: None,
        json: false,
    }
}

#[test]
fn overrides_replace_only_given_fields() {
    let base = BatcherConfig::new(64, Duration::from_millis(100));

    let cases: &[(Option<usize>, Option<u64>, usize, Duration)] = &[
        (None, None, 64, Duration::from_millis(100)),
        (Some(8), None, 8, Duration::from_millis(100)),
        (None, Some(0), 64, Duration::ZERO),
        (Some(1), Some(5), 1, Duration::from_millis(5)),
    ];

    for (capacity, interval, want_cap, want_interval) in cases {
        let config = apply_overrides(base.clone(), &args(*capacity, *interval));
        assert_eq!(config.capacity, *want_cap);
        assert_eq!(config.flush_interval, *want_interval);
        assert!(config.isolate_panics);
    }
}

#[test]
fn delivery_tracks_batches_and_order() {
    let mut delivery = Delivery::new(2);

    delivery.record_batch(
        [
            Item { producer: 0, seq: 0 },
            Item { producer: 1, seq: 0 },
            Item { producer: 0, seq: 1 },
        ]
        .into_iter(),
    );
    delivery.record_batch(std::iter::empty());
    delivery.record_batch([Item { producer: 1, seq: 1 }].into_iter());

    assert_eq!(delivery.delivered, 4);
    assert_eq!(delivery.batches, 2);
    assert_eq!(delivery.largest_batch, 3);
    assert_eq!(delivery.out_of_order, 0);
}

#[test]
fn delivery_flags_reordering() {
    let mut delivery = Delivery::new(1);

    delivery.record_batch(
        [
            Item { producer: 0, seq: 3 },
            Item { producer: 0, seq: 1 },
            Item { producer: 0, seq: 1 },
        ]
        .into_iter(),
    );

    assert_eq!(delivery.out_of_order, 2);
}

#[test]
fn producers_feed_the_batcher() {
    let delivery = Arc::new(Mutex::new(Delivery::new(3)));
    let batcher = {
        let delivery = Arc::clone(&delivery);
        Batcher::new(
            move |rows: Pending<'_, Item>| delivery.lock().unwrap().record_batch(rows),
            300,
            Duration::from_millis(1),
        )
    };

    let accepted = produce(&batcher, 3, 100).expect("producers finish");
    batcher.wait();
    batcher.shutdown().expect("clean shutdown");

    let delivery = delivery.lock().unwrap();
    assert_eq!(accepted, 300);
    assert_eq!(delivery.delivered, 300);
    assert_eq!(delivery.out_of_order, 0);
}

#[test]
fn accepted_counts_are_summed() {
    let counts = vec![Ok(3), Ok(0), Ok(7)];
    assert_eq!(sum_accepted(counts.into_iter()).unwrap(), 10);

    let saturating = vec![Ok(usize::MAX), Ok(1)];
    assert_eq!(sum_accepted(saturating.into_iter()).unwrap(), usize::MAX);
}

#[test]
fn panicked_producer_is_an_error() {
    let counts: Vec<thread::Result<usize>> = vec![Ok(3), Err(Box::new("producer blew up"))];

    let err = sum_accepted(counts.into_iter()).expect_err("panic must surface");
    assert!(err.to_string().contains("producer thread panicked"), "{err}");
}
