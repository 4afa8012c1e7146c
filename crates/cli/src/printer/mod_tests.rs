use super::*;

fn report() -> RunReport {
    RunReport {
        capacity: 2,
        flush_interval: Duration::from_millis(1),
        producers: 1,
        attempted: 3,
        accepted: 2,
        rejected: 1,
        delivered: 2,
        batches: 1,
        largest_batch: 2,
        out_of_order: 0,
        drained: true,
        elapsed: Duration::from_millis(4),
    }
}

#[test]
fn consistency_requires_drain_order_and_full_delivery() {
    let cases: &[(fn(&mut RunReport), bool)] = &[
        (|_| {}, true),
        (|r| r.drained = false, false),
        (|r| r.out_of_order = 1, false),
        (|r| r.delivered = 1, false),
        (|r| r.rejected = 50, true),
    ];

    for (i, (tweak, expected)) in cases.iter().enumerate() {
        let mut r = report();
        tweak(&mut r);
        assert_eq!(r.is_consistent(), *expected, "case {i}");
    }
}

#[test]
fn human_printer_summarises_counts() {
    let mut buf = Vec::new();
    HumanPrinter::new(&mut buf).print_report(&report()).unwrap();

    let text = String::from_utf8(buf).unwrap();
    assert!(text.contains("[run] accepted:  2"), "{text}");
    assert!(text.contains("[run] dropped:   1"), "{text}");
    assert!(text.contains("delivered: 2 in 1 flushes (largest 2)"), "{text}");
    assert!(!text.contains("out of order"), "{text}");
    assert!(!text.contains("did not drain"), "{text}");
}

#[test]
fn human_printer_calls_out_problems() {
    let mut r = report();
    r.out_of_order = 3;
    r.drained = false;

    let mut buf = Vec::new();
    HumanPrinter::new(&mut buf).print_report(&r).unwrap();

    let text = String::from_utf8(buf).unwrap();
    assert!(text.contains("[run] out of order: 3"), "{text}");
    assert!(text.contains("did not drain"), "{text}");
}

#[test]
fn json_printer_emits_one_object() {
    let mut buf = Vec::new();
    JsonPrinter::new(&mut buf).print_report(&report()).unwrap();

    let text = String::from_utf8(buf).unwrap();
    assert_eq!(text.lines().count(), 1);

    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["accepted"], 2);
    assert_eq!(value["rejected"], 1);
    assert_eq!(value["drained"], true);
    assert_eq!(value["consistent"], true);
}
