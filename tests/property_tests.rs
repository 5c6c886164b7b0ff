//! Property-based tests for sawmill using proptest

use proptest::prelude::*;
use sawmill::prelude::*;
use sawmill::{destructure, FlatFields};
use std::collections::BTreeMap;
use std::sync::Arc;

fn any_level() -> impl Strategy<Value = Level> {
    (0u8..8).prop_map(|ordinal| Level::from_ordinal(ordinal).unwrap())
}

// ============================================================================
// Level Tests
// ============================================================================

proptest! {
    /// Level string conversions roundtrip
    #[test]
    fn test_level_str_roundtrip(level in any_level()) {
        let parsed: Level = level.to_str().parse().unwrap();
        prop_assert_eq!(level, parsed);
    }

    /// Ordering follows the syslog ordinal, most severe first
    #[test]
    fn test_level_ordering(a in any_level(), b in any_level()) {
        prop_assert_eq!(a <= b, a.ordinal() <= b.ordinal());
        prop_assert_eq!(a.is_at_least(b), a.ordinal() <= b.ordinal());
    }

    /// Parsing ignores case
    #[test]
    fn test_level_case_insensitive(level in any_level(), upper in any::<bool>()) {
        let input = if upper {
            level.to_str().to_uppercase()
        } else {
            level.to_str().to_string()
        };
        let parsed: std::result::Result<Level, String> = input.parse();
        prop_assert_eq!(parsed, Ok(level));
    }
}

// ============================================================================
// Destructure Tests
// ============================================================================

proptest! {
    /// Mutating the original after the call never changes the copy
    #[test]
    fn test_copy_independence(
        mut numbers in prop::collection::vec(any::<i64>(), 0..16),
        mut labels in prop::collection::hash_map("[a-z]{1,6}", "[a-z]{0,6}", 0..8),
    ) {
        let payload = Fields::new().with("numbers", &numbers).with("labels", &labels);
        let (copy, flat) = destructure(&payload);
        let before_copy = copy.clone();
        let before_flat = flat.clone();

        numbers.push(42);
        numbers.iter_mut().for_each(|n| *n = n.wrapping_add(1));
        labels.insert("zzzzzzz".to_string(), "new".to_string());
        labels.values_mut().for_each(|v| v.push('!'));

        prop_assert_eq!(copy, before_copy);
        prop_assert_eq!(flat, before_flat);
    }

    /// A byte sequence yields exactly one flattened entry
    #[test]
    fn test_byte_atomicity(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let (_, flat) = destructure(&Fields::new().with("data", &bytes));
        prop_assert_eq!(flat.len(), 1);
        prop_assert_eq!(flat.get("data"), Some(&Scalar::Bytes(bytes.clone())));
    }

    /// Nested mappings flatten to `outer.inner` keys
    #[test]
    fn test_nested_map_key_shape(
        nested in prop::collection::btree_map(
            "[a-z]{1,8}",
            prop::collection::btree_map("[a-z]{1,8}", any::<i64>(), 1..4),
            0..6,
        )
    ) {
        let (_, flat) = destructure(&nested);

        let mut expected = FlatFields::new();
        for (outer, inner) in &nested {
            for (key, value) in inner {
                expected.insert(format!("{}.{}", outer, key), Scalar::Int(*value));
            }
        }
        prop_assert_eq!(flat, expected);
    }

    /// Sequence elements are keyed by their zero-based index
    #[test]
    fn test_sequence_index_keys(items in prop::collection::vec("[a-z]{0,5}", 0..20)) {
        let (_, flat) = destructure(&Fields::new().with("items", &items));

        prop_assert_eq!(flat.len(), items.len());
        for (index, item) in items.iter().enumerate() {
            prop_assert_eq!(
                flat.get(&format!("items.{}", index)),
                Some(&Scalar::from(item.as_str()))
            );
        }
    }

    /// String keys never produce empty path segments
    #[test]
    fn test_flat_keys_have_no_empty_segments(
        map in prop::collection::hash_map("[a-z0-9]{1,5}", any::<bool>(), 0..10)
    ) {
        let (_, flat) = destructure(&Fields::new().with("m", &map));
        for key in flat.keys() {
            prop_assert!(key.split('.').all(|segment| !segment.is_empty()), "{}", key);
        }
    }
}

// ============================================================================
// Formatting Tests
// ============================================================================

proptest! {
    /// Every output format renders one event as exactly one line
    #[test]
    fn test_single_line_rendering(message in ".*", value in ".*") {
        let event = Event::new(1, Level::Info, message, &Fields::new().with("v", &value), false);
        for format in [OutputFormat::Text, OutputFormat::Json, OutputFormat::Logfmt] {
            let line = format.format(&event, &TimestampFormat::default());
            prop_assert!(!line.contains('\n'), "{:?}: {:?}", format, line);
            prop_assert!(!line.contains('\r'), "{:?}: {:?}", format, line);
        }
    }
}

// ============================================================================
// Dispatch Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// A single handler processes ids in submission order, each exactly once
    #[test]
    fn test_per_handler_ordering(count in 1usize..60, capacity in 1usize..8) {
        let capture = Arc::new(CaptureHandler::new());
        let logger = Logger::new();
        logger
            .add_handler_with("capture", Arc::clone(&capture), HandlerConfig::new().capacity(capacity))
            .unwrap();

        for i in 0..count {
            logger.debug("tick", &fields! { "i" => i });
        }
        logger.stop();

        let ids: Vec<u64> = capture.events().iter().map(|e| e.id).collect();
        prop_assert!(ids.windows(2).all(|w| w[0] < w[1]), "{:?}", ids);
        prop_assert_eq!(ids.len() as u64 + logger.dropped_count(), count as u64);
    }

    /// Counters agree: every submission is either delivered or dropped per handler
    #[test]
    fn test_metrics_account_for_every_event(count in 1usize..40) {
        let logger = Logger::new();
        logger.add_handler("a", CaptureHandler::new()).unwrap();
        logger.add_handler("b", CaptureHandler::new()).unwrap();

        let mut last = 0;
        for _ in 0..count {
            last = logger.info("x", &());
        }
        logger.sync(last);

        let metrics = logger.metrics();
        prop_assert_eq!(metrics.submitted_count(), count as u64);
        prop_assert_eq!(
            metrics.enqueued_count() + metrics.dropped_count(),
            2 * count as u64
        );
        logger.stop();
    }
}

#[test]
fn test_flat_fields_sorted() {
    let mut payload = BTreeMap::new();
    payload.insert("zeta", 1);
    payload.insert("alpha", 2);
    let (_, flat) = destructure(&payload);
    let keys: Vec<&String> = flat.keys().collect();
    assert_eq!(keys, vec!["alpha", "zeta"]);
}
