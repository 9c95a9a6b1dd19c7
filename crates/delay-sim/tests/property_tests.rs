//! Property tests for delayed channel behavior

use delay_sim::delay::prefix;
use delay_sim::{DelayedChannel, DelayedChannelConfig};
use proptest::prelude::*;

fn chunks() -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(prop::collection::vec(any::<u8>(), 0..64), 0..16)
}

fn delay_set() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(0u64..5, 1..4)
}

/// Split a payload into its delay value and the buffer that followed it
fn split_payload(payload: &[u8]) -> (String, &[u8]) {
    let dash = payload
        .iter()
        .position(|&b| b == b'-')
        .expect("payload has a prefix");
    let digits = String::from_utf8(payload[..dash].to_vec()).unwrap();
    (digits, &payload[dash + 1..])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn writes_accumulate(chunks in chunks()) {
        let channel = DelayedChannel::new(vec![0]);
        let mut expected = Vec::new();

        for chunk in &chunks {
            prop_assert_eq!(channel.write(chunk), chunk.len());
            expected.extend_from_slice(chunk);
        }

        prop_assert_eq!(channel.snapshot(), expected);
    }

    #[test]
    fn read_reflects_buffer(chunks in chunks(), delays in delay_set(), seed in any::<u64>()) {
        let channel = DelayedChannel::from_config(
            DelayedChannelConfig::new(delays.clone()).with_seed(seed),
        );
        for chunk in &chunks {
            channel.write(chunk);
        }
        let buffer = channel.snapshot();

        let mut dst = vec![0u8; buffer.len() + 32];
        let event = channel.read_blocking(&mut dst).unwrap();
        prop_assert!(event.is_end_of_stream());
        prop_assert!(delays.contains(&event.delay_ms));

        let (digits, rest) = split_payload(&dst[..event.len]);
        prop_assert_eq!(digits, event.delay_ms.to_string());
        prop_assert_eq!(rest, &buffer[..]);
    }

    #[test]
    fn consecutive_reads_see_same_buffer(data in prop::collection::vec(any::<u8>(), 0..128)) {
        let channel = DelayedChannel::new(vec![0, 1]);
        channel.write(&data);

        let mut first = vec![0u8; data.len() + 8];
        let mut second = vec![0u8; data.len() + 8];
        let a = channel.read_blocking(&mut first).unwrap();
        let b = channel.read_blocking(&mut second).unwrap();

        let (_, rest_a) = split_payload(&first[..a.len]);
        let (_, rest_b) = split_payload(&second[..b.len]);
        prop_assert_eq!(rest_a, &data[..]);
        prop_assert_eq!(rest_b, &data[..]);
    }

    #[test]
    fn prefix_is_plain_decimal(delay in any::<u64>()) {
        let p = prefix(delay);
        prop_assert!(p.ends_with('-'));

        let digits = &p[..p.len() - 1];
        prop_assert!(digits.bytes().all(|b| b.is_ascii_digit()));
        prop_assert!(digits == "0" || !digits.starts_with('0'));
        prop_assert_eq!(digits.parse::<u64>().unwrap(), delay);
    }

    #[test]
    fn capacity_covers_buffer(chunks in chunks()) {
        let channel = DelayedChannel::new(vec![0]);
        for chunk in &chunks {
            let needed = channel.len() + chunk.len();
            let before = channel.capacity();
            channel.write(chunk);
            if needed > before {
                prop_assert!(channel.capacity() >= 2 * needed);
            } else {
                prop_assert_eq!(channel.capacity(), before);
            }
        }
    }
}

#[test]
fn config_from_json() {
    let config: DelayedChannelConfig =
        serde_json::from_str(r#"{ "delays_ms": [10, 20, 30] }"#).unwrap();
    assert_eq!(config, DelayedChannelConfig::new(vec![10, 20, 30]));

    let config: DelayedChannelConfig =
        serde_json::from_str(r#"{ "delays_ms": [5], "seed": 9 }"#).unwrap();
    assert_eq!(config.seed, Some(9));
}
