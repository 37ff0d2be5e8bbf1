use proptest::prelude::*;

use quorum_types::{Account, BlockHeight, Timestamp};

proptest! {
    /// Account display output always parses back to the same account.
    #[test]
    fn account_display_parses_back(bytes in prop::array::uniform20(0u8..)) {
        let account = Account::new(bytes);
        let parsed: Account = account.to_string().parse().unwrap();
        prop_assert_eq!(parsed, account);
    }

    /// Account::is_zero is true only for all-zero bytes.
    #[test]
    fn account_is_zero_correct(bytes in prop::array::uniform20(0u8..)) {
        prop_assert_eq!(Account::new(bytes).is_zero(), bytes == [0u8; 20]);
    }

    /// Accounts survive a bincode round trip (used by token and governor snapshots).
    #[test]
    fn account_bincode_roundtrip(bytes in prop::array::uniform20(0u8..)) {
        let account = Account::new(bytes);
        let encoded = bincode::serialize(&account).unwrap();
        let decoded: Account = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded, account);
    }

    /// BlockHeight ordering follows the raw number.
    #[test]
    fn block_height_ordering(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
        prop_assert_eq!(BlockHeight::new(a) <= BlockHeight::new(b), a <= b);
    }

    /// prev() is the inverse of saturating_add(1) away from the limits.
    #[test]
    fn block_height_prev_inverts_add(h in 0u64..u64::MAX - 1) {
        prop_assert_eq!(BlockHeight::new(h).saturating_add(1).prev(), Some(BlockHeight::new(h)));
    }

    /// Timestamp has_expired agrees with manual arithmetic.
    #[test]
    fn timestamp_has_expired(base in 0u64..1_000_000, duration in 0u64..1_000_000, now in 0u64..3_000_000) {
        let t = Timestamp::new(base);
        prop_assert_eq!(t.has_expired(duration, Timestamp::new(now)), now >= base + duration);
    }
}
