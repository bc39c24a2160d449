use proptest::prelude::*;

use ferry_types::{Address, TargetAddress, TxHash};

proptest! {
    /// Display output parses back to the same address.
    #[test]
    fn address_display_parse_roundtrip(bytes in prop::array::uniform20(0u8..)) {
        let addr = Address::new(bytes);
        let parsed: Address = addr.to_string().parse().unwrap();
        prop_assert_eq!(parsed, addr);
    }

    /// Key form is always 40 lowercase hex characters.
    #[test]
    fn address_key_form_is_fixed_width(bytes in prop::array::uniform20(0u8..)) {
        let hex = TargetAddress::new(bytes).to_hex();
        prop_assert_eq!(hex.len(), 40);
        prop_assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    /// is_zero is true only for all-zero bytes.
    #[test]
    fn address_is_zero_correct(bytes in prop::array::uniform20(0u8..)) {
        prop_assert_eq!(Address::new(bytes).is_zero(), bytes == [0u8; 20]);
    }

    /// TxHash bincode serialization roundtrip.
    #[test]
    fn tx_hash_bincode_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let hash = TxHash::new(bytes);
        let encoded = bincode::serialize(&hash).unwrap();
        let decoded: TxHash = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded, hash);
    }

    /// Slices of any length other than 20 are rejected.
    #[test]
    fn from_slice_rejects_wrong_length(len in 0usize..64) {
        let bytes = vec![7u8; len];
        prop_assert_eq!(Address::from_slice(&bytes).is_ok(), len == 20);
    }
}
