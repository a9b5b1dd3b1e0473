//! Numeric domain ids.
//!
//! Sequences differ between environments, so the numeric id is a CRC32 of
//! the machine id instead. The value is computed once when a record is
//! created and stored with it afterwards.

/// Derive the numeric domain id for a machine id.
pub fn derive_domain_id(id: &str) -> u32 {
    crc32fast::hash(id.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values() {
        assert_eq!(derive_domain_id("example_com"), 1_702_463_808);
        // Exceeds i32::MAX; must not wrap negative.
        assert_eq!(derive_domain_id("shop_example_com"), 3_071_180_624);
    }

    #[test]
    fn test_stable_across_calls() {
        let first = derive_domain_id("example_com");
        for _ in 0..10 {
            assert_eq!(derive_domain_id("example_com"), first);
        }
        assert_ne!(derive_domain_id("example_com"), derive_domain_id("example_org"));
    }
}
