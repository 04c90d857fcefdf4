use rand::Rng;

const SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 9;

/// Build an item id from the creation time and a random base-36 suffix.
///
/// There is no central allocator; two ids only collide if they are created in
/// the same millisecond and draw the same 9-character suffix (1 in 36^9).
pub fn generate_item_id<R: Rng>(now_millis: i64, rng: &mut R) -> String {
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.random_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect();
    format!("{}{}", now_millis, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_id_is_time_prefix_plus_suffix() {
        let mut rng = StdRng::seed_from_u64(7);
        let id = generate_item_id(1_700_000_000_000, &mut rng);

        assert!(id.starts_with("1700000000000"));
        assert_eq!(id.len(), 13 + SUFFIX_LEN);
        assert!(id[13..].bytes().all(|b| SUFFIX_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_same_millisecond_ids_differ() {
        let mut rng = StdRng::seed_from_u64(42);
        let ids: HashSet<String> = (0..500)
            .map(|_| generate_item_id(1_700_000_000_000, &mut rng))
            .collect();
        assert_eq!(ids.len(), 500);
    }
}
