//! Primary-key generation shared by every tool that writes game rows.
//! Keys follow the nanoid convention the game database uses.

use rand::Rng;

/// URL-safe id alphabet.
pub const ID_ALPHABET: &[u8; 64] = b"useandom-26T198340PX75pxJACKVERYMINDBUSHWOLF_GQZbfghjklqvwyzrict";

pub const ID_LEN: usize = 21;

pub fn new_id() -> String {
    new_id_with(&mut rand::thread_rng())
}

pub fn new_id_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..ID_LEN)
        .map(|_| char::from(ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn ids_are_url_safe_and_fixed_length() {
        for _ in 0..200 {
            let id = new_id();
            assert_eq!(id.len(), ID_LEN);
            assert!(id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-'));
        }
    }

    #[test]
    fn alphabet_has_no_repeats() {
        let unique: HashSet<_> = ID_ALPHABET.iter().collect();
        assert_eq!(unique.len(), 64);
    }

    #[test]
    fn seeded_ids_are_reproducible() {
        let a = new_id_with(&mut StdRng::seed_from_u64(9));
        let b = new_id_with(&mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
        assert_ne!(a, new_id_with(&mut StdRng::seed_from_u64(10)));
    }
}
