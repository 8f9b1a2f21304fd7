//! Blob Name Codec: the bijection between a page index and the textual
//! name used to store it in the buffer store's bucket.
//!
//! `name(k)` is the decimal ASCII spelling of `k` followed by a single
//! `\n`, bounded by a 10-byte field. The spelling must stay
//! byte-identical across implementations to remain interoperable with
//! an existing bucket; do not change the width or the trailing newline.

/// Field width blob names are bounded by. Indices through 10^8 fit.
pub const BLOB_NAME_FIELD_WIDTH: usize = 10;

/// Encodes a page index as its blob name.
pub fn blob_name(page: u64) -> String {
    let name = format!("{page}\n");
    debug_assert!(
        name.len() <= BLOB_NAME_FIELD_WIDTH,
        "page index {page} does not fit the {BLOB_NAME_FIELD_WIDTH}-byte blob name field"
    );
    name
}

/// Decodes a blob name back into a page index. The inverse of [`blob_name`].
pub fn page_index(name: &str) -> Option<u64> {
    name.strip_suffix('\n')?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        for page in [0u64, 1, 9, 10, 2500, 99_999_999] {
            let name = blob_name(page);
            assert!(name.ends_with('\n'));
            assert_eq!(page_index(&name), Some(page));
        }
    }

    #[test]
    fn is_stable_and_collision_free() {
        assert_eq!(blob_name(0), "0\n");
        assert_eq!(blob_name(42), "42\n");
        assert_ne!(blob_name(1), blob_name(10));
    }

    #[test]
    fn fits_the_field_width() {
        assert!(blob_name(99_999_999).len() <= BLOB_NAME_FIELD_WIDTH);
    }
}
