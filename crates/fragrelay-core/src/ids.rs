//! Request-scoped identifier generation.
//!
//! Session ids, completion ids and stream chunk ids all come from this one
//! capability so the wire format stays uniform across the pipeline.

use uuid::Uuid;

/// Generate a fresh random identifier.
///
/// Standard v4 layout (five dash-separated hex groups with the version and
/// variant bits set), which is what the fragment service accepts as a
/// `userID`. Values are random, not secret.
#[must_use]
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_has_v4_layout() {
        let id = new_id();
        let groups: Vec<&str> = id.split('-').collect();
        assert_eq!(groups.len(), 5);
        assert_eq!(groups.iter().map(|g| g.len()).collect::<Vec<_>>(), vec![
            8, 4, 4, 4, 12
        ]);
        // Version nibble is 4, variant nibble is one of 8/9/a/b
        assert!(groups[2].starts_with('4'));
        assert!(matches!(
            groups[3].chars().next(),
            Some('8' | '9' | 'a' | 'b')
        ));
    }

    #[test]
    fn test_ids_are_unique_per_call() {
        assert_ne!(new_id(), new_id());
    }
}
