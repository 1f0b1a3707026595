//! Identifier generators for `(uuid ...)` fields.

use uuid::Uuid;

/// Source of unique identifiers for emitted records.
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

/// Random version-4 UUIDs
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic UUID-shaped identifiers counting up from zero.
#[derive(Debug, Default, Clone)]
pub struct SequentialIds {
    next: u128,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> String {
        let id = Uuid::from_u128(self.next);
        self.next += 1;
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_uuid_shaped(s: &str) -> bool {
        let groups: Vec<&str> = s.split('-').collect();
        groups.iter().map(|g| g.len()).collect::<Vec<_>>() == vec![8, 4, 4, 4, 12]
            && s.chars().all(|c| c == '-' || c.is_ascii_hexdigit())
    }

    #[test]
    fn test_random_ids_are_unique_and_well_formed() {
        let mut ids = RandomIds;
        let a = ids.next_id();
        let b = ids.next_id();
        assert_ne!(a, b);
        assert!(is_uuid_shaped(&a));
    }

    #[test]
    fn test_sequential_ids_are_deterministic() {
        let mut ids = SequentialIds::new();
        assert_eq!(ids.next_id(), "00000000-0000-0000-0000-000000000000");
        assert_eq!(ids.next_id(), "00000000-0000-0000-0000-000000000001");
        assert!(is_uuid_shaped(&ids.next_id()));
    }
}
