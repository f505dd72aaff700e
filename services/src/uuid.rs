use uuid::Uuid;

/// Fresh random session id (UUIDv4, hyphenated).
pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// Deterministic UUIDv5 from an arbitrary string id.
///
/// Lets a caller-chosen name (e.g. `--session alice`) map onto the same
/// id shape as generated sessions.
pub fn stable_uuid(id: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, id.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_are_unique_v4() {
        let a = new_session_id();
        let b = new_session_id();
        assert_ne!(a, b);
        assert_eq!(Uuid::parse_str(&a).unwrap().get_version_num(), 4);
    }

    #[test]
    fn stable_uuid_is_deterministic() {
        assert_eq!(stable_uuid("alice"), stable_uuid("alice"));
        assert_ne!(stable_uuid("alice"), stable_uuid("bob"));
        assert_eq!(stable_uuid("alice").get_version_num(), 5);
    }
}
