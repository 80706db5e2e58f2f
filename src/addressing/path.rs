//! Builds schema-addressed storage paths.
//!
//! Layout: `{schema}/{table}/{col=value[,col=value...]}/{field}{extension}`.
//! Every component is percent-escaped, so delimiters inside names or values
//! cannot make two identities share a path, and the same identity always yields
//! the same one. Key values are rendered by their text form only: within one
//! primary-key column (which has a single type in the host schema) distinct
//! values give distinct paths, but `1` and `"1"` render alike.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sha2::{Digest, Sha256};

use super::PrimaryKey;
use crate::error::PhotonError;

/// Builds the deterministic path for one field cell, plus an opaque token.
///
/// The token is the hex SHA-256 of `"{store}:{path}"` and is stable for a given
/// address; hosts may index on it instead of the full path.
pub fn build_path(
    schema: &str,
    table: &str,
    field: &str,
    primary_key: &PrimaryKey,
    extension: &str,
    store_name: Option<&str>,
) -> Result<(String, String), PhotonError> {
    require("schema", schema)?;
    require("table", table)?;
    require("field", field)?;
    check_extension(extension)?;
    if primary_key.is_empty() {
        return Err(PhotonError::Addressing(
            "primary key is empty; cannot address a cell without it".into(),
        ));
    }

    let mut key_parts = Vec::with_capacity(primary_key.len());
    for (column, value) in primary_key.iter() {
        require("primary key column", column)?;
        key_parts.push(format!(
            "{}={}",
            escape_segment(column),
            escape_segment(&value.to_string())
        ));
    }

    let path = format!(
        "{}/{}/{}/{}{}",
        escape_segment(schema),
        escape_segment(table),
        key_parts.join(","),
        escape_segment(field),
        extension
    );

    let mut hasher = Sha256::new();
    hasher.update(store_name.unwrap_or_default().as_bytes());
    hasher.update(b":");
    hasher.update(path.as_bytes());
    let token = hex::encode(hasher.finalize());

    Ok((path, token))
}

fn require(what: &str, value: &str) -> Result<(), PhotonError> {
    if value.is_empty() {
        return Err(PhotonError::Addressing(format!("{} name is missing", what)));
    }
    Ok(())
}

fn check_extension(extension: &str) -> Result<(), PhotonError> {
    let valid = extension.len() > 1
        && extension.starts_with('.')
        && extension[1..].chars().all(|c| c.is_ascii_alphanumeric());
    if !valid {
        return Err(PhotonError::Addressing(format!(
            "extension must look like '.zarr', got '{}'",
            extension
        )));
    }
    Ok(())
}

/// Bytes kept verbatim in a path segment: `[A-Za-z0-9_.-]`.
const SEGMENT_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'_').remove(b'-').remove(b'.');

/// Used for segments made only of dots, which must not read as `.` or `..`.
const DOT_SEGMENT_SET: &AsciiSet = &SEGMENT_SET.add(b'.');

/// Percent-escapes every byte outside `[A-Za-z0-9_.-]`. A segment made only of
/// dots is escaped in full.
pub(crate) fn escape_segment(raw: &str) -> String {
    let set = if raw.bytes().all(|b| b == b'.') {
        DOT_SEGMENT_SET
    } else {
        SEGMENT_SET
    };
    utf8_percent_encode(raw, set).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addressing::KeyValue;

    fn pk(pairs: &[(&str, KeyValue)]) -> PrimaryKey {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_layout_is_human_auditable() {
        let key = pk(&[("recording_id", KeyValue::Int(1))]);
        let (path, token) =
            build_path("calcium_imaging", "Recording", "movie", &key, ".zarr", None).unwrap();
        assert_eq!(path, "calcium_imaging/Recording/recording_id=1/movie.zarr");
        assert_eq!(token.len(), 64);
    }

    #[test]
    fn test_primary_key_columns_are_canonically_ordered() {
        let a = pk(&[("session", KeyValue::Int(2)), ("animal", KeyValue::from("m7"))]);
        let b = pk(&[("animal", KeyValue::from("m7")), ("session", KeyValue::Int(2))]);
        let (pa, _) = build_path("s", "t", "f", &a, ".zarr", None).unwrap();
        let (pb, _) = build_path("s", "t", "f", &b, ".zarr", None).unwrap();
        assert_eq!(pa, pb);
        assert_eq!(pa, "s/t/animal=m7,session=2/f.zarr");
    }

    #[test]
    fn test_delimiters_in_values_cannot_collide() {
        // Without escaping both of these would render as "a=1,b=2".
        let joined = pk(&[("a", KeyValue::from("1,b=2"))]);
        let split = pk(&[("a", KeyValue::Int(1)), ("b", KeyValue::Int(2))]);
        let (p1, _) = build_path("s", "t", "f", &joined, ".zarr", None).unwrap();
        let (p2, _) = build_path("s", "t", "f", &split, ".zarr", None).unwrap();
        assert_ne!(p1, p2);
        assert_eq!(p1, "s/t/a=1%2Cb%3D2/f.zarr");
    }

    #[test]
    fn test_slashes_and_dot_segments_are_escaped() {
        let key = pk(&[("id", KeyValue::Int(1))]);
        let (path, _) = build_path("..", "a/b", "f", &key, ".zarr", None).unwrap();
        assert_eq!(path, "%2E%2E/a%2Fb/id=1/f.zarr");
    }

    #[test]
    fn test_non_ascii_and_spaces_are_escaped() {
        let key = pk(&[("animal", KeyValue::from("mouse 7/\u{fc}"))]);
        let (path, _) = build_path("lab", "v1.2", "f", &key, ".zarr", None).unwrap();
        assert_eq!(path, "lab/v1.2/animal=mouse%207%2F%C3%BC/f.zarr");
    }

    #[test]
    fn test_key_values_render_by_text_form() {
        let int = pk(&[("id", KeyValue::Int(1))]);
        let text = pk(&[("id", KeyValue::from("1"))]);
        let other = pk(&[("id", KeyValue::from("01"))]);
        let (p_int, _) = build_path("s", "t", "f", &int, ".zarr", None).unwrap();
        let (p_text, _) = build_path("s", "t", "f", &text, ".zarr", None).unwrap();
        let (p_other, _) = build_path("s", "t", "f", &other, ".zarr", None).unwrap();
        assert_eq!(p_int, p_text);
        assert_ne!(p_text, p_other);
    }

    #[test]
    fn test_token_depends_on_store() {
        let key = pk(&[("id", KeyValue::Int(1))]);
        let (_, t1) = build_path("s", "t", "f", &key, ".zarr", None).unwrap();
        let (_, t2) = build_path("s", "t", "f", &key, ".zarr", Some("archive")).unwrap();
        let (_, t3) = build_path("s", "t", "f", &key, ".zarr", Some("archive")).unwrap();
        assert_ne!(t1, t2);
        assert_eq!(t2, t3);
    }

    #[test]
    fn test_missing_context_fails() {
        let key = pk(&[("id", KeyValue::Int(1))]);
        assert!(matches!(
            build_path("", "t", "f", &key, ".zarr", None),
            Err(PhotonError::Addressing(_))
        ));
        assert!(matches!(
            build_path("s", "t", "f", &PrimaryKey::default(), ".zarr", None),
            Err(PhotonError::Addressing(_))
        ));
        assert!(matches!(
            build_path("s", "t", "f", &pk(&[("", KeyValue::Int(1))]), ".zarr", None),
            Err(PhotonError::Addressing(_))
        ));
        assert!(matches!(
            build_path("s", "t", "f", &key, "zarr", None),
            Err(PhotonError::Addressing(_))
        ));
    }
}
