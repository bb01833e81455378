//! Reading query parameters into request messages.
use base64::{engine::general_purpose::STANDARD, Engine};
use httprule::{QueryParam, ScalarKind};
use url::form_urlencoded;

use crate::{
    bind::{self, Bindable, FieldValue, Scalar},
    error::HandlerError,
};

/// A query value that does not parse as its field's type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} value {value:?} for query parameter {key}: {reason}")]
pub struct QueryError {
    pub key: String,
    pub value: String,
    pub kind: ScalarKind,
    pub reason: String,
}

/// Parse `raw` as a value of `kind`.
///
/// Booleans accept `1`, `t`, `T`, `TRUE`, `true`, `True` and their false
/// counterparts. Bytes are standard base64 with padding.
pub fn parse_scalar(kind: ScalarKind, raw: &str) -> Result<Scalar, String> {
    fn num<T: std::str::FromStr>(raw: &str) -> Result<T, String>
    where
        T::Err: std::fmt::Display,
    {
        raw.parse::<T>().map_err(|err| err.to_string())
    }

    let scalar = match kind {
        ScalarKind::Double => Scalar::Double(num(raw)?),
        ScalarKind::Float => Scalar::Float(num(raw)?),
        ScalarKind::Int32 | ScalarKind::Sint32 | ScalarKind::Sfixed32 => Scalar::Int32(num(raw)?),
        ScalarKind::Int64 | ScalarKind::Sint64 | ScalarKind::Sfixed64 => Scalar::Int64(num(raw)?),
        ScalarKind::Uint32 | ScalarKind::Fixed32 => Scalar::Uint32(num(raw)?),
        ScalarKind::Uint64 | ScalarKind::Fixed64 => Scalar::Uint64(num(raw)?),
        ScalarKind::Bool => Scalar::Bool(parse_bool(raw)?),
        ScalarKind::String => Scalar::String(raw.to_string()),
        ScalarKind::Bytes => Scalar::Bytes(STANDARD.decode(raw).map_err(|err| err.to_string())?),
    };

    Ok(scalar)
}

fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err("invalid boolean".to_string()),
    }
}

/// Bind `params` from the raw (still encoded) query string.
///
/// Singular parameters use the first value and are left unset when it is
/// empty or missing. Repeated parameters collect every value, in order, and
/// are left unset when there is none.
pub fn apply_query_params(
    target: &mut dyn Bindable,
    params: &[QueryParam],
    query: Option<&str>,
) -> Result<(), HandlerError> {
    let pairs: Vec<(String, String)> = form_urlencoded::parse(query.unwrap_or_default().as_bytes())
        .into_owned()
        .collect();

    for param in params {
        let key = param.field_path.key();
        let mut values = pairs
            .iter()
            .filter(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str());

        let value = if param.repeated {
            let list = values
                .map(|raw| parse(param, &key, raw))
                .collect::<Result<Vec<_>, _>>()?;

            if list.is_empty() {
                continue;
            }
            FieldValue::List(list)
        } else {
            match values.next() {
                Some(raw) if !raw.is_empty() => FieldValue::Single(parse(param, &key, raw)?),
                _ => continue,
            }
        };

        bind::assign(target, &param.field_path, value).map_err(|source| HandlerError::Bind {
            field_path: key.clone(),
            source,
        })?;
    }

    Ok(())
}

fn parse(param: &QueryParam, key: &str, raw: &str) -> Result<Scalar, QueryError> {
    parse_scalar(param.kind, raw).map_err(|reason| QueryError {
        key: key.to_string(),
        value: raw.to_string(),
        kind: param.kind,
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bind::tests::{Leaf, Root};
    use httprule::FieldPath;

    fn param(path: &str, kind: ScalarKind, repeated: bool) -> QueryParam {
        QueryParam {
            field_path: FieldPath::from(path),
            kind,
            repeated,
        }
    }

    fn params() -> Vec<QueryParam> {
        vec![
            param("id", ScalarKind::String, false),
            param("tags", ScalarKind::String, true),
            param("sub.subfield", ScalarKind::String, false),
            param("sub.count", ScalarKind::Int32, false),
        ]
    }

    #[test]
    fn test_parse_scalars() {
        assert_eq!(parse_scalar(ScalarKind::Double, "1.5"), Ok(Scalar::Double(1.5)));
        assert_eq!(parse_scalar(ScalarKind::Float, "-2"), Ok(Scalar::Float(-2.0)));
        assert_eq!(parse_scalar(ScalarKind::Sint32, "-7"), Ok(Scalar::Int32(-7)));
        assert_eq!(parse_scalar(ScalarKind::Sfixed64, "9"), Ok(Scalar::Int64(9)));
        assert_eq!(parse_scalar(ScalarKind::Fixed32, "4"), Ok(Scalar::Uint32(4)));
        assert_eq!(
            parse_scalar(ScalarKind::Uint64, "18446744073709551615"),
            Ok(Scalar::Uint64(u64::MAX))
        );
        assert_eq!(parse_scalar(ScalarKind::Bool, "t"), Ok(Scalar::Bool(true)));
        assert_eq!(parse_scalar(ScalarKind::Bool, "False"), Ok(Scalar::Bool(false)));
        assert_eq!(parse_scalar(ScalarKind::Bytes, "aGk="), Ok(Scalar::Bytes(b"hi".to_vec())));

        assert!(parse_scalar(ScalarKind::Int32, "2147483648").is_err());
        assert!(parse_scalar(ScalarKind::Uint32, "-1").is_err());
        assert!(parse_scalar(ScalarKind::Bool, "yes").is_err());
        assert!(parse_scalar(ScalarKind::Bytes, "not base64!").is_err());
    }

    #[test]
    fn test_apply_query_params() {
        let mut root = Root::default();

        apply_query_params(
            &mut root,
            &params(),
            Some("id=abc&tags=a&tags=good%20bye&sub.subfield=x+y&sub.count=3&other=1"),
        )
        .unwrap();

        assert_eq!(
            root,
            Root {
                id: "abc".to_string(),
                tags: vec!["a".to_string(), "good bye".to_string()],
                sub: Some(Leaf {
                    subfield: "x y".to_string(),
                    count: 3,
                }),
            }
        );
    }

    #[test]
    fn test_absent_and_empty_values_are_skipped() {
        let mut root = Root::default();

        apply_query_params(&mut root, &params(), Some("id=&tags=")).unwrap();
        assert_eq!(root.id, "");
        assert_eq!(root.tags, vec![String::new()]);
        assert_eq!(root.sub, None);

        let mut root = Root::default();
        apply_query_params(&mut root, &params(), None).unwrap();
        assert_eq!(root, Root::default());
    }

    #[test]
    fn test_first_singular_value_wins() {
        let mut root = Root::default();

        apply_query_params(&mut root, &params(), Some("id=first&id=second")).unwrap();
        assert_eq!(root.id, "first");
    }

    #[test]
    fn test_invalid_value() {
        let mut root = Root::default();

        let err = apply_query_params(&mut root, &params(), Some("sub.count=many")).unwrap_err();
        match err {
            HandlerError::Query(err) => {
                assert_eq!(err.key, "sub.count");
                assert_eq!(err.value, "many");
                assert_eq!(err.kind, ScalarKind::Int32);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
