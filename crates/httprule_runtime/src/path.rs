use httprule::{PathParam, Route};
use percent_encoding::percent_decode_str;

use crate::{
    bind::{self, Bindable, FieldValue, Scalar},
    error::HandlerError,
};

/// Bind the path parameters of `route` from the request path.
///
/// `path` is split on `/` as received, so element 0 is the empty string in
/// front of the leading slash. When the route has a custom verb, the path
/// must end with it and it is removed first. Captured elements are
/// percent-decoded and multi-element captures are joined back with `/`.
pub fn apply_path_params(
    target: &mut dyn Bindable,
    route: &Route,
    path: &str,
) -> Result<(), HandlerError> {
    let mismatch = || HandlerError::PathMismatch {
        path: path.to_string(),
        pattern: route.pattern.clone(),
    };

    let trimmed = match &route.verb {
        Some(verb) => path
            .strip_suffix(verb.as_str())
            .and_then(|rest| rest.strip_suffix(':'))
            .ok_or_else(mismatch)?,
        None => path,
    };
    let elements: Vec<&str> = trimmed.split('/').collect();

    for param in &route.path_params {
        for prefix in &param.instantiate {
            bind::ensure(target, prefix.segments()).map_err(|source| HandlerError::Bind {
                field_path: prefix.key(),
                source,
            })?;
        }

        let captured = capture(&elements, param).ok_or_else(mismatch)?;

        let value = captured
            .iter()
            .map(|element| percent_decode_str(element).decode_utf8_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let value = FieldValue::Single(Scalar::String(value));
        bind::assign(target, &param.field_path, value).map_err(|source| HandlerError::Bind {
            field_path: param.field_path.key(),
            source,
        })?;
    }

    Ok(())
}

fn capture<'e, 'p>(elements: &'e [&'p str], param: &PathParam) -> Option<&'e [&'p str]> {
    let end = match param.width {
        Some(width) => param.index + width,
        None => elements.len(),
    };

    match elements.get(param.index..end) {
        Some(captured) if !captured.is_empty() => Some(captured),
        _ => None,
    }
}
