use std::collections::HashSet;

use httprule_pattern::{Segment, Template};

use crate::model::{FieldPath, PathParam};

/// Compute the captured fields of `template`, in template order.
///
/// Each literal or wildcard advances the path position by one element and
/// each variable by its width. Nothing after a deep wildcard can be captured,
/// so extraction stops there.
pub fn extract_path_params(template: &Template<'_>) -> Vec<PathParam> {
    let mut params = vec![];
    let mut seen = HashSet::new();
    let mut index = 1;

    for seg in template.segments() {
        match seg {
            Segment::Literal(_) | Segment::Wildcard => index += 1,
            Segment::DeepWildcard => break,
            Segment::Variable(var) => {
                let field_path = FieldPath::from(var.field_path.as_slice());
                let instantiate = field_path
                    .prefixes()
                    .filter(|prefix| seen.insert(prefix.clone()))
                    .collect();
                let width = var.width();

                params.push(PathParam {
                    index,
                    field_path,
                    width,
                    instantiate,
                });

                match width {
                    Some(width) => index += width,
                    None => break,
                }
            }
        }
    }

    params
}

/// Field paths already bound from the path, which the query resolver must
/// not bind again.
pub fn claimed_paths(params: &[PathParam]) -> HashSet<FieldPath> {
    params.iter().map(|p| p.field_path.clone()).collect()
}
