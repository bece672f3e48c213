//! Checks of sample datasets against the schema registry.
//!
//! Every check here stops at the first problem it finds and returns it; nothing
//! after a failed check is evaluated.
use crate::{
    boundaries::BoundaryMap,
    dataset::Dataset,
    error::ValidationError,
    registry::{DatasetKind, DatasetSchemaExpectation},
};

/// Check that `ds` has every dimension in `expected` at its exact size, in
/// registry order, then that every required variable exists.
pub fn validate_dataset(
    kind: DatasetKind,
    ds: &Dataset,
    expected: &DatasetSchemaExpectation,
) -> Result<(), ValidationError> {
    for (dim, size) in expected.dims() {
        let actual = ds.dimension(dim);
        if actual != Some(size) {
            log::debug!("{kind} dimension {dim} = {actual:?}, expected {size}");
            return Err(ValidationError::DimensionMismatch {
                kind: kind.to_string(),
                dim: dim.to_string(),
                expected: size,
                actual,
            });
        }
    }

    for var in expected.required_vars() {
        if !ds.has_variable(var) {
            return Err(ValidationError::MissingVariable {
                kind: kind.to_string(),
                var: var.to_string(),
            });
        }
    }

    Ok(())
}

/// Check that each expected boundary name was read as a polygon. The polygon
/// contents are not inspected.
pub fn validate_boundaries<'a, I>(names: I, polygons: &BoundaryMap) -> Result<(), ValidationError>
where
    I: IntoIterator<Item = &'a str>,
{
    for name in names {
        if !polygons.contains_key(name) {
            return Err(ValidationError::MissingBoundary(name.to_string()));
        }
    }
    Ok(())
}
