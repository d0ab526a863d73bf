//! Thin helpers over the native netcdf library.
//!
//! The `netcdf` crate wraps libnetcdf/HDF5. These helpers keep attribute
//! access quiet and typed so the reader and writer can stay declarative.

use std::collections::BTreeMap;
use std::sync::Once;

use nbhood_common::AttrValue;
use netcdf::AttributeValue;

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints verbose error messages to stderr even when errors
/// are handled gracefully by the Rust code (e.g., when checking for optional
/// attributes that don't exist). This creates confusing log spam like:
///
/// ```text
/// HDF5-DIAG: Error detected in HDF5 (1.10.8) thread 3:
///   #003: ../../../src/H5Adense.c line 397 in H5A__dense_open(): can't locate attribute in name index
/// ```
///
/// Safe to call multiple times; only the first call has an effect.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and we're passing null pointers
        // to disable error output, which is a documented valid use.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Check if a variable has an attribute with the given name.
/// This avoids HDF5 error spam when checking for optional attributes.
pub(crate) fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

/// Helper to get a numeric attribute as f64.
pub(crate) fn get_f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    f64::try_from(attr_value).ok()
}

/// Helper to get a text attribute.
pub(crate) fn get_str_attr(var: &netcdf::Variable, name: &str) -> Option<String> {
    if !has_attr(var, name) {
        return None;
    }
    match var.attribute_value(name)?.ok()? {
        AttributeValue::Str(s) => Some(s),
        AttributeValue::Strs(v) => Some(v.join(" ")),
        _ => None,
    }
}

/// Every attribute not listed in `skip`, as cube attributes.
///
/// Works for both variable and file attributes. Attribute types other than
/// text and numbers are dropped.
pub(crate) fn collect_attributes<'a>(
    attributes: impl Iterator<Item = netcdf::Attribute<'a>>,
    skip: &[&str],
) -> BTreeMap<String, AttrValue> {
    let mut out = BTreeMap::new();
    for attr in attributes {
        let name = attr.name().to_string();
        if skip.contains(&name.as_str()) {
            continue;
        }
        let Ok(value) = attr.value() else { continue };
        let converted = match value {
            AttributeValue::Str(s) => Some(AttrValue::Text(s)),
            AttributeValue::Strs(v) => Some(AttrValue::Text(v.join(" "))),
            other => f64::try_from(other).ok().map(AttrValue::Number),
        };
        if let Some(v) = converted {
            out.insert(name, v);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_is_idempotent() {
        silence_hdf5_errors();
        silence_hdf5_errors();
    }
}
