//! Save a [`Cube`] as a CF NetCDF file.

use std::collections::BTreeMap;
use std::path::Path;

use nbhood_common::{AttrValue, Coord, CoordRole, Cube};
use tracing::{debug, info};

use crate::error::{NetCdfError, NetCdfResult};
use crate::native::silence_hdf5_errors;

const CONVENTIONS: &str = "CF-1.5";
const BOUNDS_DIM: &str = "bnds";

/// Provenance attributes written at file level rather than on the variable.
const GLOBAL_ATTRS: &[&str] = &[
    "title",
    "institution",
    "source",
    "history",
    "references",
    "comment",
];

/// Write `cube` to `path`, replacing any existing file.
///
/// Dimension coordinates become coordinate variables named after their
/// dimension; auxiliary and scalar coordinates are listed in the data
/// variable's `coordinates` attribute. Provenance attributes such as
/// `institution` and `source` are written as file attributes.
pub fn save_cube<P: AsRef<Path>>(cube: &Cube, path: P) -> NetCdfResult<()> {
    silence_hdf5_errors();

    let path = path.as_ref();
    info!(file = %path.display(), cube = %cube, "Saving cube");

    let mut file = netcdf::create(path)?;

    let dim_names: Vec<String> = (0..cube.ndim())
        .map(|axis| {
            cube.dim_coord(axis)
                .map(|c| c.var_name.clone())
                .unwrap_or_else(|| format!("dim{}", axis))
        })
        .collect();
    for (name, len) in dim_names.iter().zip(cube.shape()) {
        file.add_dimension(name, *len)?;
    }
    if cube.coord_entries().any(|(c, _)| c.bounds.is_some()) {
        file.add_dimension(BOUNDS_DIM, 2)?;
    }

    let mut aux_names = Vec::new();
    for (coord, role) in cube.coord_entries() {
        match role {
            CoordRole::Dim(axis) => {
                write_coord(&mut file, coord, Some(&dim_names[*axis]))?;
            }
            CoordRole::Aux(axis) => {
                write_coord(&mut file, coord, Some(&dim_names[*axis]))?;
                aux_names.push(coord.var_name.clone());
            }
            CoordRole::Scalar => {
                write_coord(&mut file, coord, None)?;
                aux_names.push(coord.var_name.clone());
            }
        }
    }

    let var_name = cube
        .var_name
        .clone()
        .unwrap_or_else(|| sanitize_var_name(&cube.name));
    let dim_refs: Vec<&str> = dim_names.iter().map(String::as_str).collect();

    let data = cube.data().as_standard_layout();
    let values = data
        .as_slice()
        .ok_or_else(|| NetCdfError::InvalidFormat("cube data is not contiguous".to_string()))?;

    let mut var = file.add_variable::<f32>(&var_name, &dim_refs)?;
    if cube.name != var_name {
        var.put_attribute("long_name", cube.name.as_str())?;
    }
    if !cube.units.symbol().is_empty() {
        var.put_attribute("units", cube.units.symbol())?;
    }
    if !aux_names.is_empty() {
        var.put_attribute("coordinates", aux_names.join(" ").as_str())?;
    }
    let (globals, locals): (BTreeMap<_, _>, BTreeMap<_, _>) = cube
        .attributes
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .partition(|(k, _)| GLOBAL_ATTRS.contains(&k.as_str()));
    put_attributes(&mut var, &locals)?;
    var.put_values(values, ..)?;
    drop(var);

    file.add_attribute("Conventions", CONVENTIONS)?;
    for (key, value) in &globals {
        match value {
            AttrValue::Text(s) => file.add_attribute(key, s.as_str())?,
            AttrValue::Number(n) => file.add_attribute(key, *n)?,
        };
    }

    debug!(variable = %var_name, "Cube written");
    Ok(())
}

fn write_coord(
    file: &mut netcdf::FileMut,
    coord: &Coord,
    dim: Option<&str>,
) -> NetCdfResult<()> {
    let dims: Vec<&str> = dim.into_iter().collect();

    let bounds_name = coord.bounds.as_ref().map(|_| format!("{}_bnds", coord.var_name));

    {
        let mut var = file.add_variable::<f64>(&coord.var_name, &dims)?;
        var.put_attribute("units", coord.units.symbol())?;
        if let Some(sn) = &coord.standard_name {
            var.put_attribute("standard_name", sn.as_str())?;
        }
        if let Some(ln) = &coord.long_name {
            var.put_attribute("long_name", ln.as_str())?;
        }
        if let Some(bn) = &bounds_name {
            var.put_attribute("bounds", bn.as_str())?;
        }
        put_attributes(&mut var, &coord.attributes)?;
        var.put_values(&coord.points, ..)?;
    }

    if let (Some(bn), Some(bounds)) = (&bounds_name, &coord.bounds) {
        let mut bounds_dims = dims.clone();
        bounds_dims.push(BOUNDS_DIM);
        let flat: Vec<f64> = bounds.iter().flat_map(|b| b.iter().copied()).collect();
        let mut var = file.add_variable::<f64>(bn, &bounds_dims)?;
        var.put_values(&flat, ..)?;
    }

    Ok(())
}

fn put_attributes(
    var: &mut netcdf::VariableMut,
    attributes: &BTreeMap<String, AttrValue>,
) -> NetCdfResult<()> {
    for (key, value) in attributes {
        match value {
            AttrValue::Text(s) => var.put_attribute(key, s.as_str())?,
            AttrValue::Number(n) => var.put_attribute(key, *n)?,
        };
    }
    Ok(())
}

/// NetCDF variable names may not contain spaces or slashes.
fn sanitize_var_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "data".to_string()
    } else {
        cleaned
    }
}
