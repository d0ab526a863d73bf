//! Load a CF NetCDF file into a [`Cube`].

use std::collections::HashSet;
use std::path::Path;

use nbhood_common::{Coord, Cube};
use ndarray::{ArrayD, IxDyn};
use tracing::{debug, info, warn};

use crate::error::{NetCdfError, NetCdfResult};
use crate::native::{collect_attributes, get_f64_attr, get_str_attr, silence_hdf5_errors};

/// Attributes interpreted by the loader rather than carried on the cube.
const RESERVED_ATTRS: &[&str] = &[
    "standard_name",
    "long_name",
    "units",
    "coordinates",
    "bounds",
    "grid_mapping",
    "_FillValue",
    "missing_value",
    "scale_factor",
    "add_offset",
    "valid_range",
    "valid_min",
    "valid_max",
];

/// File attributes that describe the data model rather than the data.
const RESERVED_GLOBAL_ATTRS: &[&str] = &["Conventions"];

/// Attributes whose values name other variables.
const REFERENCE_ATTRS: &[&str] = &["coordinates", "bounds", "grid_mapping", "ancillary_variables"];

/// Load one data variable from `path` as a cube.
///
/// `variable` selects the data variable by name. Without it the loader picks
/// the variable with the most dimensions that is neither a coordinate nor
/// referenced by another variable's metadata.
pub fn load_cube<P: AsRef<Path>>(path: P, variable: Option<&str>) -> NetCdfResult<Cube> {
    silence_hdf5_errors();

    let path = path.as_ref();
    if !path.exists() {
        return Err(NetCdfError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        )));
    }

    let file = netcdf::open(path)
        .map_err(|e| NetCdfError::InvalidFormat(format!("Failed to open NetCDF: {}", e)))?;

    let var = match variable {
        Some(name) => file
            .variable(name)
            .ok_or_else(|| NetCdfError::MissingData(format!("{} variable", name)))?,
        None => select_data_variable(&file)?,
    };
    let var_name = var.name();
    info!(file = %path.display(), variable = %var_name, "Loading cube");

    let dims = var.dimensions();
    let dim_names: Vec<String> = dims.iter().map(|d| d.name()).collect();
    let shape: Vec<usize> = dims.iter().map(|d| d.len()).collect();

    // Read as f64 so packed integer values survive until they are unpacked
    let raw: Vec<f64> = var
        .get_values(..)
        .map_err(|e| NetCdfError::InvalidFormat(format!("Failed to read {}: {}", var_name, e)))?;

    let scale_factor = get_f64_attr(&var, "scale_factor").unwrap_or(1.0);
    let add_offset = get_f64_attr(&var, "add_offset").unwrap_or(0.0);
    let fill = get_f64_attr(&var, "_FillValue").or_else(|| get_f64_attr(&var, "missing_value"));
    debug!(scale_factor, add_offset, fill = ?fill, "Unpacking data");

    // Fill values are compared before unpacking
    let values: Vec<f32> = raw
        .into_iter()
        .map(|v| {
            if fill == Some(v) {
                f32::NAN
            } else {
                (v * scale_factor + add_offset) as f32
            }
        })
        .collect();

    let data = ArrayD::from_shape_vec(IxDyn(&shape), values)
        .map_err(|e| NetCdfError::InvalidFormat(format!("{} data: {}", var_name, e)))?;

    let name = get_str_attr(&var, "standard_name")
        .or_else(|| get_str_attr(&var, "long_name"))
        .unwrap_or_else(|| var_name.clone());
    let units = get_str_attr(&var, "units").unwrap_or_else(|| "1".to_string());

    let mut cube = Cube::new(data).with_name(&name).with_units(units.as_str());
    cube.var_name = Some(var_name.clone());
    // Variable attributes win over file attributes of the same name
    let mut attributes = collect_attributes(file.attributes(), RESERVED_GLOBAL_ATTRS);
    attributes.extend(collect_attributes(var.attributes(), RESERVED_ATTRS));
    cube.attributes = attributes;

    for (axis, dim_name) in dim_names.iter().enumerate() {
        let Some(coord_var) = file.variable(dim_name) else {
            debug!(dimension = %dim_name, "No coordinate variable for dimension");
            continue;
        };
        let coord_dims: Vec<String> = coord_var.dimensions().iter().map(|d| d.name()).collect();
        if coord_dims != [dim_name.clone()] {
            continue;
        }
        cube.add_dim_coord(read_coord(&file, &coord_var)?, axis)?;
    }

    for aux_name in referenced_names(&var, "coordinates") {
        let Some(coord_var) = file.variable(&aux_name) else {
            warn!(coordinate = %aux_name, "Listed coordinate variable is missing");
            continue;
        };
        let coord_dims: Vec<String> = coord_var.dimensions().iter().map(|d| d.name()).collect();
        let axis = match coord_dims.as_slice() {
            [] => None,
            [only] => match dim_names.iter().position(|d| d == only) {
                Some(axis) => Some(axis),
                None => {
                    warn!(coordinate = %aux_name, "Coordinate spans a dimension the data lacks");
                    continue;
                }
            },
            _ => {
                warn!(coordinate = %aux_name, "Skipping multi-dimensional auxiliary coordinate");
                continue;
            }
        };
        cube.add_aux_coord(read_coord(&file, &coord_var)?, axis)?;
    }

    debug!(cube = %cube, "Loaded cube");
    Ok(cube)
}

fn referenced_names(var: &netcdf::Variable, attr: &str) -> Vec<String> {
    get_str_attr(var, attr)
        .map(|s| s.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

fn select_data_variable(file: &netcdf::File) -> NetCdfResult<netcdf::Variable<'_>> {
    let dimension_names: HashSet<String> = file.dimensions().map(|d| d.name()).collect();

    let mut referenced = HashSet::new();
    for var in file.variables() {
        for attr in REFERENCE_ATTRS {
            referenced.extend(referenced_names(&var, attr));
        }
    }

    file.variables()
        .filter(|v| !dimension_names.contains(&v.name()) && !referenced.contains(&v.name()))
        .filter(|v| !v.dimensions().is_empty())
        .fold(None, |best: Option<netcdf::Variable<'_>>, v| match best {
            Some(b) if b.dimensions().len() >= v.dimensions().len() => Some(b),
            _ => Some(v),
        })
        .ok_or_else(|| NetCdfError::MissingData("data variable".to_string()))
}

fn read_coord(file: &netcdf::File, var: &netcdf::Variable) -> NetCdfResult<Coord> {
    let var_name = var.name();
    let points: Vec<f64> = var
        .get_values(..)
        .map_err(|e| NetCdfError::InvalidFormat(format!("Failed to read {}: {}", var_name, e)))?;

    let units = get_str_attr(var, "units").unwrap_or_else(|| "1".to_string());
    let mut coord = Coord::new(&var_name, points, units.as_str());
    coord.standard_name = get_str_attr(var, "standard_name");
    coord.long_name = get_str_attr(var, "long_name");
    coord.attributes = collect_attributes(var.attributes(), RESERVED_ATTRS);

    if let Some(bounds_name) = get_str_attr(var, "bounds") {
        if let Some(bounds_var) = file.variable(&bounds_name) {
            let flat: Vec<f64> = bounds_var.get_values(..).map_err(|e| {
                NetCdfError::InvalidFormat(format!("Failed to read {}: {}", bounds_name, e))
            })?;
            let pairs: Vec<[f64; 2]> = flat.chunks_exact(2).map(|c| [c[0], c[1]]).collect();
            coord = coord.with_bounds(pairs)?;
        }
    }

    Ok(coord)
}
