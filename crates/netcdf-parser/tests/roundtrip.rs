//! Save/load tests against real NetCDF files in a temporary directory.

use std::path::Path;

use nbhood_common::{AttrValue, Coord, CoordRole};
use netcdf_parser::{load_cube, save_cube, NetCdfError};
use test_utils::{pattern_cube, spacing, time_series_cube, REFERENCE_TIME_HOURS};

// ============================================================================
// Round trips
// ============================================================================

#[test]
fn test_roundtrip_2d_cube() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pattern.nc");

    let cube = pattern_cube(6, 4, spacing::UKV_2KM)
        .with_attribute("source", "Met Office Unified Model");
    save_cube(&cube, &path).unwrap();
    let loaded = load_cube(&path, None).unwrap();

    assert_eq!(loaded.shape(), &[4, 6]);
    assert_eq!(loaded.data(), cube.data());
    assert_eq!(loaded.name, cube.name);
    assert_eq!(loaded.units.symbol(), "1");
    assert_eq!(
        loaded.attributes.get("source"),
        Some(&AttrValue::Text("Met Office Unified Model".to_string()))
    );

    let x = loaded.coord("projection_x_coordinate").unwrap();
    assert_eq!(x.points, cube.coord("projection_x_coordinate").unwrap().points);
    assert_eq!(x.units.symbol(), "m");
    assert_eq!(loaded.coord_dims("projection_y_coordinate").unwrap(), vec![0]);
    assert_eq!(loaded.coord_dims("projection_x_coordinate").unwrap(), vec![1]);
}

#[test]
fn test_roundtrip_time_series_coords() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("series.nc");

    let cube = time_series_cube(&[2.0, 3.0, 4.0], 5, 5, spacing::UKV_2KM);
    save_cube(&cube, &path).unwrap();
    let loaded = load_cube(&path, None).unwrap();

    assert_eq!(loaded.shape(), &[3, 5, 5]);
    assert_eq!(loaded.coord_role("time").unwrap(), CoordRole::Dim(0));
    assert_eq!(loaded.coord_role("forecast_period").unwrap(), CoordRole::Aux(0));
    assert_eq!(
        loaded.coord_role("forecast_reference_time").unwrap(),
        CoordRole::Scalar
    );

    let frt = loaded.coord("forecast_reference_time").unwrap();
    assert_eq!(frt.points, vec![REFERENCE_TIME_HOURS]);
    assert!(frt.units.is_time_reference());
    assert_eq!(
        loaded.coord("forecast_period").unwrap().points,
        vec![2.0, 3.0, 4.0]
    );
}

#[test]
fn test_roundtrip_bounds() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bounds.nc");

    let fp = Coord::scalar("forecast_period", 3.0, "hours")
        .with_bounds(vec![[2.0, 3.0]])
        .unwrap();
    let cube = pattern_cube(3, 3, spacing::UKV_2KM)
        .with_aux_coord(fp, None)
        .unwrap();
    save_cube(&cube, &path).unwrap();

    let loaded = load_cube(&path, None).unwrap();
    let fp = loaded.coord("forecast_period").unwrap();
    assert_eq!(fp.bounds, Some(vec![[2.0, 3.0]]));
}

#[test]
fn test_nan_written_and_read_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nan.nc");

    let mut cube = pattern_cube(3, 3, spacing::UKV_2KM);
    let mut data = cube.data().clone();
    data[[1, 1]] = f32::NAN;
    cube.set_data(data).unwrap();

    save_cube(&cube, &path).unwrap();
    let loaded = load_cube(&path, None).unwrap();
    assert!(loaded.has_nan());
}

#[test]
fn test_provenance_written_as_file_attributes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("provenance.nc");

    let cube = pattern_cube(3, 3, spacing::UKV_2KM)
        .with_attribute("institution", "Met Office")
        .with_attribute("mosg__grid_version", "1.3.0");
    save_cube(&cube, &path).unwrap();

    {
        let file = netcdf::open(&path).unwrap();
        assert!(file.attribute("institution").is_some());
        let var = file
            .variable("probability_of_precipitation_rate_above_threshold")
            .unwrap();
        assert!(var.attribute("institution").is_none());
        assert!(var.attribute("mosg__grid_version").is_some());
    }

    let loaded = load_cube(&path, None).unwrap();
    assert_eq!(
        loaded.attributes.get("institution"),
        Some(&AttrValue::Text("Met Office".to_string()))
    );
    assert!(!loaded.attributes.contains_key("Conventions"));
}

// ============================================================================
// Packed and missing data
// ============================================================================

/// A 2x2 int16 field packed with scale 0.01 and offset 1.0; -1 is missing.
fn write_packed_field(path: &Path) {
    let mut file = netcdf::create(path).unwrap();
    file.add_dimension("y", 2).unwrap();
    file.add_dimension("x", 2).unwrap();
    file.add_attribute("source", "radar composite").unwrap();

    let mut var = file.add_variable::<i16>("rainfall", &["y", "x"]).unwrap();
    var.put_attribute("units", "mm h-1").unwrap();
    var.put_attribute("scale_factor", 0.01f64).unwrap();
    var.put_attribute("add_offset", 1.0f64).unwrap();
    var.put_attribute("missing_value", -1i16).unwrap();
    var.put_values(&[100i16, 50, -1, 0], ..).unwrap();
}

#[test]
fn test_packed_values_are_unpacked() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("packed.nc");
    write_packed_field(&path);

    let cube = load_cube(&path, None).unwrap();
    let data = cube.data();
    assert!((data[[0, 0]] - 2.0).abs() < 1e-6);
    assert!((data[[0, 1]] - 1.5).abs() < 1e-6);
    assert!(data[[1, 0]].is_nan());
    assert!((data[[1, 1]] - 1.0).abs() < 1e-6);

    for attr in ["scale_factor", "add_offset", "missing_value"] {
        assert!(!cube.attributes.contains_key(attr), "{} was carried", attr);
    }
    assert_eq!(
        cube.attributes.get("source"),
        Some(&AttrValue::Text("radar composite".to_string()))
    );
}

#[test]
fn test_unpacked_data_is_saved_without_packing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("packed.nc");
    let output = dir.path().join("unpacked.nc");
    write_packed_field(&input);

    let cube = load_cube(&input, None).unwrap();
    save_cube(&cube, &output).unwrap();

    {
        let file = netcdf::open(&output).unwrap();
        let var = file.variable("rainfall").unwrap();
        assert!(var.attribute("scale_factor").is_none());
        assert!(var.attribute("add_offset").is_none());
    }

    let reloaded = load_cube(&output, None).unwrap();
    assert!((reloaded.data()[[0, 0]] - 2.0).abs() < 1e-6);
}

#[test]
fn test_fill_value_becomes_nan() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("filled.nc");
    {
        let mut file = netcdf::create(&path).unwrap();
        file.add_dimension("y", 2).unwrap();
        file.add_dimension("x", 2).unwrap();
        let mut var = file.add_variable::<f32>("probability", &["y", "x"]).unwrap();
        var.put_attribute("_FillValue", -999.0f32).unwrap();
        var.put_values(&[0.25f32, -999.0, 0.5, 0.75], ..).unwrap();
    }

    let cube = load_cube(&path, None).unwrap();
    assert!(cube.has_nan());
    assert!(cube.data()[[0, 1]].is_nan());
    assert_eq!(cube.data()[[1, 1]], 0.75);
    assert!(!cube.attributes.contains_key("_FillValue"));
}

// ============================================================================
// Variable selection and errors
// ============================================================================

#[test]
fn test_load_named_variable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("named.nc");

    let mut cube = pattern_cube(4, 4, spacing::UKV_2KM);
    cube.var_name = Some("precip_prob".to_string());
    save_cube(&cube, &path).unwrap();

    let loaded = load_cube(&path, Some("precip_prob")).unwrap();
    assert_eq!(loaded.var_name.as_deref(), Some("precip_prob"));
    assert_eq!(loaded.name, cube.name);

    let err = load_cube(&path, Some("not_there")).unwrap_err();
    assert!(matches!(err, NetCdfError::MissingData(_)));
}

#[test]
fn test_load_missing_file() {
    let err = load_cube("/nonexistent/input.nc", None).unwrap_err();
    match err {
        NetCdfError::IoError(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
        other => panic!("expected IoError, got {:?}", other),
    }
}

#[test]
fn test_load_not_netcdf() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garbage.nc");
    std::fs::write(&path, b"not a netcdf file").unwrap();

    let err = load_cube(&path, None).unwrap_err();
    assert!(matches!(err, NetCdfError::InvalidFormat(_)));
}
