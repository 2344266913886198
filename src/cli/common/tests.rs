// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests against the arguments shared between subcommands, and argument files.

use std::{fs::File, io::Write, path::PathBuf};

use indoc::indoc;
use ndarray::array;
use tempfile::TempDir;

use super::*;
use crate::cli::{shape::ShapeArgs, AntennaJonesError};

#[test]
fn term_args_defaults() {
    let config = JonesTermArgs::default().parse().unwrap();
    assert_eq!(config, JonesChainConfig::default());
    assert_eq!(config.present_terms().count(), 0);
}

#[test]
fn term_args_parse() {
    let config = JonesTermArgs {
        complex_phase: true,
        ddes: true,
        precision: Some("Single".to_string()),
        ddes_schema: Some("(row,source,chan,corr)".to_string()),
        dimensions: Some(vec!["source=3".to_string(), " chan = 7 ".to_string()]),
        ..Default::default()
    }
    .parse()
    .unwrap();
    assert!(!config.have_bsqrt);
    assert!(config.have_complex_phase);
    assert!(!config.have_feed_rotation);
    assert!(config.have_ddes);
    assert_eq!(config.precision, Precision::Single);
    assert_eq!(config.ddes_schema, "(row,source,chan,corr)");
    assert_eq!(config.bsqrt_schema, DEFAULT_BSQRT_SCHEMA);
    assert_eq!(config.dimensions.len(), 2);
    assert_eq!(config.dimensions["source"], 3);
    assert_eq!(config.dimensions["chan"], 7);
}

#[test]
fn term_args_errors() {
    let result = JonesTermArgs {
        precision: Some("quad".to_string()),
        ..Default::default()
    }
    .parse();
    assert!(matches!(result, Err(JonesTermArgsError::InvalidPrecision(p)) if p == "quad"));

    for bad in ["source", "=3", "source=three", "source=-1"] {
        let result = JonesTermArgs {
            dimensions: Some(vec![bad.to_string()]),
            ..Default::default()
        }
        .parse();
        assert!(
            matches!(result, Err(JonesTermArgsError::InvalidDimension(_))),
            "'{bad}' should not parse"
        );
    }
}

#[test]
fn size_args_make_term_shapes() {
    let config = JonesChainConfig::with_terms(&JonesTermKind::ORDER);
    let setup = SizeArgs {
        num_sources: Some(2),
        num_rows: Some(5),
        num_times: Some(3),
        num_chans: Some(4),
    }
    .parse(config)
    .unwrap();

    assert_eq!(
        setup.term_shapes,
        vec![
            (JonesTermKind::BrightnessSqrt, vec![2, 3, 4, 4]),
            (JonesTermKind::ComplexPhase, vec![2, 5, 4]),
            (JonesTermKind::FeedRotation, vec![5, 4]),
            (JonesTermKind::Ddes, vec![2, 5, 4, 4]),
        ]
    );
    assert_eq!(setup.row_to_time_index, array![0, 0, 1, 1, 2]);

    let shapes = setup.shapes();
    assert_eq!(shapes.bsqrt, &[2, 3, 4, 4]);
    assert_eq!(shapes.feed_rotation, &[5, 4]);
    assert_eq!(shapes.row_to_time_index, &[5]);
}

#[test]
fn size_args_defaults_and_declarations() {
    let mut config = JonesChainConfig::with_terms(&[JonesTermKind::Ddes]);
    config.ddes_schema = "(chan,source,row,corr)".to_string();
    // Declared sizes win over the sizes arguments.
    config.dimensions.insert("chan".to_string(), 2);
    let setup = SizeArgs {
        num_chans: Some(100),
        ..Default::default()
    }
    .parse(config)
    .unwrap();
    assert_eq!(
        setup.term_shapes,
        vec![(
            JonesTermKind::Ddes,
            vec![2, DEFAULT_NUM_SOURCES, DEFAULT_NUM_ROWS, NUM_CORR]
        )]
    );
    assert_eq!(setup.row_to_time_index.len(), DEFAULT_NUM_ROWS);
    assert_eq!(setup.config.dimensions["time"], DEFAULT_NUM_TIMES);
}

#[test]
fn size_args_unknown_axis() {
    let mut config = JonesChainConfig::with_terms(&[JonesTermKind::FeedRotation]);
    config.feed_rotation_schema = "(row,pol)".to_string();
    let result = SizeArgs::default().parse(config.clone());
    assert!(matches!(
        result,
        Err(SizeArgsError::UnknownAxis { tensor, axis }) if tensor == "feed_rotation" && axis == "pol"
    ));

    // Declaring the axis fixes the problem (even though the chain itself
    // will then complain about the schema).
    config.dimensions.insert("pol".to_string(), 4);
    let setup = SizeArgs::default().parse(config).unwrap();
    assert_eq!(
        setup.term_shapes,
        vec![(JonesTermKind::FeedRotation, vec![DEFAULT_NUM_ROWS, 4])]
    );
}

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut f = File::create(&path).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn toml_arg_file_is_merged() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let arg_file = write_file(
        &tmp_dir,
        "args.toml",
        indoc! {r#"
            [terms]
            bsqrt = true
            feed_rotation = false
            precision = "single"
            bsqrt_schema = "(time,source,chan,corr)"

            [sizes]
            num_sources = 4
            num_rows = 8
        "#},
    );

    let cli_args = ShapeArgs {
        args_file: Some(arg_file),
        term_args: JonesTermArgs {
            ddes: true,
            precision: Some("double".to_string()),
            ..Default::default()
        },
        size_args: SizeArgs {
            num_rows: Some(16),
            ..Default::default()
        },
    };
    let merged = cli_args.merge().unwrap();
    assert!(merged.args_file.is_none());
    // Flags are combined.
    assert!(merged.term_args.bsqrt);
    assert!(merged.term_args.ddes);
    // CLI arguments win.
    assert_eq!(merged.term_args.precision.as_deref(), Some("double"));
    assert_eq!(merged.size_args.num_rows, Some(16));
    // File arguments fill in the gaps.
    assert_eq!(
        merged.term_args.bsqrt_schema.as_deref(),
        Some("(time,source,chan,corr)")
    );
    assert_eq!(merged.size_args.num_sources, Some(4));
    assert_eq!(merged.size_args.num_chans, None);
}

#[test]
fn json_arg_file_is_merged() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let arg_file = write_file(
        &tmp_dir,
        "args.JSON",
        indoc! {r#"
            {
                "terms": {
                    "complex_phase": true,
                    "dimensions": ["source=2"]
                },
                "sizes": {
                    "num_chans": 3
                }
            }
        "#},
    );

    let merged = ShapeArgs {
        args_file: Some(arg_file),
        ..Default::default()
    }
    .merge()
    .unwrap();
    assert!(merged.term_args.complex_phase);
    assert!(!merged.term_args.bsqrt);
    assert_eq!(
        merged.term_args.dimensions,
        Some(vec!["source=2".to_string()])
    );
    assert_eq!(merged.size_args.num_chans, Some(3));
}

#[test]
fn bad_arg_files() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");

    let arg_file = write_file(&tmp_dir, "args.yaml", "terms:\n  bsqrt: true\n");
    let result = ShapeArgs {
        args_file: Some(arg_file),
        ..Default::default()
    }
    .merge();
    match result {
        Err(AntennaJonesError::ArgFile(e)) => {
            assert!(e.contains("recognised file extension"), "{e}");
            assert!(e.contains("toml, json"), "{e}");
            assert!(e.starts_with("The shape argument file"), "{e}");
        }
        other => panic!("unexpected result: {other:?}"),
    }

    let arg_file = write_file(&tmp_dir, "args.toml", "[terms]\nbsqrt = 3\n");
    let result = ShapeArgs {
        args_file: Some(arg_file),
        ..Default::default()
    }
    .merge();
    match result {
        Err(AntennaJonesError::ArgFile(e)) => {
            assert!(e.starts_with("Couldn't decode shape arguments from toml file"), "{e}")
        }
        other => panic!("unexpected result: {other:?}"),
    }

    let result = ShapeArgs {
        args_file: Some(tmp_dir.path().join("doesnt_exist.toml")),
        ..Default::default()
    }
    .merge();
    assert!(matches!(result, Err(AntennaJonesError::Generic(_))));
}

#[test]
fn saved_toml_can_be_read_back() {
    let args = ShapeArgs {
        args_file: None,
        term_args: JonesTermArgs {
            feed_rotation: true,
            feed_rotation_schema: Some("(corr,row)".to_string()),
            dimensions: Some(vec!["chan=9".to_string()]),
            ..Default::default()
        },
        size_args: SizeArgs {
            num_times: Some(6),
            ..Default::default()
        },
    };
    let toml_str = toml::to_string(&args).unwrap();

    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let arg_file = write_file(&tmp_dir, "saved.toml", &toml_str);
    let read_back = ShapeArgs {
        args_file: Some(arg_file),
        ..Default::default()
    }
    .merge()
    .unwrap();
    assert_eq!(
        toml::to_string(&read_back).unwrap(),
        toml_str,
        "round trip changed the arguments"
    );
}
