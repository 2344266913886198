// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::{fs::File, io::Write};

use indoc::indoc;
use tempfile::TempDir;

use crate::{antenna_jones, get_cmd_output, get_logged_value};

const SHAPE_KEY: &str = "Antenna Jones shape (source,row,chan,corr):";

#[test]
fn test_shape_defaults() {
    for terms in [
        vec![],
        vec!["--bsqrt"],
        vec!["--feed-rotation"],
        vec!["--bsqrt", "--complex-phase", "--feed-rotation", "--ddes"],
    ] {
        let cmd = antenna_jones().arg("shape").args(&terms).ok();
        assert!(
            cmd.is_ok(),
            "shape failed with {terms:?}: {}",
            cmd.err().unwrap()
        );
        let (stdout, stderr) = get_cmd_output(cmd);
        assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
        assert_eq!(
            get_logged_value(&stdout, SHAPE_KEY),
            Some("[10, 225, 16, 4]"),
            "{stdout}"
        );
    }
}

#[test]
fn test_shape_sizes_and_schemas() {
    #[rustfmt::skip]
    let cmd = antenna_jones()
        .args([
            "shape",
            "--ddes",
            "--ddes-schema", "(chan,row,source,corr)",
            "--num-sources", "3",
            "--num-rows", "20",
            "--num-chans", "2",
        ])
        .ok();
    assert!(cmd.is_ok(), "{}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert_eq!(get_logged_value(&stdout, SHAPE_KEY), Some("[3, 20, 2, 4]"));
}

#[test]
fn test_shape_bad_corr() {
    #[rustfmt::skip]
    let cmd = antenna_jones()
        .args([
            "shape",
            "--dimensions", "corr=2",
            "--feed-rotation",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(
        stderr.contains("Number of correlations '2' does not equal '4'"),
        "{stderr}"
    );
}

#[test]
fn test_shape_bad_schema() {
    #[rustfmt::skip]
    let cmd = antenna_jones()
        .args([
            "shape",
            "--bsqrt",
            "--bsqrt-schema", "source,time,chan,corr",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.starts_with("Error: "), "{stderr}");
    assert!(stderr.contains("Schemas name each axis"), "{stderr}");
}

#[test]
fn test_shape_dry_run() {
    let cmd = antenna_jones()
        .args(["shape", "--ddes", "--dry-run"])
        .ok();
    assert!(cmd.is_ok(), "{}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Dry run -- exiting now."), "{stdout}");
    assert!(get_logged_value(&stdout, SHAPE_KEY).is_none(), "{stdout}");
}

#[test]
fn test_shape_dimensions_before_arg_file() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let arg_file = tmp_dir.path().join("shape.toml");
    let mut f = File::create(&arg_file).unwrap();
    f.write_all(
        indoc! {r#"
            [terms]
            feed_rotation = true

            [sizes]
            num_rows = 6
        "#}
        .as_bytes(),
    )
    .unwrap();
    drop(f);

    #[rustfmt::skip]
    let cmd = antenna_jones()
        .args([
            "shape",
            "--dimensions", "source=3,chan=2",
            "--dimensions", "time=6",
            arg_file.to_str().unwrap(),
        ])
        .ok();
    assert!(cmd.is_ok(), "{}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert_eq!(get_logged_value(&stdout, SHAPE_KEY), Some("[3, 6, 2, 4]"), "{stdout}");
}
