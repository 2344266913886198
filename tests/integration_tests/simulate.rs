// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::{fs::File, io::Write};

use indoc::indoc;
use tempfile::TempDir;

use crate::{antenna_jones, get_cmd_output, get_logged_value};

fn get_checksum(args: &[&str]) -> String {
    let cmd = antenna_jones().arg("simulate").args(args).ok();
    assert!(cmd.is_ok(), "simulate failed: {}", cmd.err().unwrap());
    let (stdout, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
    get_logged_value(&stdout, "Checksum:")
        .expect("no checksum was logged")
        .to_string()
}

#[test]
fn test_simulate_thread_counts_agree() {
    #[rustfmt::skip]
    let args = [
        "--bsqrt", "--complex-phase", "--feed-rotation", "--ddes",
        "--num-sources", "4",
        "--num-rows", "30",
        "--num-times", "5",
        "--num-chans", "8",
    ];
    let one = get_checksum(&[&args[..], &["--num-threads", "1"]].concat());
    let three = get_checksum(&[&args[..], &["--num-threads", "3"]].concat());
    assert_eq!(one, three);
}

#[test]
fn test_simulate_single_precision() {
    let checksum = get_checksum(&["--ddes", "--precision", "single", "-s", "2", "-r", "3"]);
    let checksum: f64 = checksum.parse().unwrap();
    assert!(checksum.is_finite());
}

#[test]
fn test_simulate_with_arg_file() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let arg_file = tmp_dir.path().join("simulate.toml");
    let mut f = File::create(&arg_file).unwrap();
    f.write_all(
        indoc! {r#"
            [terms]
            bsqrt = true
            ddes = true
            ddes_schema = "(row,chan,source,corr)"

            [sizes]
            num_sources = 2
            num_rows = 6
            num_times = 2
            num_chans = 3

            [simulate]
            num_threads = 2
        "#}
        .as_bytes(),
    )
    .unwrap();
    drop(f);

    let from_file = get_checksum(&[arg_file.to_str().unwrap()]);
    #[rustfmt::skip]
    let from_cli = get_checksum(&[
        "--bsqrt", "--ddes",
        "--ddes-schema", "(row,chan,source,corr)",
        "-s", "2", "-r", "6", "-t", "2", "-c", "3",
    ]);
    assert_eq!(from_file, from_cli);

    // CLI arguments override the file.
    let overridden = get_checksum(&[arg_file.to_str().unwrap(), "--num-chans", "4"]);
    assert_ne!(from_file, overridden);
}

#[test]
fn test_simulate_save_toml() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let saved = tmp_dir.path().join("saved.toml");
    #[rustfmt::skip]
    let first = get_checksum(&[
        "--complex-phase", "--feed-rotation",
        "-s", "3", "-r", "7", "-c", "2",
        "--save-toml", saved.to_str().unwrap(),
    ]);
    assert!(saved.exists());

    let second = get_checksum(&[saved.to_str().unwrap()]);
    assert_eq!(first, second);
}

#[test]
fn test_simulate_bad_arg_file() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let arg_file = tmp_dir.path().join("simulate.txt");
    File::create(&arg_file).unwrap();

    let cmd = antenna_jones()
        .args(["simulate", arg_file.to_str().unwrap()])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(
        stderr.contains("doesn't have a recognised file extension"),
        "{stderr}"
    );
}
