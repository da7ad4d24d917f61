use codespan_reporting::term::termcolor::NoColor;
use libtest_mimic::{Arguments, Failed, Trial};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::process;
use walkdir::WalkDir;

fn main() {
    let args = Arguments::from_args();

    let tests = find_source_files("tests/cases").map(extract_test).collect();

    libtest_mimic::run(&args, tests).exit();
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
#[serde(rename_all = "kebab-case")]
struct Config {
    #[serde(default = "DEFAULT_IGNORE")]
    ignore: bool,
    #[serde(default = "DEFAULT_EXIT_CODE")]
    exit_code: i32,
    #[serde(default)]
    allow_unused: bool,
    /// Fragments expected in the diagnostics written to stderr.
    #[serde(default)]
    stderr_contains: Vec<String>,
    /// Expectations for each match, by name.
    #[serde(default)]
    matches: BTreeMap<String, MatchConfig>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
#[serde(rename_all = "kebab-case")]
struct MatchConfig {
    /// Goals discharged by each clause.
    subgoals: Option<Vec<usize>>,
    #[serde(default)]
    counterexamples: Vec<String>,
    /// Unused clauses, numbered from one.
    #[serde(default)]
    unused: Vec<usize>,
}

const DEFAULT_IGNORE: fn() -> bool = || false;
const DEFAULT_EXIT_CODE: fn() -> i32 = || 0;

struct TestFailure {
    name: &'static str,
    details: Vec<(&'static str, String)>,
}

/// Recursively walk over test files under a file path.
pub fn find_source_files(root: impl AsRef<Path>) -> impl Iterator<Item = PathBuf> {
    let mut paths = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| matches!(entry.path().extension(), Some(ext) if ext == "toml"))
        .map(|entry| entry.into_path())
        .collect::<Vec<_>>();
    paths.sort();
    paths.into_iter()
}

fn extract_test(path: PathBuf) -> Trial {
    let name = path.display().to_string();
    let ignored = read_config(&path).map_or(false, |config| config.ignore);
    Trial::test(name, move || run_test(&path)).with_ignored_flag(ignored)
}

fn read_config(path: &Path) -> Result<Config, String> {
    use itertools::Itertools;

    const CONFIG_COMMENT_START: &str = "#~";

    let input_source = std::fs::read_to_string(path).map_err(|error| error.to_string())?;
    // Collect the lines with CONFIG_COMMENT_START prefix, stripping the prefix in the process
    let config_source = input_source
        .lines()
        .filter_map(|line| line.strip_prefix(CONFIG_COMMENT_START))
        .join("\n");

    toml::from_str::<Config>(&config_source).map_err(|error| error.to_string())
}

fn run_test(path: &Path) -> Result<(), Failed> {
    let config = match read_config(path) {
        Ok(config) => config,
        Err(error) => {
            return failures_to_outcome(&[TestFailure {
                name: "config parse error",
                details: vec![("toml::de::Error", error)],
            }])
        }
    };

    let mut failures = Vec::new();
    failures.extend(run_library(path, &config));
    failures.extend(run_binary(path, &config));
    failures_to_outcome(&failures)
}

/// Compile the problem file through the library API, checking the compiled
/// matches against the expectations.
fn run_library(path: &Path, config: &Config) -> Vec<TestFailure> {
    let mut failures = Vec::new();

    let mut driver = depmatch::Driver::new();
    driver.set_allow_unused(config.allow_unused);
    driver.set_diagnostic_writer(NoColor::new(std::io::sink()));
    driver.set_emit_writer(NoColor::new(std::io::sink()));

    let file_id = match driver.load_source_path(path) {
        Some(file_id) => file_id,
        None => {
            failures.push(TestFailure {
                name: "problem file not loaded",
                details: vec![("path", path.display().to_string())],
            });
            return failures;
        }
    };
    let (status, compiled) = driver.compile_module(file_id);

    if status.exit_code() != config.exit_code {
        failures.push(TestFailure {
            name: "unexpected library status",
            details: vec![("status", format!("{status:?}"))],
        });
    }

    for (name, expected) in &config.matches {
        let compiled = match compiled.iter().find(|m| m.name.resolve() == name.as_str()) {
            Some(compiled) => compiled,
            None => {
                failures.push(TestFailure {
                    name: "match not compiled",
                    details: vec![("match", name.clone())],
                });
                continue;
            }
        };

        if let Some(subgoals) = &expected.subgoals {
            if *subgoals != compiled.subgoals {
                failures.push(TestFailure {
                    name: "subgoal count mismatch",
                    details: vec![
                        ("match", name.clone()),
                        ("expected", format!("{subgoals:?}")),
                        ("found", format!("{:?}", compiled.subgoals)),
                    ],
                });
            }
        }
        if expected.counterexamples != compiled.counterexamples {
            failures.push(TestFailure {
                name: "counterexample mismatch",
                details: vec![
                    ("match", name.clone()),
                    ("expected", expected.counterexamples.join("\n")),
                    ("found", compiled.counterexamples.join("\n")),
                ],
            });
        }
        let unused = compiled.unused_alts.iter().map(|alt| alt + 1).collect::<Vec<_>>();
        if expected.unused != unused {
            failures.push(TestFailure {
                name: "unused clause mismatch",
                details: vec![
                    ("match", name.clone()),
                    ("expected", format!("{:?}", expected.unused)),
                    ("found", format!("{unused:?}")),
                ],
            });
        }
    }

    failures
}

/// Run the command line interface on the problem file, checking its exit
/// code and diagnostics.
fn run_binary(path: &Path, config: &Config) -> Vec<TestFailure> {
    let mut failures = Vec::new();

    let mut exe = process::Command::new(env!("CARGO_BIN_EXE_depmatch"));
    exe.arg("compile");
    if config.allow_unused {
        exe.arg("--allow-unused");
    }
    exe.arg(path);

    let output = match exe.output() {
        Ok(output) => output,
        Err(error) => {
            failures.push(TestFailure {
                name: "unexpected command error",
                details: vec![("std::io::Error", error.to_string())],
            });
            return failures;
        }
    };
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    if output.status.code() != Some(config.exit_code) {
        failures.push(TestFailure {
            name: "unexpected command output",
            details: vec![
                ("command", format!("{exe:?}")),
                ("status", output.status.to_string()),
                ("stdout", stdout.to_string()),
                ("stderr", stderr.to_string()),
            ],
        });
    }
    for fragment in &config.stderr_contains {
        if !stderr.contains(fragment.as_str()) {
            failures.push(TestFailure {
                name: "missing diagnostic",
                details: vec![("expected", fragment.clone()), ("stderr", stderr.to_string())],
            });
        }
    }

    failures
}

fn failures_to_outcome(failures: &[TestFailure]) -> Result<(), Failed> {
    if failures.is_empty() {
        return Ok(());
    }

    let mut msg = String::new();

    writeln!(msg).unwrap();
    for failure in failures {
        writeln!(msg, "    {}:", failure.name).unwrap();
        for (name, data) in &failure.details {
            writeln!(msg, "        ---- {} ----", name).unwrap();
            for line in data.lines() {
                writeln!(msg, "        {}", line).unwrap();
            }
        }
        writeln!(msg).unwrap();
    }
    writeln!(msg).unwrap();
    writeln!(msg, "    failures:").unwrap();
    for failure in failures {
        writeln!(msg, "        {}", failure.name).unwrap();
    }

    Err(msg.into())
}
