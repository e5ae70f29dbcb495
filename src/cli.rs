use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use marktest::config::Config;
use marktest::{Runner, Test, TestResult, outln, test_class};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the built-in demonstration tests
    Demo {
        /// Colour the report headers
        #[arg(long)]
        color: bool,

        /// Config file to use instead of the discovered one
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },
}

/// Load the config for a run. An explicit path must load; otherwise fall back to discovery.
pub fn load_config(path: Option<&PathBuf>, color: bool) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::load_from_path(path)?,
        None => Config::find_and_load().unwrap_or_default(),
    };
    if color {
        config.report.color = true;
    }
    Ok(config)
}

pub struct Calculator;

test_class! {
    impl Calculator {
        /// @test adds small numbers
        pub fn check_add(&self, t: &Test) -> TestResult {
            t.assert_equal(1 + 1, 2)?;
            Ok(())
        }

        /// @test
        pub fn check_divide(&self, t: &Test) -> TestResult {
            let parsed: i32 = "four".parse()?;
            t.assert_equal(8 / parsed, 2)?;
            Ok(())
        }
    }
}

/// Returns the number of failed tests
pub fn run_demo(runner: &Runner) -> usize {
    let mut failed = 0;

    outln!("*Failing Test*");
    let outcome = runner.run_test("test", |t| {
        t.assert_equal(1, 1)?;
        t.assert_equal(1, 2)?;
        Ok(())
    });
    failed += usize::from(!outcome.passed);
    outln!();

    outln!("*Passing Test*");
    let outcome = runner.run_test("test", |t| {
        outln!("checking one");
        t.assert_equal(1, 1)?;
        Ok(())
    });
    failed += usize::from(!outcome.passed);
    outln!();

    outln!("*Suite Test*");
    let summary = runner.run_suite("test", |suite| {
        suite.register("test", |t| {
            t.assert_equal(1, 1)?;
            Ok(())
        });
        suite.register("test", |t| {
            t.assert_equal(1, 2)?;
            Ok(())
        });
    });
    failed += summary.failed;
    outln!();

    outln!("*Class Suite Test*");
    match runner.run_suite_from_annotated_methods(&Calculator, None) {
        Ok(summary) => failed += summary.failed,
        Err(e) => {
            marktest::capture::output::write_str(&runner.reporter().render_discovery_error(&e));
            failed += 1;
        }
    }

    failed
}
