use std::collections::HashMap;
use std::time::Duration;

use marktest::config::Config;
use marktest::runner::{ClassifiedError, ResultReporter, TestExecutor};
use marktest::{Runner, outln};

fn runner() -> Runner {
    Runner::new(&Config::default()).unwrap()
}

#[test]
fn test_failing_test_reports_second_assertion() {
    let line = line!() + 3;
    let outcome = runner().run_test("test", |t| {
        t.assert_equal(1, 1)?;
        t.assert_equal(1, 2)?;
        Ok(())
    });

    let Some(ClassifiedError::AssertionFailure(failure)) = &outcome.error else {
        panic!("Expected assertion failure, got {:?}", outcome.error);
    };
    assert_eq!(failure.message, "1 != 2");
    assert_eq!(failure.site.location.line, line);
    assert!(failure.site.location.file.ends_with("runner_integration_test.rs"));

    let report = ResultReporter::default().render(&outcome);
    assert!(report.starts_with("[\u{2717}] Test failed:\n    Name: test\n    Message: 1 != 2\n"));
    assert!(report.contains("| assert_equal(1, 2)"));
}

#[test]
fn test_output_and_warnings_attach_to_report() {
    let outcome = runner().run_test("noisy", |t| {
        outln!("step one");
        tracing::warn!("slow path taken");
        t.assert_contains("marktest", "test")?;
        Ok(())
    });

    assert!(outcome.passed);
    assert!(outcome.has_extra_data());

    let report = ResultReporter::default().render(&outcome);
    assert!(report.starts_with("[\u{2713}] Test passed with details:\n    Name: noisy\n"));
    assert!(report.contains("    Warnings:\n        \u{2022} "));
    assert!(report.contains("| slow path taken\n"));
    assert!(report.ends_with("    Output:\n        step one\n"));
}

#[test]
fn test_unhandled_error_report() {
    let outcome = runner().run_test("parse", |_| {
        let _: u8 = "300".parse()?;
        Ok(())
    });

    let report = ResultReporter::default().render(&outcome);
    assert!(report.starts_with("[\u{2717}] Test raised an error:\n    Name: parse\n"));
    assert!(report.contains("Message: number too large to fit in target type\n"));
    assert!(report.contains("    Traceback:\n"));
    assert!(report.trim_end().ends_with("{main}"));
}

fn parse_quantity(text: &str) -> anyhow::Result<u8> {
    Ok(text.parse()?)
}

#[test]
fn test_returned_error_points_at_caller_code() {
    let outcome = runner().run_test("quantity", |_| {
        parse_quantity("300")?;
        Ok(())
    });

    let Some(ClassifiedError::UnhandledError(error)) = &outcome.error else {
        panic!("Expected unhandled error, got {:?}", outcome.error);
    };
    let location = error.location.as_ref().unwrap();
    assert!(location.file.ends_with("runner_integration_test.rs"), "{}", location);
    assert!(error.frames.iter().all(|frame| !frame.function.starts_with("anyhow::")));
    assert!(error.frames.iter().all(|frame| !frame.location.file.contains("/anyhow-")));

    let report = ResultReporter::default().render(&outcome);
    let at_line = report.lines().find(|line| line.starts_with("    At: ")).unwrap();
    assert!(at_line.contains("runner_integration_test.rs"), "{}", report);
}

#[test]
fn test_panicking_test_does_not_escape() {
    let outcome = runner().run_test("panics", |_| {
        let values: Vec<i32> = Vec::new();
        outln!("before");
        let _ = values[3];
        Ok(())
    });

    assert!(!outcome.passed);
    assert_eq!(outcome.captured_output, "before\n");
    assert!(matches!(outcome.error, Some(ClassifiedError::UnhandledError(_))));
}

#[test]
fn test_suite_counts() {
    let summary = runner().run_suite("test", |suite| {
        suite.register("passes", |t| {
            t.assert_equal(1, 1)?;
            Ok(())
        });
        suite.register("fails", |t| {
            t.assert_equal(1, 2)?;
            Ok(())
        });
        suite.register("map", |t| {
            let map = HashMap::from([("a", 1)]);
            t.assert_has_key(&map, &"a")?;
            Ok(())
        });
    });

    assert_eq!(summary.passed, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.total(), 3);

    let report = ResultReporter::default().render_suite(&summary);
    assert!(report.starts_with("\nTest suite:\n    [\u{2713}] Test passed: passes\n"));
    assert!(report.ends_with("Results:\n    Suite Name: test\n    Passed: 2/3\n    Failed: 1/3\n"));
}

#[test]
fn test_error_and_timeout_assertions() {
    let outcome = TestExecutor::new().execute("callbacks", |t| {
        t.assert_error(|| -> anyhow::Result<()> { anyhow::bail!("refused") })?;
        t.assert_no_error(|| -> anyhow::Result<i32> { Ok(1) })?;
        t.assert_timeout(Duration::from_secs(5), || 1 + 1)?;
        Ok(())
    });

    assert!(outcome.passed, "{:?}", outcome.error);
}

#[test]
fn test_elapsed_is_recorded() {
    let outcome = runner().run_test("sleepy", |_| {
        std::thread::sleep(Duration::from_millis(5));
        Ok(())
    });

    assert!(outcome.elapsed >= Duration::from_millis(5));
}
