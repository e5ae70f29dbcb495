use colored::Colorize;

use crate::assertion::AssertionFailure;
use crate::config::Config;
use crate::discovery::MethodFilteringError;
use crate::runner::traceback::TRACEBACK_END;
use crate::runner::types::{ClassifiedError, SuiteSummary, TestOutcome, UnhandledError};
use crate::utils::{bullet, indent};

const PASS_GLYPH: &str = "[\u{2713}]";
const FAIL_GLYPH: &str = "[\u{2717}]";

/// Turns outcomes into report text
#[derive(Debug, Clone, Default)]
pub struct ResultReporter {
    color: bool,
}

impl ResultReporter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.report.color)
    }

    /// Report for a single test
    pub fn render(&self, outcome: &TestOutcome) -> String {
        match &outcome.error {
            None if !outcome.has_extra_data() => {
                format!("{} {}\n", self.header(true, "Test passed:"), outcome.name)
            }
            None => format!(
                "{}\n    Name: {}\n{}",
                self.header(true, "Test passed with details:"),
                outcome.name,
                indent(1, &extra_data(outcome)),
            ),
            Some(ClassifiedError::AssertionFailure(failure)) => {
                self.render_assertion(outcome, failure)
            }
            Some(ClassifiedError::UnhandledError(error)) => self.render_unhandled(outcome, error),
        }
    }

    fn render_assertion(&self, outcome: &TestOutcome, failure: &AssertionFailure) -> String {
        format!(
            "{}\n    Name: {}\n    Message: {}\n    Assertion: {}\n{}",
            self.header(false, "Test failed:"),
            outcome.name,
            failure.message,
            failure.site,
            indent(1, &extra_data(outcome)),
        )
    }

    fn render_unhandled(&self, outcome: &TestOutcome, error: &UnhandledError) -> String {
        let at = error
            .location
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "unknown".to_string());

        let mut traceback: Vec<String> = error.frames.iter().map(ToString::to_string).collect();
        traceback.push(TRACEBACK_END.to_string());

        format!(
            "{}\n    Name: {}\n    Message: {}\n    At: {}\n    Traceback:\n{}\n{}",
            self.header(false, "Test raised an error:"),
            outcome.name,
            error.message,
            at,
            indent(2, &traceback.join("\n")),
            indent(1, &extra_data(outcome)),
        )
    }

    /// Suite report: every test report, then the tally
    pub fn render_suite(&self, summary: &SuiteSummary) -> String {
        let total = summary.total();
        format!(
            "\nTest suite:\n{}\nResults:\n    Suite Name: {}\n    Passed: {}/{}\n    Failed: {}/{}\n",
            summary.reports.concat(),
            summary.suite_name,
            summary.passed,
            total,
            summary.failed,
            total,
        )
    }

    /// Report for a suite whose test methods could not be discovered
    pub fn render_discovery_error(&self, error: &MethodFilteringError) -> String {
        format!(
            "{}\n    Error: {}\n",
            self.header(false, "Test suite could not be built:"),
            error
        )
    }

    fn header(&self, passed: bool, text: &str) -> String {
        let glyph = if passed { PASS_GLYPH } else { FAIL_GLYPH };
        let header = format!("{} {}", glyph, text);
        match (self.color, passed) {
            (false, _) => header,
            (true, true) => header.green().to_string(),
            (true, false) => header.red().bold().to_string(),
        }
    }
}

/// Warnings and output sections, unindented. Empty when there is neither.
fn extra_data(outcome: &TestOutcome) -> String {
    let mut text = String::new();

    if !outcome.captured_warnings.is_empty() {
        text.push_str("Warnings:\n");
        for warning in &outcome.captured_warnings {
            text.push_str(&indent(1, &bullet(&warning.to_string())));
            text.push('\n');
        }
    }

    let output = outcome.captured_output.trim();
    if !output.is_empty() {
        text.push_str("Output:\n");
        text.push_str(&indent(1, output));
        text.push('\n');
    }

    text
}
