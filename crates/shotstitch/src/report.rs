//! Verification reports.
//!
//! A verify run produces one [`TestCaseReport`] per screenshot. The session
//! hands the full list to a [`ReportSink`], which owns the file format.

use crate::result::ShotResult;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Suite name used for every verify run
pub const SUITE_NAME: &str = "Screenshot Tests";

/// Failure detail attached to mismatching screenshots
pub const MISMATCH_DETAIL: &str = "Image does not match";

/// Elapsed time reported for each case; verification is not timed per screenshot
pub const ELAPSED_PLACEHOLDER: Duration = Duration::from_secs(1);

/// One entry of a verification report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCaseReport {
    /// Owning test class
    pub test_class: String,
    /// Owning test method
    pub test_name: String,
    /// Whether the screenshot matched its baseline
    pub passed: bool,
    /// Failure detail if failed
    pub failure_detail: Option<String>,
    /// Elapsed time
    pub elapsed: Duration,
}

impl TestCaseReport {
    /// Create a passing entry
    #[must_use]
    pub fn passed(test_class: impl Into<String>, test_name: impl Into<String>) -> Self {
        Self {
            test_class: test_class.into(),
            test_name: test_name.into(),
            passed: true,
            failure_detail: None,
            elapsed: ELAPSED_PLACEHOLDER,
        }
    }

    /// Create a failing entry
    #[must_use]
    pub fn failed(
        test_class: impl Into<String>,
        test_name: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            test_class: test_class.into(),
            test_name: test_name.into(),
            passed: false,
            failure_detail: Some(detail.into()),
            elapsed: ELAPSED_PLACEHOLDER,
        }
    }
}

/// Destination for verification reports
pub trait ReportSink {
    /// Accept the full list of cases of one suite
    ///
    /// # Errors
    ///
    /// Returns an error if the report cannot be written
    fn emit(&mut self, suite: &str, cases: &[TestCaseReport]) -> ShotResult<()>;
}

/// Collects cases in memory
impl ReportSink for Vec<TestCaseReport> {
    fn emit(&mut self, _suite: &str, cases: &[TestCaseReport]) -> ShotResult<()> {
        self.extend_from_slice(cases);
        Ok(())
    }
}

impl<S: ReportSink + ?Sized> ReportSink for &mut S {
    fn emit(&mut self, suite: &str, cases: &[TestCaseReport]) -> ShotResult<()> {
        (**self).emit(suite, cases)
    }
}

impl<S: ReportSink + ?Sized> ReportSink for Box<S> {
    fn emit(&mut self, suite: &str, cases: &[TestCaseReport]) -> ShotResult<()> {
        (**self).emit(suite, cases)
    }
}

/// Writes `screenshot.xml` in JUnit format
#[derive(Debug, Clone)]
pub struct JunitReport {
    dir: PathBuf,
}

impl JunitReport {
    /// File name written inside the report directory
    pub const FILE_NAME: &'static str = "screenshot.xml";

    /// Write into `dir`
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Full path of the report file
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.join(Self::FILE_NAME)
    }
}

impl ReportSink for JunitReport {
    fn emit(&mut self, suite: &str, cases: &[TestCaseReport]) -> ShotResult<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path(), render_junit(suite, cases))?;
        Ok(())
    }
}

/// Writes `screenshot.json`
#[derive(Debug, Clone)]
pub struct JsonReport {
    dir: PathBuf,
}

#[derive(Serialize)]
struct JsonSuite<'a> {
    name: &'a str,
    tests: usize,
    failures: usize,
    cases: &'a [TestCaseReport],
}

impl JsonReport {
    /// File name written inside the report directory
    pub const FILE_NAME: &'static str = "screenshot.json";

    /// Write into `dir`
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Full path of the report file
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.join(Self::FILE_NAME)
    }
}

impl ReportSink for JsonReport {
    fn emit(&mut self, suite: &str, cases: &[TestCaseReport]) -> ShotResult<()> {
        let doc = JsonSuite {
            name: suite,
            tests: cases.len(),
            failures: cases.iter().filter(|c| !c.passed).count(),
            cases,
        };
        std::fs::create_dir_all(&self.dir)?;
        let file = std::fs::File::create(self.path())?;
        serde_json::to_writer_pretty(file, &doc)?;
        Ok(())
    }
}

/// Render JUnit XML content
#[must_use]
pub fn render_junit(suite: &str, cases: &[TestCaseReport]) -> String {
    let failures = cases.iter().filter(|c| !c.passed).count();
    let total: Duration = cases.iter().map(|c| c.elapsed).sum();

    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str("<testsuites>\n");
    xml.push_str(&format!(
        r#"  <testsuite name="{}" tests="{}" failures="{}" errors="0" skipped="0" time="{:.3}">"#,
        escape_xml(suite),
        cases.len(),
        failures,
        total.as_secs_f64()
    ));
    xml.push('\n');

    for case in cases {
        xml.push_str(&format!(
            r#"    <testcase classname="{}" name="{}" time="{:.3}""#,
            escape_xml(&case.test_class),
            escape_xml(&case.test_name),
            case.elapsed.as_secs_f64()
        ));

        match (&case.failure_detail, case.passed) {
            (Some(detail), false) => {
                xml.push_str(">\n");
                xml.push_str(&format!(
                    r#"      <failure type="failure" message="{}" />"#,
                    escape_xml(detail)
                ));
                xml.push_str("\n    </testcase>\n");
            }
            (None, false) => {
                xml.push_str(">\n      <failure type=\"failure\" />\n    </testcase>\n");
            }
            _ => xml.push_str(" />\n"),
        }
    }

    xml.push_str("  </testsuite>\n</testsuites>\n");
    xml
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
