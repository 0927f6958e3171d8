use super::error::{ReportError, Result};
use super::types::{ItemStatus, PlanItem, ReportPayload};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;
use std::path::Path;

/// Generate JUnit XML report string from a plan run
pub fn generate_junit_xml(payload: &ReportPayload) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let items = &payload.plan_items;
    let total_tests = items.len();
    let failures = items
        .iter()
        .filter(|i| i.status == ItemStatus::Failed)
        .count();
    // Statuses other than success/failed cannot be judged; report them as skipped.
    let skipped = items
        .iter()
        .filter(|i| matches!(i.status, ItemStatus::Other(_)))
        .count();
    let summary = payload.plan_summary.clone().unwrap_or_default();
    let total_duration = summary
        .duration_ms
        .unwrap_or_else(|| items.iter().filter_map(|i| i.duration_ms).sum());
    let suite_name = payload.plan_name().unwrap_or("plan-report");

    let mut suites_start = BytesStart::new("testsuites");
    suites_start.push_attribute(("name", suite_name));
    suites_start.push_attribute(("tests", total_tests.to_string().as_str()));
    suites_start.push_attribute(("failures", failures.to_string().as_str()));
    suites_start.push_attribute(("skipped", skipped.to_string().as_str()));
    suites_start.push_attribute(("time", seconds(Some(total_duration)).as_str()));
    writer.write_event(Event::Start(suites_start))?;

    // One suite per plan run
    let mut suite_start = BytesStart::new("testsuite");
    suite_start.push_attribute(("name", suite_name));
    suite_start.push_attribute(("tests", total_tests.to_string().as_str()));
    suite_start.push_attribute(("failures", failures.to_string().as_str()));
    suite_start.push_attribute(("skipped", skipped.to_string().as_str()));
    if let Some(id) = summary.plan_id_text() {
        suite_start.push_attribute(("id", id.as_str()));
    }
    if let Some(run_no) = payload.report_detail.plan_run_no() {
        suite_start.push_attribute(("run", run_no.as_str()));
    }
    suite_start.push_attribute(("time", seconds(Some(total_duration)).as_str()));
    writer.write_event(Event::Start(suite_start))?;

    let classname = default_classname(payload);
    for item in items {
        write_test_case(&mut writer, item, &classname)?;
    }

    writer.write_event(Event::End(BytesEnd::new("testsuite")))?;
    writer.write_event(Event::End(BytesEnd::new("testsuites")))?;

    let result = writer.into_inner().into_inner();
    String::from_utf8(result).map_err(|e| ReportError::Xml(e.to_string()))
}

fn default_classname(payload: &ReportPayload) -> String {
    let plan_id = payload
        .plan_summary
        .as_ref()
        .and_then(|s| s.plan_id_text())
        .unwrap_or_else(|| "unknown".to_string());
    format!("plan.{}", plan_id)
}

fn seconds(ms: Option<u64>) -> String {
    format!("{:.3}", ms.unwrap_or(0) as f64 / 1000.0)
}

fn write_test_case<W: std::io::Write>(
    writer: &mut Writer<W>,
    item: &PlanItem,
    default_classname: &str,
) -> Result<()> {
    let name = item.display_name();
    let classname = item
        .case_type
        .as_deref()
        .map(|t| format!("{}.{}", default_classname, t.to_lowercase()))
        .unwrap_or_else(|| default_classname.to_string());

    let mut case_start = BytesStart::new("testcase");
    case_start.push_attribute(("name", name.as_str()));
    case_start.push_attribute(("classname", classname.as_str()));
    case_start.push_attribute(("time", seconds(item.duration_ms).as_str()));
    writer.write_event(Event::Start(case_start))?;

    match &item.status {
        ItemStatus::Success => {}
        ItemStatus::Failed => {
            let message = item.failure_message().unwrap_or("Test case failed");
            let mut fail_start = BytesStart::new("failure");
            fail_start.push_attribute(("message", message));
            fail_start.push_attribute(("type", "AssertionError"));
            writer.write_event(Event::Start(fail_start))?;

            let mut detail = format!(
                "{} {}",
                item.method.as_deref().unwrap_or("-"),
                item.url.as_deref().unwrap_or("-")
            );
            if let Some(code) = item.status_code {
                detail.push_str(&format!(" -> {}", code));
            }
            writer.write_event(Event::Text(BytesText::new(&detail)))?;
            writer.write_event(Event::End(BytesEnd::new("failure")))?;
        }
        ItemStatus::Other(status) => {
            let mut skip = BytesStart::new("skipped");
            skip.push_attribute(("message", format!("status: {}", status).as_str()));
            writer.write_event(Event::Empty(skip))?;
        }
    }

    if !item.logs.is_empty() {
        writer.write_event(Event::Start(BytesStart::new("system-out")))?;
        writer.write_event(Event::Text(BytesText::new(&item.logs.join("\n"))))?;
        writer.write_event(Event::End(BytesEnd::new("system-out")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("testcase")))?;
    Ok(())
}

/// Write report to file
pub fn write_report(payload: &ReportPayload, output: &Path) -> Result<()> {
    let xml = generate_junit_xml(payload)?;
    std::fs::write(output, xml).map_err(|source| ReportError::Write {
        path: output.to_path_buf(),
        source,
    })?;
    println!("    Generated JUnit report: {}", output.display());
    Ok(())
}
