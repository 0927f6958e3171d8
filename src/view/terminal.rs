//! Terminal rendition of the report viewer: summary, filter badges, the
//! filtered case list and the active detail tab of the selected case.

use super::format::{
    classify_log, format_body, format_duration, format_environment, format_size,
    status_code_is_error, LogLevel,
};
use super::state::{DetailTab, StatusFilter, ViewState};
use crate::report::types::{value_text, ItemStatus, PlanItem};
use colored::Colorize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::{self, Write};

pub fn render<W: Write>(view: &ViewState<'_>, out: &mut W) -> io::Result<()> {
    render_header(view, out)?;
    writeln!(out)?;
    render_list(view, out)?;
    writeln!(out)?;
    match view.selected() {
        Some(item) => render_detail(view, item, out),
        None => writeln!(
            out,
            "{}",
            "Select a test case (--select <N>) to see its details".dimmed()
        ),
    }
}

fn render_header<W: Write>(view: &ViewState<'_>, out: &mut W) -> io::Result<()> {
    let payload = view.payload();
    let summary = payload.plan_summary.clone().unwrap_or_default();

    let mut title = format!(
        "{}  {}",
        payload.plan_name().unwrap_or("Test Report").bold(),
        format!("[Plan {}]", summary.plan_id_text().unwrap_or_else(|| "-".into())).dimmed()
    );
    if let Some(env) = &summary.environment {
        title.push_str(&format!(" {}", format!("[{}]", format_environment(env)).blue()));
    }
    if let Some(run) = payload.report_detail.plan_run_no() {
        title.push_str(&format!(" {}", format!("[Run #{}]", run).dimmed()));
    }
    writeln!(out, "{}", title)?;

    let count = |v: Option<u64>| value_text(v.map(Value::from).as_ref());
    writeln!(
        out,
        "Total {} · Passed {} · Failed {} · Pass rate {}% · Duration {} · Avg {}",
        count(summary.total),
        count(summary.success).green(),
        count(summary.failed).red(),
        view.success_rate(),
        format_duration(summary.duration_ms),
        format_duration(Some(view.avg_duration())),
    )
}

fn render_list<W: Write>(view: &ViewState<'_>, out: &mut W) -> io::Result<()> {
    let badges: Vec<String> = StatusFilter::ALL
        .iter()
        .map(|filter| {
            let badge = format!("{} ({})", filter.label(), view.filter_count(*filter));
            if *filter == view.current_filter {
                format!("[{}]", badge).bold().to_string()
            } else {
                badge
            }
        })
        .collect();
    let mut line = format!("Filter: {}", badges.join("  "));
    if !view.search_query.is_empty() {
        line.push_str(&format!("   Search: \"{}\"", view.search_query));
    }
    writeln!(out, "{}", line)?;

    let indices = view.filtered_indices();
    if indices.is_empty() {
        let message = if view.payload().plan_items.is_empty() {
            "No test cases in this report"
        } else {
            "No matching test cases"
        };
        return writeln!(out, "  {}", message.dimmed());
    }

    for idx in indices {
        let item = &view.payload().plan_items[idx];
        let marker = if view.selected_index() == Some(idx) { ">" } else { " " };
        let mut secondary = item.method.clone().unwrap_or_default();
        if item.case_name.is_some() {
            if let Some(url) = &item.url {
                if !secondary.is_empty() {
                    secondary.push(' ');
                }
                secondary.push_str(url);
            }
        }
        writeln!(
            out,
            "{} {:>3} {} {}  {}  {}",
            marker,
            idx,
            status_icon(&item.status),
            item.display_name(),
            secondary.dimmed(),
            format_duration(item.duration_ms).dimmed()
        )?;
    }
    Ok(())
}

fn render_detail<W: Write>(view: &ViewState<'_>, item: &PlanItem, out: &mut W) -> io::Result<()> {
    writeln!(out, "{} {}", "──".dimmed(), item.display_name().bold())?;
    if item.case_name.is_some() {
        if let Some(url) = &item.url {
            writeln!(out, "   {}", url.dimmed())?;
        }
    }
    let source = item
        .source
        .clone()
        .unwrap_or_else(|| format!("report #{}", value_text(item.report_id.as_ref())));
    writeln!(
        out,
        "   {}From {}",
        item.method
            .as_deref()
            .map(|m| format!("{} · ", m))
            .unwrap_or_default(),
        source
    )?;

    let code = match item.status_code {
        Some(code) if status_code_is_error(code) => code.to_string().red().to_string(),
        Some(code) => code.to_string().green().to_string(),
        None => "-".to_string(),
    };
    writeln!(
        out,
        "   HTTP status: {} · Duration: {} · Size: {}",
        code,
        format_duration(item.duration_ms),
        format_size(item.response_size)
    )?;

    let tabs: Vec<String> = DetailTab::ALL
        .iter()
        .map(|tab| {
            if *tab == view.current_tab {
                format!("[{}]", tab.label()).cyan().bold().to_string()
            } else {
                tab.label().to_string()
            }
        })
        .collect();
    writeln!(out, "   {}", tabs.join("  "))?;
    writeln!(out)?;

    match view.current_tab {
        DetailTab::Steps => render_steps(item, out),
        DetailTab::Body => match item.response_body.as_ref().filter(|b| !b.is_empty()) {
            Some(body) => writeln!(out, "{}", format_body(Some(body), view.format_json)),
            None => writeln!(out, "{}", "No response body".dimmed()),
        },
        DetailTab::Header => {
            writeln!(out, "{}", "Request headers".bold())?;
            render_entries(item.request_headers.as_ref(), "No request headers", out)?;
            writeln!(out, "{}", "Response headers".bold())?;
            render_entries(item.response_headers.as_ref(), "No response headers", out)
        }
        DetailTab::Cookie => render_entries(item.cookies.as_ref(), "No cookies", out),
        DetailTab::Console => {
            if item.logs.is_empty() {
                return writeln!(out, "{}", "No console output".dimmed());
            }
            for (idx, line) in item.logs.iter().enumerate() {
                let text = match classify_log(line) {
                    LogLevel::Error => line.red(),
                    LogLevel::Success => line.green(),
                    LogLevel::Neutral => line.normal(),
                };
                writeln!(out, "{} {}", format!("{:>4}", idx + 1).dimmed(), text)?;
            }
            Ok(())
        }
        DetailTab::Request => {
            writeln!(out, "URL:    {}", item.url.as_deref().unwrap_or("-"))?;
            writeln!(out, "Method: {}", item.method.as_deref().unwrap_or("-"))?;
            let body = format_body(item.request_body.as_ref(), true);
            writeln!(out, "Body:")?;
            writeln!(out, "{}", if body.is_empty() { "-".to_string() } else { body })
        }
    }
}

fn render_steps<W: Write>(item: &PlanItem, out: &mut W) -> io::Result<()> {
    if item.steps.is_empty() {
        return writeln!(out, "{}", "No steps recorded".dimmed());
    }
    for (idx, step) in item.steps.iter().enumerate() {
        let id = match &step.id {
            Some(id) if !id.is_null() => value_text(Some(id)),
            _ => (idx + 1).to_string(),
        };
        let duration = step
            .duration
            .map(|d| format!("{} ms", d))
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            out,
            "{:>4} {} {:<12} {}",
            id,
            status_icon(&step.status),
            step.action.as_deref().unwrap_or("-"),
            duration.dimmed()
        )?;
        if let Some(details) = &step.details {
            writeln!(out, "       {}", details)?;
        }
        if let Some(error) = &step.error {
            writeln!(out, "       {}", error.red())?;
        }
    }
    Ok(())
}

fn render_entries<W: Write>(
    entries: Option<&BTreeMap<String, Value>>,
    empty: &str,
    out: &mut W,
) -> io::Result<()> {
    match entries.filter(|e| !e.is_empty()) {
        Some(entries) => {
            for (key, value) in entries {
                writeln!(out, "  {}: {}", key.dimmed(), value_text(Some(value)))?;
            }
            Ok(())
        }
        None => writeln!(out, "  {}", empty.dimmed()),
    }
}

fn status_icon(status: &ItemStatus) -> colored::ColoredString {
    match status {
        ItemStatus::Success => "✓".green(),
        ItemStatus::Failed => "✗".red(),
        ItemStatus::Other(_) => "○".yellow(),
    }
}
