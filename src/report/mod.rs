pub mod assemble;
pub mod error;
pub mod html;
pub mod json;
pub mod junit;
pub mod types;

use error::{ReportError, Result};
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;
use types::ReportPayload;

pub use assemble::{assemble, assemble_value, EmbeddedPayload};
pub use html::{generate_report_html, render_document, RenderOptions};

/// Output format of an exported report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Html,
    Json,
    Junit,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Html => "html",
            ExportFormat::Json => "json",
            ExportFormat::Junit => "xml",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "html" => Ok(ExportFormat::Html),
            "json" => Ok(ExportFormat::Json),
            "junit" | "xml" => Ok(ExportFormat::Junit),
            other => Err(ReportError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportFormat::Html => "html",
            ExportFormat::Json => "json",
            ExportFormat::Junit => "junit",
        };
        f.write_str(name)
    }
}

/// Read a payload file (bare payload or backend response envelope)
pub fn load_payload(path: &Path) -> Result<ReportPayload> {
    let content = std::fs::read_to_string(path).map_err(|source| ReportError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let payload = ReportPayload::from_json_str(&content)?;
    log::debug!(
        "Loaded {}: {} items",
        path.display(),
        payload.plan_items.len()
    );
    Ok(payload)
}

/// Expand input arguments; each may be a plain path or a glob pattern.
pub fn resolve_inputs(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        let matches: Vec<PathBuf> = glob::glob(input)?.filter_map(|entry| entry.ok()).collect();
        if matches.is_empty() && Path::new(input).exists() {
            paths.push(PathBuf::from(input));
        } else {
            paths.extend(matches);
        }
    }
    let mut seen = HashSet::new();
    paths.retain(|path| seen.insert(path.clone()));
    if paths.is_empty() {
        return Err(ReportError::NoInputs(inputs.join(", ")));
    }
    Ok(paths)
}

fn slugify(text: &str) -> String {
    static UNSAFE_CHARS: OnceLock<Regex> = OnceLock::new();
    let unsafe_chars =
        UNSAFE_CHARS.get_or_init(|| Regex::new(r"[^A-Za-z0-9_-]+").expect("valid regex"));
    unsafe_chars
        .replace_all(&text.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

/// File name for an exported report, e.g. `report-checkout-api-run3.html`.
pub fn default_output_name(payload: &ReportPayload, input: &Path, format: ExportFormat) -> String {
    let base = payload
        .plan_name()
        .map(str::to_string)
        .or_else(|| {
            input
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "report".to_string());
    let slug = slugify(&base);
    let slug = if slug.is_empty() { "report".to_string() } else { slug };

    match payload.report_detail.plan_run_no() {
        Some(run) => format!("report-{}-run{}.{}", slug, run, format.extension()),
        None => format!("report-{}.{}", slug, format.extension()),
    }
}

/// Output file names handed out during one batch run.
///
/// A name that is already taken gets the input file stem appended, then a
/// counter, so no report in the batch overwrites another.
#[derive(Debug, Default)]
pub struct OutputNames {
    taken: HashSet<String>,
}

impl OutputNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&mut self, payload: &ReportPayload, input: &Path, format: ExportFormat) -> String {
        let name = default_output_name(payload, input, format);
        if self.taken.insert(name.clone()) {
            return name;
        }

        let ext = format.extension();
        let base = name
            .strip_suffix(&format!(".{}", ext))
            .unwrap_or(&name)
            .to_string();
        let stem = input
            .file_stem()
            .map(|stem| slugify(&stem.to_string_lossy()))
            .filter(|stem| !stem.is_empty());
        if let Some(stem) = stem {
            let candidate = format!("{}-{}.{}", base, stem, ext);
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }

        let mut counter = 2;
        loop {
            let candidate = format!("{}-{}.{}", base, counter, ext);
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            counter += 1;
        }
    }
}

/// Generate report from a payload file
pub async fn generate_report(
    payload_path: &Path,
    format: ExportFormat,
    output: Option<&Path>,
    options: &RenderOptions,
    pretty_json: bool,
) -> Result<()> {
    let payload = load_payload(payload_path)?;
    export_payload(&payload, format, output, options, pretty_json).await
}

/// Export an already loaded payload; `None` writes to stdout.
pub async fn export_payload(
    payload: &ReportPayload,
    format: ExportFormat,
    output: Option<&Path>,
    options: &RenderOptions,
    pretty_json: bool,
) -> Result<()> {
    match format {
        ExportFormat::Html => html::generate(payload, options, output).await,
        ExportFormat::Json => json::generate(payload, pretty_json, output).await,
        ExportFormat::Junit => match output {
            Some(path) => junit::write_report(payload, path),
            None => {
                println!("{}", junit::generate_junit_xml(payload)?);
                Ok(())
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format() {
        assert_eq!("HTML".parse::<ExportFormat>().unwrap(), ExportFormat::Html);
        assert_eq!("xml".parse::<ExportFormat>().unwrap(), ExportFormat::Junit);
        assert!(matches!(
            "pdf".parse::<ExportFormat>(),
            Err(ReportError::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_default_output_name() {
        let payload = ReportPayload::from_json_str(
            r#"{"planSummary":{"planName":"Checkout API / EU"},"reportDetail":{"planRunNo":3}}"#,
        )
        .unwrap();
        assert_eq!(
            default_output_name(&payload, Path::new("in.json"), ExportFormat::Html),
            "report-checkout-api-eu-run3.html"
        );

        let unnamed = ReportPayload::default();
        assert_eq!(
            default_output_name(&unnamed, Path::new("runs/nightly_42.json"), ExportFormat::Junit),
            "report-nightly_42.xml"
        );
    }

    #[test]
    fn test_resolve_inputs_with_glob() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.json", "b.json", "notes.txt"] {
            std::fs::write(dir.path().join(name), "{}").unwrap();
        }
        let pattern = dir.path().join("*.json").to_string_lossy().into_owned();
        let paths = resolve_inputs(&[pattern]).unwrap();
        assert_eq!(paths.len(), 2);

        let missing = dir.path().join("*.yaml").to_string_lossy().into_owned();
        assert!(matches!(
            resolve_inputs(&[missing]),
            Err(ReportError::NoInputs(_))
        ));
    }

    #[test]
    fn test_batch_names_never_collide() {
        let monday = ReportPayload::from_json_str(r#"{"planSummary":{"planName":"Nightly"}}"#).unwrap();
        let tuesday = ReportPayload::from_json_str(r#"{"planSummary":{"planName":"nightly!"}}"#).unwrap();
        let mut names = OutputNames::new();

        assert_eq!(
            names.claim(&monday, Path::new("runs/mon.json"), ExportFormat::Html),
            "report-nightly.html"
        );
        assert_eq!(
            names.claim(&tuesday, Path::new("runs/tue.json"), ExportFormat::Html),
            "report-nightly-tue.html"
        );
        assert_eq!(
            names.claim(&tuesday, Path::new("archive/tue.json"), ExportFormat::Html),
            "report-nightly-2.html"
        );
    }

    #[test]
    fn test_resolve_inputs_drops_repeats() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.json").to_string_lossy().into_owned();
        let b = dir.path().join("b.json").to_string_lossy().into_owned();
        std::fs::write(&a, "{}").unwrap();
        std::fs::write(&b, "{}").unwrap();

        let paths = resolve_inputs(&[a.clone(), b.clone(), a.clone()]).unwrap();
        assert_eq!(paths, vec![PathBuf::from(&a), PathBuf::from(&b)]);
    }

    #[tokio::test]
    async fn test_generate_html_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("run.json");
        let output = dir.path().join("run.html");
        std::fs::write(
            &input,
            r#"{"planSummary":{"planName":"Smoke","total":1,"success":1},"planItems":[{"status":"success","caseName":"Health check"}]}"#,
        )
        .unwrap();

        generate_report(&input, ExportFormat::Html, Some(&output), &RenderOptions::default(), true)
            .await
            .unwrap();

        let html = std::fs::read_to_string(&output).unwrap();
        assert!(html.contains("<title>Test Report - Smoke</title>"));
        assert!(html.contains("Health check"));
    }

    #[tokio::test]
    async fn test_export_loaded_payload() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("report.xml");
        let payload = ReportPayload::from_json_str(
            r#"{"planSummary":{"planName":"Smoke"},"planItems":[{"status":"failed","caseName":"Login"}]}"#,
        )
        .unwrap();

        export_payload(&payload, ExportFormat::Junit, Some(&output), &RenderOptions::default(), true)
            .await
            .unwrap();

        let xml = std::fs::read_to_string(&output).unwrap();
        assert!(xml.contains(r#"name="Login""#));
        assert!(xml.contains("<failure"));
    }

    #[tokio::test]
    async fn test_generate_reports_unreadable_input() {
        let err = generate_report(
            Path::new("/nonexistent/run.json"),
            ExportFormat::Json,
            None,
            &RenderOptions::default(),
            true,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ReportError::Read { .. }));
    }
}
