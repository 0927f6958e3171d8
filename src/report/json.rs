use super::error::{ReportError, Result};
use super::types::ReportPayload;
use std::path::Path;

/// Generate JSON report (the normalized payload)
pub async fn generate(payload: &ReportPayload, pretty: bool, output: Option<&Path>) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(payload)?
    } else {
        serde_json::to_string(payload)?
    };

    if let Some(path) = output {
        std::fs::write(path, json).map_err(|source| ReportError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        println!("JSON report saved to: {}", path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_writes_normalized_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let payload = ReportPayload::from_json_str(
            r#"{"code":200,"data":{"planSummary":{"planName":"Smoke"},"planItems":[{"status":"success","caseName":"Ping"}]}}"#,
        )
        .unwrap();

        generate(&payload, true, Some(&path)).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\n  \"planSummary\""));
        let back = ReportPayload::from_json_str(&written).unwrap();
        assert_eq!(back, payload);
    }
}
