use super::ProjectStatus;
use crate::errors::Result;

pub fn render_json(
    status: &ProjectStatus,
    project_dir: &str,
    now: &str,
) -> Result<String> {
    let v = serde_json::json!({
        "generated_at": now,
        "project_dir": project_dir,
        "coverage_percent": (status.coverage_percent() * 10.0).round() / 10.0,
        "status": status,
    });
    Ok(serde_json::to_string_pretty(&v)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_report_embeds_status() {
        let status = ProjectStatus {
            total_files: 3,
            files_with_metadata: 1,
            files_without_metadata: 2,
            ..ProjectStatus::default()
        };
        let text = render_json(&status, "/proj", "now").unwrap();
        let v: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["coverage_percent"], 33.3);
        assert_eq!(v["status"]["total_files"], 3);
        assert_eq!(v["project_dir"], "/proj");
    }
}
