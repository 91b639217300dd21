//! JSON output formatting

use serde_json::{json, Value};

use crate::output::formatter::Report;

pub fn format_json(report: &Report) -> String {
    let data: Value = match report {
        Report::Containers(names) => json!({ "containers": names }),
        other => serde_json::to_value(other).unwrap_or(json!(null)),
    };

    serde_json::to_string_pretty(&data).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{BuildStage, CreateReport};

    #[test]
    fn test_containers_json() {
        let out = format_json(&Report::Containers(vec!["a".into(), "b".into()]));
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value, json!({ "containers": ["a", "b"] }));
    }

    #[test]
    fn test_created_json() {
        let report = Report::Created(CreateReport {
            name: "demo".into(),
            stage: BuildStage::Scaffolded,
            warnings: Vec::new(),
        });
        let value: Value = serde_json::from_str(&format_json(&report)).unwrap();
        assert_eq!(value["name"], "demo");
        assert_eq!(value["stage"], "scaffolded");
    }
}
