//! Language detection heuristics for container images.

use std::collections::HashMap;

const LANGUAGE_HINTS: &[(&str, &str)] = &[
    ("python", "python"),
    ("py", "python"),
    ("django", "python"),
    ("flask", "python"),
    ("fastapi", "python"),
    ("node", "nodejs"),
    ("nodejs", "nodejs"),
    ("npm", "nodejs"),
    ("yarn", "nodejs"),
    ("java", "java"),
    ("jre", "java"),
    ("jvm", "java"),
    ("spring", "java"),
    ("golang", "go"),
    ("go", "go"),
    ("dotnet", "dotnet"),
    ("aspnet", "dotnet"),
    ("ruby", "ruby"),
    ("rails", "ruby"),
];

/// An explicit `telemetry.mindops/language` label wins; otherwise a
/// substring match against the image name.
pub fn detect_language(image: &str, labels: &HashMap<String, String>) -> String {
    if let Some(hint) = labels.get("telemetry.mindops/language") {
        return hint.clone();
    }
    let lowered = image.to_lowercase();
    for (token, language) in LANGUAGE_HINTS {
        if lowered.contains(token) {
            return (*language).to_string();
        }
    }
    "unknown".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_hint_wins_over_image_match() {
        let mut labels = HashMap::new();
        labels.insert("telemetry.mindops/language".to_string(), "rust".to_string());
        assert_eq!(detect_language("python:3.12", &labels), "rust");
    }

    #[test]
    fn falls_back_to_image_substring() {
        assert_eq!(detect_language("my-registry/django-app:latest", &HashMap::new()), "python");
    }

    #[test]
    fn unknown_image_yields_unknown() {
        assert_eq!(detect_language("scratch", &HashMap::new()), "unknown");
    }
}
