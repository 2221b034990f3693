//! Prompt loader for built-in and workspace prompt definitions.

use crate::types::PromptDefinition;
use policyqa_core::{AppError, AppResult};
use std::path::Path;

/// Prompt used to answer one question from document chunks.
pub const EXTRACT_ANSWER_PROMPT: &str = "extract-answer";

/// Prompt used to check a document chunk against criteria.
pub const VERIFY_DOCUMENT_PROMPT: &str = "verify-document";

const BUILTIN_PROMPTS: [(&str, &str); 2] = [
    (
        EXTRACT_ANSWER_PROMPT,
        include_str!("../prompts/extract-answer.yml"),
    ),
    (
        VERIFY_DOCUMENT_PROMPT,
        include_str!("../prompts/verify-document.yml"),
    ),
];

/// Load a prompt definition by ID.
///
/// A file named `<id>.yml` in the workspace's `.policyqa/prompts/` directory
/// overrides the built-in definition of the same ID.
///
/// # Example
/// ```no_run
/// use policyqa_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), "extract-answer")?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = workspace_path
        .join(".policyqa/prompts")
        .join(format!("{}.yml", prompt_id));

    if !prompt_file.exists() {
        return builtin_prompt(prompt_id);
    }

    tracing::debug!("Loading prompt override from: {:?}", prompt_file);

    let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    let definition = parse_prompt(&contents, &prompt_file.display().to_string())?;

    if definition.id != prompt_id {
        return Err(AppError::Prompt(format!(
            "Prompt file {:?} declares id '{}', expected '{}'",
            prompt_file, definition.id, prompt_id
        )));
    }

    tracing::info!("Loaded prompt override: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// Load one of the prompt definitions compiled into the binary.
pub fn builtin_prompt(prompt_id: &str) -> AppResult<PromptDefinition> {
    let (_, contents) = BUILTIN_PROMPTS
        .iter()
        .find(|(id, _)| *id == prompt_id)
        .ok_or_else(|| AppError::Prompt(format!("Unknown prompt: {}", prompt_id)))?;

    parse_prompt(contents, prompt_id)
}

fn parse_prompt(contents: &str, origin: &str) -> AppResult<PromptDefinition> {
    let definition: PromptDefinition = serde_yaml::from_str(contents)
        .map_err(|e| AppError::Prompt(format!("Failed to parse prompt YAML {}: {}", origin, e)))?;

    validate_prompt(&definition)?;

    Ok(definition)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.template.is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    if def.output.format == "json" && def.output.schema.is_none() {
        return Err(AppError::Prompt(format!(
            "Prompt '{}' declares JSON output without a schema",
            def.id
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_override(dir: &Path, id: &str, content: &str) {
        let prompts_dir = dir.join(".policyqa/prompts");
        fs::create_dir_all(&prompts_dir).unwrap();
        fs::write(prompts_dir.join(format!("{}.yml", id)), content).unwrap();
    }

    #[test]
    fn test_builtin_prompts_parse() {
        let extract = builtin_prompt(EXTRACT_ANSWER_PROMPT).unwrap();
        assert!(extract.system.as_deref().unwrap().contains("policy and legal documents"));
        assert!(extract.template.contains("{{#each documentChunks}}"));
        assert_eq!(extract.output.format, "json");

        let verify = builtin_prompt(VERIFY_DOCUMENT_PROMPT).unwrap();
        let schema = verify.output.schema.unwrap();
        assert_eq!(schema["properties"]["isValid"]["type"], "boolean");
    }

    #[test]
    fn test_unknown_builtin() {
        assert!(builtin_prompt("nonexistent").is_err());
    }

    #[test]
    fn test_load_falls_back_to_builtin() {
        let temp_dir = TempDir::new().unwrap();
        let prompt = load_prompt(temp_dir.path(), EXTRACT_ANSWER_PROMPT).unwrap();
        assert_eq!(prompt.id, EXTRACT_ANSWER_PROMPT);
    }

    #[test]
    fn test_workspace_override() {
        let temp_dir = TempDir::new().unwrap();
        write_override(
            temp_dir.path(),
            EXTRACT_ANSWER_PROMPT,
            r#"
id: extract-answer
title: "Custom extractor"
apiVersion: "1.1"
behavior: {tone: formal, style: terse}
template: "Q: {{question}}"
output: {format: text}
"#,
        );

        let prompt = load_prompt(temp_dir.path(), EXTRACT_ANSWER_PROMPT).unwrap();
        assert_eq!(prompt.title, "Custom extractor");
        assert_eq!(prompt.template, "Q: {{question}}");
    }

    #[test]
    fn test_override_with_mismatched_id() {
        let temp_dir = TempDir::new().unwrap();
        write_override(
            temp_dir.path(),
            EXTRACT_ANSWER_PROMPT,
            r#"
id: something-else
title: "Wrong"
apiVersion: "1.0"
behavior: {tone: formal, style: terse}
template: "x"
output: {format: text}
"#,
        );

        assert!(load_prompt(temp_dir.path(), EXTRACT_ANSWER_PROMPT).is_err());
    }

    #[test]
    fn test_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        write_override(temp_dir.path(), "broken", "invalid: yaml: content:");
        assert!(load_prompt(temp_dir.path(), "broken").is_err());
    }

    #[test]
    fn test_json_output_requires_schema() {
        let yaml = r#"
id: no-schema
title: "No schema"
apiVersion: "1.0"
behavior: {tone: formal, style: terse}
template: "x"
output: {format: json}
"#;
        assert!(parse_prompt(yaml, "inline").is_err());
    }
}
