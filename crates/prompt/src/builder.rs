//! Prompt builder for rendering templates.

use crate::types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition};
use handlebars::Handlebars;
use policyqa_core::{AppError, AppResult};
use serde::Serialize;

/// Build a prompt from a definition and template variables.
///
/// `variables` must serialize to a JSON object holding every variable the
/// definition declares in `input.variables`; arrays are allowed so templates
/// can iterate with `{{#each}}`.
///
/// # Example
/// ```no_run
/// use policyqa_prompt::{build_prompt, builtin_prompt};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let def = builtin_prompt("extract-answer")?;
/// let vars = serde_json::json!({
///     "question": "How many leave days?",
///     "documentChunks": ["25 days of paid annual leave"],
/// });
/// let built = build_prompt(&def, &vars)?;
/// println!("User prompt: {}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt<V: Serialize>(
    definition: &PromptDefinition,
    variables: &V,
) -> AppResult<BuiltPrompt> {
    tracing::trace!("Building prompt: {}", definition.id);

    let context = serde_json::to_value(variables)?;
    let provided = context.as_object().ok_or_else(|| {
        AppError::Prompt(format!(
            "Variables for prompt '{}' must be an object",
            definition.id
        ))
    })?;

    let missing: Vec<&str> = definition
        .input
        .variables
        .iter()
        .filter(|name| !provided.contains_key(name.as_str()))
        .map(String::as_str)
        .collect();

    if !missing.is_empty() {
        return Err(AppError::Prompt(format!(
            "Prompt '{}' is missing variables: {}",
            definition.id,
            missing.join(", ")
        )));
    }

    let user = render_template(&definition.template, &context)?;
    let mut resolved_variables: Vec<String> = provided.keys().cloned().collect();
    resolved_variables.sort();

    Ok(BuiltPrompt {
        system: definition.system.clone(),
        user,
        response_schema: definition.output.schema.clone(),
        metadata: BuiltPromptMetadata {
            source_prompt_id: definition.id.clone(),
            resolved_variables,
        },
    })
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &serde_json::Value) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Plain text, never HTML
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("prompt", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{builtin_prompt, EXTRACT_ANSWER_PROMPT, VERIFY_DOCUMENT_PROMPT};
    use crate::types::{PromptBehavior, PromptInputSpec, PromptOutputSpec};

    fn create_test_definition(template: &str, variables: &[&str]) -> PromptDefinition {
        PromptDefinition {
            id: "test.prompt".to_string(),
            title: "Test".to_string(),
            api_version: "1.0".to_string(),
            created_by: "test".to_string(),
            behavior: PromptBehavior {
                tone: "professional".to_string(),
                style: "concise".to_string(),
            },
            system: Some("persona".to_string()),
            input: PromptInputSpec {
                variables: variables.iter().map(|v| v.to_string()).collect(),
            },
            template: template.to_string(),
            output: PromptOutputSpec {
                format: "text".to_string(),
                schema: None,
            },
        }
    }

    #[test]
    fn test_render_simple_template() {
        let vars = serde_json::json!({"question": "Hello, world?"});
        let result = render_template("Question: {{question}}", &vars).unwrap();
        assert_eq!(result, "Question: Hello, world?");
    }

    #[test]
    fn test_no_html_escaping() {
        let vars = serde_json::json!({"question": "Is \"A & B\" <covered>?"});
        let result = render_template("{{question}}", &vars).unwrap();
        assert_eq!(result, "Is \"A & B\" <covered>?");
    }

    #[test]
    fn test_build_prompt_carries_system_and_metadata() {
        let def = create_test_definition("Q: {{question}}", &["question"]);
        let built = build_prompt(&def, &serde_json::json!({"question": "Why?"})).unwrap();

        assert_eq!(built.user, "Q: Why?");
        assert_eq!(built.system.as_deref(), Some("persona"));
        assert!(built.response_schema.is_none());
        assert_eq!(built.metadata.source_prompt_id, "test.prompt");
        assert_eq!(built.metadata.resolved_variables, vec!["question".to_string()]);
    }

    #[test]
    fn test_missing_declared_variable() {
        let def = create_test_definition("{{question}} {{documentChunks}}", &["question", "documentChunks"]);
        let err = build_prompt(&def, &serde_json::json!({"question": "Why?"})).unwrap_err();
        assert!(err.to_string().contains("documentChunks"));
    }

    #[test]
    fn test_variables_must_be_object() {
        let def = create_test_definition("x", &[]);
        assert!(build_prompt(&def, &vec!["not", "an", "object"]).is_err());
    }

    #[test]
    fn test_extract_answer_template_lists_chunks_in_order() {
        let def = builtin_prompt(EXTRACT_ANSWER_PROMPT).unwrap();
        let vars = serde_json::json!({
            "question": "What is the grace period?",
            "documentChunks": ["first passage", "second passage"],
        });

        let built = build_prompt(&def, &vars).unwrap();
        assert!(built.user.contains("What is the grace period?"));
        assert!(built.user.contains("---"));
        let first = built.user.find("first passage").unwrap();
        let second = built.user.find("second passage").unwrap();
        assert!(first < second);
        assert!(built.system.unwrap().contains("blank line"));
        assert!(built.response_schema.is_some());
    }

    #[test]
    fn test_verify_template() {
        let def = builtin_prompt(VERIFY_DOCUMENT_PROMPT).unwrap();
        let vars = serde_json::json!({
            "documentChunk": "Employees get 25 days of leave.",
            "criteria": "Must state the leave entitlement",
        });

        let built = build_prompt(&def, &vars).unwrap();
        assert!(built.user.contains("Employees get 25 days of leave."));
        assert!(built.user.contains("\"Must state the leave entitlement\""));
    }
}
