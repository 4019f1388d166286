//! System instructions for a turn.

use std::fmt::Write;

use tether_core::{CallableTool, ToolSet};

use crate::config::AgentConfig;

/// Render the system instructions: operating rules, every available
/// capability with its required parameters, and a task-to-capability
/// mapping.
pub fn system_prompt(config: &AgentConfig, tools: &ToolSet) -> String {
    let mut prompt = format!(
        "You are {name}. You have access to several tools that can fetch and change data.\n\
         \n\
         CRITICAL RULES:\n\
         1. ALWAYS use tools to fetch data - NEVER make up or assume information\n\
         2. When asked about data, you MUST call the appropriate tool first\n\
         3. DO NOT answer that nothing exists without checking via tools\n\
         4. After getting tool results, format them nicely for the user\n\
         \n\
         Your available tools:\n",
        name = config.assistant_name
    );

    for tool in tools.iter() {
        let _ = writeln!(prompt, "{}", tool_line(tool));
    }

    prompt.push_str("\nTask-to-Tool mapping:\n");
    for hint in &config.task_hints {
        let _ = writeln!(prompt, "- \"{}\" → CALL {}", hint.request, hint.call);
    }
    for tool in tools.iter() {
        let _ = writeln!(prompt, "{}", mapping_line(tool));
    }

    prompt.push_str(
        "\nIMPORTANT: The first thing you should do when asked for data is call the appropriate tool!",
    );
    prompt
}

fn tool_line(tool: &CallableTool) -> String {
    let required: Vec<&str> = tool
        .param_spec()
        .required_fields()
        .map(|field| field.name.as_str())
        .collect();

    let mut line = format!("- {}: {}", tool.name(), tool.description());
    if !required.is_empty() {
        let _ = write!(line, " (requires: {})", required.join(", "));
    }
    line
}

fn mapping_line(tool: &CallableTool) -> String {
    let arguments: Vec<String> = tool
        .param_spec()
        .required_fields()
        .map(|field| format!("{}=\"...\"", field.name))
        .collect();

    let request = if tool.description().is_empty() {
        tool.name().replace('_', " ")
    } else {
        tool.description().to_lowercase()
    };

    format!(
        "- \"{request}\" → CALL {}({})",
        tool.name(),
        arguments.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TaskHint;
    use serde_json::json;
    use std::sync::Arc;
    use tether_core::{
        CapabilityDescriptor, CapabilityInvoker, CapabilityOutput, ToolResult,
    };

    struct NoopInvoker;

    #[async_trait::async_trait]
    impl CapabilityInvoker for NoopInvoker {
        async fn call_capability(
            &self,
            _name: &str,
            _arguments: serde_json::Map<String, serde_json::Value>,
        ) -> ToolResult<CapabilityOutput> {
            Ok(CapabilityOutput::default())
        }
    }

    fn tools() -> ToolSet {
        let invoker: Arc<dyn CapabilityInvoker> = Arc::new(NoopInvoker);
        ToolSet::new([
            CallableTool::new(
                CapabilityDescriptor::new("list_expenses", "List all expenses", json!({})),
                invoker.clone(),
            ),
            CallableTool::new(
                CapabilityDescriptor::new(
                    "list_expenses_by_date",
                    "List expenses within a date range",
                    json!({
                        "type": "object",
                        "properties": {
                            "endDate": { "type": "string" },
                            "startDate": { "type": "string" }
                        },
                        "required": ["endDate", "startDate"]
                    }),
                ),
                invoker,
            ),
        ])
    }

    #[test]
    fn test_names_every_tool_with_required_parameters() {
        let prompt = system_prompt(&AgentConfig::default(), &tools());

        assert!(prompt.starts_with("You are Tether assistant."));
        assert!(prompt.contains("- list_expenses: List all expenses\n"));
        assert!(prompt.contains(
            "- list_expenses_by_date: List expenses within a date range (requires: endDate, startDate)"
        ));
    }

    #[test]
    fn test_task_mapping() {
        let config = AgentConfig::default()
            .with_task_hint(TaskHint::new("show all expenses", "list_expenses()"));
        let prompt = system_prompt(&config, &tools());

        let mapping = prompt.split("Task-to-Tool mapping:\n").nth(1).unwrap();
        let lines: Vec<&str> = mapping.lines().take(3).collect();
        assert_eq!(lines[0], "- \"show all expenses\" → CALL list_expenses()");
        assert_eq!(lines[1], "- \"list all expenses\" → CALL list_expenses()");
        assert_eq!(
            lines[2],
            "- \"list expenses within a date range\" → CALL list_expenses_by_date(endDate=\"...\", startDate=\"...\")"
        );
    }
}
