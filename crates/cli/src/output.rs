// Output formatting for CLI

use anyhow::Result;
use flowwait_client::Workflow;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Self {
        match s {
            "json" => OutputFormat::Json,
            "yaml" => OutputFormat::Yaml,
            _ => OutputFormat::Text,
        }
    }

    /// Render a value in a structured format; `None` for text output
    pub fn render<T: Serialize>(&self, value: &T) -> Result<Option<String>> {
        let rendered = match self {
            OutputFormat::Json => Some(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Some(serde_yaml::to_string(value)?),
            // Text format is handled by each command
            OutputFormat::Text => None,
        };
        Ok(rendered)
    }

    pub fn print_value<T: Serialize>(&self, value: &T) -> Result<()> {
        if let Some(rendered) = self.render(value)? {
            println!("{}", rendered.trim_end());
        }
        Ok(())
    }

    pub fn is_text(&self) -> bool {
        matches!(self, OutputFormat::Text)
    }
}

/// Print a simple key-value pair for text output
pub fn print_field(label: &str, value: &str) {
    println!("{:<14} {}", format!("{}:", label), value);
}

/// Print a workflow in the requested format
///
/// Quiet text output is just the name, for use in scripts.
pub fn print_workflow(output: OutputFormat, quiet: bool, workflow: &Workflow) -> Result<()> {
    if !output.is_text() {
        return output.print_value(workflow);
    }

    if quiet {
        println!("{}", workflow.name());
        return Ok(());
    }

    print_field("Name", workflow.name());
    print_field("Namespace", workflow.namespace());
    print_field("Phase", &workflow.phase().to_string());
    if let Some(message) = workflow.status.extra.get("message").and_then(|m| m.as_str()) {
        print_field("Message", message);
    }
    Ok(())
}
