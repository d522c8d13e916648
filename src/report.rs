//! Console report rendering
//!
//! Sectioned textual output: package banner, connections, variables, tasks
//! with type-specific detail lines, and precedence constraints. Long fields
//! are truncated for display (100 characters for connection strings and
//! variable values, 10 lines for script code, 3 entries for data-flow
//! components). Empty connection/variable/task sections still print their
//! header with a zero count; the constraint section is omitted entirely when
//! empty.

use crate::model::{
    DataFlowDetail, Executable, FileSystemDetail, PackageReport, ScriptDetail, SqlDetail,
    TaskDetail,
};

const BANNER_WIDTH: usize = 80;
const RULE_WIDTH: usize = 50;
const VALUE_DISPLAY_LIMIT: usize = 100;
const SCRIPT_LINE_LIMIT: usize = 10;
const COMPONENT_DISPLAY_LIMIT: usize = 3;

/// Render the full report for one extracted package.
pub fn render(report: &PackageReport) -> String {
    let mut out = String::new();

    out.push_str(&"=".repeat(BANNER_WIDTH));
    out.push_str("\nDTSX PACKAGE ANALYSIS\n");
    out.push_str(&"=".repeat(BANNER_WIDTH));
    out.push('\n');

    out.push_str(&format!("\n\u{1F4E6} PACKAGE: {}\n", report.package.object_name));
    out.push_str(&format!(
        "   Version: {}.{}.{}\n",
        report.package.version_major, report.package.version_minor, report.package.version_build
    ));
    out.push_str(&format!("   Created: {}\n", report.package.creation_date));

    out.push_str(&format!(
        "\n\u{1F50C} CONNECTIONS ({}):\n",
        report.connections.len()
    ));
    out.push_str(&rule());
    for (i, conn) in report.connections.iter().enumerate() {
        out.push_str(&format!("{:2}. {}\n", i + 1, conn.name));
        out.push_str(&format!("    Type: {}\n", conn.connection_type));
        if !conn.connection_string.is_empty() {
            out.push_str(&format!(
                "    Connection: {}\n",
                truncated(&conn.connection_string)
            ));
        }
        out.push('\n');
    }

    out.push_str(&format!(
        "\n\u{1F4CB} PARAMETERS AND VARIABLES ({}):\n",
        report.variables.len()
    ));
    out.push_str(&rule());
    for (i, var) in report.variables.iter().enumerate() {
        out.push_str(&format!("{:2}. {}\n", i + 1, var.name));
        out.push_str(&format!("    Namespace: {}\n", var.namespace));
        if !var.value.is_empty() {
            out.push_str(&format!("    Value: {}\n", truncated(&var.value)));
        }
        out.push('\n');
    }

    out.push_str(&format!(
        "\n\u{2699}\u{FE0F} TASKS ({}):\n",
        report.executables.len()
    ));
    out.push_str(&rule());
    for (i, task) in report.executables.iter().enumerate() {
        render_task(&mut out, i + 1, task);
    }

    if !report.constraints.is_empty() {
        out.push_str(&format!(
            "\n\u{1F517} PRECEDENCE CONSTRAINTS ({}):\n",
            report.constraints.len()
        ));
        out.push_str(&rule());
        for (i, constraint) in report.constraints.iter().enumerate() {
            out.push_str(&format!("{:2}. {}\n", i + 1, constraint.name));
            out.push_str(&format!("    From: {}\n", constraint.from_executable));
            out.push_str(&format!("    To: {}\n", constraint.to_executable));
            if !constraint.expression.is_empty() {
                out.push_str(&format!("    Expression: {}\n", constraint.expression));
            }
            out.push('\n');
        }
    }

    out
}

fn render_task(out: &mut String, number: usize, task: &Executable) {
    out.push_str(&format!("{:2}. {}\n", number, task.name));
    out.push_str(&format!("    Type: {}\n", task.task_type));
    if !task.description.is_empty() {
        out.push_str(&format!("    Description: {}\n", task.description));
    }

    match &task.detail {
        TaskDetail::FileSystem(detail) => render_file_system(out, detail),
        TaskDetail::Sql(detail) => render_sql(out, detail),
        TaskDetail::Script(detail) => render_script(out, detail),
        TaskDetail::DataFlow(detail) => render_data_flow(out, detail),
        TaskDetail::None => {}
    }

    out.push('\n');
}

fn render_file_system(out: &mut String, detail: &FileSystemDetail) {
    if let Some(operation) = &detail.operation {
        out.push_str(&format!("    Operation: {}\n", operation));
    }
    if let Some(source) = &detail.source {
        out.push_str(&format!("    Source: {}\n", source));
    }
    if let Some(destination) = &detail.destination {
        out.push_str(&format!("    Destination: {}\n", destination));
    }
}

fn render_sql(out: &mut String, detail: &SqlDetail) {
    match detail
        .sql_statement_source
        .as_deref()
        .filter(|sql| !sql.is_empty())
    {
        // Statement display always carries the marker, however short.
        Some(sql) => {
            let head: String = sql.chars().take(VALUE_DISPLAY_LIMIT).collect();
            out.push_str(&format!("    SQL: {}...\n", head));
        }
        None => out.push_str("    SQL: (query not found)\n"),
    }
    if let Some(connection) = &detail.connection {
        out.push_str(&format!("    Connection: {}\n", connection));
    }
    if let Some(is_stored_proc) = &detail.is_stored_proc {
        out.push_str(&format!("    Stored procedure: {}\n", is_stored_proc));
    }
}

fn render_script(out: &mut String, detail: &ScriptDetail) {
    out.push_str(&format!("    Language: {}\n", detail.language));
    out.push_str(&format!("    Entry point: {}\n", detail.entry_point));
    match &detail.code {
        Some(code) => {
            out.push_str("    Main code:\n");
            let lines: Vec<&str> = code.split('\n').collect();
            for (j, line) in lines.iter().take(SCRIPT_LINE_LIMIT).enumerate() {
                out.push_str(&format!("      {:2}: {}\n", j + 1, line));
            }
            if lines.len() > SCRIPT_LINE_LIMIT {
                out.push_str(&format!(
                    "      ... ({} more lines)\n",
                    lines.len() - SCRIPT_LINE_LIMIT
                ));
            }
        }
        None => out.push_str("    Main code: (no script code found)\n"),
    }
}

fn render_data_flow(out: &mut String, detail: &DataFlowDetail) {
    out.push_str(&format!("    Components: {}\n", detail.components.len()));
    for component in detail.components.iter().take(COMPONENT_DISPLAY_LIMIT) {
        out.push_str(&format!(
            "      - {} ({})\n",
            component.name, component.component_type
        ));
    }
    if detail.components.len() > COMPONENT_DISPLAY_LIMIT {
        out.push_str(&format!(
            "      ... ({} more components)\n",
            detail.components.len() - COMPONENT_DISPLAY_LIMIT
        ));
    }
}

fn rule() -> String {
    format!("{}\n", "-".repeat(RULE_WIDTH))
}

/// Display truncation: values longer than 100 characters are cut and marked.
fn truncated(value: &str) -> String {
    if value.chars().count() > VALUE_DISPLAY_LIMIT {
        let head: String = value.chars().take(VALUE_DISPLAY_LIMIT).collect();
        format!("{}...", head)
    } else {
        value.to_string()
    }
}
