//! Task-kind classification and per-kind payload extraction
//!
//! The raw `CreationName` string is classified into a task kind by substring
//! matching; the match set (including the hard-coded data-flow GUID used by
//! some tool versions instead of a type name) is part of the legacy format
//! and must not be tightened. Detail fields live on a payload element nested
//! under the task's `ObjectData`, in a per-task namespace, so payload
//! elements and attributes are matched by local name.

use roxmltree::Node;
use tracing::debug;

use crate::extract::fields::{local_attr, DTS_NS};
use crate::extract::script;
use crate::model::{
    DataFlowComponent, DataFlowDetail, FileSystemDetail, ScriptDetail, SqlDetail, TaskDetail,
};

/// Type GUID some tool versions emit for data-flow tasks in place of a name.
pub const DATA_FLOW_GUID: &str = "{E3CFBEA8-1F48-40D8-91E1-2DEDC1EDDD56}";

/// Task classification derived from the raw type string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    FileSystem,
    Sql,
    Script,
    DataFlow,
    Other,
}

impl TaskKind {
    /// Substring classification, in the legacy tool's match order.
    pub fn classify(type_name: &str) -> TaskKind {
        if type_name.contains("FileSystemTask") {
            TaskKind::FileSystem
        } else if type_name.contains("ExecuteSQLTask") || type_name.contains("SQLTask") {
            TaskKind::Sql
        } else if type_name.contains("ScriptTask") {
            TaskKind::Script
        } else if type_name.contains("DataFlowTask") || type_name.contains(DATA_FLOW_GUID) {
            TaskKind::DataFlow
        } else {
            TaskKind::Other
        }
    }
}

/// Extract the type-specific detail block for one executable element.
pub fn extract_detail(exe: Node, type_name: &str) -> TaskDetail {
    match TaskKind::classify(type_name) {
        TaskKind::FileSystem => extract_file_system(exe),
        TaskKind::Sql => extract_sql(exe),
        TaskKind::Script => extract_script(exe),
        TaskKind::DataFlow => extract_data_flow(exe),
        TaskKind::Other => TaskDetail::None,
    }
}

fn object_data<'a, 'input>(exe: Node<'a, 'input>) -> Option<Node<'a, 'input>> {
    exe.children()
        .find(|n| n.has_tag_name((DTS_NS, "ObjectData")))
}

fn owned(value: Option<&str>) -> Option<String> {
    value.map(str::to_string)
}

fn extract_file_system(exe: Node) -> TaskDetail {
    let Some(data) =
        object_data(exe).and_then(|od| od.children().find(|n| n.has_tag_name("FileSystemTaskData")))
    else {
        return TaskDetail::None;
    };
    TaskDetail::FileSystem(FileSystemDetail {
        operation: owned(local_attr(data, "Operation")),
        source: owned(local_attr(data, "Source")),
        destination: owned(local_attr(data, "Destination")),
        overwrite_destination: owned(local_attr(data, "OverwriteDestination")),
    })
}

fn extract_sql(exe: Node) -> TaskDetail {
    let Some(data) =
        object_data(exe).and_then(|od| od.children().find(|n| n.has_tag_name("SqlTaskData")))
    else {
        return TaskDetail::None;
    };
    TaskDetail::Sql(SqlDetail {
        connection: owned(local_attr(data, "Connection")),
        sql_statement_source: owned(local_attr(data, "SqlStatementSource")),
        is_stored_proc: owned(local_attr(data, "IsStoredProc")),
        result_type: owned(local_attr(data, "ResultType")),
        time_out: owned(local_attr(data, "TimeOut")),
        code_page: owned(local_attr(data, "CodePage")),
        sql_stmt_source_type: owned(local_attr(data, "SqlStmtSourceType")),
    })
}

fn extract_script(exe: Node) -> TaskDetail {
    let Some(data) = object_data(exe) else {
        return TaskDetail::None;
    };

    if let Some(script_data) = data.children().find(|n| n.has_tag_name("ScriptTaskData")) {
        let raw = owned(local_attr(script_data, "ScriptCode")).or_else(|| {
            script_data
                .children()
                .find(|n| n.is_element() && n.tag_name().name().contains("ScriptCode"))
                .and_then(|n| n.text())
                .map(str::to_string)
        });
        return TaskDetail::Script(ScriptDetail {
            language: local_attr(script_data, "ScriptLanguage")
                .unwrap_or("Unknown")
                .to_string(),
            entry_point: local_attr(script_data, "EntryPoint")
                .unwrap_or("Main")
                .to_string(),
            code: raw
                .filter(|c| !c.is_empty())
                .map(|c| script::isolate_entry_point(&c)),
        });
    }

    // Older payloads bury the source under an arbitrary *Script* element;
    // collect every non-blank text fragment below it.
    if let Some(script_node) = data
        .children()
        .find(|n| n.is_element() && n.tag_name().name().contains("Script"))
    {
        debug!("script task without ScriptTaskData, using nested text fallback");
        let mut raw = String::new();
        for node in script_node.descendants().filter(|n| n.is_element()) {
            if let Some(text) = node.text() {
                if !text.trim().is_empty() {
                    raw.push_str(text);
                }
            }
        }
        return TaskDetail::Script(ScriptDetail {
            language: "C#".to_string(),
            entry_point: "Main".to_string(),
            code: (!raw.is_empty()).then(|| script::isolate_entry_point(&raw)),
        });
    }

    TaskDetail::None
}

fn extract_data_flow(exe: Node) -> TaskDetail {
    let Some(data) =
        object_data(exe).and_then(|od| od.children().find(|n| n.has_tag_name("DataFlow")))
    else {
        return TaskDetail::None;
    };
    let components = data
        .descendants()
        .filter(|n| n.has_tag_name("Component"))
        .map(|c| DataFlowComponent {
            name: local_attr(c, "Name").unwrap_or("").to_string(),
            component_type: local_attr(c, "ComponentClassID").unwrap_or("").to_string(),
        })
        .collect();
    TaskDetail::DataFlow(DataFlowDetail {
        data_flow_type: "Data Flow Task".to_string(),
        components,
    })
}
