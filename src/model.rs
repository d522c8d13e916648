//! Record types produced by one extraction pass
//!
//! All entities are immutable value records produced once per run; there is
//! no mutation after creation and no cross-run persistence. Optional lookups
//! that miss degrade to an empty string (or `None` for payload attributes),
//! never to an error.

/// Scalar package metadata from whichever schema variant is present.
///
/// The legacy property set wins only when its `ObjectName` is non-empty;
/// otherwise the modern root attributes are used. `version_major` and
/// `version_minor` exist only in the legacy variant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageInfo {
    pub object_name: String,
    pub description: String,
    pub creation_date: String,
    pub version_major: String,
    pub version_minor: String,
    pub version_build: String,
}

/// A named, typed data-source/destination definition referenced by tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Connection {
    pub name: String,
    pub connection_type: String,
    pub connection_string: String,
}

/// A package variable, sourced from either schema variant.
///
/// Legacy `PackageVariable` elements and modern `Variable` elements are two
/// independent producers appending to the same list; entries with the same
/// name are kept as emitted, never deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub value: String,
    pub namespace: String,
}

/// A unit of work in the workflow, with type-specific detail merged in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Executable {
    pub name: String,
    /// The raw `CreationName`, which drives task-kind classification.
    pub task_type: String,
    pub executable_type: String,
    pub description: String,
    pub dtsid: String,
    pub detail: TaskDetail,
}

/// Type-specific detail block, selected by classifying the raw type string.
///
/// `None` covers both unrecognized task kinds and recognized kinds whose
/// payload element is missing from `ObjectData`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskDetail {
    None,
    FileSystem(FileSystemDetail),
    Sql(SqlDetail),
    Script(ScriptDetail),
    DataFlow(DataFlowDetail),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSystemDetail {
    pub operation: Option<String>,
    pub source: Option<String>,
    pub destination: Option<String>,
    pub overwrite_destination: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqlDetail {
    pub connection: Option<String>,
    pub sql_statement_source: Option<String>,
    pub is_stored_proc: Option<String>,
    pub result_type: Option<String>,
    pub time_out: Option<String>,
    pub code_page: Option<String>,
    pub sql_stmt_source_type: Option<String>,
}

/// Embedded script task detail.
///
/// `code` is the best-effort entry-point excerpt produced by
/// [`crate::extract::script::isolate_entry_point`]; `None` means no script
/// source was found in any known payload shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptDetail {
    pub language: String,
    pub entry_point: String,
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataFlowDetail {
    pub data_flow_type: String,
    pub components: Vec<DataFlowComponent>,
}

/// A named processing step inside a data-flow-type task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataFlowComponent {
    pub name: String,
    pub component_type: String,
}

/// A directed dependency edge between two tasks.
///
/// `from_executable` is the child reference flagged `IsFrom`; every other
/// reference overwrites `to_executable`, so with more than two references
/// only the last non-from one survives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrecedenceConstraint {
    pub name: String,
    pub dtsid: String,
    pub from_executable: String,
    pub to_executable: String,
    pub value: String,
    pub eval_op: String,
    pub expression: String,
}

/// The normalized record set for one package document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageReport {
    pub package: PackageInfo,
    pub connections: Vec<Connection>,
    pub variables: Vec<Variable>,
    pub executables: Vec<Executable>,
    pub constraints: Vec<PrecedenceConstraint>,
}
