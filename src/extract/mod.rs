//! Package document extraction
//!
//! One synchronous pass over the parsed XML tree producing the normalized
//! record set. Entity discovery is a descendant search (the legacy reader's
//! `.//` behavior): false positives this produces, such as the inner
//! connection manager nested inside `ObjectData` or the executable-reference
//! children of precedence constraints, are dropped by the name filter.
//!
//! Field-level lookup misses always degrade to empty values; the only fatal
//! condition is failing to read or parse the document itself.

pub mod fields;
pub mod script;
pub mod tasks;

use roxmltree::{Document, Node};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::model::{
    Connection, Executable, PackageInfo, PackageReport, PrecedenceConstraint, Variable,
};
use fields::{dts_attr, is_named, local_attr, prop_or_attr, property, DTS_NS};

/// The one fatal failure tier: the document could not be loaded.
#[derive(Debug, Error)]
pub enum InspectError {
    #[error("failed to read package file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse package XML")]
    Parse(#[from] roxmltree::Error),
}

/// Read and parse a package file, then extract its record set.
pub fn inspect_file(path: &Path) -> Result<PackageReport, InspectError> {
    let text = fs::read_to_string(path).map_err(|source| InspectError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let doc = Document::parse(&text)?;
    Ok(extract_package(&doc))
}

/// Extract the full record set from a parsed document.
pub fn extract_package(doc: &Document) -> PackageReport {
    let root = doc.root_element();
    let report = PackageReport {
        package: extract_package_info(root),
        connections: extract_connections(root),
        variables: extract_variables(root),
        executables: extract_executables(root),
        constraints: extract_constraints(root),
    };
    info!(
        connections = report.connections.len(),
        variables = report.variables.len(),
        executables = report.executables.len(),
        constraints = report.constraints.len(),
        "package extracted"
    );
    report
}

fn dts_descendants<'a, 'input>(
    root: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    root.descendants()
        .filter(move |n| n.has_tag_name((DTS_NS, name)))
}

fn extract_package_info(root: Node) -> PackageInfo {
    let mut info = PackageInfo::default();

    // Legacy variant: properties directly on the package root.
    for prop in root
        .children()
        .filter(|n| n.has_tag_name((DTS_NS, "Property")))
    {
        let Some(name) = prop.attribute((DTS_NS, "Name")) else {
            continue;
        };
        let value = prop.text().unwrap_or("").to_string();
        match name {
            "ObjectName" => info.object_name = value,
            "Description" => info.description = value,
            "CreationDate" => info.creation_date = value,
            "VersionMajor" => info.version_major = value,
            "VersionMinor" => info.version_minor = value,
            "VersionBuild" => info.version_build = value,
            _ => {}
        }
    }

    // Modern variant: attributes on the root element. The legacy set wins
    // only when its ObjectName is non-empty; major/minor stay legacy-only.
    if info.object_name.is_empty() {
        info.object_name = dts_attr(root, "ObjectName").unwrap_or("").to_string();
        info.description = dts_attr(root, "Description").unwrap_or("").to_string();
        info.creation_date = dts_attr(root, "CreationDate").unwrap_or("").to_string();
        info.version_build = dts_attr(root, "VersionBuild").unwrap_or("").to_string();
    }

    info
}

fn extract_connections(root: Node) -> Vec<Connection> {
    let mut connections = Vec::new();
    for conn in dts_descendants(root, "ConnectionManager") {
        let name = prop_or_attr(conn, "ObjectName");
        if !is_named(&name) {
            continue;
        }
        let connection_string = conn
            .children()
            .find(|n| n.has_tag_name((DTS_NS, "ObjectData")))
            .and_then(|od| {
                od.children()
                    .find(|n| n.has_tag_name((DTS_NS, "ConnectionManager")))
            })
            .map(|inner| prop_or_attr(inner, "ConnectionString"))
            .unwrap_or_default();
        connections.push(Connection {
            name,
            connection_type: prop_or_attr(conn, "CreationName"),
            connection_string,
        });
    }
    connections
}

fn extract_variables(root: Node) -> Vec<Variable> {
    let mut variables = Vec::new();

    // Legacy producer: property-based PackageVariable elements.
    for var in dts_descendants(root, "PackageVariable") {
        let name = property(var, "ObjectName").unwrap_or_default();
        if !is_named(&name) {
            continue;
        }
        variables.push(Variable {
            name,
            value: property(var, "PackageVariableValue").unwrap_or_default(),
            namespace: property(var, "Namespace").unwrap_or_default(),
        });
    }

    // Modern producer: attribute-based Variable elements with a nested value.
    // Both producers append; same-named entries stay duplicated as emitted.
    for var in dts_descendants(root, "Variable") {
        let name = dts_attr(var, "ObjectName").unwrap_or("").to_string();
        if !is_named(&name) {
            continue;
        }
        let value = var
            .children()
            .find(|n| n.has_tag_name((DTS_NS, "VariableValue")))
            .and_then(|n| n.text())
            .unwrap_or("")
            .to_string();
        variables.push(Variable {
            name,
            value,
            namespace: dts_attr(var, "Namespace").unwrap_or("").to_string(),
        });
    }

    variables
}

fn extract_executables(root: Node) -> Vec<Executable> {
    let mut executables = Vec::new();
    // The package root is itself an Executable element in both schema
    // variants; only true descendants are tasks.
    for exe in dts_descendants(root, "Executable").filter(|n| *n != root) {
        let name = prop_or_attr(exe, "ObjectName");
        if !is_named(&name) {
            continue;
        }
        let task_type = prop_or_attr(exe, "CreationName");
        debug!(task = %name, task_type = %task_type, "executable found");
        executables.push(Executable {
            detail: tasks::extract_detail(exe, &task_type),
            executable_type: dts_attr(exe, "ExecutableType").unwrap_or("").to_string(),
            description: prop_or_attr(exe, "Description"),
            dtsid: prop_or_attr(exe, "DTSID"),
            name,
            task_type,
        });
    }
    executables
}

fn extract_constraints(root: Node) -> Vec<PrecedenceConstraint> {
    let mut constraints = Vec::new();
    for constraint in dts_descendants(root, "PrecedenceConstraint") {
        let name = prop_or_attr(constraint, "ObjectName");
        if name.is_empty() {
            continue;
        }

        let mut from_executable = String::new();
        let mut to_executable = String::new();
        for reference in constraint
            .children()
            .filter(|n| n.has_tag_name((DTS_NS, "Executable")))
        {
            let id = local_attr(reference, "IDREF").unwrap_or("").to_string();
            if local_attr(reference, "IsFrom") == Some("1") {
                from_executable = id;
            } else {
                // Sequential overwrite: with more than two references only
                // the last non-from one survives.
                to_executable = id;
            }
        }

        constraints.push(PrecedenceConstraint {
            name,
            dtsid: prop_or_attr(constraint, "DTSID"),
            from_executable,
            to_executable,
            value: prop_or_attr(constraint, "Value"),
            eval_op: prop_or_attr(constraint, "EvalOp"),
            expression: prop_or_attr(constraint, "Expression"),
        });
    }
    constraints
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskDetail;

    fn parse(xml: &str) -> Document {
        Document::parse(xml).expect("test document parses")
    }

    const LEGACY_DOC: &str = r#"
<DTS:Executable xmlns:DTS="www.microsoft.com/SqlServer/Dts">
  <DTS:Property DTS:Name="ObjectName">NightlyLoad</DTS:Property>
  <DTS:Property DTS:Name="Description">Loads the nightly extract</DTS:Property>
  <DTS:Property DTS:Name="CreationDate">2006-03-14</DTS:Property>
  <DTS:Property DTS:Name="VersionMajor">1</DTS:Property>
  <DTS:Property DTS:Name="VersionMinor">2</DTS:Property>
  <DTS:Property DTS:Name="VersionBuild">37</DTS:Property>
  <DTS:ConnectionManager>
    <DTS:Property DTS:Name="ObjectName">Warehouse</DTS:Property>
    <DTS:Property DTS:Name="CreationName">OLEDB</DTS:Property>
    <DTS:ObjectData>
      <DTS:ConnectionManager>
        <DTS:Property DTS:Name="ConnectionString">Data Source=wh01;Initial Catalog=DW;</DTS:Property>
      </DTS:ConnectionManager>
    </DTS:ObjectData>
  </DTS:ConnectionManager>
  <DTS:ConnectionManager>
    <DTS:Property DTS:Name="ObjectName">None</DTS:Property>
    <DTS:Property DTS:Name="CreationName">FLATFILE</DTS:Property>
  </DTS:ConnectionManager>
  <DTS:PackageVariable>
    <DTS:Property DTS:Name="ObjectName">BatchId</DTS:Property>
    <DTS:Property DTS:Name="PackageVariableValue">0</DTS:Property>
    <DTS:Property DTS:Name="Namespace">User</DTS:Property>
  </DTS:PackageVariable>
  <DTS:Executable>
    <DTS:Property DTS:Name="ObjectName">Copy extract</DTS:Property>
    <DTS:Property DTS:Name="CreationName">Microsoft.FileSystemTask</DTS:Property>
    <DTS:Property DTS:Name="DTSID">{11111111-0000-0000-0000-000000000001}</DTS:Property>
    <DTS:ObjectData>
      <FileSystemTaskData Operation="CopyFile" Source="in.csv" Destination="work.csv"
                          OverwriteDestination="True"/>
    </DTS:ObjectData>
  </DTS:Executable>
  <DTS:Executable>
    <DTS:Property DTS:Name="ObjectName">Load staging</DTS:Property>
    <DTS:Property DTS:Name="CreationName">Microsoft.ExecuteSQLTask</DTS:Property>
    <DTS:ObjectData>
      <SqlTaskData SqlStatementSource="EXEC dbo.LoadStaging" IsStoredProc="True"
                   Connection="{C0FFEE00}"/>
    </DTS:ObjectData>
  </DTS:Executable>
  <DTS:PrecedenceConstraint>
    <DTS:Property DTS:Name="ObjectName">Constraint 1</DTS:Property>
    <DTS:Property DTS:Name="Value">0</DTS:Property>
    <DTS:Property DTS:Name="EvalOp">2</DTS:Property>
    <DTS:Executable IDREF="Copy extract" IsFrom="1"/>
    <DTS:Executable IDREF="Load staging"/>
  </DTS:PrecedenceConstraint>
</DTS:Executable>
"#;

    const MODERN_DOC: &str = r#"
<DTS:Executable xmlns:DTS="www.microsoft.com/SqlServer/Dts"
                DTS:ObjectName="ModernLoad" DTS:Description="Attribute style"
                DTS:CreationDate="2016-08-01" DTS:VersionBuild="7">
  <DTS:ConnectionManagers>
    <DTS:ConnectionManager DTS:ObjectName="Staging" DTS:CreationName="FLATFILE">
      <DTS:ObjectData>
        <DTS:ConnectionManager DTS:ConnectionString="C:\in\extract.txt"/>
      </DTS:ObjectData>
    </DTS:ConnectionManager>
  </DTS:ConnectionManagers>
  <DTS:Variables>
    <DTS:Variable DTS:ObjectName="RowCount" DTS:Namespace="User">
      <DTS:VariableValue>0</DTS:VariableValue>
    </DTS:Variable>
  </DTS:Variables>
  <DTS:Executables>
    <DTS:Executable DTS:ObjectName="Move rows"
                    DTS:CreationName="{E3CFBEA8-1F48-40D8-91E1-2DEDC1EDDD56}"
                    DTS:ExecutableType="Microsoft.Pipeline"
                    DTS:DTSID="{22222222-0000-0000-0000-000000000002}">
      <DTS:ObjectData>
        <DataFlow>
          <Component Name="Source" ComponentClassID="{AAA}"/>
          <Component Name="Lookup" ComponentClassID="{BBB}"/>
        </DataFlow>
      </DTS:ObjectData>
    </DTS:Executable>
  </DTS:Executables>
  <DTS:PrecedenceConstraints>
    <DTS:PrecedenceConstraint DTS:ObjectName="C1" DTS:EvalOp="2"
                              DTS:Expression="@rows &gt; 0">
      <DTS:Executable IDREF="Move rows" IsFrom="1"/>
      <DTS:Executable IDREF="Archive"/>
      <DTS:Executable IDREF="Notify"/>
    </DTS:PrecedenceConstraint>
  </DTS:PrecedenceConstraints>
</DTS:Executable>
"#;

    #[test]
    fn test_legacy_package_info() {
        let doc = parse(LEGACY_DOC);
        let info = extract_package(&doc).package;
        assert_eq!(info.object_name, "NightlyLoad");
        assert_eq!(info.description, "Loads the nightly extract");
        assert_eq!(info.creation_date, "2006-03-14");
        assert_eq!(info.version_major, "1");
        assert_eq!(info.version_minor, "2");
        assert_eq!(info.version_build, "37");
    }

    #[test]
    fn test_modern_package_info_from_attributes() {
        let doc = parse(MODERN_DOC);
        let info = extract_package(&doc).package;
        assert_eq!(info.object_name, "ModernLoad");
        assert_eq!(info.description, "Attribute style");
        assert_eq!(info.creation_date, "2016-08-01");
        assert_eq!(info.version_build, "7");
        // Major/minor have no attribute source.
        assert_eq!(info.version_major, "");
        assert_eq!(info.version_minor, "");
    }

    #[test]
    fn test_legacy_package_info_wins_over_conflicting_attributes() {
        // Both variants present: the attribute fallback must not fire when
        // the legacy ObjectName property is non-empty.
        let xml = r#"
<DTS:Executable xmlns:DTS="www.microsoft.com/SqlServer/Dts"
                DTS:ObjectName="AttrName" DTS:Description="Attr description"
                DTS:CreationDate="2016-08-01" DTS:VersionBuild="99">
  <DTS:Property DTS:Name="ObjectName">LegacyName</DTS:Property>
  <DTS:Property DTS:Name="Description">Legacy description</DTS:Property>
  <DTS:Property DTS:Name="CreationDate">2006-03-14</DTS:Property>
  <DTS:Property DTS:Name="VersionBuild">37</DTS:Property>
</DTS:Executable>
"#;
        let doc = parse(xml);
        let info = extract_package(&doc).package;
        assert_eq!(info.object_name, "LegacyName");
        assert_eq!(info.description, "Legacy description");
        assert_eq!(info.creation_date, "2006-03-14");
        assert_eq!(info.version_build, "37");
    }

    #[test]
    fn test_empty_legacy_object_name_takes_attribute_set() {
        // Legacy properties exist but the name is empty, so the four
        // attribute-sourced fields replace them wholesale.
        let xml = r#"
<DTS:Executable xmlns:DTS="www.microsoft.com/SqlServer/Dts"
                DTS:ObjectName="AttrName" DTS:Description="Attr description"
                DTS:CreationDate="2016-08-01" DTS:VersionBuild="99">
  <DTS:Property DTS:Name="ObjectName"></DTS:Property>
  <DTS:Property DTS:Name="Description">Legacy description</DTS:Property>
  <DTS:Property DTS:Name="VersionMajor">1</DTS:Property>
</DTS:Executable>
"#;
        let doc = parse(xml);
        let info = extract_package(&doc).package;
        assert_eq!(info.object_name, "AttrName");
        assert_eq!(info.description, "Attr description");
        assert_eq!(info.creation_date, "2016-08-01");
        assert_eq!(info.version_build, "99");
        // Major/minor stay legacy-sourced.
        assert_eq!(info.version_major, "1");
    }

    #[test]
    fn test_legacy_connections_exclude_unnamed_and_none() {
        let doc = parse(LEGACY_DOC);
        let connections = extract_package(&doc).connections;
        // The inner connection manager (no name) and the "None" one are gone.
        assert_eq!(connections.len(), 1);
        assert_eq!(connections[0].name, "Warehouse");
        assert_eq!(connections[0].connection_type, "OLEDB");
        assert_eq!(
            connections[0].connection_string,
            "Data Source=wh01;Initial Catalog=DW;"
        );
    }

    #[test]
    fn test_modern_connection_string_from_inner_attribute() {
        let doc = parse(MODERN_DOC);
        let connections = extract_package(&doc).connections;
        assert_eq!(connections.len(), 1);
        assert_eq!(connections[0].name, "Staging");
        assert_eq!(connections[0].connection_string, "C:\\in\\extract.txt");
    }

    #[test]
    fn test_variables_from_both_producers_are_not_deduplicated() {
        let xml = r#"
<DTS:Executable xmlns:DTS="www.microsoft.com/SqlServer/Dts">
  <DTS:PackageVariable>
    <DTS:Property DTS:Name="ObjectName">BatchId</DTS:Property>
    <DTS:Property DTS:Name="PackageVariableValue">legacy</DTS:Property>
    <DTS:Property DTS:Name="Namespace">User</DTS:Property>
  </DTS:PackageVariable>
  <DTS:Variable DTS:ObjectName="BatchId" DTS:Namespace="User">
    <DTS:VariableValue>modern</DTS:VariableValue>
  </DTS:Variable>
</DTS:Executable>
"#;
        let doc = parse(xml);
        let variables = extract_package(&doc).variables;
        assert_eq!(variables.len(), 2);
        assert_eq!(variables[0].value, "legacy");
        assert_eq!(variables[1].value, "modern");
        assert_eq!(variables[0].name, variables[1].name);
    }

    #[test]
    fn test_legacy_executables_with_details() {
        let doc = parse(LEGACY_DOC);
        let executables = extract_package(&doc).executables;
        assert_eq!(executables.len(), 2);

        assert_eq!(executables[0].name, "Copy extract");
        assert_eq!(executables[0].task_type, "Microsoft.FileSystemTask");
        assert_eq!(
            executables[0].dtsid,
            "{11111111-0000-0000-0000-000000000001}"
        );
        let TaskDetail::FileSystem(ref fs) = executables[0].detail else {
            panic!("expected file system detail");
        };
        assert_eq!(fs.operation.as_deref(), Some("CopyFile"));

        assert_eq!(executables[1].name, "Load staging");
        let TaskDetail::Sql(ref sql) = executables[1].detail else {
            panic!("expected sql detail");
        };
        assert_eq!(sql.sql_statement_source.as_deref(), Some("EXEC dbo.LoadStaging"));
    }

    #[test]
    fn test_package_root_is_not_reported_as_a_task() {
        let doc = parse(LEGACY_DOC);
        let executables = extract_package(&doc).executables;
        assert!(executables.iter().all(|e| e.name != "NightlyLoad"));
    }

    #[test]
    fn test_guid_typed_task_gets_data_flow_detail() {
        let doc = parse(MODERN_DOC);
        let executables = extract_package(&doc).executables;
        assert_eq!(executables.len(), 1);
        assert_eq!(executables[0].executable_type, "Microsoft.Pipeline");
        let TaskDetail::DataFlow(ref flow) = executables[0].detail else {
            panic!("expected data flow detail");
        };
        assert_eq!(flow.components.len(), 2);
    }

    #[test]
    fn test_constraint_from_to_resolution() {
        let doc = parse(LEGACY_DOC);
        let constraints = extract_package(&doc).constraints;
        assert_eq!(constraints.len(), 1);
        assert_eq!(constraints[0].name, "Constraint 1");
        assert_eq!(constraints[0].from_executable, "Copy extract");
        assert_eq!(constraints[0].to_executable, "Load staging");
        assert_eq!(constraints[0].value, "0");
        assert_eq!(constraints[0].eval_op, "2");
    }

    #[test]
    fn test_constraint_last_non_from_reference_wins() {
        let doc = parse(MODERN_DOC);
        let constraints = extract_package(&doc).constraints;
        assert_eq!(constraints.len(), 1);
        assert_eq!(constraints[0].from_executable, "Move rows");
        assert_eq!(constraints[0].to_executable, "Notify");
        assert_eq!(constraints[0].expression, "@rows > 0");
    }

    #[test]
    fn test_inspect_file_read_failure() {
        let err = inspect_file(Path::new("/definitely/not/here.dtsx")).unwrap_err();
        assert!(matches!(err, InspectError::Read { .. }));
    }

    #[test]
    fn test_malformed_document_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.dtsx");
        std::fs::write(&path, "<DTS:Executable").unwrap();
        let err = inspect_file(&path).unwrap_err();
        assert!(matches!(err, InspectError::Parse(_)));
    }
}
