//! Parser for packer's machine-readable inspection output.
//!
//! The format is line-oriented: each line is a comma-separated record
//! prefixed with a timestamp and a build-name placeholder. Only records
//! whose third field starts with `template` describe template structure;
//! everything else is UI chatter and is discarded. Comma characters inside
//! chatter arrive escaped as `%!(PACKER_COMMA)`, but since those lines are
//! discarded anyway no unescaping happens here.

use serde::{Deserialize, Serialize};

use crate::subprocess::ExitStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateVariable {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateBuilder {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateProvisioner {
    #[serde(rename = "type")]
    pub kind: String,
}

/// Structured view of a template as reported by `packer inspect`, plus the
/// exit status of the run that produced it.
///
/// Records appear in the order packer emitted them; nothing is deduplicated
/// or sorted, so parsing the same output always yields the same structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inspection {
    pub status: ExitStatus,
    pub variables: Vec<TemplateVariable>,
    pub builders: Vec<TemplateBuilder>,
    pub provisioners: Vec<TemplateProvisioner>,
}

impl Inspection {
    pub(crate) fn from_output(status: ExitStatus, stdout: &str) -> Self {
        let mut inspection = Inspection {
            status,
            variables: Vec::new(),
            builders: Vec::new(),
            provisioners: Vec::new(),
        };
        for line in stdout.lines() {
            match parse_record(line) {
                Some(Record::Variable(variable)) => inspection.variables.push(variable),
                Some(Record::Builder(builder)) => inspection.builders.push(builder),
                Some(Record::Provisioner(provisioner)) => {
                    inspection.provisioners.push(provisioner)
                }
                None => {}
            }
        }
        inspection
    }
}

enum Record {
    Variable(TemplateVariable),
    Builder(TemplateBuilder),
    Provisioner(TemplateProvisioner),
}

/// Parse one machine-readable line into a template record.
///
/// Returns `None` for UI chatter, unknown `template-*` kinds, and lines too
/// short for the fields their kind requires; a malformed line never aborts
/// the surrounding parse.
fn parse_record(line: &str) -> Option<Record> {
    let fields: Vec<&str> = line.split(',').collect();
    if !fields.get(2)?.starts_with("template") {
        return None;
    }

    // Fields 0 and 1 are the timestamp and build-name placeholder.
    let record = &fields[2..];
    match record[0] {
        "template-variable" => Some(Record::Variable(TemplateVariable {
            name: record.get(1)?.to_string(),
            value: record.get(2)?.to_string(),
        })),
        "template-builder" => Some(Record::Builder(TemplateBuilder {
            name: record.get(1)?.to_string(),
            kind: record.get(2)?.to_string(),
        })),
        "template-provisioner" => Some(Record::Provisioner(TemplateProvisioner {
            kind: record.get(1)?.to_string(),
        })),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
1508999535,,ui,say,Variables:
1508999535,,ui,say,  <No variables>
1508999535,,ui,say,
1508999535,,ui,say,Builders:
1508999535,,template-builder,docker,docker
1508999535,,ui,say,  docker
1508999535,,ui,say,
1508999535,,ui,say,Provisioners:
1508999535,,template-provisioner,shell
1508999535,,ui,say,  shell
1508999535,,ui,say,Note: If your build names contain user variables or template functions such as 'timestamp'%!(PACKER_COMMA) these are processed at build time%!(PACKER_COMMA) and therefore only show in their raw form here.";

    #[test]
    fn builder_line_yields_builder_record() {
        let inspection =
            Inspection::from_output(ExitStatus::Success, "1508999535,,template-builder,docker,docker");
        assert_eq!(
            inspection.builders,
            vec![TemplateBuilder {
                name: "docker".to_string(),
                kind: "docker".to_string(),
            }]
        );
        assert!(inspection.variables.is_empty());
        assert!(inspection.provisioners.is_empty());
    }

    #[test]
    fn ui_chatter_yields_nothing() {
        let inspection = Inspection::from_output(ExitStatus::Success, "1508999535,,ui,say,Variables:");
        assert!(inspection.variables.is_empty());
        assert!(inspection.builders.is_empty());
        assert!(inspection.provisioners.is_empty());
    }

    #[test]
    fn full_sample_preserves_order_and_is_idempotent() {
        let first = Inspection::from_output(ExitStatus::Success, SAMPLE);
        assert!(first.variables.is_empty());
        assert_eq!(
            first.builders,
            vec![TemplateBuilder {
                name: "docker".to_string(),
                kind: "docker".to_string(),
            }]
        );
        assert_eq!(
            first.provisioners,
            vec![TemplateProvisioner {
                kind: "shell".to_string(),
            }]
        );

        let second = Inspection::from_output(ExitStatus::Success, SAMPLE);
        assert_eq!(first, second);
    }

    #[test]
    fn variable_lines_capture_name_and_value() {
        let output = "\
1508999535,,template-variable,aws_access_key,
1508999535,,template-variable,region,us-east-1";
        let inspection = Inspection::from_output(ExitStatus::Success, output);
        assert_eq!(
            inspection.variables,
            vec![
                TemplateVariable {
                    name: "aws_access_key".to_string(),
                    value: String::new(),
                },
                TemplateVariable {
                    name: "region".to_string(),
                    value: "us-east-1".to_string(),
                },
            ]
        );
    }

    #[test]
    fn unknown_template_kind_is_ignored() {
        let inspection = Inspection::from_output(
            ExitStatus::Success,
            "1508999535,,template-post-processor,vagrant",
        );
        assert!(inspection.variables.is_empty());
        assert!(inspection.builders.is_empty());
        assert!(inspection.provisioners.is_empty());
    }

    #[test]
    fn truncated_lines_are_skipped_not_fatal() {
        let output = "\
1508999535,,template-builder
1508999535,,template-variable,orphan
1508999535
1508999535,,template-provisioner,shell";
        let inspection = Inspection::from_output(ExitStatus::Success, output);
        assert!(inspection.variables.is_empty());
        assert!(inspection.builders.is_empty());
        assert_eq!(
            inspection.provisioners,
            vec![TemplateProvisioner {
                kind: "shell".to_string(),
            }]
        );
    }

    #[test]
    fn empty_output_parses_to_empty_collections() {
        let inspection = Inspection::from_output(ExitStatus::Error(1), "");
        assert_eq!(inspection.status, ExitStatus::Error(1));
        assert!(inspection.variables.is_empty());
        assert!(inspection.builders.is_empty());
        assert!(inspection.provisioners.is_empty());
    }
}
