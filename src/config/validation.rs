//! Configuration validation.
//!
//! # Responsibilities
//! - Turn a decoded document tree into a [`RootConfig`]
//! - Reject wrong types at the boundary (no string-to-integer coercion)
//! - Validate value ranges (ports 1-65535, non-empty hosts and ids)
//! - Detect duplicate network names
//!
//! # Design Decisions
//! - Duplicate names are reported on their own, before field checks
//! - Field checks collect every violation, not just the first
//! - Either a complete `RootConfig` is returned or nothing is

use std::collections::{BTreeMap, HashSet};
use std::net::IpAddr;

use serde_json::Map;

use crate::config::document::{into_map, Node};
use crate::config::error::{ConfigError, ValidationError, Violation};
use crate::config::loader::LoadOptions;
use crate::config::schema::{
    CompilerSpec, NetworkId, NetworkProfile, RootConfig, TestRunnerOptions, DEFAULT_COMPILER,
    WILDCARD_NETWORK_ID,
};

const NETWORKS: &str = "networks";
const COMPILER: &str = "compiler";
const COMPILERS: &str = "compilers";
const TEST_RUNNER_KEYS: [&str; 3] = ["testRunnerOptions", "test_runner_options", "mocha"];
const NETWORK_ID_KEYS: [&str; 2] = ["networkId", "network_id"];

/// Top-level entries sorted by role.
#[derive(Default)]
struct Sections {
    networks: Option<Node>,
    test_runner: Option<(String, Node)>,
    compiler: Option<Node>,
    compilers: Option<Node>,
    unknown: Vec<(String, Node)>,
}

/// A network entry with its name resolved, ready for field checks.
struct NetworkEntry {
    name: String,
    path: String,
    node: Node,
}

/// Validate decoded top-level entries into a [`RootConfig`].
pub(crate) fn validate_document(
    entries: Vec<(String, Node)>,
    options: LoadOptions,
) -> Result<RootConfig, ConfigError> {
    let mut errors = Vec::new();
    let sections = split_sections(entries, &mut errors);

    let entries = match sections.networks {
        Some(node) => network_entries(node, &mut errors),
        None => {
            errors.push(ValidationError::new(NETWORKS, Violation::Missing));
            Vec::new()
        }
    };

    if let Some(name) = first_duplicate(&entries) {
        return Err(ConfigError::DuplicateNetworkName(name));
    }

    let mut networks = BTreeMap::new();
    for entry in entries {
        if let Some(profile) = build_profile(entry, options, &mut errors) {
            networks.insert(profile.name.clone(), profile);
        }
    }
    tracing::debug!(networks = networks.len(), "Network section validated");

    let test_runner_options = build_test_runner_options(sections.test_runner, &mut errors);
    let compiler = build_compiler(sections.compiler, sections.compilers, options, &mut errors);

    let mut extensions = Map::new();
    for (key, node) in sections.unknown {
        if options.strict {
            errors.push(ValidationError::new(key, Violation::UnknownField));
        } else {
            tracing::warn!(key = %key, "Preserving unknown top-level key");
            extensions.insert(key, node.into_value());
        }
    }

    match compiler {
        Some(compiler) if errors.is_empty() => Ok(RootConfig {
            networks,
            test_runner_options,
            compiler,
            extensions,
        }),
        _ => Err(ConfigError::Validation(errors)),
    }
}

fn split_sections(entries: Vec<(String, Node)>, errors: &mut Vec<ValidationError>) -> Sections {
    let mut sections = Sections::default();

    for (key, node) in entries {
        match key.as_str() {
            NETWORKS => set_once(&mut sections.networks, key, node, errors),
            COMPILER => set_once(&mut sections.compiler, key, node, errors),
            COMPILERS => set_once(&mut sections.compilers, key, node, errors),
            k if TEST_RUNNER_KEYS.contains(&k) => match &sections.test_runner {
                Some((previous, _)) => {
                    let violation = Violation::Conflict(previous.clone());
                    errors.push(ValidationError::new(key, violation));
                }
                None => sections.test_runner = Some((key, node)),
            },
            _ => sections.unknown.push((key, node)),
        }
    }

    sections
}

fn set_once(
    slot: &mut Option<Node>,
    path: String,
    node: Node,
    errors: &mut Vec<ValidationError>,
) {
    if slot.is_some() {
        errors.push(ValidationError::new(path, Violation::Repeated));
    } else {
        *slot = Some(node);
    }
}

/// Flatten either accepted `networks` shape into named entries.
///
/// Tables are keyed by name; arrays carry a `name` field in each element.
fn network_entries(node: Node, errors: &mut Vec<ValidationError>) -> Vec<NetworkEntry> {
    let mut out = Vec::new();

    match node {
        Node::Table(entries) => {
            for (name, node) in entries {
                let path = format!("{NETWORKS}.{name}");
                if name.is_empty() {
                    errors.push(ValidationError::new(path, Violation::Empty));
                    continue;
                }
                out.push(NetworkEntry { name, path, node });
            }
        }
        Node::Array(items) => {
            for (i, item) in items.into_iter().enumerate() {
                let item_path = format!("{NETWORKS}[{i}]");
                let mut fields = match item {
                    Node::Table(fields) => fields,
                    other => {
                        errors.push(ValidationError::new(
                            item_path,
                            Violation::WrongType {
                                expected: "table",
                                found: other.kind(),
                            },
                        ));
                        continue;
                    }
                };

                let Some(pos) = fields.iter().position(|(key, _)| key == "name") else {
                    errors.push(ValidationError::new(
                        format!("{item_path}.name"),
                        Violation::Missing,
                    ));
                    continue;
                };
                let name = match fields.remove(pos).1 {
                    Node::String(name) if !name.is_empty() => name,
                    Node::String(_) => {
                        errors.push(ValidationError::new(
                            format!("{item_path}.name"),
                            Violation::Empty,
                        ));
                        continue;
                    }
                    other => {
                        errors.push(ValidationError::new(
                            format!("{item_path}.name"),
                            Violation::WrongType {
                                expected: "string",
                                found: other.kind(),
                            },
                        ));
                        continue;
                    }
                };

                out.push(NetworkEntry {
                    path: format!("{NETWORKS}.{name}"),
                    name,
                    node: Node::Table(fields),
                });
            }
        }
        other => errors.push(ValidationError::new(
            NETWORKS,
            Violation::WrongType {
                expected: "table or array",
                found: other.kind(),
            },
        )),
    }

    out
}

fn first_duplicate(entries: &[NetworkEntry]) -> Option<String> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .find(|entry| !seen.insert(entry.name.as_str()))
        .map(|entry| entry.name.clone())
}

fn build_profile(
    entry: NetworkEntry,
    options: LoadOptions,
    errors: &mut Vec<ValidationError>,
) -> Option<NetworkProfile> {
    let NetworkEntry { name, path, node } = entry;
    let fields = table_fields(node, &path, errors)?;

    let mut host = None;
    let mut port = None;
    let mut network_id: Option<(String, Node)> = None;
    let mut extra = Map::new();

    for (key, value) in fields {
        match key.as_str() {
            "host" => set_once(&mut host, format!("{path}.host"), value, errors),
            "port" => set_once(&mut port, format!("{path}.port"), value, errors),
            k if NETWORK_ID_KEYS.contains(&k) => match &network_id {
                Some((previous, _)) => {
                    let violation = Violation::Conflict(previous.clone());
                    errors.push(ValidationError::new(format!("{path}.{key}"), violation));
                }
                None => network_id = Some((key, value)),
            },
            _ if options.strict => {
                errors.push(ValidationError::new(
                    format!("{path}.{key}"),
                    Violation::UnknownField,
                ));
            }
            _ => {
                extra.insert(key, value.into_value());
            }
        }
    }

    let host = required(host, format!("{path}.host"), host_value, errors);
    let port = required(port, format!("{path}.port"), port_value, errors);
    let network_id = match network_id {
        Some((key, node)) => check(network_id_value(node), format!("{path}.{key}"), errors),
        None => {
            errors.push(ValidationError::new(
                format!("{path}.networkId"),
                Violation::Missing,
            ));
            None
        }
    };

    Some(NetworkProfile {
        name,
        host: host?,
        port: port?,
        network_id: network_id?,
        extra,
    })
}

fn build_test_runner_options(
    section: Option<(String, Node)>,
    errors: &mut Vec<ValidationError>,
) -> TestRunnerOptions {
    match section {
        None | Some((_, Node::Null)) => TestRunnerOptions::new(),
        Some((_, Node::Table(entries))) => into_map(entries),
        Some((key, other)) => {
            errors.push(ValidationError::new(
                key,
                Violation::WrongType {
                    expected: "table",
                    found: other.kind(),
                },
            ));
            TestRunnerOptions::new()
        }
    }
}

fn build_compiler(
    compiler: Option<Node>,
    compilers: Option<Node>,
    options: LoadOptions,
    errors: &mut Vec<ValidationError>,
) -> Option<CompilerSpec> {
    match (compiler, compilers) {
        (Some(_), Some(_)) => {
            errors.push(ValidationError::new(
                COMPILER,
                Violation::Conflict(COMPILERS.to_string()),
            ));
            None
        }
        (None, None) => {
            errors.push(ValidationError::new(COMPILER, Violation::Missing));
            None
        }
        (Some(node), None) => compiler_section(node, COMPILER, None, options, errors),
        (None, Some(Node::Table(mut entries))) if entries.len() == 1 => {
            let (name, node) = entries.remove(0);
            if name.trim().is_empty() {
                errors.push(ValidationError::new(COMPILERS, Violation::Empty));
                return None;
            }
            let path = format!("{COMPILERS}.{name}");
            compiler_section(node, &path, Some(name), options, errors)
        }
        (None, Some(Node::Table(entries))) => {
            errors.push(ValidationError::new(
                COMPILERS,
                Violation::CompilerCount(entries.len()),
            ));
            None
        }
        (None, Some(other)) => {
            errors.push(ValidationError::new(
                COMPILERS,
                Violation::WrongType {
                    expected: "table",
                    found: other.kind(),
                },
            ));
            None
        }
    }
}

/// Validate one compiler table. `name` is set when the table was keyed by
/// compiler name (`compilers.<name>`); a `name` field inside it is then
/// rejected as conflicting with the key.
fn compiler_section(
    node: Node,
    path: &str,
    name: Option<String>,
    options: LoadOptions,
    errors: &mut Vec<ValidationError>,
) -> Option<CompilerSpec> {
    let fields = table_fields(node, path, errors)?;

    let mut version = None;
    let mut name_node = None;
    let mut settings = None;
    let mut extra = Map::new();

    for (key, value) in fields {
        match key.as_str() {
            "version" => set_once(&mut version, format!("{path}.version"), value, errors),
            "settings" => set_once(&mut settings, format!("{path}.settings"), value, errors),
            "name" => set_once(&mut name_node, format!("{path}.name"), value, errors),
            _ if options.strict => {
                errors.push(ValidationError::new(
                    format!("{path}.{key}"),
                    Violation::UnknownField,
                ));
            }
            _ => {
                extra.insert(key, value.into_value());
            }
        }
    }

    let version = required(version, format!("{path}.version"), version_value, errors);
    let name = match (name, name_node) {
        (Some(_), Some(_)) => {
            errors.push(ValidationError::new(
                format!("{path}.name"),
                Violation::Conflict(path.to_string()),
            ));
            None
        }
        (Some(name), None) => Some(name),
        (None, Some(node)) => check(non_empty_string(node), format!("{path}.name"), errors),
        (None, None) => Some(DEFAULT_COMPILER.to_string()),
    };
    let settings = match settings {
        None => Some(Map::new()),
        Some(node) => table_fields(node, &format!("{path}.settings"), errors).map(into_map),
    };

    Some(CompilerSpec {
        name: name?,
        version: version?,
        settings: settings?,
        extra,
    })
}

fn table_fields(
    node: Node,
    path: &str,
    errors: &mut Vec<ValidationError>,
) -> Option<Vec<(String, Node)>> {
    match node {
        Node::Table(fields) => Some(fields),
        other => {
            errors.push(ValidationError::new(
                path,
                Violation::WrongType {
                    expected: "table",
                    found: other.kind(),
                },
            ));
            None
        }
    }
}

fn required<T>(
    node: Option<Node>,
    path: String,
    convert: fn(Node) -> Result<T, Violation>,
    errors: &mut Vec<ValidationError>,
) -> Option<T> {
    match node {
        Some(node) => check(convert(node), path, errors),
        None => {
            errors.push(ValidationError::new(path, Violation::Missing));
            None
        }
    }
}

fn check<T>(
    result: Result<T, Violation>,
    path: String,
    errors: &mut Vec<ValidationError>,
) -> Option<T> {
    result
        .map_err(|violation| errors.push(ValidationError::new(path, violation)))
        .ok()
}

fn non_empty_string(node: Node) -> Result<String, Violation> {
    match node {
        Node::String(s) if s.trim().is_empty() => Err(Violation::Empty),
        Node::String(s) => Ok(s),
        other => Err(Violation::WrongType {
            expected: "string",
            found: other.kind(),
        }),
    }
}

fn host_value(node: Node) -> Result<String, Violation> {
    let host = non_empty_string(node)?;
    if is_valid_host(&host) {
        Ok(host)
    } else {
        Err(Violation::InvalidHost(host))
    }
}

fn port_value(node: Node) -> Result<u16, Violation> {
    let n = match node {
        Node::Number(n) => n,
        other => {
            return Err(Violation::WrongType {
                expected: "integer",
                found: other.kind(),
            })
        }
    };

    if let Some(port) = n.as_u64() {
        match u16::try_from(port) {
            Ok(port) if port != 0 => Ok(port),
            _ => Err(Violation::PortOutOfRange(port.to_string())),
        }
    } else if let Some(port) = n.as_i64() {
        Err(Violation::PortOutOfRange(port.to_string()))
    } else {
        Err(Violation::WrongType {
            expected: "integer",
            found: "float",
        })
    }
}

fn network_id_value(node: Node) -> Result<NetworkId, Violation> {
    match node {
        Node::String(s) if s == WILDCARD_NETWORK_ID => Ok(NetworkId::Wildcard),
        Node::Number(n) if n.is_u64() => Ok(NetworkId::Id(n.to_string())),
        Node::Number(n) => Err(Violation::WrongType {
            expected: "string or non-negative integer",
            found: if n.is_f64() { "float" } else { "negative integer" },
        }),
        Node::String(s) if s.is_empty() => Err(Violation::Empty),
        Node::String(s) => Ok(NetworkId::Id(s)),
        other => Err(Violation::WrongType {
            expected: "string",
            found: other.kind(),
        }),
    }
}

fn version_value(node: Node) -> Result<String, Violation> {
    non_empty_string(node).map(|v| v.trim().to_string())
}

/// Accepts IP literals and RFC 1123 hostnames.
fn is_valid_host(host: &str) -> bool {
    if host.parse::<IpAddr>().is_ok() {
        return true;
    }

    let name = host.strip_suffix('.').unwrap_or(host);
    if name.is_empty() || name.len() > 253 {
        return false;
    }

    let labels: Vec<&str> = name.split('.').collect();
    let labels_ok = labels.iter().all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });

    // An all-digit last label means a mistyped IPv4 literal, not a name.
    let numeric_tail = labels
        .last()
        .is_some_and(|label| label.chars().all(|c| c.is_ascii_digit()));

    labels_ok && !numeric_tail
}
