use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

use super::error::UniverseReaderError;

/// How a universe's data leaves the controller (e.g. a USB-DMX interface)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputBinding {
    pub plugin: String,
    pub line: String,
    /// Plugin parameters in source order, values already rendered as text
    pub parameters: Vec<(String, String)>,
}

/// One DMX universe and its optional output binding.
///
/// The id is taken verbatim from the source; it is neither renumbered nor checked for
/// uniqueness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniverseRecord {
    pub name: String,
    pub id: i64,
    pub output: Option<OutputBinding>,
}

// Raw shapes of the JSON source. Kept private so that the rest of the crate only ever sees
// validated records.
#[derive(Debug, Deserialize)]
struct UniverseFile {
    universes: Vec<RawUniverse>,
}

#[derive(Debug, Deserialize)]
struct RawUniverse {
    name: String,
    id: i64,
    output: Option<RawOutput>,
}

#[derive(Debug, Deserialize)]
struct RawOutput {
    plugin: String,
    line: Value,
    #[serde(default)]
    parameters: serde_json::Map<String, Value>,
}

/// Render a JSON scalar as attribute text. Returns None for arrays and objects.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

impl RawUniverse {
    fn validate(self, path: &Path) -> Result<UniverseRecord, UniverseReaderError> {
        let malformed = |reason: String| UniverseReaderError::MalformedUniverse {
            path: path.to_path_buf(),
            universe: self.name.clone(),
            reason,
        };

        let output = match self.output {
            None => None,
            Some(raw) => {
                let line = match &raw.line {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    other => return Err(malformed(format!("output line {other} is not a string"))),
                };
                let mut parameters = Vec::with_capacity(raw.parameters.len());
                for (key, value) in raw.parameters.iter() {
                    match scalar_to_string(value) {
                        Some(text) => parameters.push((key.clone(), text)),
                        None => {
                            return Err(malformed(format!(
                                "output parameter {key:?} is not a scalar value"
                            )))
                        }
                    }
                }
                Some(OutputBinding {
                    plugin: raw.plugin,
                    line,
                    parameters,
                })
            }
        };

        Ok(UniverseRecord {
            name: self.name,
            id: self.id,
            output,
        })
    }
}

/// Read the universe declarations from a JSON file, preserving declared order
pub fn read_universes(path: &Path) -> Result<Vec<UniverseRecord>, UniverseReaderError> {
    if !path.exists() {
        return Err(UniverseReaderError::BadFilePath(path.to_path_buf()));
    }
    let json_str = std::fs::read_to_string(path)?;
    parse_universes(&json_str, path)
}

/// Parse universe declarations from JSON text. `path` is only used to label errors.
pub fn parse_universes(
    json_str: &str,
    path: &Path,
) -> Result<Vec<UniverseRecord>, UniverseReaderError> {
    let file: UniverseFile =
        serde_json::from_str(json_str).map_err(|source| UniverseReaderError::ParsingError {
            path: path.to_path_buf(),
            source,
        })?;

    let universes = file
        .universes
        .into_iter()
        .map(|raw| raw.validate(path))
        .collect::<Result<Vec<_>, _>>()?;
    spdlog::debug!(
        "Read {} universes from {}",
        universes.len(),
        path.to_string_lossy()
    );
    Ok(universes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<Vec<UniverseRecord>, UniverseReaderError> {
        parse_universes(json, Path::new("universes.json"))
    }

    #[test]
    fn test_output_binding() {
        let universes = parse(
            r#"{"universes": [
                {"name": "Universe 1", "id": 0,
                 "output": {"plugin": "USB DMX", "line": "0", "parameters": {"Bus": "1"}}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(
            universes,
            vec![UniverseRecord {
                name: String::from("Universe 1"),
                id: 0,
                output: Some(OutputBinding {
                    plugin: String::from("USB DMX"),
                    line: String::from("0"),
                    parameters: vec![(String::from("Bus"), String::from("1"))],
                }),
            }]
        );
    }

    #[test]
    fn test_output_is_optional_and_ids_pass_through() {
        let universes = parse(
            r#"{"universes": [
                {"name": "Stage", "id": 7},
                {"name": "Floor", "id": 3}
            ]}"#,
        )
        .unwrap();
        assert_eq!(universes.len(), 2);
        assert_eq!(universes[0].id, 7);
        assert_eq!(universes[1].id, 3);
        assert!(universes.iter().all(|u| u.output.is_none()));
    }

    #[test]
    fn test_parameter_order_and_stringify() {
        let universes = parse(
            r#"{"universes": [
                {"name": "Art", "id": 1,
                 "output": {"plugin": "ArtNet", "line": 2,
                   "parameters": {"outputIP": "10.0.0.255", "UniverseOffset": 4, "Enabled": true, "Note": null}}}
            ]}"#,
        )
        .unwrap();
        let output = universes[0].output.as_ref().unwrap();
        assert_eq!(output.line, "2");
        let keys: Vec<&str> = output.parameters.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["outputIP", "UniverseOffset", "Enabled", "Note"]);
        assert_eq!(output.parameters[1].1, "4");
        assert_eq!(output.parameters[2].1, "true");
        assert_eq!(output.parameters[3].1, "");
    }

    #[test]
    fn test_missing_parameters_is_empty_block() {
        let universes =
            parse(r#"{"universes": [{"name": "U", "id": 0, "output": {"plugin": "DMX", "line": "1"}}]}"#)
                .unwrap();
        assert!(universes[0].output.as_ref().unwrap().parameters.is_empty());
    }

    #[test]
    fn test_missing_name_or_id() {
        assert!(matches!(
            parse(r#"{"universes": [{"id": 0}]}"#),
            Err(UniverseReaderError::ParsingError { .. })
        ));
        assert!(matches!(
            parse(r#"{"universes": [{"name": "U"}]}"#),
            Err(UniverseReaderError::ParsingError { .. })
        ));
    }

    #[test]
    fn test_output_missing_plugin_or_line() {
        assert!(matches!(
            parse(r#"{"universes": [{"name": "U", "id": 0, "output": {"line": "0"}}]}"#),
            Err(UniverseReaderError::ParsingError { .. })
        ));
        assert!(matches!(
            parse(r#"{"universes": [{"name": "U", "id": 0, "output": {"plugin": "DMX"}}]}"#),
            Err(UniverseReaderError::ParsingError { .. })
        ));
    }

    #[test]
    fn test_nested_parameter_is_malformed() {
        match parse(
            r#"{"universes": [{"name": "U", "id": 0,
                "output": {"plugin": "DMX", "line": "0", "parameters": {"x": [1, 2]}}}]}"#,
        ) {
            Err(e @ UniverseReaderError::MalformedUniverse { .. }) => {
                assert_eq!(e.kind(), crate::error::ErrorKind::MalformedInput)
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
