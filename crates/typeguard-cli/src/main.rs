//! Contract-check CLI.
//!
//! Provides the `typeguard` binary, which runs one check against a value
//! given as JSON and prints the outcome as JSON. Classes and functions the
//! value may refer to are loaded from a registry configuration file.
//!
//! Uses the same `typeguard_check` entry points as library callers, so a
//! value fails here exactly when it fails in-process.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use typeguard_check::{AssertionError, Checker};
use typeguard_core::{Array, ArrayKey, ClassRegistry, CoreError, Object, RegistryConfig, Value};

/// JSON object member naming the class of an object value.
const CLASS_MARKER: &str = "$class";
/// JSON string standing for a closure.
const CLOSURE_MARKER: &str = "$closure";

/// Runtime contract checks for JSON values.
#[derive(Parser)]
#[command(name = "typeguard", about = "Runtime contract checks for JSON values")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// The value under test and where its classes come from.
#[derive(Args, Debug)]
struct Subject {
    /// The value to check, as JSON.
    #[arg(short, long)]
    value: String,

    /// Parameter name used in failure messages.
    #[arg(short, long, default_value = "value")]
    name: String,

    /// Registry configuration (JSON) declaring classes and functions.
    #[arg(long, env = "TYPEGUARD_CLASSES")]
    classes: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Check that the value satisfies a type specification.
    Type {
        /// Pipe-delimited type specification, e.g. `integer|null`.
        #[arg(short = 't', long = "type")]
        spec: String,

        #[command(flatten)]
        subject: Subject,
    },
    /// Check that the value is an array whose elements satisfy a type
    /// specification.
    ElementType {
        /// Pipe-delimited element type specification.
        #[arg(short = 't', long = "type")]
        spec: String,

        #[command(flatten)]
        subject: Subject,
    },
    /// Check that the value is an array whose keys are all `integer` or all
    /// `string`.
    KeyType {
        /// `integer` or `string`.
        #[arg(short = 't', long = "type")]
        tag: String,

        #[command(flatten)]
        subject: Subject,
    },
    /// Check that the value is a non-empty string.
    NonEmpty {
        #[command(flatten)]
        subject: Subject,
    },
}

impl Commands {
    fn subject(&self) -> &Subject {
        match self {
            Commands::Type { subject, .. }
            | Commands::ElementType { subject, .. }
            | Commands::KeyType { subject, .. }
            | Commands::NonEmpty { subject } => subject,
        }
    }
}

/// Input problems; contract failures are not errors at this level.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid class registry: {0}")]
    Registry(#[from] CoreError),
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let exit_code = match run(&cli.command) {
        Ok(outcome) => report(outcome),
        Err(e) => {
            eprintln!("Error: {}", e);
            2
        }
    };
    process::exit(exit_code);
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TYPEGUARD_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Execute a subcommand.
///
/// The outer `Result` is about the input; the inner one is the check.
fn run(command: &Commands) -> Result<Result<(), AssertionError>, CliError> {
    let subject = command.subject();
    let registry = load_registry(subject.classes.as_deref())?;
    let value = decode_value(serde_json::from_str(&subject.value)?);
    let checker = Checker::new(&registry);
    let name = subject.name.as_str();

    tracing::debug!(command = ?command, "running check");
    Ok(match command {
        Commands::Type { spec, .. } => checker.parameter_type(spec.as_str(), &value, name),
        Commands::ElementType { spec, .. } => {
            checker.parameter_element_type(spec.as_str(), &value, name)
        }
        Commands::KeyType { tag, .. } => checker.parameter_key_type(tag, &value, name),
        Commands::NonEmpty { .. } => checker.non_empty_string(&value, name),
    })
}

/// Print the outcome as JSON and return the exit code.
fn report(outcome: Result<(), AssertionError>) -> i32 {
    match outcome {
        Ok(()) => {
            println!("{}", serde_json::json!({ "ok": true }));
            0
        }
        Err(failure) => {
            println!("{}", failure_report(&failure));
            1
        }
    }
}

fn failure_report(failure: &AssertionError) -> serde_json::Value {
    serde_json::json!({
        "ok": false,
        "message": failure.message(),
        "failure": failure,
    })
}

/// Built-ins only, or built-ins plus the declarations in `path`.
fn load_registry(path: Option<&Path>) -> Result<ClassRegistry, CliError> {
    let Some(path) = path else {
        return Ok(ClassRegistry::new());
    };
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: RegistryConfig = serde_json::from_str(&text)?;
    Ok(ClassRegistry::from_config(&config)?)
}

/// Decode JSON into a [`Value`], recognizing the object and closure markers.
fn decode_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::String(s) if s == CLOSURE_MARKER => Value::from(Object::closure()),
        serde_json::Value::Array(items) => {
            Value::from(Array::list(items.into_iter().map(decode_value)))
        }
        serde_json::Value::Object(mut map) => {
            if let Some(serde_json::Value::String(class)) = map.get(CLASS_MARKER) {
                let mut object = Object::new(class.as_str());
                map.shift_remove(CLASS_MARKER);
                for (property, value) in map {
                    object.set_property(property, decode_value(value));
                }
                return Value::from(object);
            }
            let mut array = Array::new();
            for (key, value) in map {
                array.insert(ArrayKey::from(key), decode_value(value));
            }
            Value::from(array)
        }
        other => Value::from(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use typeguard_check::FailureKind;

    fn command(args: &[&str]) -> Commands {
        let mut argv = vec!["typeguard"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().command
    }

    fn config_file(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    // -----------------------------------------------------------------------
    // Argument parsing
    // -----------------------------------------------------------------------

    #[test]
    fn parses_type_subcommand() {
        match command(&["type", "--type", "integer|null", "--value", "null"]) {
            Commands::Type { spec, subject } => {
                assert_eq!(spec, "integer|null");
                assert_eq!(subject.value, "null");
                assert_eq!(subject.name, "value");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_missing_value() {
        assert!(Cli::try_parse_from(["typeguard", "non-empty"]).is_err());
    }

    // -----------------------------------------------------------------------
    // Checks
    // -----------------------------------------------------------------------

    #[test]
    fn type_check_passes() {
        let cmd = command(&["type", "-t", "integer|null", "-v", "null"]);
        assert_eq!(run(&cmd).unwrap(), Ok(()));
    }

    #[test]
    fn element_type_failure_is_reported() {
        let cmd = command(&["element-type", "-t", "string", "-v", r#"["hello", 5]"#, "-n", "list"]);
        let failure = run(&cmd).unwrap().unwrap_err();
        assert_eq!(failure.kind(), FailureKind::ParameterElementType);

        let report = failure_report(&failure);
        assert_eq!(report["ok"], false);
        assert_eq!(report["failure"]["kind"], "parameter_element_type");
        assert_eq!(report["failure"]["key"], 1);
        assert_eq!(
            report["message"],
            "Bad value for parameter list: all elements must be string, got 5 at key 1"
        );
    }

    #[test]
    fn key_type_sees_normalized_keys() {
        let cmd = command(&["key-type", "-t", "integer", "-v", r#"{"0": "a", "7": "b"}"#]);
        assert_eq!(run(&cmd).unwrap(), Ok(()));

        let cmd = command(&["key-type", "-t", "integer|string", "-v", "[]"]);
        let failure = run(&cmd).unwrap().unwrap_err();
        assert_eq!(failure.kind(), FailureKind::UnsupportedType);
    }

    #[test]
    fn non_empty_string_check() {
        let cmd = command(&["non-empty", "-v", r#""""#, "-n", "s"]);
        let failure = run(&cmd).unwrap().unwrap_err();
        assert_eq!(
            failure.to_string(),
            "Bad value for parameter s: must be a non-empty string"
        );
    }

    #[test]
    fn closure_marker_is_callable() {
        let cmd = command(&["type", "-t", "callable", "-v", r#""$closure""#]);
        assert_eq!(run(&cmd).unwrap(), Ok(()));
    }

    #[test]
    fn bad_json_is_an_input_error() {
        let cmd = command(&["type", "-t", "string", "-v", "{not json"]);
        assert!(matches!(run(&cmd), Err(CliError::Json(_))));
    }

    // -----------------------------------------------------------------------
    // Registry configuration
    // -----------------------------------------------------------------------

    #[test]
    fn classes_come_from_config() {
        let file = config_file(
            r#"{
                "classes": [
                    { "name": "Exception", "methods": ["getMessage"] },
                    { "name": "RuntimeException", "extends": ["Exception"] }
                ],
                "functions": ["time"]
            }"#,
        );
        let path = file.path().to_str().unwrap();

        let cmd = command(&[
            "type",
            "-t",
            "Exception",
            "-v",
            r#"{"$class": "RuntimeException"}"#,
            "--classes",
            path,
        ]);
        assert_eq!(run(&cmd).unwrap(), Ok(()));

        let cmd = command(&["type", "-t", "callable", "-v", r#""time""#, "--classes", path]);
        assert_eq!(run(&cmd).unwrap(), Ok(()));

        let cmd = command(&["type", "-t", "callable", "-v", r#""Exception::getMessage""#, "--classes", path]);
        assert_eq!(run(&cmd).unwrap(), Ok(()));
    }

    #[test]
    fn invalid_config_is_an_input_error() {
        let file = config_file(r#"{ "classes": [ { "name": "Child", "extends": ["Missing"] } ] }"#);
        assert!(matches!(
            load_registry(Some(file.path())),
            Err(CliError::Registry(CoreError::UnknownClass { .. }))
        ));

        let missing = file.path().with_extension("missing");
        assert!(matches!(load_registry(Some(missing.as_path())), Err(CliError::Io { .. })));
    }

    // -----------------------------------------------------------------------
    // Value decoding
    // -----------------------------------------------------------------------

    #[test]
    fn decodes_objects_with_properties() {
        let value = decode_value(serde_json::json!({ "$class": "Point", "x": 1, "tags": ["a"] }));
        let object = value.as_object().unwrap();
        assert_eq!(object.class(), "Point");
        assert_eq!(object.property("x"), Some(&Value::from(1)));
        assert_eq!(object.property("tags"), Some(&Value::from(Array::list(["a"]))));
    }

    #[test]
    fn object_members_keep_source_order() {
        let value = decode_value(serde_json::from_str(r#"{"z": 1, "$class": 2, "a": "x"}"#).unwrap());
        let keys: Vec<_> = value.as_array().unwrap().keys().cloned().collect();
        assert_eq!(
            keys,
            vec![ArrayKey::from("z"), ArrayKey::from("$class"), ArrayKey::from("a")]
        );

        let cmd = command(&["element-type", "-t", "string", "-v", r#"{"z": 1, "a": 2}"#]);
        let failure = run(&cmd).unwrap().unwrap_err();
        assert_eq!(failure.offending_key(), Some(&ArrayKey::from("z")));
    }

    #[test]
    fn non_string_class_marker_stays_an_array_member() {
        let value = decode_value(serde_json::json!({ "$class": 5 }));
        let array = value.as_array().unwrap();
        assert_eq!(array.get(&ArrayKey::from("$class")), Some(&Value::from(5)));
    }

    #[test]
    fn nested_markers_are_decoded() {
        let value = decode_value(serde_json::json!(["$closure", { "$class": "stdClass" }]));
        let array = value.as_array().unwrap();
        assert_eq!(array.get(&ArrayKey::Int(0)), Some(&Value::from(Object::closure())));
        assert_eq!(
            array.get(&ArrayKey::Int(1)),
            Some(&Value::from(Object::new("stdClass")))
        );
    }
}
