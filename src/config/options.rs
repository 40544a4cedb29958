// ABOUTME: Environment option settings assembled from the options file and the dotenv file.
// ABOUTME: File entries come first, dotenv entries follow; duplicates are kept in order.

use crate::cloud::OptionSetting;
use crate::diagnostics::{Diagnostics, Warning};
use crate::error::{Error, Result};
use serde_yaml::{Mapping, Value};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

/// Namespace holding the variables exported to the application process.
pub const APP_ENV_NAMESPACE: &str = "aws:elasticbeanstalk:application:environment";

/// Parse an options file mapping `namespace -> option -> value`.
///
/// Scalar values are rendered as strings; `null` becomes an empty value.
pub fn parse_option_file(yaml: &str) -> Result<Vec<OptionSetting>> {
    let root: Option<Mapping> = serde_yaml::from_str(yaml)?;
    let Some(root) = root else {
        return Ok(Vec::new());
    };

    let mut settings = Vec::new();
    for (namespace, options) in root {
        let namespace = scalar_to_string(&namespace)
            .ok_or_else(|| Error::InvalidConfig("option namespace must be a string".into()))?;
        let Value::Mapping(options) = options else {
            return Err(Error::InvalidConfig(format!(
                "options for namespace '{namespace}' must be a mapping"
            )));
        };

        for (key, value) in options {
            let key = scalar_to_string(&key).ok_or_else(|| {
                Error::InvalidConfig(format!("option name in '{namespace}' must be a string"))
            })?;
            let value = scalar_to_string(&value).ok_or_else(|| {
                Error::InvalidConfig(format!("value of {namespace}/{key} must be a scalar"))
            })?;
            settings.push(OptionSetting::new(namespace.clone(), key, value));
        }
    }

    Ok(settings)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        _ => None,
    }
}

/// Load the options file. A missing file is a precondition failure.
pub fn load_option_file(path: &Path) -> Result<Vec<OptionSetting>> {
    if !path.is_file() {
        return Err(Error::ConfigNotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    parse_option_file(&content)
}

/// Read `KEY=value` pairs in file order without touching the process environment.
pub fn parse_dotenv<R: Read>(reader: R, path: &Path) -> Result<Vec<(String, String)>> {
    dotenvy::from_read_iter(reader)
        .map(|item| {
            item.map_err(|e| Error::Dotenv {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
        })
        .collect()
}

/// Load the dotenv file. A missing file is a precondition failure.
pub fn load_dotenv(path: &Path) -> Result<Vec<(String, String)>> {
    if !path.is_file() {
        return Err(Error::MissingEnvFile(path.to_path_buf()));
    }
    let file = std::fs::File::open(path)?;
    parse_dotenv(file, path)
}

/// Append every dotenv variable as an application environment option.
pub fn merge_options(
    mut file_settings: Vec<OptionSetting>,
    env_vars: Vec<(String, String)>,
) -> Vec<OptionSetting> {
    file_settings.extend(
        env_vars
            .into_iter()
            .map(|(key, value)| OptionSetting::new(APP_ENV_NAMESPACE, key, value)),
    );
    file_settings
}

/// Warn once for every option that is set more than once.
pub fn warn_duplicates(settings: &[OptionSetting], diag: &mut Diagnostics) {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for setting in settings {
        let key = (setting.namespace.as_str(), setting.option_name.as_str());
        if !seen.insert(key) && reported.insert(key) {
            diag.warn(Warning::duplicate_option(format!(
                "option {}/{} is set more than once; the last value wins",
                setting.namespace, setting.option_name
            )));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_namespaces_in_file_order() {
        let yaml = r#"
aws:autoscaling:launchconfiguration:
  IamInstanceProfile: aws-elasticbeanstalk-ec2-role
  InstanceType: t3.micro
aws:autoscaling:asg:
  MinSize: 1
  MaxSize: 2
aws:elasticbeanstalk:environment:
  EnvironmentType: LoadBalanced
"#;
        let settings = parse_option_file(yaml).unwrap();
        let names: Vec<_> = settings.iter().map(|s| s.option_name.as_str()).collect();
        assert_eq!(
            names,
            [
                "IamInstanceProfile",
                "InstanceType",
                "MinSize",
                "MaxSize",
                "EnvironmentType"
            ]
        );
        assert_eq!(settings[2].namespace, "aws:autoscaling:asg");
        assert_eq!(settings[2].value, "1");
    }

    #[test]
    fn booleans_and_nulls_become_strings() {
        let yaml = "ns:\n  Enabled: true\n  Empty:\n";
        let settings = parse_option_file(yaml).unwrap();
        assert_eq!(settings[0].value, "true");
        assert_eq!(settings[1].value, "");
    }

    #[test]
    fn nested_values_are_rejected() {
        let yaml = "ns:\n  Key:\n    - a\n";
        let err = parse_option_file(yaml).unwrap_err();
        assert!(err.to_string().contains("ns/Key"));
    }

    #[test]
    fn empty_file_has_no_options() {
        assert!(parse_option_file("").unwrap().is_empty());
    }

    #[test]
    fn dotenv_keeps_file_order() {
        let env = "ZETA=1\n# comment\nALPHA=\"two words\"\n";
        let vars = parse_dotenv(env.as_bytes(), Path::new(".env")).unwrap();
        assert_eq!(
            vars,
            vec![
                ("ZETA".to_string(), "1".to_string()),
                ("ALPHA".to_string(), "two words".to_string())
            ]
        );
    }

    #[test]
    fn duplicates_produce_one_warning_per_option() {
        let settings = vec![
            OptionSetting::new(APP_ENV_NAMESPACE, "FOO", "1"),
            OptionSetting::new(APP_ENV_NAMESPACE, "FOO", "2"),
            OptionSetting::new(APP_ENV_NAMESPACE, "FOO", "3"),
            OptionSetting::new(APP_ENV_NAMESPACE, "BAR", "1"),
        ];
        let mut diag = Diagnostics::default();
        warn_duplicates(&settings, &mut diag);
        assert_eq!(diag.warnings().len(), 1);
        assert!(diag.warnings()[0].message.contains("FOO"));
    }
}
