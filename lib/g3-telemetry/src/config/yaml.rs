/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::path::PathBuf;

use anyhow::{Context, anyhow};
use yaml_rust::{Yaml, yaml};

use super::TelemetryConfig;

fn normalize_key(k: &str) -> String {
    k.to_lowercase().replace('-', "_")
}

fn foreach_kv<F>(map: &yaml::Hash, mut f: F) -> anyhow::Result<()>
where
    F: FnMut(&str, &Yaml) -> anyhow::Result<()>,
{
    for (k, v) in map.iter() {
        if let Yaml::String(key) = k {
            f(key, v)?;
        } else {
            return Err(anyhow!("all keys should be string"));
        }
    }
    Ok(())
}

impl TelemetryConfig {
    pub fn parse_yaml(v: &Yaml) -> anyhow::Result<Self> {
        if let Yaml::Hash(map) = v {
            let mut config = TelemetryConfig::default();
            foreach_kv(map, |k, v| config.set_by_yaml_kv(k, v))?;
            config.check()?;
            Ok(config)
        } else {
            Err(anyhow!(
                "yaml value type for 'telemetry config' should be 'map'"
            ))
        }
    }

    fn set_by_yaml_kv(&mut self, k: &str, v: &Yaml) -> anyhow::Result<()> {
        match normalize_key(k).as_str() {
            "data_dir" | "directory" => {
                let Yaml::String(s) = v else {
                    return Err(anyhow!("yaml value type for key {k} should be 'string'"));
                };
                self.set_data_dir(PathBuf::from(s));
                Ok(())
            }
            "max_pending_pings" => {
                let Yaml::Integer(i) = v else {
                    return Err(anyhow!("yaml value type for key {k} should be 'integer'"));
                };
                let max = usize::try_from(*i)
                    .map_err(|e| anyhow!("out of range usize value: {e}"))
                    .context(format!("invalid value for key {k}"))?;
                self.set_max_pending_pings(max);
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yaml_rust::YamlLoader;

    macro_rules! yaml_doc {
        ($s:literal) => {
            YamlLoader::load_from_str($s).unwrap().pop().unwrap()
        };
    }

    #[test]
    fn parse_yaml_ok() {
        let yaml = yaml_doc!(
            r#"
                data_dir: "/var/lib/telemetry"
                max_pending_pings: 16
            "#
        );
        let config = TelemetryConfig::parse_yaml(&yaml).unwrap();
        assert_eq!(config.data_dir(), PathBuf::from("/var/lib/telemetry"));
        assert_eq!(config.max_pending_pings(), 16);

        let yaml = yaml_doc!(
            r#"
                directory: "/var/lib/telemetry"
            "#
        );
        let config = TelemetryConfig::parse_yaml(&yaml).unwrap();
        assert_eq!(config.max_pending_pings(), super::super::DEFAULT_MAX_PENDING_PINGS);
    }

    #[test]
    fn parse_yaml_err() {
        let yaml = yaml_doc!(
            r#"
                invalid_key: "value"
            "#
        );
        assert!(TelemetryConfig::parse_yaml(&yaml).is_err());

        // no data dir set
        let yaml = yaml_doc!(
            r#"
                max_pending_pings: 16
            "#
        );
        assert!(TelemetryConfig::parse_yaml(&yaml).is_err());

        let yaml = yaml_doc!(
            r#"
                data_dir: 123
            "#
        );
        assert!(TelemetryConfig::parse_yaml(&yaml).is_err());

        let yaml = yaml_doc!(
            r#"
                data_dir: "/var/lib/telemetry"
                max_pending_pings: -1
            "#
        );
        assert!(TelemetryConfig::parse_yaml(&yaml).is_err());

        let yaml = Yaml::Array(vec![]);
        assert!(TelemetryConfig::parse_yaml(&yaml).is_err());

        let yaml = Yaml::Null;
        assert!(TelemetryConfig::parse_yaml(&yaml).is_err());
    }
}
