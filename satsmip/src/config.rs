//! Formulation settings, layered from several sources.

use sats_opt::FormulationConfig;
use std::path::Path;

/// Load the formulation settings with precedence:
/// 1. Environment variables (highest priority)
/// 2. The TOML file given on the command line
/// 3. Default values (lowest priority)
///
/// Environment variables are mapped using the pattern
/// `SATS_<KEY>` or `SATS_<SECTION>__<KEY>`, for example
///
/// ```bash
/// export SATS_SAFE_CEILING=1000000
/// export SATS_LINEARIZATION=adjacent
/// export SATS_AGGREGATION_LIMIT__HIGH_LIMIT=2
/// ```
pub fn load_config(path: Option<&Path>) -> anyhow::Result<FormulationConfig> {
    let mut config = config::Config::builder();

    config = config.add_source(config::Config::try_from(&FormulationConfig::default())?);

    if let Some(path) = path {
        if path.exists() {
            config = config.add_source(config::File::from(path))
        } else {
            return Err(anyhow::anyhow!(
                "Config file {} does not exist",
                path.display()
            ));
        }
    }

    config = config.add_source(
        config::Environment::with_prefix("SATS")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let loaded: FormulationConfig = config.build()?.try_deserialize()?;
    tracing::debug!(config = ?loaded, "loaded formulation settings");
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sats_opt::Linearization;
    use std::io::Write;

    #[test]
    fn defaults_without_a_file() {
        let config = load_config(None).unwrap();
        assert_eq!(config.linearization, Linearization::Auto);
        assert!(config.allow_zero_value_items);
        assert!(config.aggregation_limit.is_none());
    }

    #[test]
    fn file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!("satsmip-config-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
linearization = "adjacent"
allow_zero_value_items = false

[aggregation_limit]
low = "LOW_PAIRED"
high = "HIGH_PAIRED"
"#
        )
        .unwrap();
        drop(file);

        let config = load_config(Some(&path)).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.linearization, Linearization::Adjacent);
        assert!(!config.allow_zero_value_items);
        let limit = config.aggregation_limit.unwrap();
        assert_eq!(limit.low.as_str(), "LOW_PAIRED");
        assert_eq!(limit.pair_limit, 2);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_config(Some(Path::new("/nonexistent/satsmip.toml"))).is_err());
    }
}
