use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Log filter and output format, read from `RUST_LOG` and `LOG_FORMAT`.
#[derive(Debug, Clone, PartialEq)]
pub struct LogSettings {
    pub filter: String,
    pub json: bool,
}

impl LogSettings {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            filter: lookup("RUST_LOG")
                .filter(|f| !f.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_FILTER.to_string()),
            json: lookup("LOG_FORMAT").is_some_and(|f| f.trim().eq_ignore_ascii_case("json")),
        }
    }
}

/// Install the global subscriber. `.env` is read first so logging settings
/// placed there apply from the first line of output.
pub fn init_tracing() {
    dotenvy::dotenv().ok();
    let settings = LogSettings::from_lookup(|key| std::env::var(key).ok());

    let filter = EnvFilter::try_new(&settings.filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if settings.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = LogSettings::from_lookup(|_| None);
        assert_eq!(settings.filter, "info");
        assert!(!settings.json);
    }

    #[test]
    fn test_settings_from_env_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "RUST_LOG=rank=debug,info").unwrap();
        writeln!(file, "LOG_FORMAT=JSON").unwrap();

        let vars: HashMap<String, String> = dotenvy::from_path_iter(&path)
            .unwrap()
            .map(|item| item.unwrap())
            .collect();
        let settings = LogSettings::from_lookup(|key| vars.get(key).cloned());

        assert_eq!(settings.filter, "rank=debug,info");
        assert!(settings.json);
    }

    #[test]
    fn test_blank_filter_falls_back() {
        let settings = LogSettings::from_lookup(|key| (key == "RUST_LOG").then(|| "  ".to_string()));
        assert_eq!(settings.filter, "info");
    }
}
