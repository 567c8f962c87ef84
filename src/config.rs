//! Packager configuration
//!
//! Read from `packager.toml` at the project root when present, otherwise the
//! built-in defaults (the two shipped products). Format:
//!
//! ```toml
//! dist_dir = "bin"
//! locked = false
//!
//! [[product]]
//! name = "tradingbot"
//!
//! [[product]]
//! name = "trading-view"
//! package = "trading-view"   # cargo -p selector, for workspace projects
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::PackageError;

/// One packaged deliverable
#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    /// Product name, used for selection and status output
    pub name: String,
    /// Executable file stem; defaults to the product name
    #[serde(default)]
    pub bin: Option<String>,
    /// `cargo build -p` selector for workspace projects
    #[serde(default)]
    pub package: Option<String>,
}

impl Product {
    /// Product with all defaults derived from its name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            bin: None,
            package: None,
        }
    }

    /// Executable file stem, before the platform suffix is applied
    pub fn bin_name(&self) -> &str {
        self.bin.as_deref().unwrap_or(&self.name)
    }
}

/// Packager configuration as loaded from `packager.toml`
#[derive(Debug, Clone, Deserialize)]
pub struct PackagerConfig {
    /// Distribution directory, resolved against the project root
    #[serde(default = "default_dist_dir")]
    pub dist_dir: PathBuf,
    /// Pass `--locked` to every build
    #[serde(default)]
    pub locked: bool,
    /// Products collected into the distribution directory
    #[serde(default, rename = "product")]
    pub products: Vec<Product>,
}

fn default_dist_dir() -> PathBuf {
    PathBuf::from("bin")
}

impl Default for PackagerConfig {
    fn default() -> Self {
        Self {
            dist_dir: default_dist_dir(),
            locked: false,
            products: vec![Product::new("tradingbot"), Product::new("trading-view")],
        }
    }
}

impl PackagerConfig {
    /// Configuration file looked up at the project root
    pub const FILE_NAME: &'static str = "packager.toml";

    /// Load `packager.toml` from `root`, falling back to the defaults when
    /// the file is absent. A present-but-malformed file is fatal.
    pub fn load(root: &Path) -> Result<Self, PackageError> {
        let path = root.join(Self::FILE_NAME);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no packager.toml, using defaults");
            return Ok(Self::default());
        }

        let text = fs::read_to_string(&path).map_err(|e| PackageError::Io {
            op: "read",
            path: path.clone(),
            source: e,
        })?;
        let config: Self = toml::from_str(&text)
            .map_err(|e| PackageError::Config(format!("{}: {e}", path.display())))?;
        config.validate(&path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<(), PackageError> {
        if self.products.is_empty() {
            return Err(PackageError::Config(format!(
                "{}: no products configured",
                path.display()
            )));
        }
        for (i, product) in self.products.iter().enumerate() {
            if self.products[..i].iter().any(|p| p.name == product.name) {
                return Err(PackageError::Config(format!(
                    "{}: duplicate product `{}`",
                    path.display(),
                    product.name
                )));
            }
        }
        Ok(())
    }

    /// Resolve the product subset named on the command line. An empty
    /// selection means every configured product.
    pub fn select(&self, names: &[String]) -> Result<Vec<Product>, PackageError> {
        if names.is_empty() {
            return Ok(self.products.clone());
        }
        names
            .iter()
            .map(|name| {
                self.products
                    .iter()
                    .find(|p| p.name == *name)
                    .cloned()
                    .ok_or_else(|| {
                        PackageError::Config(format!(
                            "unknown product `{name}` (use --list to see configured products)"
                        ))
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config_has_both_products() {
        let config = PackagerConfig::default();
        let names: Vec<&str> = config.products.iter().map(|p| p.name.as_str()).collect();

        assert_eq!(names, vec!["tradingbot", "trading-view"]);
        assert_eq!(config.dist_dir, PathBuf::from("bin"));
        assert!(!config.locked);
    }

    #[test]
    fn test_parse_packager_toml() {
        let config: PackagerConfig = toml::from_str(
            r#"
            dist_dir = "dist"
            locked = true

            [[product]]
            name = "tradingbot"

            [[product]]
            name = "trading-view"
            bin = "trading_view"
            package = "trading-view"
            "#,
        )
        .expect("valid config");

        assert_eq!(config.dist_dir, PathBuf::from("dist"));
        assert!(config.locked);
        assert_eq!(config.products.len(), 2);
        assert_eq!(config.products[0].bin_name(), "tradingbot");
        assert_eq!(config.products[1].bin_name(), "trading_view");
        assert_eq!(config.products[1].package.as_deref(), Some("trading-view"));
    }

    #[test]
    fn test_select_empty_returns_all() {
        let config = PackagerConfig::default();
        let selected = config.select(&[]).expect("select all");

        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn test_select_subset_preserves_cli_order() {
        let config = PackagerConfig::default();
        let selected = config
            .select(&["trading-view".to_string(), "tradingbot".to_string()])
            .expect("known products");
        let names: Vec<&str> = selected.iter().map(|p| p.name.as_str()).collect();

        assert_eq!(names, vec!["trading-view", "tradingbot"]);
    }

    #[test]
    fn test_select_unknown_product_fails() {
        let config = PackagerConfig::default();
        let err = config.select(&["tradingview".to_string()]).unwrap_err();

        assert!(matches!(err, PackageError::Config(_)));
        assert!(err.to_string().contains("unknown product `tradingview`"));
    }

    #[test]
    fn test_duplicate_product_names_rejected() {
        let text = r#"
            [[product]]
            name = "tradingbot"

            [[product]]
            name = "tradingbot"
        "#;
        let config: PackagerConfig = toml::from_str(text).expect("parses");
        let err = config.validate(Path::new("packager.toml")).unwrap_err();

        assert!(err.to_string().contains("duplicate product"));
    }

    #[test]
    fn test_empty_products_rejected() {
        let config: PackagerConfig = toml::from_str("dist_dir = \"bin\"").expect("parses");
        let err = config.validate(Path::new("packager.toml")).unwrap_err();

        assert!(err.to_string().contains("no products configured"));
    }
}
