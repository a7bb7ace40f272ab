//! Generator configuration
//!
//! Projects can describe their generation targets in an `edgeroute.toml` file at
//! the project root. Every key has a default, so a project following the
//! conventional layout (`src/controllers`, `src/consumers`) needs no file at all.
//!
//! ```toml
//! extensions = ["ts", "tsx"]
//!
//! [http]
//! source_dir = "src/controllers"
//! output = "src/generated/router.ts"
//!
//! [[http.middleware]]
//! name = "cors"
//! path = "src/middleware/cors.ts"
//!
//! [queue]
//! enabled = false
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::table::PipelineKind;

/// Name of the configuration file looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "edgeroute.toml";

/// Top-level generator configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Recognized source file extensions (without the dot). `.d.ts` files are
    /// always skipped.
    pub extensions: Vec<String>,
    /// Directory names that are never descended into.
    pub exclude: Vec<String>,
    /// HTTP router target.
    pub http: HttpTargetConfig,
    /// Queue consumer target.
    pub queue: QueueTargetConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            extensions: ["ts", "tsx", "mts", "cts"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            exclude: vec!["node_modules".to_string()],
            http: HttpTargetConfig::default(),
            queue: QueueTargetConfig::default(),
        }
    }
}

/// Settings for the generated HTTP router.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct HttpTargetConfig {
    pub enabled: bool,
    /// Directory scanned for `@Controller` classes.
    pub source_dir: PathBuf,
    /// Generated router module.
    pub output: PathBuf,
    /// Package providing `Router` and `IRequest`.
    pub router_package: String,
    /// Package providing the dependency-injection container type.
    pub container_package: String,
    /// Name of the container type imported from `container_package`.
    pub container_type: String,
    /// Path of the built-in health-check route.
    pub health_path: String,
    /// Middleware registered globally, in order, before any route.
    pub middleware: Vec<MiddlewareImport>,
}

impl Default for HttpTargetConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            source_dir: PathBuf::from("src/controllers"),
            output: PathBuf::from("src/generated/router.ts"),
            router_package: "itty-router".to_string(),
            container_package: "tsyringe".to_string(),
            container_type: "DependencyContainer".to_string(),
            health_path: "/ping".to_string(),
            middleware: vec![
                MiddlewareImport {
                    name: "cors".to_string(),
                    path: PathBuf::from("src/middleware/cors.ts"),
                },
                MiddlewareImport {
                    name: "auth".to_string(),
                    path: PathBuf::from("src/middleware/auth.ts"),
                },
            ],
        }
    }
}

/// A named export registered as global middleware.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MiddlewareImport {
    /// Exported binding name, used verbatim in the generated code.
    pub name: String,
    /// Module declaring the binding, relative to the project root.
    pub path: PathBuf,
}

/// Settings for the generated queue dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct QueueTargetConfig {
    pub enabled: bool,
    /// Directory scanned for `@Consumer` classes.
    pub source_dir: PathBuf,
    /// Generated queue dispatch module.
    pub output: PathBuf,
    pub container_package: String,
    pub container_type: String,
    /// Type of the worker environment bindings passed to every consumer.
    pub env_type: String,
    /// Module exporting `env_type`. When absent the type is assumed ambient.
    pub env_module: Option<PathBuf>,
}

impl Default for QueueTargetConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            source_dir: PathBuf::from("src/consumers"),
            output: PathBuf::from("src/generated/queue.ts"),
            container_package: "tsyringe".to_string(),
            container_type: "DependencyContainer".to_string(),
            env_type: "Env".to_string(),
            env_module: None,
        }
    }
}

impl GeneratorConfig {
    /// Whether the given target is switched on.
    pub fn is_enabled(&self, kind: PipelineKind) -> bool {
        match kind {
            PipelineKind::Http => self.http.enabled,
            PipelineKind::Queue => self.queue.enabled,
        }
    }

    /// Source directory scanned for the given target, relative to the project root.
    pub fn source_dir(&self, kind: PipelineKind) -> &Path {
        match kind {
            PipelineKind::Http => &self.http.source_dir,
            PipelineKind::Queue => &self.queue.source_dir,
        }
    }

    /// Generated file for the given target, relative to the project root.
    pub fn output(&self, kind: PipelineKind) -> &Path {
        match kind {
            PipelineKind::Http => &self.http.output,
            PipelineKind::Queue => &self.queue.output,
        }
    }

    /// Whether `path` carries one of the recognized source extensions.
    pub fn is_source_file(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        if name.ends_with(".d.ts") {
            return false;
        }
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|known| known == ext))
            .unwrap_or(false)
    }
}

/// Load a configuration file.
///
/// Returns `Ok(None)` if the file doesn't exist (not an error) and `Err` if it
/// exists but fails to parse.
pub fn load_config(config_path: &Path) -> anyhow::Result<Option<GeneratorConfig>> {
    if !config_path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config: {}", config_path.display()))?;

    let config: GeneratorConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config: {}", config_path.display()))?;

    Ok(Some(config))
}

/// Resolve the configuration for a project.
///
/// Priority:
/// 1. Explicitly provided path (via CLI) - must exist
/// 2. `edgeroute.toml` in the project root
/// 3. Built-in defaults
pub fn resolve_config(explicit_path: Option<&Path>, project_root: &Path) -> anyhow::Result<GeneratorConfig> {
    if let Some(path) = explicit_path {
        return load_config(path)?
            .ok_or_else(|| anyhow::anyhow!("Config file not found: {}", path.display()));
    }
    let default_path = project_root.join(CONFIG_FILE_NAME);
    Ok(load_config(&default_path)?.unwrap_or_default())
}
