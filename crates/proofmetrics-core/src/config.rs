use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::types::{BraceCounting, TableFormat};

/// Name of the configuration file looked up in the project tree.
pub const CONFIG_FILE: &str = ".proofmetrics.toml";

/// Top-level configuration from `.proofmetrics.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub components: ComponentsConfig,
    #[serde(default)]
    pub applications: Vec<ApplicationConfig>,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub integration: IntegrationConfig,
    #[serde(default)]
    pub verify: VerifyConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// The dafny-replay registry, used when no config file is found. Registry
/// sections omitted from a loaded file stay empty.
impl Default for Config {
    fn default() -> Self {
        Self {
            components: ComponentsConfig {
                entries: dafny_replay_components(),
                ..ComponentsConfig::default()
            },
            applications: dafny_replay_applications(),
            classifier: ClassifierConfig::default(),
            integration: IntegrationConfig::default(),
            verify: VerifyConfig::default(),
            output: OutputConfig {
                usage_matrix: dafny_replay_usage_matrix(),
                ..OutputConfig::default()
            },
        }
    }
}

/// One shared, independently verified source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentEntry {
    /// Display name used by applications and reports. Defaults to the file stem.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub file: String,
}

impl ComponentEntry {
    pub fn new(file: &str) -> Self {
        Self {
            name: None,
            file: file.to_string(),
        }
    }

    pub fn named(name: &str, file: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            file: file.to_string(),
        }
    }

    /// Registry identifier: the explicit name, or the file name without extension.
    pub fn name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => Path::new(&self.file)
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| self.file.clone()),
        }
    }
}

/// The component registry: a directory and the files registered in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentsConfig {
    #[serde(default = "default_components_dir")]
    pub directory: String,
    #[serde(default)]
    pub entries: Vec<ComponentEntry>,
}

fn default_components_dir() -> String {
    "kernels".to_string()
}

fn dafny_replay_components() -> Vec<ComponentEntry> {
    vec![
        ComponentEntry::new("Replay.dfy"),
        ComponentEntry::new("Authority.dfy"),
        ComponentEntry::new("MultiCollaboration.dfy"),
        ComponentEntry::new("EffectStateMachine.dfy"),
        ComponentEntry::named("CrossProject", "MultiProject.dfy"),
        ComponentEntry::new("EffectSystemProperties.dfy"),
        ComponentEntry::new("MultiEffectSystemProperties.dfy"),
        ComponentEntry::new("MultiProjectEffectStateMachine.dfy"),
        ComponentEntry::new("RealtimeCollaboration.dfy"),
    ]
}

impl Default for ComponentsConfig {
    fn default() -> Self {
        Self {
            directory: default_components_dir(),
            entries: Vec::new(),
        }
    }
}

/// An application: its own source directory and the components it builds on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    pub name: String,
    pub directory: String,
    #[serde(default)]
    pub components: Vec<String>,
}

impl ApplicationConfig {
    pub fn new(name: &str, directory: &str, components: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            directory: directory.to_string(),
            components: components.iter().map(|c| c.to_string()).collect(),
        }
    }
}

fn dafny_replay_applications() -> Vec<ApplicationConfig> {
    vec![
        ApplicationConfig::new("Counter", "counter", &["Replay"]),
        ApplicationConfig::new("Canon", "canon", &["Replay"]),
        ApplicationConfig::new("ColorWheel", "colorwheel", &["Replay"]),
        ApplicationConfig::new("DelegationAuth", "delegation-auth", &["Replay"]),
        ApplicationConfig::new("CounterAuthority", "counter-authority", &["Authority"]),
        ApplicationConfig::new(
            "Kanban",
            "kanban",
            &["Replay", "MultiCollaboration", "EffectStateMachine"],
        ),
        ApplicationConfig::new(
            "ClearSplit",
            "clear-split",
            &["MultiCollaboration", "EffectStateMachine"],
        ),
        ApplicationConfig::new(
            "CollabTodo",
            "collab-todo",
            &["CrossProject", "EffectStateMachine"],
        ),
    ]
}

/// Line classifier settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub brace_counting: BraceCounting,
}

/// Glob patterns separating hand-written integration code from generated code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationConfig {
    /// Directory under each application holding integration code.
    #[serde(default = "default_source_dir")]
    pub source_dir: String,
    #[serde(default = "default_integration_extensions")]
    pub extensions: Vec<String>,
    /// Patterns (relative to `source_dir`) for generated files.
    #[serde(default = "default_generated_patterns")]
    pub generated: Vec<String>,
    /// Patterns (relative to `source_dir`) that stay hand-written even inside generated paths.
    #[serde(default = "default_handwritten_overrides")]
    pub handwritten_overrides: Vec<String>,
    /// Patterns (relative to the application directory) for generated files outside `source_dir`.
    #[serde(default = "default_extra_generated")]
    pub extra_generated: Vec<String>,
}

fn default_source_dir() -> String {
    "src".to_string()
}

fn default_integration_extensions() -> Vec<String> {
    ["js", "jsx", "ts", "tsx", "cjs"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_generated_patterns() -> Vec<String> {
    vec!["dafny*".to_string(), "**/*dafny/**".to_string()]
}

fn default_handwritten_overrides() -> Vec<String> {
    vec!["**/app-extras.ts".to_string()]
}

fn default_extra_generated() -> Vec<String> {
    vec!["supabase/functions/**/dafny-bundle.ts".to_string()]
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            extensions: default_integration_extensions(),
            generated: default_generated_patterns(),
            handwritten_overrides: default_handwritten_overrides(),
            extra_generated: default_extra_generated(),
        }
    }
}

/// External verifier invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyConfig {
    /// Program and leading arguments; the file path is appended.
    #[serde(default = "default_verify_command")]
    pub command: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_verify_command() -> Vec<String> {
    vec!["dafny".to_string(), "verify".to_string()]
}

fn default_timeout_secs() -> u64 {
    300
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            command: default_verify_command(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Where and how tables are written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub directory: String,
    #[serde(default)]
    pub format: TableFormat,
    /// Columns of the usage matrix. Empty means every component some application uses.
    #[serde(default)]
    pub usage_matrix: Vec<String>,
}

fn default_output_dir() -> String {
    "tables".to_string()
}

fn dafny_replay_usage_matrix() -> Vec<String> {
    [
        "Replay",
        "Authority",
        "MultiCollaboration",
        "EffectStateMachine",
        "CrossProject",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            format: TableFormat::default(),
            usage_matrix: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from a `.proofmetrics.toml` file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        let config: Config = toml::from_str(&content).with_context(|| {
            format!(
                "failed to parse '{}'. Run `proofmetrics init` to create a valid config file",
                path.display()
            )
        })?;
        Ok(config)
    }

    /// Load from `.proofmetrics.toml` in the given directory or any ancestor, or return defaults.
    pub fn load_or_default(dir: &Path) -> Self {
        let start = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
        let mut current = start.as_path();
        loop {
            let config_path = current.join(CONFIG_FILE);
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => config,
                    Err(e) => {
                        log::warn!(
                            "failed to load config from '{}': {e:#}. Using defaults.",
                            config_path.display()
                        );
                        Self::default()
                    }
                };
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }
        Self::default()
    }

    /// Columns of the usage matrix, falling back to every referenced component
    /// in registry order when none are configured.
    pub fn usage_matrix_columns(&self) -> Vec<String> {
        if !self.output.usage_matrix.is_empty() {
            return self.output.usage_matrix.clone();
        }
        let mut columns: Vec<String> = self
            .components
            .entries
            .iter()
            .map(ComponentEntry::name)
            .filter(|name| {
                self.applications
                    .iter()
                    .any(|app| app.components.contains(name))
            })
            .collect();
        // Referenced names missing from the registry still get a column.
        for app in &self.applications {
            for name in &app.components {
                if !columns.contains(name) {
                    columns.push(name.clone());
                }
            }
        }
        columns
    }

    /// Generate default TOML content for `proofmetrics init`.
    pub fn default_toml() -> String {
        r#"# proofmetrics - Dafny spec/proof metrics configuration

[components]
# Shared kernels, relative to the project root
directory = "kernels"
# `name` defaults to the file stem
entries = [
  { file = "Replay.dfy" },
  { file = "Authority.dfy" },
  { file = "MultiCollaboration.dfy" },
  { file = "EffectStateMachine.dfy" },
  { name = "CrossProject", file = "MultiProject.dfy" },
  { file = "EffectSystemProperties.dfy" },
  { file = "MultiEffectSystemProperties.dfy" },
  { file = "MultiProjectEffectStateMachine.dfy" },
  { file = "RealtimeCollaboration.dfy" },
]

[[applications]]
name = "Counter"
directory = "counter"
components = ["Replay"]

[[applications]]
name = "Canon"
directory = "canon"
components = ["Replay"]

[[applications]]
name = "ColorWheel"
directory = "colorwheel"
components = ["Replay"]

[[applications]]
name = "DelegationAuth"
directory = "delegation-auth"
components = ["Replay"]

[[applications]]
name = "CounterAuthority"
directory = "counter-authority"
components = ["Authority"]

[[applications]]
name = "Kanban"
directory = "kanban"
components = ["Replay", "MultiCollaboration", "EffectStateMachine"]

[[applications]]
name = "ClearSplit"
directory = "clear-split"
components = ["MultiCollaboration", "EffectStateMachine"]

[[applications]]
name = "CollabTodo"
directory = "collab-todo"
components = ["CrossProject", "EffectStateMachine"]

[classifier]
# "lexical" counts every brace character; "literal-aware" skips strings and comments
brace_counting = "lexical"

[integration]
source_dir = "src"
extensions = ["js", "jsx", "ts", "tsx", "cjs"]
# Relative to source_dir
generated = ["dafny*", "**/*dafny/**"]
handwritten_overrides = ["**/app-extras.ts"]
# Relative to the application directory
extra_generated = ["supabase/functions/**/dafny-bundle.ts"]

[verify]
command = ["dafny", "verify"]
timeout_secs = 300

[output]
directory = "tables"
# "latex" or "markdown"
format = "latex"
usage_matrix = ["Replay", "Authority", "MultiCollaboration", "EffectStateMachine", "CrossProject"]
"#
        .to_string()
    }
}
