//! Configuration loading and typed config structures for the Crafting simulation.
//!
//! The canonical configuration lives in `crafting-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, a loader that reads the file, and the builders that turn the
//! `world` and `purpose` sections into a [`World`] and a [`Purpose`].

use std::path::{Path, PathBuf};

use crafting_purpose::{Purpose, PurposeError, RewardShaping, Task, TerminalGroups};
use crafting_types::{Item, ItemStack, Zone};
use crafting_world::presets;
use crafting_world::{Node, RandomWorldConfig, World, WorldError, random_world};
use serde::Deserialize;
use tracing::{info, warn};

/// Environment variable overriding the configuration path.
pub const CONFIG_PATH_ENV: &str = "CRAFTING_CONFIG";

/// Configuration file looked up when [`CONFIG_PATH_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "crafting-config.yaml";

/// Errors that can occur when loading configuration or building from it.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A task entry lacks a field its kind needs.
    #[error("task #{index} ({kind}): missing field `{field}`")]
    MissingTaskField {
        /// Position of the entry in `purpose.tasks`.
        index: usize,
        /// The entry's kind.
        kind: TaskKind,
        /// The missing field.
        field: &'static str,
    },

    /// The configured world could not be built.
    #[error("world: {0}")]
    World(#[from] WorldError),

    /// The configured purpose could not be assembled.
    #[error("purpose: {0}")]
    Purpose(#[from] PurposeError),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
///
/// Mirrors the structure of `crafting-config.yaml`. Every section has
/// defaults, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CraftingConfig {
    /// Which world to build.
    #[serde(default)]
    pub world: WorldConfig,

    /// Tasks and rewards.
    #[serde(default)]
    pub purpose: PurposeConfig,

    /// Episode bounds and decision source seed.
    #[serde(default)]
    pub episode: EpisodeConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CraftingConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yml reads an empty document as null rather than an empty map.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Path named by [`CONFIG_PATH_ENV`], or [`DEFAULT_CONFIG_PATH`].
    pub fn resolve_path() -> PathBuf {
        std::env::var_os(CONFIG_PATH_ENV)
            .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
    }

    /// Load from [`CraftingConfig::resolve_path`]; a missing file gives the
    /// defaults.
    ///
    /// # Errors
    ///
    /// Same as [`CraftingConfig::from_file`] for a file that exists.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::resolve_path();
        if !path.exists() {
            info!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let config = Self::from_file(&path)?;
        info!(path = %path.display(), "Config loaded");
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// Built-in world families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorldPreset {
    /// Wood, stone, planks, a table and a house over two zones.
    #[default]
    WoodHouse,
    /// Two rooms, a key, a locked door and a box to pick up.
    UnlockPickup,
    /// Seeded procedural crafting tree.
    Random,
}

/// World section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// World family to build.
    #[serde(default)]
    pub preset: WorldPreset,

    /// Seed for procedural worlds.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Shape of the procedural crafting tree.
    #[serde(default)]
    pub random: RandomWorldConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            preset: WorldPreset::default(),
            seed: default_seed(),
            random: RandomWorldConfig::default(),
        }
    }
}

impl WorldConfig {
    /// Build the configured world.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::World`] if the world fails validation.
    pub fn build(&self) -> Result<World, ConfigError> {
        let world = match self.preset {
            WorldPreset::WoodHouse => presets::wood_house()?,
            WorldPreset::UnlockPickup => presets::unlock_pickup()?,
            WorldPreset::Random => random_world(&self.random, self.seed)?,
        };
        Ok(world)
    }

    /// Task used when the configuration lists none.
    ///
    /// Procedural worlds aim for the item deepest in the requirements graph.
    pub fn default_task(&self, world: &World) -> Option<Task> {
        match self.preset {
            WorldPreset::WoodHouse => Some(Task::place_item(presets::WOOD_HOUSE, None)),
            WorldPreset::UnlockPickup => Some(Task::get_item(presets::unlock_pickup_goal())),
            WorldPreset::Random => deepest_item(world).map(Task::get_item),
        }
    }
}

fn deepest_item(world: &World) -> Option<Item> {
    let levels = match world.requirements().levels() {
        Ok(levels) => levels,
        Err(e) => {
            warn!(error = %e, "Requirements graph has a cycle, targeting the last item");
            return world.items().last().cloned();
        }
    };
    levels
        .into_iter()
        .filter_map(|(node, level)| match node {
            Node::Item(item) => Some((level, item)),
            Node::Zone(_) | Node::ZoneItem(_) => None,
        })
        .max()
        .map(|(_, item)| item)
}

// ---------------------------------------------------------------------------
// Purpose
// ---------------------------------------------------------------------------

/// Kind of a configured task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Hold `quantity` of `item`.
    GetItem,
    /// Stand in `zone`.
    GoToZone,
    /// Have `quantity` of `item` lying in the current zone or in `zones`.
    PlaceItem,
}

impl core::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::GetItem => "get_item",
            Self::GoToZone => "go_to_zone",
            Self::PlaceItem => "place_item",
        })
    }
}

/// One entry of `purpose.tasks`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaskConfig {
    /// Goal kind.
    pub kind: TaskKind,

    /// Item for get and place tasks.
    #[serde(default)]
    pub item: Option<String>,

    /// Zone for go-to tasks.
    #[serde(default)]
    pub zone: Option<String>,

    /// Candidate zones for place tasks.
    #[serde(default)]
    pub zones: Option<Vec<String>>,

    /// Required quantity.
    #[serde(default = "default_quantity")]
    pub quantity: u32,

    /// Completion reward.
    #[serde(default = "default_task_reward")]
    pub reward: f64,

    /// Shaping; the purpose default when absent.
    #[serde(default)]
    pub shaping: Option<RewardShaping>,

    /// Terminal groups; `default` when absent, optional when empty.
    #[serde(default)]
    pub groups: Option<Vec<String>>,
}

impl TaskConfig {
    /// Build the task this entry describes. `index` is only used in errors.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingTaskField`] if `item` or `zone` is
    /// missing for the kind.
    pub fn to_task(&self, index: usize) -> Result<Task, ConfigError> {
        let missing = |field| ConfigError::MissingTaskField {
            index,
            kind: self.kind,
            field,
        };
        let stack = || {
            self.item
                .as_deref()
                .map(|item| ItemStack::new(item, self.quantity))
                .ok_or_else(|| missing("item"))
        };
        let task = match self.kind {
            TaskKind::GetItem => Task::get_item(stack()?),
            TaskKind::GoToZone => {
                Task::go_to_zone(self.zone.as_deref().ok_or_else(|| missing("zone"))?)
            }
            TaskKind::PlaceItem => Task::place_item(
                stack()?,
                self.zones
                    .as_ref()
                    .map(|zones| zones.iter().map(Zone::new).collect()),
            ),
        };
        Ok(task.with_reward(self.reward))
    }

    fn terminal_groups(&self) -> TerminalGroups {
        self.groups
            .clone()
            .map_or(TerminalGroups::Default, TerminalGroups::Named)
    }
}

/// Purpose section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PurposeConfig {
    /// Reward added on every step.
    #[serde(default)]
    pub timestep_reward: f64,

    /// Reward of each shaping subtask.
    #[serde(default = "default_shaping_value")]
    pub shaping_value: f64,

    /// Shaping for tasks that do not set one.
    #[serde(default)]
    pub default_shaping: RewardShaping,

    /// Tasks; empty means the world's default task.
    #[serde(default)]
    pub tasks: Vec<TaskConfig>,
}

impl Default for PurposeConfig {
    fn default() -> Self {
        Self {
            timestep_reward: 0.0,
            shaping_value: default_shaping_value(),
            default_shaping: RewardShaping::None,
            tasks: Vec::new(),
        }
    }
}

impl PurposeConfig {
    /// Assemble the (unbuilt) purpose. `fallback` is added when no task is
    /// configured.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingTaskField`] for incomplete entries and
    /// [`ConfigError::Purpose`] for duplicate task names.
    pub fn assemble(&self, fallback: Option<Task>) -> Result<Purpose, ConfigError> {
        let mut purpose = Purpose::new(self.timestep_reward)
            .with_shaping_value(self.shaping_value)
            .with_default_shaping(self.default_shaping);
        for (index, entry) in self.tasks.iter().enumerate() {
            purpose.add_task_with(entry.to_task(index)?, entry.shaping, entry.terminal_groups())?;
        }
        if self.tasks.is_empty() {
            if let Some(task) = fallback {
                purpose.add_task(task)?;
            }
        }
        Ok(purpose)
    }
}

// ---------------------------------------------------------------------------
// Episode and logging
// ---------------------------------------------------------------------------

/// Episode section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EpisodeConfig {
    /// Steps after which an episode is truncated.
    #[serde(default = "default_max_steps")]
    pub max_steps: Option<u64>,

    /// Episodes to run.
    #[serde(default = "default_episodes")]
    pub episodes: u32,

    /// Seed of the random decision source.
    #[serde(default = "default_seed")]
    pub decision_seed: u64,
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            episodes: default_episodes(),
            decision_seed: default_seed(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` wins.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const fn default_seed() -> u64 {
    42
}

const fn default_quantity() -> u32 {
    1
}

const fn default_task_reward() -> f64 {
    1.0
}

const fn default_shaping_value() -> f64 {
    1.0
}

#[allow(clippy::unnecessary_wraps)]
const fn default_max_steps() -> Option<u64> {
    Some(500)
}

const fn default_episodes() -> u32 {
    1
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = CraftingConfig::default();
        assert_eq!(config.world.preset, WorldPreset::WoodHouse);
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.episode.max_steps, Some(500));
        assert_eq!(config.episode.episodes, 1);
        assert_eq!(config.purpose.default_shaping, RewardShaping::None);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
world:
  preset: random
  seed: 7
  random:
    items_per_inputs:
      0: 3
      1: 2
purpose:
  timestep_reward: -0.1
  shaping_value: 0.5
  default_shaping: inputs
  tasks:
    - kind: get_item
      item: "1_0"
      quantity: 2
      reward: 10.0
      groups: [main]
    - kind: go_to_zone
      zone: cave
      shaping: none
      groups: []
    - kind: place_item
      item: table
      zones: [a, b]
episode:
  max_steps: 50
  episodes: 3
  decision_seed: 9
logging:
  level: debug
  json: true
"#;
        let config = CraftingConfig::parse(yaml).unwrap();
        assert_eq!(config.world.preset, WorldPreset::Random);
        assert_eq!(config.world.random.item_count(), 5);
        assert_eq!(config.purpose.default_shaping, RewardShaping::Inputs);
        assert_eq!(config.purpose.tasks.len(), 3);
        assert_eq!(config.purpose.tasks[1].shaping, Some(RewardShaping::None));
        assert_eq!(config.purpose.tasks[1].groups, Some(Vec::new()));
        assert_eq!(config.episode.max_steps, Some(50));
        assert!(config.logging.json);

        let purpose = config.purpose.assemble(None).unwrap();
        assert_eq!(
            purpose.to_string(),
            "Purpose(main:[Get 1_0[2]#inputs], default:[Place table in [a,b]#inputs], optional:[Go to cave])"
        );
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = CraftingConfig::parse("world:\n  seed: 7\n").unwrap();
        assert_eq!(config.world.seed, 7);
        assert_eq!(config.world.preset, WorldPreset::WoodHouse);
        assert_eq!(config.episode.episodes, 1);
    }

    #[test]
    fn parse_empty_yaml() {
        assert_eq!(CraftingConfig::parse("").unwrap(), CraftingConfig::default());
    }

    #[test]
    fn unknown_preset_is_rejected() {
        assert!(matches!(
            CraftingConfig::parse("world:\n  preset: castle\n"),
            Err(ConfigError::Yaml { .. })
        ));
    }

    #[test]
    fn task_without_item_is_rejected() {
        let config = CraftingConfig::parse("purpose:\n  tasks:\n    - kind: get_item\n").unwrap();
        assert!(matches!(
            config.purpose.assemble(None),
            Err(ConfigError::MissingTaskField {
                index: 0,
                field: "item",
                ..
            })
        ));
    }

    #[test]
    fn zero_quantity_task_fails_the_build() {
        let config = CraftingConfig::parse(
            "purpose:\n  tasks:\n    - kind: get_item\n      item: wood\n      quantity: 0\n",
        )
        .unwrap();
        let world = config.world.build().unwrap();
        let mut purpose = config.purpose.assemble(None).unwrap();
        assert!(matches!(
            purpose.build(&world),
            Err(PurposeError::ZeroQuantity { .. })
        ));
    }

    #[test]
    fn fallback_task_fills_an_empty_list() {
        let config = CraftingConfig::default();
        let world = config.world.build().unwrap();
        let purpose = config
            .purpose
            .assemble(config.world.default_task(&world))
            .unwrap();
        assert_eq!(purpose.to_string(), "Purpose(default:[Place wood house anywhere])");
    }

    #[test]
    fn random_default_task_targets_a_deepest_item() {
        let config = WorldConfig {
            preset: WorldPreset::Random,
            ..WorldConfig::default()
        };
        let world = config.build().unwrap();
        let task = config.default_task(&world).unwrap();
        // Items with inputs sit above the searchable ones.
        assert!(task.name().starts_with("Get "));
        assert!(!task.name().starts_with("Get 0_"));
    }

    #[test]
    fn cyclic_world_falls_back_to_the_last_item() {
        let world = presets::unlock_pickup().unwrap();
        assert!(world.requirements().levels().is_err());
        assert_eq!(deepest_item(&world), world.items().last().cloned());
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join(DEFAULT_CONFIG_PATH);
        if path.exists() {
            let config = CraftingConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
