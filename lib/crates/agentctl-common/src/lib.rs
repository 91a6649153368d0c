pub mod profile;
pub mod settings;

pub use profile::{
    AgentKind, AgentProfile, CLUSTER_AGENT, ContextVar, JOBBERGATE_AGENT, UnitKind, UnitSpec,
};
pub use settings::{RawSettings, SecretSource, SettingSpec, SettingValue};
