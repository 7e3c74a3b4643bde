pub mod catalog;
pub mod config;
pub mod descriptor;
pub mod indexer;
pub mod metrics;
pub mod mirror;
pub mod testing;

pub use catalog::{
    ChartRecord, ChartStore, HardlinkTarget, SearchCondition, SqliteChartStore, StoreError,
};
pub use config::{
    load_config, load_config_from_str, validate_config, write_default_config, Config,
    ConfigError, FilterCache,
};
pub use descriptor::{ChartDescriptor, DescriptorParser, ParseError, SrtbParser};
pub use indexer::{IndexError, IndexSummary, Indexer};
pub use mirror::{HardlinkMirror, MirrorError, SyncOutcome};
