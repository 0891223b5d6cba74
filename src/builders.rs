use tracing::info;

use crate::constants::targets::BUILDER;
use crate::pipeline::RecordBuilder;
use crate::record::Record;
use crate::types::ConfigValue;

/// Logs every configuration and builds nothing.
///
/// Useful for checking what a generator emits before a real builder exists.
#[derive(Debug, Default)]
pub struct EchoRecordBuilder {
    echoed: Vec<ConfigValue>,
}

impl EchoRecordBuilder {
    /// Create an echo builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configurations seen so far, in order.
    pub fn echoed(&self) -> &[ConfigValue] {
        &self.echoed
    }
}

impl RecordBuilder for EchoRecordBuilder {
    fn build(&mut self, _model: bool, config: &str) -> Option<Record> {
        info!(target: BUILDER, config, "record config");
        self.echoed.push(config.to_string());
        None
    }
}

/// Builds an empty record named after the configuration value.
#[derive(Clone, Copy, Debug, Default)]
pub struct NameRecordBuilder;

impl RecordBuilder for NameRecordBuilder {
    fn build(&mut self, _model: bool, config: &str) -> Option<Record> {
        info!(target: BUILDER, config, "building named record");
        Some(Record::new(config))
    }
}
