use crate::aggregators::AggregatorsConfig;

/// Per-request configuration handed to the flows processor.
#[derive(Clone, Debug, Default)]
pub struct FlowsConfig {
    pub aggregators: AggregatorsConfig,
}
