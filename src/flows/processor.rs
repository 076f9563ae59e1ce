use chrono::Utc;

use crate::errors::FlowError;
use crate::flows::config::FlowsConfig;
use crate::flows::processor_enums::{
    FlowSnapshot, FlowsProcessorInput, FlowsProcessorOutput, SourceInfo, WindowSnapshot,
};
use crate::flows::producers::produce;
use crate::flows::sources::DataSource;
use crate::flows::synthetic::synthetic_result;
use crate::result_cache::CacheLookup;
use crate::utils::app_config::AppConfig;
use crate::utils::traits::ActionProcessor;

impl ActionProcessor<FlowsConfig, FlowsProcessorOutput> for FlowsProcessorInput {
    async fn process(
        &self,
        app_config: &mut AppConfig,
        local_config: &mut FlowsConfig,
    ) -> anyhow::Result<FlowsProcessorOutput> {
        match self {
            FlowsProcessorInput::GetWindows(source) => {
                let lookup = lookup(app_config, local_config, *source).await;
                Ok(FlowsProcessorOutput::GetWindows(FlowSnapshot::from_lookup(*source, lookup)))
            }
            FlowsProcessorInput::GetWindow(args) => {
                let lookup = lookup(app_config, local_config, args.source).await;

                let records = lookup
                    .result
                    .window(args.window)
                    .ok_or_else(|| FlowError::invalid_window(format!("{} is not materialized", args.window)))?
                    .to_vec();

                let snapshot = FlowSnapshot::from_lookup(args.source, lookup);

                Ok(FlowsProcessorOutput::GetWindow(WindowSnapshot {
                    source: args.source,
                    window: args.window,
                    records,
                    reference_price: snapshot.data.reference_price,
                    last_updated: snapshot.last_updated,
                    status: snapshot.status,
                    error: snapshot.error,
                }))
            }
            FlowsProcessorInput::ForceRefresh(source) => {
                let source = *source;
                let now = Utc::now();
                let upstream = &app_config.upstream;
                let aggregators = &local_config.aggregators;

                let lookup = app_config
                    .cache
                    .force_refresh_at(
                        source,
                        now,
                        || produce(source, upstream, now, aggregators),
                        || synthetic_result(source, now, aggregators),
                    )
                    .await;
                Ok(FlowsProcessorOutput::ForceRefresh(FlowSnapshot::from_lookup(source, lookup)))
            }
            FlowsProcessorInput::ListSources => Ok(FlowsProcessorOutput::ListSources(
                DataSource::ALL.into_iter().map(SourceInfo::from).collect(),
            )),
        }
    }
}

/// Serves `source` from the cache, refreshing from upstream and falling back to synthetic data.
async fn lookup(app_config: &AppConfig, local_config: &FlowsConfig, source: DataSource) -> CacheLookup {
    let now = Utc::now();
    let upstream = &app_config.upstream;
    let aggregators = &local_config.aggregators;

    app_config
        .cache
        .get_or_refresh_at(
            source,
            now,
            source.freshness(),
            || produce(source, upstream, now, aggregators),
            || synthetic_result(source, now, aggregators),
        )
        .await
}
