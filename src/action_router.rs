use crate::flows::config::FlowsConfig;
use crate::flows::processor_enums::{FlowsProcessorInput, FlowsProcessorOutput};
use crate::utils::app_config::AppConfig;
use crate::utils::traits::ActionProcessor;
use anyhow::Result;

pub enum ActionRouterInput {
    Flows(FlowsProcessorInput)
}

pub enum ActionRouterOutput {
    Flows(FlowsProcessorOutput)
}


impl ActionRouterInput {

    pub async fn process(&self, app_config: AppConfig)-> Result<ActionRouterOutput> {
        match self {
            ActionRouterInput::Flows(processor)=>{
                let mut config = FlowsConfig::default();

                let res = processor.process(&mut app_config.clone(), &mut config).await?;

                Ok(ActionRouterOutput::Flows(res))
            }
        }
    }
}
