use anyhow::Result;
use colored::Colorize;
use dialoguer::Confirm;
use crate::utils::app_config::AppConfig;
use crate::action_router::{ActionRouterInput, ActionRouterOutput};
use crate::flows::processor_enums::{FlowsProcessorInput, FlowsProcessorOutput};

/// Initialize AppConfig for CLI operations
pub fn initialize_app_config() -> Result<AppConfig> {
    AppConfig::from_env()
}

/// Execute an action through the ActionRouter
pub async fn call_action_router(input: ActionRouterInput, app_config: AppConfig) -> Result<ActionRouterOutput> {
    input.process(app_config).await
}

pub async fn call_flows(input: FlowsProcessorInput, app_config: &AppConfig) -> Result<FlowsProcessorOutput> {
    match call_action_router(ActionRouterInput::Flows(input), app_config.clone()).await? {
        ActionRouterOutput::Flows(output) => Ok(output),
    }
}

/// Prompt user to retry a failed operation
pub fn prompt_retry() -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt("Operation failed. Retry?")
        .default(false)
        .interact()?)
}

/// Execute an operation with retry prompt on failure
pub async fn execute_with_retry<F, Fut, T>(operation: F, op_name: &str) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                eprintln!("\n{} ({}): {}\n", "Error".red(), op_name, e);

                if !prompt_retry()? {
                    return Err(e);
                }
            }
        }
    }
}
