use anyhow::{Result, anyhow};
use colored::Colorize;
use std::io::Write;

use flow_tracker_back_end::aggregators::WindowKey;
use flow_tracker_back_end::cli_helper::{call_flows, execute_with_retry, initialize_app_config};
use flow_tracker_back_end::cli_utils::{
    format_json, format_record, format_table,
    formatting::{format_amount, format_status, print_header, print_section, record_rows, window_totals},
    menu::{FlowAction, back_on_cancel, select_source, select_window},
    notify, Notice,
};
use flow_tracker_back_end::flows::processor_enums::{
    FlowSnapshot, FlowsProcessorInput, FlowsProcessorOutput, GetWindowInputArgs, WindowSnapshot,
};
use flow_tracker_back_end::flows::sources::DataSource;
use flow_tracker_back_end::utils::app_config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string()))
        .with_writer(std::io::stderr)
        .init();

    eprintln!("{}", "╔═══════════════════════════════════════════════════════╗".bright_cyan());
    eprintln!("{}", "║             Flow Tracker Dashboard CLI                ║".bright_cyan());
    eprintln!("{}", "╚═══════════════════════════════════════════════════════╝".bright_cyan());
    eprintln!();

    eprint!("Initializing app config... ");
    std::io::stderr().flush().ok();

    let app_config = match initialize_app_config() {
        Ok(config) => {
            eprintln!("{}", "✓ Ready".green());
            config
        }
        Err(e) => {
            eprintln!("{}", "✗ Failed".red());
            eprintln!("Error: {}", e);
            return Err(e);
        }
    };

    eprintln!();

    loop {
        match FlowAction::select() {
            Ok(action) => match action {
                FlowAction::View => view_window(&app_config).await?,
                FlowAction::Refresh => refresh_source(&app_config).await?,
                FlowAction::RawJson => raw_json(&app_config).await?,
                FlowAction::Sources => list_sources(&app_config).await?,
                FlowAction::Quit => {
                    eprintln!("{}", "Goodbye!".bright_cyan());
                    break;
                }
            },
            Err(e) => {
                notify(Notice::Error, &e.to_string());
                break;
            }
        }

        eprintln!();
    }

    Ok(())
}

async fn fetch_window(app_config: &AppConfig, source: DataSource, window: WindowKey) -> Result<WindowSnapshot> {
    let input = FlowsProcessorInput::GetWindow(GetWindowInputArgs { source, window });

    match call_flows(input, app_config).await? {
        FlowsProcessorOutput::GetWindow(snapshot) => Ok(snapshot),
        _ => Err(anyhow!("Unexpected response type")),
    }
}

fn print_window(snapshot: &WindowSnapshot) {
    let plan = snapshot.source.plan();

    print_header(&format!("{} / {}", snapshot.source, snapshot.window));
    print_freshness(&snapshot.last_updated, snapshot.status, snapshot.error.as_deref());
    if let Some(price) = snapshot.reference_price {
        format_record(vec![("AVAX price", format!("${}", format_amount(price)))]);
    }
    println!();

    let mut headers = vec!["time"];
    headers.extend(plan.field_names());
    format_table(headers, record_rows(&snapshot.records, &plan));

    print_section("Window totals");
    let totals = window_totals(&snapshot.records, &plan);
    format_record(totals.into_iter().map(|(field, sum)| (field, format_amount(sum))).collect());
}

fn print_freshness(last_updated: &str, status: &str, error: Option<&str>) {
    format_record(vec![
        ("Last updated", last_updated.to_string()),
        ("Status", format_status(status)),
    ]);

    if let Some(error) = error {
        notify(Notice::Warning, error);
    }
}

async fn view_window(app_config: &AppConfig) -> Result<()> {
    let Some(source) = back_on_cancel(select_source())? else {
        return Ok(());
    };
    let Some(window) = back_on_cancel(select_window())? else {
        return Ok(());
    };

    let snapshot = execute_with_retry(|| fetch_window(app_config, source, window), "view window").await?;
    print_window(&snapshot);

    Ok(())
}

async fn refresh_source(app_config: &AppConfig) -> Result<()> {
    let Some(source) = back_on_cancel(select_source())? else {
        return Ok(());
    };

    let snapshot: FlowSnapshot = match call_flows(FlowsProcessorInput::ForceRefresh(source), app_config).await? {
        FlowsProcessorOutput::ForceRefresh(snapshot) => snapshot,
        _ => return Err(anyhow!("Unexpected response type")),
    };

    print_freshness(&snapshot.last_updated, snapshot.status, snapshot.error.as_deref());
    if snapshot.error.is_none() {
        notify(Notice::Success, &format!("{} refreshed", source));
    }

    Ok(())
}

async fn raw_json(app_config: &AppConfig) -> Result<()> {
    let Some(source) = back_on_cancel(select_source())? else {
        return Ok(());
    };

    match call_flows(FlowsProcessorInput::GetWindows(source), app_config).await? {
        FlowsProcessorOutput::GetWindows(snapshot) => println!("{}", format_json(&snapshot)),
        _ => return Err(anyhow!("Unexpected response type")),
    }

    Ok(())
}

async fn list_sources(app_config: &AppConfig) -> Result<()> {
    print_header("Sources");

    let sources = match call_flows(FlowsProcessorInput::ListSources, app_config).await? {
        FlowsProcessorOutput::ListSources(sources) => sources,
        _ => return Err(anyhow!("Unexpected response type")),
    };

    let rows = sources
        .iter()
        .map(|info| {
            vec![
                info.source.to_string(),
                info.route.clone(),
                format!("{}s", info.freshness_secs),
                info.fields.join(", "),
            ]
        })
        .collect();
    format_table(vec!["source", "route", "freshness", "fields"], rows);
    notify(Notice::Info, &format!("{} sources", sources.len()));

    Ok(())
}
