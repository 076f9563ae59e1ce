use crate::cli_utils::{CliError, CliResult};
use crate::aggregators::WindowKey;
use crate::flows::sources::DataSource;
use dialoguer::Select;

/// Interactive menu builder
pub struct Menu {
    title: String,
    items: Vec<String>,
}

impl Menu {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            items: Vec::new(),
        }
    }

    pub fn item(mut self, label: &str) -> Self {
        self.items.push(label.to_string());
        self
    }

    pub fn items(mut self, items: Vec<&str>) -> Self {
        self.items.extend(items.iter().map(|s| s.to_string()));
        self
    }

    /// Show the menu and get the selected index
    pub fn interact(&self) -> CliResult<usize> {
        let item_refs: Vec<&str> = self.items.iter().map(|s| s.as_str()).collect();
        Select::new()
            .with_prompt(&self.title)
            .items(&item_refs)
            .default(0)
            .interact_opt()?
            .ok_or(CliError::UserCancelled)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Dashboard actions
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlowAction {
    View,
    Refresh,
    RawJson,
    Sources,
    Quit,
}

impl FlowAction {
    pub const ALL: [FlowAction; 5] = [
        FlowAction::View,
        FlowAction::Refresh,
        FlowAction::RawJson,
        FlowAction::Sources,
        FlowAction::Quit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FlowAction::View => "View window",
            FlowAction::Refresh => "Refresh",
            FlowAction::RawJson => "Raw JSON",
            FlowAction::Sources => "List sources",
            FlowAction::Quit => "Quit",
        }
    }

    pub fn select() -> CliResult<Self> {
        let menu = Menu::new("Select action").items(Self::ALL.iter().map(FlowAction::label).collect());

        match menu.interact() {
            Ok(idx) => Ok(Self::ALL.get(idx).copied().unwrap_or(FlowAction::Quit)),
            Err(CliError::UserCancelled) => Ok(FlowAction::Quit),
            Err(e) => Err(e),
        }
    }
}

/// Turns a cancelled prompt into `None` so the caller can go back to the menu.
pub fn back_on_cancel<T>(selection: CliResult<T>) -> CliResult<Option<T>> {
    match selection {
        Ok(value) => Ok(Some(value)),
        Err(CliError::UserCancelled) => Ok(None),
        Err(e) => Err(e),
    }
}

pub fn select_source() -> CliResult<DataSource> {
    let menu = Menu::new("Data source").items(DataSource::ALL.iter().map(DataSource::as_str).collect());
    let idx = menu.interact()?;

    DataSource::ALL.get(idx).copied().ok_or(CliError::UserCancelled)
}

pub fn select_window() -> CliResult<WindowKey> {
    let menu = Menu::new("Window").items(WindowKey::ALL.iter().map(WindowKey::as_str).collect());
    let idx = menu.interact()?;

    WindowKey::ALL.get(idx).copied().ok_or(CliError::UserCancelled)
}
