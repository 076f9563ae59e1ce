use crate::utils::app_config::AppSettings;

/// Where the HTTP server listens.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub bind: String,
    pub port: u16,
}

impl ApiConfig {
    pub fn from_settings(settings: &AppSettings) -> Self {
        Self {
            bind: settings.bind.clone(),
            port: settings.port,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_addr_from_settings() {
        let settings = AppSettings::parse_from(["flow-tracker-back-end", "--bind", "127.0.0.1", "--port", "7000"]);
        assert_eq!(ApiConfig::from_settings(&settings).addr(), "127.0.0.1:7000");
    }
}
