use serde_aux::field_attributes::deserialize_number_from_string;
use std::path::PathBuf;
use std::time::Duration;

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub deployment: DeploymentSettings,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    /// Largest request body, in bytes, the login route will buffer.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub login_payload_limit: usize,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct DeploymentSettings {
    pub function_name: String,
    pub region: String,
    #[serde(default)]
    pub profile: Option<String>,
    pub runtime: String,
    pub handler: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_seconds: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub memory_size_mb: u32,
    #[serde(default)]
    pub layers: Vec<String>,
    #[serde(default)]
    pub environment: Vec<FunctionVariable>,
    pub package_path: PathBuf,
    pub package_entries: Vec<PackageEntry>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub role_propagation_delay_seconds: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub function_ready_delay_seconds: u64,
}

/// A file or directory copied into the deployment archive under `name`.
#[derive(serde::Deserialize, Clone, Debug)]
pub struct PackageEntry {
    pub source: PathBuf,
    pub name: String,
    #[serde(default)]
    pub executable: bool,
}

/// An environment variable set on the function when it is created.
#[derive(serde::Deserialize, Clone, Debug, PartialEq)]
pub struct FunctionVariable {
    pub name: String,
    pub value: String,
}

impl DeploymentSettings {
    pub fn role_name(&self) -> String {
        format!("{}-role", self.function_name)
    }

    /// The credential profile to pass to the CLI; `None` means the CLI default.
    pub fn profile(&self) -> Option<&str> {
        self.profile
            .as_deref()
            .map(str::trim)
            .filter(|profile| !profile.is_empty())
    }

    pub fn profile_label(&self) -> &str {
        self.profile().unwrap_or("default")
    }

    /// The `--environment` value for the CLI, e.g. `Variables={APP_ENVIRONMENT=production}`.
    pub fn environment_argument(&self) -> Option<String> {
        if self.environment.is_empty() {
            return None;
        }
        let variables = self
            .environment
            .iter()
            .map(|variable| format!("{}={}", variable.name, variable.value))
            .collect::<Vec<_>>()
            .join(",");
        Some(format!("Variables={{{}}}", variables))
    }

    pub fn role_propagation_delay(&self) -> Duration {
        Duration::from_secs(self.role_propagation_delay_seconds)
    }

    pub fn function_ready_delay(&self) -> Duration {
        Duration::from_secs(self.function_ready_delay_seconds)
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().map_err(|e| {
        config::ConfigError::Message(format!("Failed to determine the current directory: {}", e))
    })?;
    let configuration_directory = base_path.join("configuration");

    let environment = resolve_environment(std::env::var("APP_ENVIRONMENT").ok())?;
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        // Add in settings from environment variables (with a prefix of APP and '__' as separator)
        // E.g. `APP_APPLICATION__PORT=5001 would set `Settings.application.port`
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let mut settings = settings.try_deserialize::<Settings>()?;
    apply_environment_selectors(&mut settings, |key| std::env::var(key).ok())
        .map_err(config::ConfigError::Message)?;

    Ok(settings)
}

/// Detect the running environment from `APP_ENVIRONMENT`.
/// Default to `local` if unspecified.
pub fn resolve_environment(value: Option<String>) -> Result<Environment, config::ConfigError> {
    value
        .unwrap_or_else(|| "local".into())
        .try_into()
        .map_err(|e| config::ConfigError::Message(format!("Failed to parse APP_ENVIRONMENT: {}", e)))
}

/// Apply the unprefixed variables the deployment tooling conventionally reads:
/// `PORT`, `AWS_REGION` and `AWS_PROFILE`.
pub fn apply_environment_selectors<F>(settings: &mut Settings, lookup: F) -> Result<(), String>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = lookup("PORT") {
        settings.application.port = port
            .trim()
            .parse()
            .map_err(|_| format!("{} is not a valid PORT.", port))?;
    }
    if let Some(region) = lookup("AWS_REGION").filter(|region| !region.trim().is_empty()) {
        settings.deployment.region = region.trim().to_string();
    }
    if let Some(profile) = lookup("AWS_PROFILE") {
        settings.deployment.profile = Some(profile);
    }

    Ok(())
}

/// The possible runtime environment for our application.
#[derive(Debug, PartialEq)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}
