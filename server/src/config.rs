// server/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone)]
pub struct CloudinaryConfig {
  pub cloud_name: String,
  pub api_key: String,
  pub api_secret: String,
  pub folder: String,
  pub timeout: Duration,
}

impl std::fmt::Debug for CloudinaryConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("CloudinaryConfig")
      .field("cloud_name", &self.cloud_name)
      .field("api_key", &self.api_key)
      .field("api_secret", &"[REDACTED]")
      .field("folder", &self.folder)
      .field("timeout", &self.timeout)
      .finish()
  }
}

#[derive(Clone)]
pub struct WhatsAppConfig {
  pub api_url: String,
  pub phone_number_id: String,
  pub access_token: String,
  pub template_delivered: String,
  pub template_out_for_delivery: String,
  pub template_shipped: String,
  pub template_language: String,
}

impl std::fmt::Debug for WhatsAppConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("WhatsAppConfig")
      .field("api_url", &self.api_url)
      .field("phone_number_id", &self.phone_number_id)
      .field("access_token", &"[REDACTED]")
      .field("template_delivered", &self.template_delivered)
      .field("template_out_for_delivery", &self.template_out_for_delivery)
      .field("template_shipped", &self.template_shipped)
      .field("template_language", &self.template_language)
      .finish()
  }
}

#[derive(Debug, Clone, Copy)]
pub struct UploadLimits {
  pub max_file_bytes: usize,
  pub max_files: usize,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  pub database_max_connections: u32,
  pub run_migrations: bool,

  pub cloudinary: CloudinaryConfig,
  pub upload_limits: UploadLimits,

  pub whatsapp: WhatsAppConfig,
  /// Prefixed to the AWB to build the tracking link sent to customers.
  pub tracking_base_url: Option<String>,
}

fn parse_var<T>(name: &str, raw: String) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  raw
    .trim()
    .parse::<T>()
    .map_err(|e| AppError::Config(format!("Invalid {}: {}", name, e)))
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the configuration from any variable source.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get_env = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
    let required = |name: &str| {
      get_env(name).ok_or_else(|| AppError::Config(format!("Missing environment variable '{}'", name)))
    };
    let or_default = |name: &str, default: &str| get_env(name).unwrap_or_else(|| default.to_string());

    let server_host = or_default("SERVER_HOST", "127.0.0.1");
    let server_port: u16 = parse_var("SERVER_PORT", or_default("SERVER_PORT", "8080"))?;
    let database_url = required("DATABASE_URL")?;
    let database_max_connections: u32 =
      parse_var("DATABASE_MAX_CONNECTIONS", or_default("DATABASE_MAX_CONNECTIONS", "10"))?;
    let run_migrations: bool = parse_var("RUN_MIGRATIONS", or_default("RUN_MIGRATIONS", "false"))?;

    let cloudinary = CloudinaryConfig {
      cloud_name: required("CLOUDINARY_CLOUD_NAME")?,
      api_key: required("CLOUDINARY_API_KEY")?,
      api_secret: required("CLOUDINARY_API_SECRET")?,
      folder: or_default("UPLOAD_FOLDER", "uploads"),
      timeout: Duration::from_secs(parse_var("UPLOAD_TIMEOUT_SECS", or_default("UPLOAD_TIMEOUT_SECS", "600"))?),
    };

    let upload_limits = UploadLimits {
      max_file_bytes: parse_var("UPLOAD_MAX_FILE_BYTES", or_default("UPLOAD_MAX_FILE_BYTES", "31457280"))?,
      max_files: parse_var("UPLOAD_MAX_FILES", or_default("UPLOAD_MAX_FILES", "10"))?,
    };
    if upload_limits.max_files == 0 {
      return Err(AppError::Config("UPLOAD_MAX_FILES must be at least 1".to_string()));
    }

    let whatsapp = WhatsAppConfig {
      api_url: or_default("WHATSAPP_API_URL", "https://graph.facebook.com/v19.0")
        .trim_end_matches('/')
        .to_string(),
      phone_number_id: required("WHATSAPP_PHONE_NUMBER_ID")?,
      access_token: required("WHATSAPP_ACCESS_TOKEN")?,
      template_delivered: or_default("WHATSAPP_TEMPLATE_DELIVERED", "order_delivered"),
      template_out_for_delivery: or_default("WHATSAPP_TEMPLATE_OUT_FOR_DELIVERY", "order_out_for_delivery"),
      template_shipped: or_default("WHATSAPP_TEMPLATE_SHIPPED", "order_shipped"),
      template_language: or_default("WHATSAPP_TEMPLATE_LANGUAGE", "en"),
    };

    let tracking_base_url = get_env("TRACKING_BASE_URL");

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      database_url,
      database_max_connections,
      run_migrations,
      cloudinary,
      upload_limits,
      whatsapp,
      tracking_base_url,
    })
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}
