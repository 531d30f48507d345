// server/src/services/messaging.rs

//! Customer shipment notifications over the WhatsApp Cloud API.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value as JsonValue};
use tracing::{info, instrument, warn};

use crate::config::WhatsAppConfig;
use crate::errors::{AppError, Result as AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShipmentNotice {
  Delivered,
  OutForDelivery,
  Shipped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
  pub notice: ShipmentNotice,
  pub mobile_no: String,
  pub customer_name: String,
  pub product_name: String,
  pub message: String,
  pub tracking_url: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
  async fn send(&self, notification: Notification) -> AppResult<()>;
}

/// Keeps only the digits of a phone number, as the API expects.
pub fn normalize_mobile(raw: &str) -> String {
  raw.chars().filter(char::is_ascii_digit).collect()
}

fn text_param(text: &str) -> JsonValue {
  json!({ "type": "text", "text": text })
}

/// Template message body for `notification`.
pub fn template_message(config: &WhatsAppConfig, notification: &Notification) -> JsonValue {
  let template_name = match notification.notice {
    ShipmentNotice::Delivered => &config.template_delivered,
    ShipmentNotice::OutForDelivery => &config.template_out_for_delivery,
    ShipmentNotice::Shipped => &config.template_shipped,
  };

  let mut parameters = vec![
    text_param(&notification.customer_name),
    text_param(&notification.product_name),
    text_param(&notification.message),
  ];
  if notification.notice != ShipmentNotice::Delivered {
    parameters.push(text_param(&notification.tracking_url));
  }

  json!({
    "messaging_product": "whatsapp",
    "to": normalize_mobile(&notification.mobile_no),
    "type": "template",
    "template": {
      "name": template_name,
      "language": { "code": config.template_language },
      "components": [{ "type": "body", "parameters": parameters }]
    }
  })
}

#[derive(Debug, Clone)]
pub struct WhatsAppClient {
  config: WhatsAppConfig,
  http: Client,
}

impl WhatsAppClient {
  pub fn new(config: WhatsAppConfig) -> Self {
    Self {
      config,
      http: Client::new(),
    }
  }

  fn messages_url(&self) -> String {
    format!("{}/{}/messages", self.config.api_url, self.config.phone_number_id)
  }
}

#[async_trait]
impl Notifier for WhatsAppClient {
  #[instrument(name = "messaging::send", skip(self, notification), fields(notice = ?notification.notice), err)]
  async fn send(&self, notification: Notification) -> AppResult<()> {
    let body = template_message(&self.config, &notification);

    let response = self
      .http
      .post(self.messages_url())
      .bearer_auth(&self.config.access_token)
      .json(&body)
      .send()
      .await
      .map_err(|e| AppError::Messaging(format!("Request failed: {}", e)))?;

    if !response.status().is_success() {
      let status = response.status();
      let text = response.text().await.unwrap_or_default();
      warn!(%status, "WhatsApp API rejected the message.");
      return Err(AppError::Messaging(format!("status {}: {}", status, text)));
    }

    info!("Shipment notification sent.");
    Ok(())
  }
}
