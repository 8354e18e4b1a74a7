//! Notification sink: templated mail over the Mailgun messages API.
//!
//! Fire-and-forget: sends are spawned, failures are logged and never
//! propagated. An unconfigured mailer logs and drops.

use std::collections::HashMap;

use crate::config::MailgunConfig;

#[derive(Clone, Copy, Debug)]
pub enum Template {
    OrderPaid,
}

#[derive(Clone)]
pub struct Mailer {
    http: reqwest::Client,
    config: Option<MailgunConfig>,
}

impl Mailer {
    pub fn new(http: reqwest::Client, config: Option<MailgunConfig>) -> Self {
        Self { http, config }
    }

    pub fn send(
        &self,
        to: String,
        subject: String,
        template: Template,
        context: HashMap<String, String>,
    ) {
        let mailer = self.clone();
        tokio::spawn(async move {
            if let Err(e) = mailer.deliver(&to, &subject, template, &context).await {
                tracing::error!(error = %e, to = %to, "failed to send notification email");
            }
        });
    }

    async fn deliver(
        &self,
        to: &str,
        subject: &str,
        template: Template,
        context: &HashMap<String, String>,
    ) -> anyhow::Result<()> {
        let Some(config) = &self.config else {
            tracing::warn!(to, subject, "mailer not configured; dropping message");
            return Ok(());
        };

        let text = render(template, context);
        let response = self
            .http
            .post(format!(
                "https://api.mailgun.net/v3/{}/messages",
                config.domain
            ))
            .basic_auth("api", Some(&config.api_key))
            .form(&[
                ("from", config.from.as_str()),
                ("to", to),
                ("subject", subject),
                ("text", text.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            anyhow::bail!("mailgun returned {status}: {detail}");
        }
        Ok(())
    }
}

fn render(template: Template, context: &HashMap<String, String>) -> String {
    let get = |key: &str| context.get(key).map(String::as_str).unwrap_or("");
    match template {
        Template::OrderPaid => format!(
            "Thanks for your purchase!\n\n\
             Order: {}\n\
             Total: {}\n\n\
             We will let you know as soon as it ships.\n",
            get("order_id"),
            get("total"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_order_paid() {
        let context = HashMap::from([
            ("order_id".to_string(), "abc".to_string()),
            ("total".to_string(), "1030".to_string()),
        ]);
        let text = render(Template::OrderPaid, &context);
        assert!(text.contains("Order: abc"));
        assert!(text.contains("Total: 1030"));
    }

    #[test]
    fn test_render_missing_keys_is_blank() {
        let text = render(Template::OrderPaid, &HashMap::new());
        assert!(text.contains("Order: \n"));
    }
}
