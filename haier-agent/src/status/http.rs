use super::*;
use reqwest::Client;
use std::time::Duration;

pub const DEVICE_ID_PLACEHOLDER: &str = "{device_id}";

/// Fetches the last reported status of a device from the appliance cloud API.
#[derive(Debug, Clone)]
pub struct HttpStatusClient {
    client:       Client,
    url_template: String,
    token:        Option<String>,
}

impl HttpStatusClient {
    pub fn new(
        url_template: String,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url_template,
            token,
        })
    }

    pub fn status_url(&self, device_id: &str) -> String {
        self.url_template.replace(DEVICE_ID_PLACEHOLDER, device_id)
    }
}

/// Accepts either a bare status object or one wrapped in a `data` envelope.
fn status_from_body(body: Value) -> Result<StatusMap, FetchError> {
    match body {
        Value::Object(mut obj) => match obj.remove("data") {
            Some(Value::Object(data)) => Ok(data),
            Some(other) => {
                obj.insert("data".into(), other);
                Ok(obj)
            }
            None => Ok(obj),
        },
        other => Err(FetchError::InvalidResponse(format!(
            "expected a JSON object, got: {}",
            other
        ))),
    }
}

#[async_trait]
impl StatusSource for HttpStatusClient {
    async fn fetch(&self, device_id: &str) -> Result<StatusMap, FetchError> {
        let url = self.status_url(device_id);
        trace!("GET {}", url);
        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let body: Value = request.send().await?.error_for_status()?.json().await?;
        status_from_body(body)
    }
}
