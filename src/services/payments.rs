use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Client for the external payment functions (M-Pesa STK push and PayPal
/// payment creation). This app only invokes them and interprets the JSON
/// result; the actual provider integration lives behind the endpoint.
#[derive(Clone)]
pub struct PaymentsClient {
    http: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct MpesaPushRequest<'a> {
    #[serde(rename = "phoneNumber")]
    phone_number: &'a str,
    amount: f64,
    #[serde(rename = "orderId")]
    order_id: &'a str,
}

#[derive(Debug, Serialize)]
struct PaypalCreateRequest<'a> {
    #[serde(rename = "orderId")]
    order_id: &'a str,
    amount: f64,
    currency: &'a str,
}

#[derive(Debug, Deserialize)]
struct FunctionResult {
    #[serde(default)]
    success: bool,

    #[serde(default)]
    error: Option<String>,

    #[serde(default, rename = "approvalUrl")]
    approval_url: Option<String>,
}

impl PaymentsClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            http: Client::new(),
            base_url,
            api_key,
        }
    }

    fn has_key(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.base_url.trim().is_empty()
    }

    async fn invoke(&self, name: &str, body: &impl Serialize) -> Result<FunctionResult, String> {
        if !self.has_key() {
            return Err("PAYMENTS_BASE_URL / PAYMENTS_API_KEY missing in .env".to_string());
        }

        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), name);
        let res = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(format!("{name} failed: {status} {body}"));
        }

        res.json::<FunctionResult>().await.map_err(|e| e.to_string())
    }

    /// Triggers the STK push; the buyer approves on their handset and the
    /// provider callback records the payment transaction out of band.
    pub async fn mpesa_push(&self, phone: &str, amount: f64, order_id: &str) -> Result<(), String> {
        let req = MpesaPushRequest {
            phone_number: phone,
            amount,
            order_id,
        };

        let out = self.invoke("mpesa-stk-push", &req).await?;
        if !out.success {
            return Err(out.error.unwrap_or_else(|| "push rejected".to_string()));
        }
        Ok(())
    }

    /// Creates a PayPal payment and returns the approval URL the buyer is
    /// sent to.
    pub async fn paypal_create(
        &self,
        order_id: &str,
        amount: f64,
        currency: &str,
    ) -> Result<String, String> {
        let req = PaypalCreateRequest {
            order_id,
            amount,
            currency,
        };

        let out = self.invoke("create-paypal-payment", &req).await?;
        if !out.success {
            return Err(out.error.unwrap_or_else(|| "payment creation rejected".to_string()));
        }
        out.approval_url
            .ok_or_else(|| "no approval URL in response".to_string())
    }
}
