use super::{
    Error, SigningBroker, SigningOptions, SigningRequest, SigningStatus, TransactionIntent,
};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Client for the XUMM platform payload API. Holds no payload state; the
/// gateway owns the payloads, keyed by uuid.
pub struct XummClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    api_secret: String,
}

#[derive(Serialize)]
struct CreatePayloadBody {
    txjson: serde_json::Value,
    options: PayloadOptions,
}

#[derive(Serialize)]
struct PayloadOptions {
    submit: bool,
    expire: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    return_url: Option<PayloadReturnUrl>,
}

#[derive(Serialize)]
struct PayloadReturnUrl {
    app: String,
    web: String,
}

#[derive(Deserialize, Debug)]
pub struct CreatedPayload {
    pub uuid: String,
    pub next: PayloadNext,
    pub refs: PayloadRefs,
}

#[derive(Deserialize, Debug)]
pub struct PayloadNext {
    pub always: String,
}

#[derive(Deserialize, Debug)]
pub struct PayloadRefs {
    pub qr_png: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct Payload {
    #[serde(default)]
    pub meta: PayloadMeta,
    #[serde(default)]
    pub response: PayloadResponse,
}

#[derive(Deserialize, Debug, Default)]
pub struct PayloadMeta {
    #[serde(default)]
    pub resolved: bool,
    #[serde(default)]
    pub signed: bool,
    #[serde(default)]
    pub expired: bool,
}

#[derive(Deserialize, Debug, Default)]
pub struct PayloadResponse {
    pub txid: Option<String>,
    pub account: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Deserialize, Debug)]
struct ApiErrorBody {
    #[serde(default)]
    reference: String,
    #[serde(default)]
    code: i64,
}

impl XummClient {
    pub fn new(base_url: String, api_key: String, api_secret: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
            api_secret,
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header("X-API-Key", &self.api_key)
            .header("X-API-Secret", &self.api_secret)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, Error> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(match serde_json::from_str::<ApiError>(&body) {
                Ok(api_error) => Error::ClientError {
                    status,
                    code: api_error.error.code,
                    reference: api_error.error.reference,
                },
                Err(_) => Error::ClientError {
                    status,
                    code: 0,
                    reference: body,
                },
            });
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl SigningBroker for XummClient {
    async fn create_signing_request(
        &self,
        intent: TransactionIntent,
        options: SigningOptions,
    ) -> Result<SigningRequest, Error> {
        let body = CreatePayloadBody {
            txjson: intent.to_txjson(),
            options: PayloadOptions {
                submit: true,
                expire: options.expire_seconds,
                return_url: options.return_url.map(|url| PayloadReturnUrl {
                    app: url.clone(),
                    web: url,
                }),
            },
        };
        let response = self
            .request(reqwest::Method::POST, "/platform/payload")
            .json(&body)
            .send()
            .await?;
        let created: CreatedPayload = Self::decode(response).await?;
        Ok(SigningRequest {
            uuid: created.uuid,
            qr_png_url: created.refs.qr_png,
            sign_link: created.next.always,
        })
    }

    async fn signing_request_status(&self, uuid: String) -> Result<SigningStatus, Error> {
        let response = self
            .request(
                reqwest::Method::GET,
                &format!("/platform/payload/{}", uuid),
            )
            .send()
            .await?;
        let payload: Payload = Self::decode(response).await?;
        Ok(status_from_payload(payload))
    }
}

/// Maps the gateway's payload meta onto the broker status. Expiry takes
/// precedence over resolution.
fn status_from_payload(payload: Payload) -> SigningStatus {
    if payload.meta.expired {
        SigningStatus::Expired
    } else if payload.meta.resolved {
        if payload.meta.signed {
            SigningStatus::Signed {
                tx_hash: payload.response.txid,
                account: payload.response.account,
            }
        } else {
            SigningStatus::Rejected
        }
    } else {
        SigningStatus::Pending
    }
}
