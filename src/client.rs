use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::attachment::Attachment;
use crate::error::ClientError;

/// Body of `/general_advisory/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationData {
    pub latitude: f64,
    pub longitude: f64,
    pub crop: String,
    pub language: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdvisoryResponse {
    pub advisory_report: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiseaseAnalysisResponse {
    #[allow(dead_code)]
    pub plant: String,
    #[allow(dead_code)]
    pub filename: String,
    pub analysis: String,
}

/// The farmer's profile as the sales agent expects it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FarmerProfile {
    #[serde(rename = "farmer_name")]
    pub name: String,
    pub commodity: String,
    pub grade: String,
    pub minimum_price: f64,
    pub location: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentResponse {
    pub agent_run_log: String,
}

#[derive(Debug, Serialize)]
struct FinanceRequest<'a> {
    goal: &'a str,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct FinanceResponse {
    advisory: String,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    detail: Value,
}

fn require_url(url: Option<&str>, service: &'static str) -> Result<String, ClientError> {
    match url.map(str::trim) {
        Some(url) if !url.is_empty() => Ok(url.trim_end_matches('/').to_string()),
        _ => Err(ClientError::missing_base_url(service)),
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(ClientError::api_error(status.as_u16(), message))
}

/// Client for the advisory backend: general advisory, disease detection and
/// the sales agent share one base URL.
#[derive(Debug, Clone)]
pub struct AdvisoryClient {
    base_url: String,
    client: reqwest::Client,
}

impl AdvisoryClient {
    pub fn new(base_url: Option<&str>) -> Result<Self, ClientError> {
        Ok(AdvisoryClient {
            base_url: require_url(base_url, "advisory")?,
            client: reqwest::Client::new(),
        })
    }

    pub async fn get_advisory(&self, location: &LocationData) -> Result<AdvisoryResponse, ClientError> {
        let response = self
            .client
            .post(format!("{}/general_advisory/", self.base_url))
            .json(location)
            .send()
            .await?;

        let advisory = ensure_success(response).await?.json().await?;
        Ok(advisory)
    }

    pub async fn identify_disease(
        &self,
        image: &Attachment,
        plant_name: &str,
        context: &str,
    ) -> Result<DiseaseAnalysisResponse, ClientError> {
        let bytes = tokio::fs::read(&image.path)
            .await
            .map_err(|source| ClientError::Attachment {
                path: image.path.clone(),
                source,
            })?;
        tracing::debug!(file = %image.file_name, size = bytes.len(), "uploading image for detection");

        let part = Part::bytes(bytes)
            .file_name(image.file_name.clone())
            .mime_str(image.mime)?;
        let form = Form::new()
            .part("image", part)
            .text("plant_name", plant_name.to_string())
            .text("context", context.to_string());

        let response = self
            .client
            .post(format!("{}/detect/", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let analysis = ensure_success(response).await?.json().await?;
        Ok(analysis)
    }

    pub async fn run_agent(&self, profile: &FarmerProfile) -> Result<AgentResponse, ClientError> {
        let response = self
            .client
            .post(format!("{}/setuAgent", self.base_url))
            .json(profile)
            .send()
            .await?;

        let run = ensure_success(response).await?.json().await?;
        Ok(run)
    }
}

/// Client for the finance backend, which lives behind its own base URL.
#[derive(Debug, Clone)]
pub struct FinanceClient {
    base_url: String,
    client: reqwest::Client,
}

impl FinanceClient {
    pub fn new(base_url: Option<&str>) -> Result<Self, ClientError> {
        Ok(FinanceClient {
            base_url: require_url(base_url, "finance")?,
            client: reqwest::Client::new(),
        })
    }

    /// Unlike the advisory calls, an error response that carries a `detail`
    /// field is returned as text rather than as an error. Transport failures
    /// and unstructured error bodies are still errors.
    pub async fn get_financial_advisory(
        &self,
        goal: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<String, ClientError> {
        let response = self
            .client
            .post(format!("{}/financial_advisory", self.base_url))
            .json(&FinanceRequest {
                goal,
                latitude,
                longitude,
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let body: FinanceResponse = response.json().await?;
            return Ok(body.advisory);
        }

        let text = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorDetail>(&text) {
            Ok(ErrorDetail { detail: Value::String(detail) }) => Ok(format!("Error: {}", detail)),
            Ok(ErrorDetail { detail }) => Ok(format!("Error: {}", detail)),
            Err(_) => Err(ClientError::api_error(status.as_u16(), text)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;
    use std::io::Write;

    fn location() -> LocationData {
        LocationData {
            latitude: 29.68,
            longitude: 76.99,
            crop: "wheat".to_string(),
            language: "English".to_string(),
        }
    }

    #[test]
    fn construction_requires_a_base_url() {
        assert!(matches!(
            AdvisoryClient::new(None),
            Err(ClientError::MissingBaseUrl { service: "advisory" })
        ));
        assert!(matches!(
            FinanceClient::new(Some("   ")),
            Err(ClientError::MissingBaseUrl { service: "finance" })
        ));
        assert!(AdvisoryClient::new(Some("https://backend.example/")).is_ok());
    }

    #[test]
    fn farmer_profile_uses_backend_field_names() {
        let profile = FarmerProfile {
            name: "Ramesh".to_string(),
            commodity: "Basmati Rice".to_string(),
            grade: "A".to_string(),
            minimum_price: 3500.0,
            location: "Karnal, Haryana".to_string(),
        };

        assert_eq!(
            serde_json::to_value(&profile).unwrap(),
            json!({
                "farmer_name": "Ramesh",
                "commodity": "Basmati Rice",
                "grade": "A",
                "minimum_price": 3500.0,
                "location": "Karnal, Haryana",
            })
        );
    }

    #[tokio::test]
    async fn advisory_posts_location_data() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/general_advisory/")
            .match_body(Matcher::Json(json!({
                "latitude": 29.68,
                "longitude": 76.99,
                "crop": "wheat",
                "language": "English",
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"advisory_report": "Irrigate **twice** this week."}"#)
            .create_async()
            .await;

        let client = AdvisoryClient::new(Some(&format!("{}/", server.url()))).unwrap();
        let response = client.get_advisory(&location()).await.unwrap();

        assert_eq!(response.advisory_report, "Irrigate **twice** this week.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn advisory_fails_on_server_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/general_advisory/")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let client = AdvisoryClient::new(Some(&server.url())).unwrap();
        let err = client.get_advisory(&location()).await.unwrap_err();

        assert!(matches!(err, ClientError::Api { status: 500, ref message } if message == "boom"));
    }

    #[tokio::test]
    async fn disease_detection_uploads_multipart() {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(b"not really a png").unwrap();
        let attachment = Attachment::from_path(file.path()).unwrap();

        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/detect/")
            .match_header("content-type", Matcher::Regex("multipart/form-data".to_string()))
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="plant_name""#.to_string()),
                Matcher::Regex(r#"name="image""#.to_string()),
                Matcher::Regex("yellow spots".to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"plant": "Plant", "filename": "leaf.png", "analysis": "Early blight"}"#)
            .create_async()
            .await;

        let client = AdvisoryClient::new(Some(&server.url())).unwrap();
        let response = client
            .identify_disease(&attachment, "Plant", "yellow spots")
            .await
            .unwrap();

        assert_eq!(response.analysis, "Early blight");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn disease_detection_reports_unreadable_file() {
        let attachment = Attachment::from_path("/definitely/not/here.png").unwrap();
        let client = AdvisoryClient::new(Some("http://127.0.0.1:9")).unwrap();

        let err = client.identify_disease(&attachment, "Plant", "").await.unwrap_err();
        assert!(matches!(err, ClientError::Attachment { .. }));
    }

    #[tokio::test]
    async fn agent_run_returns_log() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/setuAgent")
            .match_body(Matcher::PartialJson(json!({"farmer_name": "Ramesh", "minimum_price": 0.0})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"agent_run_log": "Thought: look for buyers"}"#)
            .create_async()
            .await;

        let client = AdvisoryClient::new(Some(&server.url())).unwrap();
        let profile = FarmerProfile {
            name: "Ramesh".to_string(),
            commodity: "Wheat".to_string(),
            grade: "B".to_string(),
            minimum_price: 0.0,
            location: "Karnal".to_string(),
        };
        let response = client.run_agent(&profile).await.unwrap();

        assert_eq!(response.agent_run_log, "Thought: look for buyers");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn financial_advisory_returns_detail_as_text() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/financial_advisory")
            .with_status(422)
            .with_header("content-type", "application/json")
            .with_body(r#"{"detail": "goal must not be empty"}"#)
            .create_async()
            .await;

        let client = FinanceClient::new(Some(&server.url())).unwrap();
        let text = client.get_financial_advisory("", 0.0, 0.0).await.unwrap();

        assert_eq!(text, "Error: goal must not be empty");
    }

    #[tokio::test]
    async fn financial_advisory_success_and_unstructured_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/financial_advisory")
            .match_body(Matcher::Json(json!({"goal": "buy a tractor", "latitude": 1.5, "longitude": 2.5})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"advisory": "Look at PM-KISAN."}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/financial_advisory")
            .match_body(Matcher::PartialJson(json!({"goal": "crash"})))
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;

        let client = FinanceClient::new(Some(&server.url())).unwrap();
        assert_eq!(
            client.get_financial_advisory("buy a tractor", 1.5, 2.5).await.unwrap(),
            "Look at PM-KISAN."
        );
        assert!(matches!(
            client.get_financial_advisory("crash", 0.0, 0.0).await,
            Err(ClientError::Api { status: 502, .. })
        ));
    }
}
