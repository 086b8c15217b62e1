//! FCM device tokens stored as Firestore documents, one per token.
//!
//! Documents live in a single collection and use the token itself as the
//! document id:
//!
//! ```text
//! fcmTokens/{token} = { token: string, label: string, updatedAt: timestamp }
//! ```

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::{debug, info};

use super::traits::{DeviceToken, DeviceTokenStore};
use crate::backend::google::GoogleAuth;

const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1/projects";
const PAGE_SIZE: &str = "300";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<Document>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Document {
    name: String,
    #[serde(default)]
    fields: HashMap<String, Value>,
}

impl Document {
    fn string_field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(|v| v.get("stringValue"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Stored token, falling back to the document id
    fn into_device_token(self) -> DeviceToken {
        let token = self
            .string_field("token")
            .map(str::to_string)
            .unwrap_or_else(|| self.name.rsplit('/').next().unwrap_or_default().to_string());
        DeviceToken {
            label: self.string_field("label").map(str::to_string),
            token,
        }
    }
}

#[derive(Clone)]
pub struct FirestoreTokenStore {
    client: Client,
    auth: GoogleAuth,
    collection_url: String,
}

impl FirestoreTokenStore {
    pub fn new(client: Client, auth: GoogleAuth, project_id: &str, collection: &str) -> Self {
        Self {
            client,
            auth,
            collection_url: format!(
                "{}/{}/databases/(default)/documents/{}",
                FIRESTORE_BASE_URL, project_id, collection
            ),
        }
    }

    fn document_url(&self, token: &str) -> Result<Url> {
        let mut url = Url::parse(&self.collection_url)?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("Firestore URL cannot take path segments"))?
            .push(token);
        Ok(url)
    }
}

pub fn document_fields(token: &str, label: Option<&str>) -> Value {
    json!({
        "fields": {
            "token": { "stringValue": token },
            "label": { "stringValue": label.unwrap_or_default() },
            "updatedAt": { "timestampValue": Utc::now().to_rfc3339() },
        }
    })
}

#[async_trait]
impl DeviceTokenStore for FirestoreTokenStore {
    async fn list_tokens(&self) -> Result<Vec<DeviceToken>> {
        let mut tokens = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(&self.collection_url)
                .bearer_auth(self.auth.access_token().await?)
                .query(&[("pageSize", PAGE_SIZE)]);
            if let Some(page) = &page_token {
                request = request.query(&[("pageToken", page.as_str())]);
            }

            let response = request.send().await?;
            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(anyhow!("Firestore list failed with {}: {}", status, body));
            }
            let page: ListDocumentsResponse = response.json().await?;
            tokens.extend(page.documents.into_iter().map(Document::into_device_token));

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        debug!("Loaded {} device tokens from Firestore", tokens.len());
        Ok(tokens)
    }

    async fn register_token(&self, token: &str, label: Option<&str>) -> Result<()> {
        let response = self
            .client
            .patch(self.document_url(token)?)
            .bearer_auth(self.auth.access_token().await?)
            .json(&document_fields(token, label))
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Firestore write failed with {}: {}", status, body));
        }
        info!("Stored device token in Firestore");
        Ok(())
    }

    async fn remove_token(&self, token: &str) -> Result<bool> {
        // Without the precondition Firestore reports success for missing documents
        let response = self
            .client
            .delete(self.document_url(token)?)
            .bearer_auth(self.auth.access_token().await?)
            .query(&[("currentDocument.exists", "true")])
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST => Ok(false),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(anyhow!("Firestore delete failed with {}: {}", status, body))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_url() {
        let store = FirestoreTokenStore::new(
            Client::new(),
            GoogleAuth::with_static_token("t"),
            "family-budget",
            "fcmTokens",
        );
        let url = store.document_url("abc:DEF").unwrap();
        assert!(url
            .as_str()
            .starts_with("https://firestore.googleapis.com/v1/projects/family-budget/databases/"));
        assert!(url.as_str().ends_with("/documents/fcmTokens/abc:DEF"));
    }

    #[test]
    fn test_parse_list_page() {
        let page: ListDocumentsResponse = serde_json::from_str(
            r#"{
                "documents": [
                    {
                        "name": "projects/p/databases/(default)/documents/fcmTokens/tok-1",
                        "fields": {
                            "token": { "stringValue": "tok-1" },
                            "label": { "stringValue": "Kitchen tablet" }
                        }
                    },
                    {
                        "name": "projects/p/databases/(default)/documents/fcmTokens/tok-2",
                        "fields": { "label": { "stringValue": "" } }
                    }
                ],
                "nextPageToken": "next"
            }"#,
        )
        .unwrap();

        assert_eq!(page.next_page_token.as_deref(), Some("next"));
        let tokens: Vec<DeviceToken> = page
            .documents
            .into_iter()
            .map(Document::into_device_token)
            .collect();
        assert_eq!(tokens[0].label.as_deref(), Some("Kitchen tablet"));
        assert_eq!(tokens[1].token, "tok-2");
        assert_eq!(tokens[1].label, None);
    }

    #[test]
    fn test_empty_collection() {
        let page: ListDocumentsResponse = serde_json::from_str("{}").unwrap();
        assert!(page.documents.is_empty());
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn test_document_fields() {
        let body = document_fields("tok", Some("Phone"));
        assert_eq!(body["fields"]["token"]["stringValue"], "tok");
        assert_eq!(body["fields"]["label"]["stringValue"], "Phone");
    }
}
