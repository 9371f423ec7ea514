//! Document-store REST client.
//!
//! One client backs both hosted collections: `admins` (the admin directory,
//! keyed by identity token) and `quizzes` (the quiz catalog, keyed by quiz
//! ID). Documents travel in the store's typed-value wire format; creation
//! timestamps are assigned server-side through a `REQUEST_TIME` field
//! transform, never supplied by the client.

use crate::config::BackendConfig;
use crate::error::BackendError;
use crate::http::{decode, transport};
use crate::identity::TokenSource;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quizpress_access::{AdminDirectory, AdminRecord, AdminRecordDraft, DirectoryError};
use quizpress_catalog::{Question, Quiz, QuizDraft, QuizStore, StoreError};
use quizpress_core::{QuizId, Uid};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::instrument;

const ADMINS_COLLECTION: &str = "admins";
const QUIZZES_COLLECTION: &str = "quizzes";
const CREATED_AT_FIELD: &str = "createdAt";

/// Typed field value in the document wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) enum Value {
    StringValue(String),
    /// Integers travel as decimal strings on the wire.
    IntegerValue(String),
    TimestampValue(DateTime<Utc>),
    BooleanValue(bool),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub(crate) struct ArrayValue {
    #[serde(default)]
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub(crate) struct MapValue {
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
}

impl Value {
    fn string(value: impl Into<String>) -> Self {
        Self::StringValue(value.into())
    }

    fn integer(value: i64) -> Self {
        Self::IntegerValue(value.to_string())
    }

    fn as_str(&self) -> Option<&str> {
        match self {
            Self::StringValue(s) => Some(s),
            _ => None,
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            Self::IntegerValue(s) => s.parse().ok(),
            _ => None,
        }
    }

    fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::TimestampValue(ts) => Some(*ts),
            _ => None,
        }
    }
}

/// One stored document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Document {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
}

impl Document {
    /// Last path segment of the document name, i.e. its collection key.
    fn doc_id(&self) -> Option<&str> {
        self.name.as_deref().and_then(|name| name.rsplit('/').next())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<Document>,
    next_page_token: Option<String>,
}

#[derive(Debug, Serialize)]
struct CommitRequest {
    writes: Vec<Write>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum Write {
    Update(Document),
    Transform(DocumentTransform),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DocumentTransform {
    document: String,
    field_transforms: Vec<FieldTransform>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldTransform {
    field_path: String,
    set_to_server_value: String,
}

/// Document CRUD against the hosted store.
pub struct DocumentClient {
    http: reqwest::Client,
    config: BackendConfig,
    tokens: Arc<dyn TokenSource>,
}

impl DocumentClient {
    /// Creates a client that signs requests with tokens from `tokens`.
    ///
    /// Unauthenticated requests are sent bare; the store's own rules decide
    /// what anonymous readers may see (the public quiz collection).
    #[must_use]
    pub fn new(config: BackendConfig, tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            tokens,
        }
    }

    fn doc_name(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.config.database_root(), collection, id)
    }

    fn doc_url(&self, collection: &str, id: &str) -> String {
        format!(
            "{}/v1/{}",
            self.config.store_url,
            self.doc_name(collection, id)
        )
    }

    fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/v1/{}/{}",
            self.config.store_url,
            self.config.database_root(),
            collection
        )
    }

    fn commit_url(&self) -> String {
        format!(
            "{}/v1/{}:commit",
            self.config.store_url,
            self.config.database_root()
        )
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.tokens.id_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, BackendError> {
        let response = self
            .authorize(self.http.get(self.doc_url(collection, id)))
            .send()
            .await
            .map_err(transport)?;
        match decode::<Document>(response).await {
            Ok(document) => Ok(Some(document)),
            Err(error) if error.is_not_found() => Ok(None),
            Err(error) => Err(error),
        }
    }

    async fn list_documents(&self, collection: &str) -> Result<Vec<Document>, BackendError> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut request = self.authorize(self.http.get(self.collection_url(collection)));
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }
            let response = request.send().await.map_err(transport)?;
            let page: ListResponse = decode(response).await?;
            documents.extend(page.documents);
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => return Ok(documents),
            }
        }
    }

    /// Writes a document and lets the store stamp its creation time.
    async fn commit_with_server_timestamp(
        &self,
        collection: &str,
        id: &str,
        fields: BTreeMap<String, Value>,
    ) -> Result<(), BackendError> {
        let name = self.doc_name(collection, id);
        let request = CommitRequest {
            writes: vec![
                Write::Update(Document {
                    name: Some(name.clone()),
                    fields,
                }),
                Write::Transform(DocumentTransform {
                    document: name,
                    field_transforms: vec![FieldTransform {
                        field_path: CREATED_AT_FIELD.to_string(),
                        set_to_server_value: "REQUEST_TIME".to_string(),
                    }],
                }),
            ],
        };
        let response = self
            .authorize(self.http.post(self.commit_url()).json(&request))
            .send()
            .await
            .map_err(transport)?;
        let _: serde_json::Value = decode(response).await?;
        Ok(())
    }

    /// Replaces a document's fields wholesale, keeping the given timestamp.
    async fn patch_document(
        &self,
        collection: &str,
        id: &str,
        fields: BTreeMap<String, Value>,
    ) -> Result<(), BackendError> {
        let response = self
            .authorize(
                self.http
                    .patch(self.doc_url(collection, id))
                    .json(&Document { name: None, fields }),
            )
            .send()
            .await
            .map_err(transport)?;
        let _: Document = decode(response).await?;
        Ok(())
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), BackendError> {
        let response = self
            .authorize(self.http.delete(self.doc_url(collection, id)))
            .send()
            .await
            .map_err(transport)?;
        match decode::<serde_json::Value>(response).await {
            Ok(_) => Ok(()),
            // Deleting an absent document is a no-op.
            Err(error) if error.is_not_found() => Ok(()),
            Err(error) => Err(error),
        }
    }
}

#[async_trait]
impl AdminDirectory for DocumentClient {
    #[instrument(skip(self), fields(uid = %uid))]
    async fn get(&self, uid: &Uid) -> Result<Option<AdminRecord>, DirectoryError> {
        let document = self
            .get_document(ADMINS_COLLECTION, uid.as_str())
            .await
            .map_err(directory_error)?;
        document
            .map(|document| admin_from_document(uid.clone(), &document))
            .transpose()
    }

    async fn list(&self) -> Result<Vec<AdminRecord>, DirectoryError> {
        let documents = self
            .list_documents(ADMINS_COLLECTION)
            .await
            .map_err(directory_error)?;
        documents
            .iter()
            .map(|document| {
                let uid: Uid = document
                    .doc_id()
                    .ok_or_else(|| DirectoryError::InvalidRecord {
                        key: String::new(),
                        reason: "document has no name".to_string(),
                    })?
                    .into();
                admin_from_document(uid, document)
            })
            .collect()
    }

    #[instrument(skip(self, draft), fields(uid = %uid))]
    async fn put(&self, uid: &Uid, draft: &AdminRecordDraft) -> Result<(), DirectoryError> {
        self.commit_with_server_timestamp(ADMINS_COLLECTION, uid.as_str(), admin_fields(draft))
            .await
            .map_err(directory_error)
    }

    #[instrument(skip(self), fields(uid = %uid))]
    async fn delete(&self, uid: &Uid) -> Result<(), DirectoryError> {
        self.delete_document(ADMINS_COLLECTION, uid.as_str())
            .await
            .map_err(directory_error)
    }
}

#[async_trait]
impl QuizStore for DocumentClient {
    async fn list(&self) -> Result<Vec<Quiz>, StoreError> {
        let documents = self
            .list_documents(QUIZZES_COLLECTION)
            .await
            .map_err(store_error)?;
        documents
            .iter()
            .map(|document| {
                let id = document
                    .doc_id()
                    .and_then(|raw| raw.parse::<QuizId>().ok())
                    .ok_or_else(|| StoreError::InvalidDocument {
                        key: document.doc_id().unwrap_or_default().to_string(),
                        reason: "document key is not a quiz id".to_string(),
                    })?;
                quiz_from_document(id, document)
            })
            .collect()
    }

    async fn get(&self, id: &QuizId) -> Result<Option<Quiz>, StoreError> {
        let document = self
            .get_document(QUIZZES_COLLECTION, &id.to_string())
            .await
            .map_err(store_error)?;
        document
            .map(|document| quiz_from_document(*id, &document))
            .transpose()
    }

    async fn put(&self, id: &QuizId, draft: &QuizDraft) -> Result<(), StoreError> {
        let key = id.to_string();
        // Replacements keep the original creation time; only a first write
        // gets the server-timestamp transform.
        let existing = self
            .get_document(QUIZZES_COLLECTION, &key)
            .await
            .map_err(store_error)?;
        match existing.and_then(|document| {
            document
                .fields
                .get(CREATED_AT_FIELD)
                .and_then(Value::as_timestamp)
        }) {
            Some(created_at) => {
                let mut fields = quiz_fields(draft);
                fields.insert(
                    CREATED_AT_FIELD.to_string(),
                    Value::TimestampValue(created_at),
                );
                self.patch_document(QUIZZES_COLLECTION, &key, fields)
                    .await
                    .map_err(store_error)
            }
            None => self
                .commit_with_server_timestamp(QUIZZES_COLLECTION, &key, quiz_fields(draft))
                .await
                .map_err(store_error),
        }
    }

    async fn delete(&self, id: &QuizId) -> Result<(), StoreError> {
        self.delete_document(QUIZZES_COLLECTION, &id.to_string())
            .await
            .map_err(store_error)
    }
}

fn directory_error(error: BackendError) -> DirectoryError {
    match &error {
        BackendError::Api { status: 403, .. } => DirectoryError::Denied {
            reason: error.to_string(),
        },
        _ => DirectoryError::Unavailable {
            reason: error.to_string(),
        },
    }
}

fn store_error(error: BackendError) -> StoreError {
    StoreError::Unavailable {
        reason: error.to_string(),
    }
}

fn admin_fields(draft: &AdminRecordDraft) -> BTreeMap<String, Value> {
    let mut fields = BTreeMap::new();
    fields.insert("email".to_string(), Value::string(&draft.email));
    fields.insert(
        "displayName".to_string(),
        Value::string(draft.display_name.clone().unwrap_or_default()),
    );
    if let Some(created_by) = &draft.created_by {
        fields.insert("createdBy".to_string(), Value::string(created_by.as_str()));
    }
    fields
}

fn admin_from_document(uid: Uid, document: &Document) -> Result<AdminRecord, DirectoryError> {
    let email = document
        .fields
        .get("email")
        .and_then(Value::as_str)
        .ok_or_else(|| DirectoryError::InvalidRecord {
            key: uid.to_string(),
            reason: "missing email".to_string(),
        })?
        .to_string();
    let display_name = document
        .fields
        .get("displayName")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .map(str::to_string);
    // A record read back between the write and its timestamp transform has
    // no createdAt yet; treat it as just created.
    let created_at = document
        .fields
        .get(CREATED_AT_FIELD)
        .and_then(Value::as_timestamp)
        .unwrap_or_else(Utc::now);
    let created_by = document
        .fields
        .get("createdBy")
        .and_then(Value::as_str)
        .map(Uid::from);
    Ok(AdminRecord::new(uid, email, display_name, created_at, created_by))
}

fn quiz_fields(draft: &QuizDraft) -> BTreeMap<String, Value> {
    let questions = draft
        .questions
        .iter()
        .map(|question| {
            let mut fields = BTreeMap::new();
            fields.insert(
                "number".to_string(),
                Value::integer(i64::from(question.number)),
            );
            fields.insert("text".to_string(), Value::string(&question.text));
            fields.insert("answer".to_string(), Value::string(&question.answer));
            Value::MapValue(MapValue { fields })
        })
        .collect();

    let mut fields = BTreeMap::new();
    fields.insert("title".to_string(), Value::string(&draft.title));
    fields.insert("month".to_string(), Value::string(&draft.month));
    fields.insert("year".to_string(), Value::integer(i64::from(draft.year)));
    fields.insert(
        "questions".to_string(),
        Value::ArrayValue(ArrayValue { values: questions }),
    );
    fields
}

fn quiz_from_document(id: QuizId, document: &Document) -> Result<Quiz, StoreError> {
    let invalid = |reason: &str| StoreError::InvalidDocument {
        key: id.to_string(),
        reason: reason.to_string(),
    };

    let title = document
        .fields
        .get("title")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("missing title"))?
        .to_string();
    let month = document
        .fields
        .get("month")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("missing month"))?
        .to_string();
    let year = document
        .fields
        .get("year")
        .and_then(Value::as_i64)
        .ok_or_else(|| invalid("missing year"))?;
    let year = i32::try_from(year).map_err(|_| invalid("year out of range"))?;
    let created_at = document
        .fields
        .get(CREATED_AT_FIELD)
        .and_then(Value::as_timestamp)
        .unwrap_or_else(Utc::now);

    let questions = match document.fields.get("questions") {
        Some(Value::ArrayValue(array)) => array
            .values
            .iter()
            .map(|value| match value {
                Value::MapValue(map) => {
                    let number = map
                        .fields
                        .get("number")
                        .and_then(Value::as_i64)
                        .and_then(|n| u32::try_from(n).ok())
                        .ok_or_else(|| invalid("question missing number"))?;
                    let text = map
                        .fields
                        .get("text")
                        .and_then(Value::as_str)
                        .ok_or_else(|| invalid("question missing text"))?
                        .to_string();
                    let answer = map
                        .fields
                        .get("answer")
                        .and_then(Value::as_str)
                        .ok_or_else(|| invalid("question missing answer"))?
                        .to_string();
                    Ok(Question {
                        number,
                        text,
                        answer,
                    })
                }
                _ => Err(invalid("question is not a map")),
            })
            .collect::<Result<Vec<_>, _>>()?,
        _ => Vec::new(),
    };

    Ok(Quiz {
        id,
        title,
        month,
        year,
        created_at,
        questions,
    })
}
