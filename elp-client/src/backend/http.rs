//! `reqwest` implementation of the [`Backend`] trait.

use serde_json::Value;
use tokio::sync::RwLock;

use elp_api::api;

use super::{Backend, Error};

/// Talks to the course backend over HTTP.
///
/// A bearer token, when present, is attached to every request. Requests
/// carry no timeout and are never retried; a stalled request simply leaves
/// the caller waiting, which matches how the rest of the client treats
/// loading state.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl HttpBackend {
    /// Creates a backend for the given API base URL, e.g.
    /// `https://backend.example/api`.
    pub fn new(base_url: &http::Uri) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.to_string().trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        }
    }

    /// Sets or clears the bearer token used for subsequent requests.
    pub async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token.read().await.as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends the request and returns the JSON body, `Value::Null` for an
    /// empty or `204` response. Non-2xx statuses become [`Error::Status`]
    /// with a message extracted from the response body.
    async fn execute(&self, builder: reqwest::RequestBuilder) -> Result<Value, Error> {
        let response = self.authorized(builder).await.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body: Option<Value> = response.json().await.ok();
            return Err(Error::Status {
                status,
                message: error_message(status, body.as_ref()),
            });
        }

        if status == reqwest::StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Like [`Self::execute`] for endpoints whose response body is an
    /// acknowledgment the client does not inspect.
    async fn acknowledge(&self, builder: reqwest::RequestBuilder) -> Result<(), Error> {
        self.execute(builder).await.map(|_| ())
    }
}

/// Extracts a human-readable error message from an error response body:
/// a `message` field if present, else a flattened field-by-field validation
/// summary, else the bare HTTP status.
fn error_message(status: reqwest::StatusCode, body: Option<&Value>) -> String {
    if let Some(body) = body {
        if let Some(message) = body.get("message").and_then(Value::as_str) {
            return message.to_string();
        }

        if let Some(fields) = body.as_object().filter(|fields| !fields.is_empty()) {
            let details = fields
                .iter()
                .map(|(field, messages)| {
                    let flattened = match messages {
                        Value::Array(items) => items
                            .iter()
                            .map(text_of)
                            .collect::<Vec<_>>()
                            .join(", "),
                        other => text_of(other),
                    };
                    format!("{field}: {flattened}")
                })
                .collect::<Vec<_>>()
                .join(" | ");
            if !details.is_empty() {
                return details;
            }
        }
    }

    format!("HTTP error, status: {status}")
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn file_part(attachment: &api::courses::post::FileAttachment) -> reqwest::multipart::Part {
    reqwest::multipart::Part::bytes(attachment.bytes.clone())
        .file_name(attachment.file_name.clone())
}

fn course_form(form: &api::courses::post::CourseForm) -> reqwest::multipart::Form {
    let mut parts = reqwest::multipart::Form::new()
        .text("title", form.title.clone())
        .text("subtitle", form.subtitle.clone())
        .text("description", form.description.clone())
        .text("price", form.price.to_string())
        .text("level", form.level.clone())
        .text("category", form.category.clone())
        .text("language", form.language.clone())
        .text(
            "what_you_will_learn",
            serde_json::to_string(&form.what_you_will_learn).unwrap_or_default(),
        )
        .text(
            "requirements",
            serde_json::to_string(&form.requirements).unwrap_or_default(),
        )
        .text(
            "target_audience",
            serde_json::to_string(&form.target_audience).unwrap_or_default(),
        );
    if let Some(discount_price) = form.discount_price {
        parts = parts.text("discount_price", discount_price.to_string());
    }
    if let Some(thumbnail) = &form.thumbnail {
        parts = parts.part("thumbnail", file_part(thumbnail));
    }
    if let Some(promo_video) = &form.promo_video {
        parts = parts.part("promo_video", file_part(promo_video));
    }
    parts
}

fn lecture_form(form: &api::lectures::post::LectureForm) -> reqwest::multipart::Form {
    let mut parts = reqwest::multipart::Form::new()
        .text("title", form.title.clone())
        .text("description", form.description.clone())
        .text("content_type", form.content_type.clone())
        .text("is_preview", if form.is_preview { "1" } else { "0" })
        .text("is_downloadable", if form.is_downloadable { "1" } else { "0" });
    if let Some(video_file) = &form.video_file {
        parts = parts.part("video_file", file_part(video_file));
    }
    parts
}

#[async_trait::async_trait]
impl Backend for HttpBackend {
    async fn list_courses(&self, query: &api::courses::get::Query) -> Result<Value, Error> {
        self.execute(self.client.get(self.url("courses")).query(query))
            .await
    }

    async fn get_course(&self, id: &str) -> Result<Value, Error> {
        self.execute(self.client.get(self.url(&format!("courses/{id}"))))
            .await
    }

    async fn create_course(&self, form: &api::courses::post::CourseForm) -> Result<(), Error> {
        self.acknowledge(
            self.client
                .post(self.url("courses"))
                .multipart(course_form(form)),
        )
        .await
    }

    async fn update_course(
        &self,
        id: &str,
        form: &api::courses::post::CourseForm,
    ) -> Result<(), Error> {
        self.acknowledge(
            self.client
                .put(self.url(&format!("courses/{id}")))
                .multipart(course_form(form)),
        )
        .await
    }

    async fn delete_course(&self, id: &str) -> Result<(), Error> {
        self.acknowledge(self.client.delete(self.url(&format!("courses/{id}"))))
            .await
    }

    async fn create_section(
        &self,
        course_id: &str,
        body: &api::sections::post::Body,
    ) -> Result<(), Error> {
        self.acknowledge(
            self.client
                .post(self.url(&format!("courses/{course_id}/sections")))
                .json(body),
        )
        .await
    }

    async fn update_section(
        &self,
        course_id: &str,
        section_id: &str,
        body: &api::sections::post::Body,
    ) -> Result<(), Error> {
        self.acknowledge(
            self.client
                .put(self.url(&format!("courses/{course_id}/sections/{section_id}")))
                .json(body),
        )
        .await
    }

    async fn delete_section(&self, course_id: &str, section_id: &str) -> Result<(), Error> {
        self.acknowledge(
            self.client
                .delete(self.url(&format!("courses/{course_id}/sections/{section_id}"))),
        )
        .await
    }

    async fn create_lecture(
        &self,
        section_id: &str,
        form: &api::lectures::post::LectureForm,
    ) -> Result<(), Error> {
        self.acknowledge(
            self.client
                .post(self.url(&format!("courses/sections/{section_id}/lectures")))
                .multipart(lecture_form(form)),
        )
        .await
    }

    async fn update_lecture(
        &self,
        section_id: &str,
        lecture_id: &str,
        form: &api::lectures::post::LectureForm,
    ) -> Result<(), Error> {
        self.acknowledge(
            self.client
                .put(self.url(&format!(
                    "courses/sections/{section_id}/lectures/{lecture_id}"
                )))
                .multipart(lecture_form(form)),
        )
        .await
    }

    async fn delete_lecture(&self, section_id: &str, lecture_id: &str) -> Result<(), Error> {
        self.acknowledge(self.client.delete(self.url(&format!(
            "courses/sections/{section_id}/lectures/{lecture_id}"
        ))))
        .await
    }

    async fn enroll(&self, course_id: &str) -> Result<(), Error> {
        self.acknowledge(
            self.client
                .post(self.url(&format!("courses/{course_id}/enroll"))),
        )
        .await
    }

    async fn complete_lecture(&self, lecture_id: &str) -> Result<(), Error> {
        self.acknowledge(
            self.client
                .post(self.url(&format!("courses/lectures/{lecture_id}/complete"))),
        )
        .await
    }

    async fn save_progress(
        &self,
        lecture_id: &str,
        body: &api::lectures::progress::post::Body,
    ) -> Result<(), Error> {
        self.acknowledge(
            self.client
                .post(self.url(&format!("courses/lectures/{lecture_id}/save-progress")))
                .json(body),
        )
        .await
    }

    async fn list_notes(&self, course_id: &str) -> Result<Value, Error> {
        self.execute(
            self.client
                .get(self.url(&format!("courses/{course_id}/notes"))),
        )
        .await
    }

    async fn create_note(
        &self,
        lecture_id: &str,
        body: &api::notes::post::Body,
    ) -> Result<(), Error> {
        self.acknowledge(
            self.client
                .post(self.url(&format!("courses/lectures/{lecture_id}/notes")))
                .json(body),
        )
        .await
    }

    async fn delete_note(&self, note_id: &str) -> Result<(), Error> {
        self.acknowledge(
            self.client
                .delete(self.url(&format!("courses/notes/{note_id}"))),
        )
        .await
    }

    async fn list_bookmarks(&self, course_id: &str) -> Result<Value, Error> {
        self.execute(
            self.client
                .get(self.url(&format!("courses/{course_id}/bookmarks"))),
        )
        .await
    }

    async fn create_bookmark(
        &self,
        lecture_id: &str,
        body: &api::bookmarks::post::Body,
    ) -> Result<(), Error> {
        self.acknowledge(
            self.client
                .post(self.url(&format!("courses/lectures/{lecture_id}/bookmarks")))
                .json(body),
        )
        .await
    }

    async fn delete_bookmark(&self, bookmark_id: &str) -> Result<(), Error> {
        self.acknowledge(
            self.client
                .delete(self.url(&format!("courses/bookmarks/{bookmark_id}"))),
        )
        .await
    }
}
