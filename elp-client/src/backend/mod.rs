//! Boundary to the remote course backend.
//!
//! Every operation of the REST collaborator is expressed on the [`Backend`]
//! trait, and the rest of the crate only ever talks to an `Arc<dyn Backend>`.
//! Fetches return the raw `serde_json::Value` payload; normalizing it into
//! the strict model is the mapper's job, not the transport's.

mod http;

pub use self::http::HttpBackend;

use serde_json::Value;

use elp_api::api;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Transport-level failure: connection refused, DNS, TLS, ...
    #[error("Error performing HTTP request: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status. `message` carries the
    /// human-readable explanation extracted from the response body.
    #[error("Request failed ({status}): {message}")]
    Status {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("Received invalid json data: {0}")]
    Json(#[from] serde_json::Error),
}

/// The REST operations the client depends on. Acknowledgment-only endpoints
/// return `()`; endpoints with a payload return the loose JSON body.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    async fn list_courses(&self, query: &api::courses::get::Query) -> Result<Value, Error>;
    async fn get_course(&self, id: &str) -> Result<Value, Error>;
    async fn create_course(&self, form: &api::courses::post::CourseForm) -> Result<(), Error>;
    async fn update_course(
        &self,
        id: &str,
        form: &api::courses::post::CourseForm,
    ) -> Result<(), Error>;
    async fn delete_course(&self, id: &str) -> Result<(), Error>;

    async fn create_section(
        &self,
        course_id: &str,
        body: &api::sections::post::Body,
    ) -> Result<(), Error>;
    async fn update_section(
        &self,
        course_id: &str,
        section_id: &str,
        body: &api::sections::post::Body,
    ) -> Result<(), Error>;
    async fn delete_section(&self, course_id: &str, section_id: &str) -> Result<(), Error>;

    async fn create_lecture(
        &self,
        section_id: &str,
        form: &api::lectures::post::LectureForm,
    ) -> Result<(), Error>;
    async fn update_lecture(
        &self,
        section_id: &str,
        lecture_id: &str,
        form: &api::lectures::post::LectureForm,
    ) -> Result<(), Error>;
    async fn delete_lecture(&self, section_id: &str, lecture_id: &str) -> Result<(), Error>;

    async fn enroll(&self, course_id: &str) -> Result<(), Error>;
    /// Idempotent on the backend: completing a completed lecture succeeds
    /// without double-counting.
    async fn complete_lecture(&self, lecture_id: &str) -> Result<(), Error>;
    async fn save_progress(
        &self,
        lecture_id: &str,
        body: &api::lectures::progress::post::Body,
    ) -> Result<(), Error>;

    async fn list_notes(&self, course_id: &str) -> Result<Value, Error>;
    async fn create_note(
        &self,
        lecture_id: &str,
        body: &api::notes::post::Body,
    ) -> Result<(), Error>;
    async fn delete_note(&self, note_id: &str) -> Result<(), Error>;

    async fn list_bookmarks(&self, course_id: &str) -> Result<Value, Error>;
    async fn create_bookmark(
        &self,
        lecture_id: &str,
        body: &api::bookmarks::post::Body,
    ) -> Result<(), Error>;
    async fn delete_bookmark(&self, bookmark_id: &str) -> Result<(), Error>;
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-memory stand-in for the REST collaborator, returning canned
    //! payloads and recording every call it receives.

    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    use serde_json::Value;

    use elp_api::api;

    use super::{Backend, Error};

    #[derive(Default)]
    pub struct FakeBackend {
        pub catalog: Mutex<Value>,
        pub courses: Mutex<HashMap<String, Value>>,
        pub notes: Mutex<Value>,
        pub bookmarks: Mutex<Value>,
        /// Log of received calls, e.g. `"complete_lecture l1"`.
        pub calls: Mutex<Vec<String>>,
        /// Operations that should fail with an injected 500.
        pub failing: Mutex<HashSet<&'static str>>,
    }

    impl FakeBackend {
        pub fn set_course(&self, id: &str, payload: Value) {
            self.courses
                .lock()
                .expect("poisoned mutex")
                .insert(id.to_string(), payload);
        }

        pub fn fail_on(&self, operation: &'static str) {
            self.failing
                .lock()
                .expect("poisoned mutex")
                .insert(operation);
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("poisoned mutex").clone()
        }

        fn record(&self, operation: &str, detail: &str) -> Result<(), Error> {
            self.calls
                .lock()
                .expect("poisoned mutex")
                .push(format!("{operation} {detail}").trim().to_string());
            if self
                .failing
                .lock()
                .expect("poisoned mutex")
                .contains(operation)
            {
                return Err(Error::Status {
                    status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                    message: "injected failure".to_string(),
                });
            }
            Ok(())
        }
    }

    #[async_trait::async_trait]
    impl Backend for FakeBackend {
        async fn list_courses(&self, _query: &api::courses::get::Query) -> Result<Value, Error> {
            self.record("list_courses", "")?;
            Ok(self.catalog.lock().expect("poisoned mutex").clone())
        }

        async fn get_course(&self, id: &str) -> Result<Value, Error> {
            self.record("get_course", id)?;
            Ok(self
                .courses
                .lock()
                .expect("poisoned mutex")
                .get(id)
                .cloned()
                .unwrap_or(Value::Null))
        }

        async fn create_course(
            &self,
            form: &api::courses::post::CourseForm,
        ) -> Result<(), Error> {
            self.record("create_course", &form.title)
        }

        async fn update_course(
            &self,
            id: &str,
            _form: &api::courses::post::CourseForm,
        ) -> Result<(), Error> {
            self.record("update_course", id)
        }

        async fn delete_course(&self, id: &str) -> Result<(), Error> {
            self.record("delete_course", id)
        }

        async fn create_section(
            &self,
            course_id: &str,
            _body: &api::sections::post::Body,
        ) -> Result<(), Error> {
            self.record("create_section", course_id)
        }

        async fn update_section(
            &self,
            _course_id: &str,
            section_id: &str,
            _body: &api::sections::post::Body,
        ) -> Result<(), Error> {
            self.record("update_section", section_id)
        }

        async fn delete_section(&self, _course_id: &str, section_id: &str) -> Result<(), Error> {
            self.record("delete_section", section_id)
        }

        async fn create_lecture(
            &self,
            section_id: &str,
            _form: &api::lectures::post::LectureForm,
        ) -> Result<(), Error> {
            self.record("create_lecture", section_id)
        }

        async fn update_lecture(
            &self,
            _section_id: &str,
            lecture_id: &str,
            _form: &api::lectures::post::LectureForm,
        ) -> Result<(), Error> {
            self.record("update_lecture", lecture_id)
        }

        async fn delete_lecture(&self, _section_id: &str, lecture_id: &str) -> Result<(), Error> {
            self.record("delete_lecture", lecture_id)
        }

        async fn enroll(&self, course_id: &str) -> Result<(), Error> {
            self.record("enroll", course_id)
        }

        async fn complete_lecture(&self, lecture_id: &str) -> Result<(), Error> {
            self.record("complete_lecture", lecture_id)
        }

        async fn save_progress(
            &self,
            lecture_id: &str,
            body: &api::lectures::progress::post::Body,
        ) -> Result<(), Error> {
            self.record(
                "save_progress",
                &format!("{lecture_id} @{}", body.video_position),
            )
        }

        async fn list_notes(&self, course_id: &str) -> Result<Value, Error> {
            self.record("list_notes", course_id)?;
            Ok(self.notes.lock().expect("poisoned mutex").clone())
        }

        async fn create_note(
            &self,
            lecture_id: &str,
            _body: &api::notes::post::Body,
        ) -> Result<(), Error> {
            self.record("create_note", lecture_id)
        }

        async fn delete_note(&self, note_id: &str) -> Result<(), Error> {
            self.record("delete_note", note_id)
        }

        async fn list_bookmarks(&self, course_id: &str) -> Result<Value, Error> {
            self.record("list_bookmarks", course_id)?;
            Ok(self.bookmarks.lock().expect("poisoned mutex").clone())
        }

        async fn create_bookmark(
            &self,
            lecture_id: &str,
            _body: &api::bookmarks::post::Body,
        ) -> Result<(), Error> {
            self.record("create_bookmark", lecture_id)
        }

        async fn delete_bookmark(&self, bookmark_id: &str) -> Result<(), Error> {
            self.record("delete_bookmark", bookmark_id)
        }
    }
}
