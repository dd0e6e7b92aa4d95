//! The `elp-api` crate defines the wire contract between the ELP client and
//! the course backend.
//!
//! The crate follows these conventions:
//! - Each backend endpoint that carries a structured request defines a
//!   nested namespace with the HTTP method of the endpoint.
//! - Inside the namespace for a given endpoint, the following types are
//!   defined:
//!   - If the request method is `GET`, a `Query` type indicates what query
//!     parameters can be sent to the server.
//!   - If the endpoint takes a JSON body, a `Body` type defines its
//!     contents.
//!   - Endpoints taking binary attachments use a multipart form type
//!     instead of a `Body`.
//! - Response bodies are deliberately untyped: the backend ships loosely
//!   shaped JSON that the client normalizes through its own mapper, so the
//!   contract only pins down what the client sends.
//!
//! The supported endpoints are:
//! - `GET` `courses`. Lists the catalog. Accepts a category/level/search
//!   filter query.
//! - `GET` `courses/{id}`. Returns one course with its nested sections and
//!   lectures.
//! - `POST` `courses` / `PUT` `courses/{id}`. Creates or updates a course
//!   from a multipart form.
//! - `DELETE` `courses/{id}`. Deletes a course and everything nested in it.
//! - `POST`/`PUT`/`DELETE` `courses/{course_id}/sections[/{id}]`. Section
//!   CRUD with a JSON body.
//! - `POST`/`PUT`/`DELETE` `courses/sections/{section_id}/lectures[/{id}]`.
//!   Lecture CRUD from a multipart form.
//! - `POST` `courses/{id}/enroll`. Enrolls the caller in a course.
//! - `POST` `courses/lectures/{id}/complete`. Marks a lecture complete.
//!   Idempotent on the backend side.
//! - `POST` `courses/lectures/{id}/save-progress`. Best-effort playback
//!   position save.
//! - Notes and bookmarks CRUD under `courses/{course_id}/notes`,
//!   `courses/lectures/{id}/notes`, `courses/notes/{id}` and the analogous
//!   bookmark paths.

mod types;

pub mod api {
    pub mod courses {
        pub mod get {
            /// The query that can be used in a `GET` `courses` request
            #[derive(Default, Debug, serde::Deserialize, serde::Serialize, PartialEq, Eq, Clone)]
            pub struct Query {
                /// Restrict the catalog to one category
                #[serde(skip_serializing_if = "Option::is_none")]
                pub category: Option<String>,
                /// Restrict the catalog to one difficulty level
                #[serde(skip_serializing_if = "Option::is_none")]
                pub level: Option<String>,
                /// Free-text search over title and description
                #[serde(skip_serializing_if = "Option::is_none")]
                pub search: Option<String>,
            }
        }

        pub mod post {
            pub use crate::types::{CourseForm, FileAttachment};
        }

        pub mod put {
            pub use crate::types::{CourseForm, FileAttachment};
        }
    }

    pub mod sections {
        pub mod post {
            /// The body of a `POST`/`PUT` section request
            #[derive(Default, Debug, serde::Deserialize, serde::Serialize, PartialEq, Eq, Clone)]
            pub struct Body {
                pub title: String,
                #[serde(skip_serializing_if = "Option::is_none")]
                pub description: Option<String>,
            }
        }
    }

    pub mod lectures {
        pub mod post {
            pub use crate::types::{FileAttachment, LectureForm};
        }

        pub mod progress {
            pub mod post {
                /// The body of a `POST` `courses/lectures/{id}/save-progress`
                /// request
                #[derive(Default, Debug, serde::Deserialize, serde::Serialize, PartialEq, Eq, Clone)]
                pub struct Body {
                    /// Playback position in seconds
                    pub video_position: u32,
                    /// Cumulative watch time in seconds
                    pub time_watched: u32,
                }
            }
        }
    }

    pub mod notes {
        pub mod post {
            /// The body of a `POST` `courses/lectures/{id}/notes` request
            #[derive(Default, Debug, serde::Deserialize, serde::Serialize, PartialEq, Eq, Clone)]
            pub struct Body {
                pub content: String,
                /// Video position the note is anchored to, in seconds
                pub timestamp: u32,
            }
        }
    }

    pub mod bookmarks {
        pub mod post {
            /// The body of a `POST` `courses/lectures/{id}/bookmarks` request
            #[derive(Default, Debug, serde::Deserialize, serde::Serialize, PartialEq, Eq, Clone)]
            pub struct Body {
                pub title: String,
                /// Video position the bookmark points at, in seconds
                pub timestamp: u32,
            }
        }
    }
}

#[cfg(test)]
mod test {
    use googletest::prelude::*;

    #[googletest::gtest]
    fn serialize_courses_query_skips_missing_filters() -> googletest::Result<()> {
        let query = crate::api::courses::get::Query {
            category: Some("maths".to_string()),
            level: None,
            search: None,
        };
        let serialized = serde_json::to_string(&query).or_fail()?;
        expect_that!(serialized, eq(r#"{"category":"maths"}"#));
        Ok(())
    }

    #[googletest::gtest]
    fn serialize_progress_body() -> googletest::Result<()> {
        let body = crate::api::lectures::progress::post::Body {
            video_position: 90,
            time_watched: 1200,
        };
        let serialized = serde_json::to_string(&body).or_fail()?;
        expect_that!(serialized, eq(r#"{"video_position":90,"time_watched":1200}"#));
        Ok(())
    }
}
