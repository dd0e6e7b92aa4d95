//! Single source of truth for curriculum data.
//!
//! The store owns the canonical in-memory collections; views hold derived
//! references into them and never mutate them directly. Consistency after a
//! mutation is achieved by refetching the affected data from the backend
//! rather than by patching nested structures locally. The one exception is
//! note/bookmark deletion, which drops the record from local state by
//! identifier: creates and updates need the server's canonical record
//! (generated id, timestamps), deletes do not.

use std::sync::Arc;

use elp_api::api;

use crate::backend::{Backend, Error};
use crate::mapper;
use crate::media::MediaResolver;
use crate::model::{Bookmark, Course, EnrollmentProgress, Note};

pub struct CourseStore {
    backend: Arc<dyn Backend>,
    media: MediaResolver,
    courses: Vec<Course>,
    current_course: Option<Course>,
    enrollment: Option<EnrollmentProgress>,
    notes: Vec<Note>,
    bookmarks: Vec<Bookmark>,
    last_error: Option<String>,
    loading: bool,
}

impl CourseStore {
    pub fn new(backend: Arc<dyn Backend>, media: MediaResolver) -> Self {
        Self {
            backend,
            media,
            courses: Vec::new(),
            current_course: None,
            enrollment: None,
            notes: Vec::new(),
            bookmarks: Vec::new(),
            last_error: None,
            loading: false,
        }
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn current_course(&self) -> Option<&Course> {
        self.current_course.as_ref()
    }

    pub fn enrollment(&self) -> Option<&EnrollmentProgress> {
        self.enrollment.as_ref()
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Fetches the catalog and replaces the `courses` collection wholesale.
    ///
    /// This is a passive load: a failure leaves the previous catalog
    /// untouched and records a user-visible error string instead of
    /// propagating. There is no automatic retry.
    #[tracing::instrument(name = "fetch_courses", skip(self, query))]
    pub async fn fetch_courses(&mut self, query: &api::courses::get::Query) {
        self.loading = true;
        let result = self.backend.list_courses(query).await;
        self.loading = false;

        match result {
            Ok(payload) => {
                self.courses = mapper::course_list(&payload, &self.media);
                self.last_error = None;
            }
            Err(err) => {
                tracing::error!("Failed to fetch courses: {err}");
                self.last_error = Some(err.to_string());
            }
        }
    }

    /// Fetches one full course, sets it as the current course, and replaces
    /// any entry with the same id in the catalog with the freshly mapped
    /// object, keeping list and detail views consistent.
    #[tracing::instrument(name = "fetch_course", skip(self))]
    pub async fn fetch_course(&mut self, id: &str) -> Result<(), Error> {
        self.loading = true;
        let result = self.backend.get_course(id).await;
        self.loading = false;

        let payload = result.inspect_err(|err| {
            tracing::error!("Failed to fetch course {id}: {err}");
        })?;

        let course = mapper::course_detail(&payload, &self.media);
        if let Some(progress) = &course.progress {
            self.enrollment = Some(progress.clone());
        }
        if let Some(entry) = self.courses.iter_mut().find(|c| c.id == course.id) {
            *entry = course.clone();
        }
        self.current_course = Some(course);
        Ok(())
    }

    /// Enrolls in a course. The enrollment flag and progress snapshot are
    /// never set optimistically; they come from the refetch after the
    /// backend confirms.
    pub async fn enroll_in_course(&mut self, id: &str) -> Result<(), Error> {
        self.backend
            .enroll(id)
            .await
            .inspect_err(|err| tracing::error!("Failed to enroll in course {id}: {err}"))?;
        self.fetch_course(id).await
    }

    /// Marks a lecture complete, then refetches the current course for the
    /// authoritative completion and progress state. Completing an
    /// already-completed lecture is a no-op on the backend and must not
    /// error here.
    pub async fn complete_lecture(&mut self, lecture_id: &str) -> Result<(), Error> {
        self.backend
            .complete_lecture(lecture_id)
            .await
            .inspect_err(|err| {
                tracing::error!("Failed to complete lecture {lecture_id}: {err}")
            })?;
        self.refetch_current_course().await
    }

    /// Best-effort save of the playback position. Fires on a timer during
    /// playback, so a failure is logged and discarded; it must never
    /// interrupt viewing and is not retried.
    pub async fn save_lecture_progress(&self, lecture_id: &str, position: u32) {
        let body = api::lectures::progress::post::Body {
            video_position: position,
            time_watched: position,
        };
        if let Err(err) = self.backend.save_progress(lecture_id, &body).await {
            tracing::warn!("Best-effort progress save for lecture {lecture_id} failed: {err}");
        }
    }

    /// Loads the notes of a course. A failure leaves the list empty; it
    /// never blocks rendering.
    pub async fn fetch_notes(&mut self, course_id: &str) {
        match self.backend.list_notes(course_id).await {
            Ok(payload) => self.notes = mapper::note_list(&payload),
            Err(err) => {
                tracing::error!("Failed to fetch notes for course {course_id}: {err}");
                self.notes.clear();
            }
        }
    }

    /// Creates a note. The server generates the id and timestamps, so the
    /// note only shows up locally once the follow-up list refetch lands.
    pub async fn create_note(
        &mut self,
        lecture_id: &str,
        content: &str,
        timestamp: u32,
    ) -> Result<(), Error> {
        let body = api::notes::post::Body {
            content: content.to_string(),
            timestamp,
        };
        self.backend
            .create_note(lecture_id, &body)
            .await
            .inspect_err(|err| tracing::error!("Failed to create note: {err}"))?;
        if let Some(course_id) = self.current_course_id() {
            self.fetch_notes(&course_id).await;
        }
        Ok(())
    }

    /// Deletes a note and drops it from local state immediately, without a
    /// list refetch.
    pub async fn delete_note(&mut self, note_id: &str) -> Result<(), Error> {
        self.backend
            .delete_note(note_id)
            .await
            .inspect_err(|err| tracing::error!("Failed to delete note {note_id}: {err}"))?;
        self.notes.retain(|n| n.id != note_id);
        Ok(())
    }

    /// Loads the bookmarks of a course. Same contract as [`Self::fetch_notes`].
    pub async fn fetch_bookmarks(&mut self, course_id: &str) {
        match self.backend.list_bookmarks(course_id).await {
            Ok(payload) => self.bookmarks = mapper::bookmark_list(&payload),
            Err(err) => {
                tracing::error!("Failed to fetch bookmarks for course {course_id}: {err}");
                self.bookmarks.clear();
            }
        }
    }

    pub async fn create_bookmark(
        &mut self,
        lecture_id: &str,
        title: &str,
        timestamp: u32,
    ) -> Result<(), Error> {
        let body = api::bookmarks::post::Body {
            title: title.to_string(),
            timestamp,
        };
        self.backend
            .create_bookmark(lecture_id, &body)
            .await
            .inspect_err(|err| tracing::error!("Failed to create bookmark: {err}"))?;
        if let Some(course_id) = self.current_course_id() {
            self.fetch_bookmarks(&course_id).await;
        }
        Ok(())
    }

    pub async fn delete_bookmark(&mut self, bookmark_id: &str) -> Result<(), Error> {
        self.backend
            .delete_bookmark(bookmark_id)
            .await
            .inspect_err(|err| {
                tracing::error!("Failed to delete bookmark {bookmark_id}: {err}")
            })?;
        self.bookmarks.retain(|b| b.id != bookmark_id);
        Ok(())
    }

    // Admin operations. Each successful mutation refetches the affected
    // course, or the full catalog for course-level create/delete; nested
    // curriculum structures are never patched optimistically.

    pub async fn create_course(
        &mut self,
        form: &api::courses::post::CourseForm,
    ) -> Result<(), Error> {
        self.backend
            .create_course(form)
            .await
            .inspect_err(|err| tracing::error!("Failed to create course: {err}"))?;
        self.fetch_courses(&api::courses::get::Query::default())
            .await;
        Ok(())
    }

    pub async fn update_course(
        &mut self,
        id: &str,
        form: &api::courses::post::CourseForm,
    ) -> Result<(), Error> {
        self.backend
            .update_course(id, form)
            .await
            .inspect_err(|err| tracing::error!("Failed to update course {id}: {err}"))?;
        self.fetch_course(id).await
    }

    pub async fn delete_course(&mut self, id: &str) -> Result<(), Error> {
        self.backend
            .delete_course(id)
            .await
            .inspect_err(|err| tracing::error!("Failed to delete course {id}: {err}"))?;
        if self.current_course.as_ref().is_some_and(|c| c.id == id) {
            self.current_course = None;
        }
        self.fetch_courses(&api::courses::get::Query::default())
            .await;
        Ok(())
    }

    pub async fn create_section(
        &mut self,
        course_id: &str,
        body: &api::sections::post::Body,
    ) -> Result<(), Error> {
        self.backend
            .create_section(course_id, body)
            .await
            .inspect_err(|err| tracing::error!("Failed to create section: {err}"))?;
        self.fetch_course(course_id).await
    }

    pub async fn update_section(
        &mut self,
        course_id: &str,
        section_id: &str,
        body: &api::sections::post::Body,
    ) -> Result<(), Error> {
        self.backend
            .update_section(course_id, section_id, body)
            .await
            .inspect_err(|err| tracing::error!("Failed to update section {section_id}: {err}"))?;
        self.fetch_course(course_id).await
    }

    pub async fn delete_section(&mut self, course_id: &str, section_id: &str) -> Result<(), Error> {
        self.backend
            .delete_section(course_id, section_id)
            .await
            .inspect_err(|err| tracing::error!("Failed to delete section {section_id}: {err}"))?;
        self.fetch_course(course_id).await
    }

    pub async fn create_lecture(
        &mut self,
        section_id: &str,
        form: &api::lectures::post::LectureForm,
    ) -> Result<(), Error> {
        self.backend
            .create_lecture(section_id, form)
            .await
            .inspect_err(|err| tracing::error!("Failed to create lecture: {err}"))?;
        self.refetch_current_course().await
    }

    pub async fn update_lecture(
        &mut self,
        section_id: &str,
        lecture_id: &str,
        form: &api::lectures::post::LectureForm,
    ) -> Result<(), Error> {
        self.backend
            .update_lecture(section_id, lecture_id, form)
            .await
            .inspect_err(|err| tracing::error!("Failed to update lecture {lecture_id}: {err}"))?;
        self.refetch_current_course().await
    }

    pub async fn delete_lecture(&mut self, section_id: &str, lecture_id: &str) -> Result<(), Error> {
        self.backend
            .delete_lecture(section_id, lecture_id)
            .await
            .inspect_err(|err| tracing::error!("Failed to delete lecture {lecture_id}: {err}"))?;
        self.refetch_current_course().await
    }

    fn current_course_id(&self) -> Option<String> {
        self.current_course.as_ref().map(|c| c.id.clone())
    }

    async fn refetch_current_course(&mut self) -> Result<(), Error> {
        if let Some(id) = self.current_course_id() {
            self.fetch_course(&id).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub mod test {
    use super::*;
    use crate::backend::fake::FakeBackend;
    use googletest::prelude::*;
    use serde_json::json;

    fn store_with(backend: &Arc<FakeBackend>) -> CourseStore {
        CourseStore::new(
            Arc::clone(backend) as Arc<dyn Backend>,
            MediaResolver::new("https://backend.example"),
        )
    }

    fn query() -> api::courses::get::Query {
        api::courses::get::Query::default()
    }

    #[googletest::gtest]
    #[tokio::test]
    async fn fetch_courses_replaces_catalog_wholesale() -> googletest::Result<()> {
        let backend = Arc::new(FakeBackend::default());
        let mut store = store_with(&backend);

        *backend.catalog.lock().or_fail()? = json!({"courses": [{"id": 1}, {"id": 2}]});
        store.fetch_courses(&query()).await;
        expect_that!(store.courses().len(), eq(2));

        *backend.catalog.lock().or_fail()? = json!([{"id": 3}]);
        store.fetch_courses(&query()).await;
        expect_that!(store.courses().len(), eq(1));
        expect_that!(store.courses()[0].id, eq("3"));
        expect_that!(store.last_error(), none());
        Ok(())
    }

    #[googletest::gtest]
    #[tokio::test]
    async fn failed_catalog_fetch_keeps_previous_state() -> googletest::Result<()> {
        let backend = Arc::new(FakeBackend::default());
        let mut store = store_with(&backend);

        *backend.catalog.lock().or_fail()? = json!([{"id": 1}]);
        store.fetch_courses(&query()).await;

        backend.fail_on("list_courses");
        store.fetch_courses(&query()).await;

        expect_that!(store.courses().len(), eq(1));
        expect_that!(store.last_error(), some(contains_substring("injected failure")));
        expect_that!(store.is_loading(), eq(false));
        Ok(())
    }

    #[googletest::gtest]
    #[tokio::test]
    async fn fetch_course_patches_matching_catalog_entry() -> googletest::Result<()> {
        let backend = Arc::new(FakeBackend::default());
        let mut store = store_with(&backend);

        *backend.catalog.lock().or_fail()? = json!([{"id": "c1", "title": "Old title"}]);
        store.fetch_courses(&query()).await;

        backend.set_course(
            "c1",
            json!({"course": {"id": "c1", "title": "New title", "sections": [{"id": "s1"}]}}),
        );
        store.fetch_course("c1").await.or_fail()?;

        let current = store.current_course().or_fail()?;
        expect_that!(current.id, eq("c1"));
        expect_that!(current.title, eq("New title"));
        // the catalog entry is replaced with the freshly mapped object
        expect_that!(&store.courses()[0], eq(current));
        Ok(())
    }

    #[googletest::gtest]
    #[tokio::test]
    async fn enrollment_is_never_set_optimistically() -> googletest::Result<()> {
        let backend = Arc::new(FakeBackend::default());
        let mut store = store_with(&backend);

        backend.set_course("c1", json!({"id": "c1", "is_enrolled": false}));
        store.fetch_course("c1").await.or_fail()?;

        backend.fail_on("enroll");
        expect_that!(store.enroll_in_course("c1").await, err(anything()));
        expect_that!(store.current_course().or_fail()?.is_enrolled, eq(false));

        *backend.failing.lock().or_fail()? = Default::default();
        backend.set_course(
            "c1",
            json!({"id": "c1", "is_enrolled": 1, "progress": {"id": "e1", "progress_percentage": 0.0}}),
        );
        store.enroll_in_course("c1").await.or_fail()?;
        expect_that!(store.current_course().or_fail()?.is_enrolled, eq(true));
        expect_that!(store.enrollment(), some(anything()));
        Ok(())
    }

    #[googletest::gtest]
    #[tokio::test]
    async fn complete_lecture_twice_does_not_error() -> googletest::Result<()> {
        let backend = Arc::new(FakeBackend::default());
        let mut store = store_with(&backend);

        backend.set_course(
            "c1",
            json!({"id": "c1", "sections": [{"id": "s1", "lectures": [{"id": "l1"}]}]}),
        );
        store.fetch_course("c1").await.or_fail()?;

        backend.set_course(
            "c1",
            json!({
                "id": "c1",
                "sections": [{"id": "s1", "lectures": [{"id": "l1", "is_completed": 1}]}],
                "progress": {"id": "e1", "completed_lectures": 1, "total_lectures": 1},
            }),
        );
        store.complete_lecture("l1").await.or_fail()?;
        store.complete_lecture("l1").await.or_fail()?;

        let lecture = &store.current_course().or_fail()?.sections[0].lectures[0];
        expect_that!(lecture.is_completed, eq(true));
        expect_that!(
            store.enrollment().map(|e| e.completed_lectures),
            some(eq(1))
        );
        Ok(())
    }

    #[googletest::gtest]
    #[tokio::test]
    async fn progress_save_failure_is_swallowed() -> googletest::Result<()> {
        let backend = Arc::new(FakeBackend::default());
        let store = store_with(&backend);

        backend.fail_on("save_progress");
        store.save_lecture_progress("l1", 42).await;

        expect_that!(store.last_error(), none());
        expect_that!(backend.calls(), contains(eq("save_progress l1 @42")));
        Ok(())
    }

    #[googletest::gtest]
    #[tokio::test]
    async fn deleting_a_note_updates_local_state_immediately() -> googletest::Result<()> {
        let backend = Arc::new(FakeBackend::default());
        let mut store = store_with(&backend);

        *backend.notes.lock().or_fail()? =
            json!({"notes": [{"id": "n1"}, {"id": "n2"}]});
        store.fetch_notes("c1").await;
        expect_that!(store.notes().len(), eq(2));

        store.delete_note("n1").await.or_fail()?;
        expect_that!(store.notes().len(), eq(1));
        expect_that!(store.notes()[0].id, eq("n2"));
        // no list refetch happened for the delete
        let refetches = backend
            .calls()
            .iter()
            .filter(|c| c.starts_with("list_notes"))
            .count();
        expect_that!(refetches, eq(1));
        Ok(())
    }

    #[googletest::gtest]
    #[tokio::test]
    async fn creating_a_note_only_lands_after_the_refetch() -> googletest::Result<()> {
        let backend = Arc::new(FakeBackend::default());
        let mut store = store_with(&backend);

        backend.set_course("c1", json!({"id": "c1"}));
        store.fetch_course("c1").await.or_fail()?;

        // the refetch carries the server-generated record
        *backend.notes.lock().or_fail()? =
            json!({"notes": [{"id": "n1", "content": "great point", "timestamp": 90}]});
        store.create_note("l1", "great point", 90).await.or_fail()?;

        expect_that!(store.notes().len(), eq(1));
        expect_that!(store.notes()[0].id, eq("n1"));
        expect_that!(
            backend.calls(),
            contains(eq("create_note l1")).times(eq(1))
        );
        expect_that!(backend.calls(), contains(eq("list_notes c1")));
        Ok(())
    }

    #[googletest::gtest]
    #[tokio::test]
    async fn failed_notes_fetch_leaves_an_empty_list() -> googletest::Result<()> {
        let backend = Arc::new(FakeBackend::default());
        let mut store = store_with(&backend);

        *backend.notes.lock().or_fail()? = json!({"notes": [{"id": "n1"}]});
        store.fetch_notes("c1").await;
        expect_that!(store.notes().len(), eq(1));

        backend.fail_on("list_notes");
        store.fetch_notes("c1").await;
        expect_that!(store.notes(), is_empty());
        Ok(())
    }

    #[googletest::gtest]
    #[tokio::test]
    async fn section_mutation_refetches_the_affected_course() -> googletest::Result<()> {
        let backend = Arc::new(FakeBackend::default());
        let mut store = store_with(&backend);

        backend.set_course(
            "c1",
            json!({"id": "c1", "sections": [{"id": "s1", "title": "Basics"}]}),
        );
        let body = api::sections::post::Body {
            title: "Basics".to_string(),
            description: None,
        };
        store.create_section("c1", &body).await.or_fail()?;

        expect_that!(store.current_course().or_fail()?.sections.len(), eq(1));
        expect_that!(
            backend.calls(),
            eq(&vec!["create_section c1".to_string(), "get_course c1".to_string()])
        );
        Ok(())
    }

    #[googletest::gtest]
    #[tokio::test]
    async fn failed_admin_mutation_skips_the_refetch() -> googletest::Result<()> {
        let backend = Arc::new(FakeBackend::default());
        let mut store = store_with(&backend);

        backend.fail_on("delete_course");
        expect_that!(store.delete_course("c1").await, err(anything()));
        expect_that!(
            backend.calls(),
            eq(&vec!["delete_course c1".to_string()])
        );
        Ok(())
    }
}
