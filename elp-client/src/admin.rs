//! Modal state of the admin curriculum editor.
//!
//! The editor works on drafts, never on the mapped model directly: opening a
//! form snapshots the record into an editable draft, and submitting sends
//! the draft through the store, which refetches the affected course. At most
//! one modal is open at a time, and destructive actions always pass through
//! an explicit confirmation step.

use elp_api::api::courses::post::{CourseForm, FileAttachment};
use elp_api::api::lectures::post::LectureForm;
use elp_api::api::sections;

use crate::model::{ContentType, Course, Lecture, Section};
use crate::store::CourseStore;

/// Editable copy of a course. `id` is `None` while creating.
///
/// File attachments never round-trip from the backend; the draft starts
/// without them and an update that attaches no new file leaves the stored
/// media untouched.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CourseDraft {
    pub id: Option<String>,
    pub form: CourseForm,
}

impl CourseDraft {
    fn for_course(course: &Course) -> Self {
        Self {
            id: Some(course.id.clone()),
            form: CourseForm {
                title: course.title.clone(),
                subtitle: course.subtitle.clone(),
                description: course.description.clone(),
                price: course.price,
                discount_price: course.discount_price,
                level: course.level.as_str().to_string(),
                category: course.category.clone(),
                language: course.language.clone(),
                what_you_will_learn: course.what_you_will_learn.clone(),
                requirements: course.requirements.clone(),
                target_audience: course.target_audience.clone(),
                thumbnail: None,
                promo_video: None,
            },
        }
    }
}

/// Editable copy of a section. `id` is `None` while creating.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SectionDraft {
    pub course_id: String,
    pub id: Option<String>,
    pub title: String,
    pub description: String,
}

impl SectionDraft {
    fn body(&self) -> sections::post::Body {
        sections::post::Body {
            title: self.title.clone(),
            description: (!self.description.is_empty()).then(|| self.description.clone()),
        }
    }
}

/// Editable copy of a lecture. `id` is `None` while creating.
///
/// Switching the content type never discards what was typed into the other
/// fields; a video file chosen earlier survives a detour through "article"
/// and back. It just is not submitted for non-video content.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LectureDraft {
    pub section_id: String,
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub content_type: ContentType,
    pub is_preview: bool,
    pub is_downloadable: bool,
    pub video_file: Option<FileAttachment>,
}

impl LectureDraft {
    fn for_lecture(section_id: &str, lecture: &Lecture) -> Self {
        Self {
            section_id: section_id.to_string(),
            id: Some(lecture.id.clone()),
            title: lecture.title.clone(),
            description: lecture.description.clone(),
            content_type: lecture.content_type,
            is_preview: lecture.is_preview,
            is_downloadable: lecture.is_downloadable,
            video_file: None,
        }
    }

    /// Whether the current content type takes a video upload.
    pub fn accepts_video_upload(&self) -> bool {
        self.content_type == ContentType::Video
    }

    fn form(&self) -> LectureForm {
        LectureForm {
            title: self.title.clone(),
            description: self.description.clone(),
            content_type: self.content_type.as_str().to_string(),
            is_preview: self.is_preview,
            is_downloadable: self.is_downloadable,
            video_file: if self.accepts_video_upload() {
                self.video_file.clone()
            } else {
                None
            },
        }
    }
}

/// What a pending deletion would remove.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteTarget {
    Course {
        id: String,
    },
    Section {
        course_id: String,
        section_id: String,
    },
    Lecture {
        section_id: String,
        lecture_id: String,
    },
}

/// The editor's one modal slot.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum EditorModal {
    #[default]
    Closed,
    Course(CourseDraft),
    Section(SectionDraft),
    Lecture(LectureDraft),
    ConfirmDelete(DeleteTarget),
}

#[derive(Default)]
pub struct CurriculumEditor {
    modal: EditorModal,
    last_error: Option<String>,
}

impl CurriculumEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn modal(&self) -> &EditorModal {
        &self.modal
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn edit_new_course(&mut self) {
        self.modal = EditorModal::Course(CourseDraft::default());
    }

    pub fn edit_course(&mut self, course: &Course) {
        self.modal = EditorModal::Course(CourseDraft::for_course(course));
    }

    pub fn edit_new_section(&mut self, course_id: &str) {
        self.modal = EditorModal::Section(SectionDraft {
            course_id: course_id.to_string(),
            ..SectionDraft::default()
        });
    }

    pub fn edit_section(&mut self, course_id: &str, section: &Section) {
        self.modal = EditorModal::Section(SectionDraft {
            course_id: course_id.to_string(),
            id: Some(section.id.clone()),
            title: section.title.clone(),
            description: section.description.clone(),
        });
    }

    pub fn edit_new_lecture(&mut self, section_id: &str) {
        self.modal = EditorModal::Lecture(LectureDraft {
            section_id: section_id.to_string(),
            ..LectureDraft::default()
        });
    }

    pub fn edit_lecture(&mut self, section_id: &str, lecture: &Lecture) {
        self.modal = EditorModal::Lecture(LectureDraft::for_lecture(section_id, lecture));
    }

    /// Asks for confirmation before deleting. Nothing is sent to the backend
    /// until [`Self::confirm_delete`].
    pub fn request_delete(&mut self, target: DeleteTarget) {
        self.modal = EditorModal::ConfirmDelete(target);
    }

    /// Closes the modal, discarding the draft or pending deletion.
    pub fn cancel(&mut self) {
        self.modal = EditorModal::Closed;
    }

    pub fn course_draft_mut(&mut self) -> Option<&mut CourseDraft> {
        match &mut self.modal {
            EditorModal::Course(draft) => Some(draft),
            _ => None,
        }
    }

    pub fn section_draft_mut(&mut self) -> Option<&mut SectionDraft> {
        match &mut self.modal {
            EditorModal::Section(draft) => Some(draft),
            _ => None,
        }
    }

    pub fn lecture_draft_mut(&mut self) -> Option<&mut LectureDraft> {
        match &mut self.modal {
            EditorModal::Lecture(draft) => Some(draft),
            _ => None,
        }
    }

    /// Submits the open form draft. On success the modal closes; on failure
    /// it stays open with the error message, keeping the user's input.
    pub async fn submit(&mut self, store: &mut CourseStore) {
        let result = match &self.modal {
            EditorModal::Closed | EditorModal::ConfirmDelete(_) => return,
            EditorModal::Course(draft) => match &draft.id {
                Some(id) => store.update_course(id, &draft.form).await,
                None => store.create_course(&draft.form).await,
            },
            EditorModal::Section(draft) => {
                let body = draft.body();
                match &draft.id {
                    Some(id) => store.update_section(&draft.course_id, id, &body).await,
                    None => store.create_section(&draft.course_id, &body).await,
                }
            }
            EditorModal::Lecture(draft) => {
                let form = draft.form();
                match &draft.id {
                    Some(id) => store.update_lecture(&draft.section_id, id, &form).await,
                    None => store.create_lecture(&draft.section_id, &form).await,
                }
            }
        };
        self.finish(result);
    }

    /// Executes a deletion the user confirmed. A call without an open
    /// confirmation does nothing.
    pub async fn confirm_delete(&mut self, store: &mut CourseStore) {
        let EditorModal::ConfirmDelete(target) = &self.modal else {
            return;
        };
        let target = target.clone();
        let result = match &target {
            DeleteTarget::Course { id } => store.delete_course(id).await,
            DeleteTarget::Section {
                course_id,
                section_id,
            } => store.delete_section(course_id, section_id).await,
            DeleteTarget::Lecture {
                section_id,
                lecture_id,
            } => store.delete_lecture(section_id, lecture_id).await,
        };
        self.finish(result);
    }

    fn finish(&mut self, result: Result<(), crate::backend::Error>) {
        match result {
            Ok(()) => {
                self.modal = EditorModal::Closed;
                self.last_error = None;
            }
            Err(err) => self.last_error = Some(err.to_string()),
        }
    }
}

#[cfg(test)]
pub mod test {
    use super::*;
    use crate::backend::fake::FakeBackend;
    use crate::backend::Backend;
    use crate::media::MediaResolver;
    use crate::model::CourseLevel;
    use googletest::prelude::*;
    use serde_json::json;
    use std::sync::Arc;

    fn store_with(backend: &Arc<FakeBackend>) -> CourseStore {
        CourseStore::new(
            Arc::clone(backend) as Arc<dyn Backend>,
            MediaResolver::new("https://backend.example"),
        )
    }

    fn attachment(name: &str) -> FileAttachment {
        FileAttachment {
            file_name: name.to_string(),
            bytes: vec![1, 2, 3],
        }
    }

    #[googletest::gtest]
    fn editing_a_course_prefills_the_draft_without_files() -> googletest::Result<()> {
        let course = Course {
            id: "c1".to_string(),
            title: "Rust from scratch".to_string(),
            level: CourseLevel::Advanced,
            price: 49.0,
            thumbnail: "https://backend.example/media/thumb.jpg".to_string(),
            ..Course::default()
        };

        let mut editor = CurriculumEditor::new();
        editor.edit_course(&course);

        let draft = editor.course_draft_mut().or_fail()?;
        expect_that!(draft.id, some(eq("c1")));
        expect_that!(draft.form.title, eq("Rust from scratch"));
        expect_that!(draft.form.level, eq("advanced"));
        expect_that!(draft.form.thumbnail, none());
        Ok(())
    }

    #[googletest::gtest]
    fn content_type_gates_the_video_upload_but_keeps_the_draft() -> googletest::Result<()> {
        let mut editor = CurriculumEditor::new();
        editor.edit_new_lecture("s1");

        let draft = editor.lecture_draft_mut().or_fail()?;
        draft.title = "Intro".to_string();
        draft.video_file = Some(attachment("intro.mp4"));
        expect_that!(draft.accepts_video_upload(), eq(true));
        expect_that!(draft.form().video_file, some(anything()));

        draft.content_type = ContentType::Article;
        expect_that!(draft.accepts_video_upload(), eq(false));
        // not submitted for an article...
        expect_that!(draft.form().video_file, none());
        expect_that!(draft.form().title, eq("Intro"));

        // ...but still there when the user switches back
        draft.content_type = ContentType::Video;
        expect_that!(draft.form().video_file, some(eq(&attachment("intro.mp4"))));
        Ok(())
    }

    #[googletest::gtest]
    #[tokio::test]
    async fn failed_submit_keeps_the_modal_open() -> googletest::Result<()> {
        let backend = Arc::new(FakeBackend::default());
        let mut store = store_with(&backend);

        let mut editor = CurriculumEditor::new();
        editor.edit_new_course();
        editor.course_draft_mut().or_fail()?.form.title = "Rust from scratch".to_string();

        backend.fail_on("create_course");
        editor.submit(&mut store).await;

        expect_that!(editor.modal(), matches_pattern!(&EditorModal::Course(_)));
        expect_that!(editor.last_error(), some(contains_substring("injected failure")));
        expect_that!(
            editor.course_draft_mut().or_fail()?.form.title,
            eq("Rust from scratch")
        );

        backend.failing.lock().or_fail()?.clear();
        editor.submit(&mut store).await;
        expect_that!(editor.modal(), eq(&EditorModal::Closed));
        expect_that!(editor.last_error(), none());
        Ok(())
    }

    #[googletest::gtest]
    #[tokio::test]
    async fn existing_section_draft_submits_an_update() -> googletest::Result<()> {
        let backend = Arc::new(FakeBackend::default());
        let mut store = store_with(&backend);
        backend.set_course("c1", json!({"id": "c1"}));

        let section = Section {
            id: "s1".to_string(),
            title: "Basics".to_string(),
            ..Section::default()
        };
        let mut editor = CurriculumEditor::new();
        editor.edit_section("c1", &section);
        editor.section_draft_mut().or_fail()?.title = "Foundations".to_string();
        editor.submit(&mut store).await;

        expect_that!(editor.modal(), eq(&EditorModal::Closed));
        expect_that!(
            backend.calls(),
            eq(&vec!["update_section s1".to_string(), "get_course c1".to_string()])
        );
        Ok(())
    }

    #[googletest::gtest]
    #[tokio::test]
    async fn deletion_requires_an_explicit_confirmation() -> googletest::Result<()> {
        let backend = Arc::new(FakeBackend::default());
        let mut store = store_with(&backend);
        backend.set_course("c1", json!({"id": "c1"}));

        let mut editor = CurriculumEditor::new();

        // nothing pending, nothing happens
        editor.confirm_delete(&mut store).await;
        expect_that!(backend.calls(), is_empty());

        editor.request_delete(DeleteTarget::Section {
            course_id: "c1".to_string(),
            section_id: "s1".to_string(),
        });
        expect_that!(backend.calls(), is_empty());

        editor.confirm_delete(&mut store).await;
        expect_that!(editor.modal(), eq(&EditorModal::Closed));
        expect_that!(
            backend.calls(),
            eq(&vec!["delete_section s1".to_string(), "get_course c1".to_string()])
        );
        Ok(())
    }

    #[googletest::gtest]
    #[tokio::test]
    async fn cancel_discards_the_pending_deletion() -> googletest::Result<()> {
        let backend = Arc::new(FakeBackend::default());
        let mut store = store_with(&backend);

        let mut editor = CurriculumEditor::new();
        editor.request_delete(DeleteTarget::Course {
            id: "c1".to_string(),
        });
        editor.cancel();

        editor.confirm_delete(&mut store).await;
        expect_that!(backend.calls(), is_empty());
        Ok(())
    }
}
