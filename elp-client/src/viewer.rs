//! Navigation and playback state of the curriculum viewer.
//!
//! The viewer never owns curriculum data; it holds identifiers into the
//! store's current course and resolves them on demand. Playback events feed
//! in from the player (time updates, the ended event) and drive periodic
//! progress saves and completion.

use std::collections::HashSet;

use crate::backend::Error;
use crate::model::{Course, Lecture};
use crate::store::CourseStore;

/// Seconds of playback between two automatic progress saves.
const AUTOSAVE_INTERVAL: u32 = 30;

/// The lecture the viewer is showing, addressed by section and lecture id.
#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    pub section_id: String,
    pub lecture_id: String,
}

#[derive(Default)]
pub struct CurriculumViewer {
    selection: Option<Selection>,
    expanded: HashSet<String>,
    playback_position: u32,
    completion_fired: bool,
}

impl CurriculumViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn playback_position(&self) -> u32 {
        self.playback_position
    }

    pub fn is_expanded(&self, section_id: &str) -> bool {
        self.expanded.contains(section_id)
    }

    /// Resolves the current selection against the given course.
    pub fn current_lecture<'a>(&self, course: &'a Course) -> Option<&'a Lecture> {
        let selection = self.selection.as_ref()?;
        course
            .sections
            .iter()
            .find(|s| s.id == selection.section_id)?
            .lectures
            .iter()
            .find(|l| l.id == selection.lecture_id)
    }

    /// Points the viewer at the store's current course: the first incomplete
    /// lecture in section order becomes the selection, falling back to the
    /// very first lecture when everything is already complete. The selected
    /// lecture's section starts out expanded.
    pub fn initialize(&mut self, store: &CourseStore) {
        self.selection = None;
        self.expanded.clear();
        self.playback_position = 0;
        self.completion_fired = false;

        let Some(course) = store.current_course() else {
            return;
        };

        let first_incomplete = course.sections.iter().find_map(|section| {
            section
                .lectures
                .iter()
                .find(|lecture| !lecture.is_completed)
                .map(|lecture| Selection {
                    section_id: section.id.clone(),
                    lecture_id: lecture.id.clone(),
                })
        });
        let first = || {
            course.sections.iter().find_map(|section| {
                section.lectures.first().map(|lecture| Selection {
                    section_id: section.id.clone(),
                    lecture_id: lecture.id.clone(),
                })
            })
        };

        self.selection = first_incomplete.or_else(first);
        if let Some(selection) = &self.selection {
            self.expanded.insert(selection.section_id.clone());
        }
    }

    /// Switches to another lecture. The position of the outgoing lecture is
    /// saved first so nothing is lost on the switch. The target's section is
    /// expanded; sections the user opened before stay open.
    pub async fn select_lecture(&mut self, store: &CourseStore, section_id: &str, lecture_id: &str) {
        if let Some(current) = &self.selection {
            if self.playback_position > 0 && current.lecture_id != lecture_id {
                store
                    .save_lecture_progress(&current.lecture_id, self.playback_position)
                    .await;
            }
        }

        self.selection = Some(Selection {
            section_id: section_id.to_string(),
            lecture_id: lecture_id.to_string(),
        });
        self.expanded.insert(section_id.to_string());
        self.playback_position = 0;
        self.completion_fired = false;
    }

    /// Advances to the next lecture: the following one in the current
    /// section, or the first lecture of the next section at a boundary.
    /// At the end of the course, or when the next section has no lectures,
    /// this does nothing.
    pub async fn next_lecture(&mut self, store: &CourseStore) {
        if let Some((section_id, lecture_id)) = self.neighbor(store, 1) {
            self.select_lecture(store, &section_id, &lecture_id).await;
        }
    }

    /// Steps back to the previous lecture, the mirror of
    /// [`Self::next_lecture`].
    pub async fn previous_lecture(&mut self, store: &CourseStore) {
        if let Some((section_id, lecture_id)) = self.neighbor(store, -1) {
            self.select_lecture(store, &section_id, &lecture_id).await;
        }
    }

    fn neighbor(&self, store: &CourseStore, direction: i32) -> Option<(String, String)> {
        let course = store.current_course()?;
        let selection = self.selection.as_ref()?;

        let section_index = course
            .sections
            .iter()
            .position(|s| s.id == selection.section_id)?;
        let section = &course.sections[section_index];
        let lecture_index = section
            .lectures
            .iter()
            .position(|l| l.id == selection.lecture_id)?;

        let forward = direction > 0;
        let within = if forward {
            lecture_index.checked_add(1).filter(|i| *i < section.lectures.len())
        } else {
            lecture_index.checked_sub(1)
        };
        if let Some(index) = within {
            return Some((section.id.clone(), section.lectures[index].id.clone()));
        }

        // section boundary: step into the adjacent section, but only if it
        // actually has lectures
        let adjacent_index = if forward {
            section_index.checked_add(1).filter(|i| *i < course.sections.len())
        } else {
            section_index.checked_sub(1)
        }?;
        let adjacent = &course.sections[adjacent_index];
        let target = if forward {
            adjacent.lectures.first()
        } else {
            adjacent.lectures.last()
        }?;
        Some((adjacent.id.clone(), target.id.clone()))
    }

    pub fn toggle_section(&mut self, section_id: &str) {
        if !self.expanded.remove(section_id) {
            self.expanded.insert(section_id.to_string());
        }
    }

    /// Player time update. The position is remembered, and whenever playback
    /// crosses an exact multiple of the autosave interval it is pushed to
    /// the backend best-effort.
    pub async fn handle_time_update(&mut self, store: &CourseStore, seconds: u32) {
        self.playback_position = seconds;
        if seconds > 0 && seconds % AUTOSAVE_INTERVAL == 0 {
            if let Some(selection) = &self.selection {
                store
                    .save_lecture_progress(&selection.lecture_id, seconds)
                    .await;
            }
        }
    }

    /// Player "ended" event. Marks the current lecture complete, at most
    /// once per viewing session and only if the backend does not already
    /// consider it complete.
    pub async fn handle_video_ended(&mut self, store: &mut CourseStore) -> Result<(), Error> {
        if self.completion_fired {
            return Ok(());
        }
        self.completion_fired = true;

        let Some(course) = store.current_course() else {
            return Ok(());
        };
        let Some(lecture) = self.current_lecture(course) else {
            return Ok(());
        };
        if lecture.is_completed {
            return Ok(());
        }
        let lecture_id = lecture.id.clone();
        store.complete_lecture(&lecture_id).await
    }

    /// Explicit "mark complete" action on the current lecture.
    pub async fn mark_complete(&mut self, store: &mut CourseStore) -> Result<(), Error> {
        let Some(selection) = &self.selection else {
            return Ok(());
        };
        let lecture_id = selection.lecture_id.clone();
        self.completion_fired = true;
        store.complete_lecture(&lecture_id).await
    }
}
