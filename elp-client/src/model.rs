//! Strict in-memory model of the course curriculum.
//!
//! Instances of these types are only ever produced by the mapper in
//! [`crate::mapper`], which normalizes the loosely shaped backend payloads.
//! The rest of the crate treats them as read-only and re-derives state by
//! refetching instead of editing in place.

/// Difficulty level of a course.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl CourseLevel {
    /// Parses the wire representation of a level. Returns `None` for
    /// anything the backend does not define.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "beginner" => Some(Self::Beginner),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }

    /// Display label, in the portal's language.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Beginner => "Débutant",
            Self::Intermediate => "Intermédiaire",
            Self::Advanced => "Avancé",
        }
    }
}

/// Kind of content a lecture carries.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Video,
    Article,
    Quiz,
}

impl ContentType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "video" => Some(Self::Video),
            "article" => Some(Self::Article),
            "quiz" => Some(Self::Quiz),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Article => "article",
            Self::Quiz => "quiz",
        }
    }
}

/// Course author, with aggregate stats precomputed by the backend.
#[derive(Debug, Default, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Instructor {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub bio: String,
    pub total_students: u32,
    pub total_courses: u32,
    pub average_rating: f64,
}

/// Downloadable attachment of a lecture.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct LectureResource {
    pub id: String,
    pub title: String,
    pub file_url: String,
    pub file_size: u64,
}

/// A single content unit within a section.
///
/// `video_url` and `article_content` are informed by `content_type` but not
/// mutually exclusive: a video lecture without a `video_url` renders as a
/// placeholder instead of failing.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Lecture {
    pub id: String,
    pub title: String,
    pub description: String,
    pub content_type: ContentType,
    pub order_index: u32,
    pub video_url: Option<String>,
    /// Duration in seconds
    pub duration: u32,
    pub article_content: Option<String>,
    pub is_preview: bool,
    pub is_downloadable: bool,
    pub resources: Vec<LectureResource>,
    /// Per-viewer completion flag
    pub is_completed: bool,
    /// Last saved playback position in seconds
    pub video_position: u32,
}

/// An ordered grouping of lectures.
///
/// `order_index` is advisory metadata; presentation order is the array
/// order as delivered by the backend.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    pub description: String,
    pub order_index: u32,
    pub learning_objective: String,
    pub lectures_count: u32,
    /// Total duration in seconds
    pub total_duration: u32,
    pub lectures: Vec<Lecture>,
}

/// Completion certificate issued once a course is finished.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Certificate {
    pub id: String,
    pub certificate_number: String,
    pub issued_at: String,
    pub student_name: String,
    pub course_title: String,
    pub instructor_name: String,
    pub completion_date: String,
    pub pdf_url: String,
}

/// Pointer to the last lecture a viewer watched.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct LastLecture {
    pub id: String,
    pub title: String,
    pub section_title: String,
}

/// One viewer's state against one course.
///
/// `progress_percentage` is authoritative from the backend. Dashboards may
/// recompute a percentage from the lecture counters for display; the two can
/// disagree by rounding and neither is corrected against the other.
#[derive(Debug, Default, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct EnrollmentProgress {
    pub id: String,
    pub enrolled_at: String,
    pub progress_percentage: f64,
    pub completed_lectures: u32,
    pub total_lectures: u32,
    /// Cumulative watch time in seconds
    pub total_time_watched: u32,
    pub is_completed: bool,
    pub completed_at: Option<String>,
    pub last_lecture: Option<LastLecture>,
    pub last_video_position: u32,
    pub certificate: Option<Certificate>,
}

/// A purchasable learning product.
///
/// `total_lectures` and `total_sections` come pre-aggregated from the
/// backend and are not recomputed from `sections` except through the
/// explicit helpers below.
#[derive(Debug, Default, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub thumbnail: String,
    pub promo_video: Option<String>,
    pub category: String,
    pub subcategory: String,
    pub level: CourseLevel,
    pub language: String,
    pub price: f64,
    pub discount_price: Option<f64>,
    pub instructor: Instructor,
    pub what_you_will_learn: Vec<String>,
    pub requirements: Vec<String>,
    pub target_audience: Vec<String>,
    /// Total duration in seconds
    pub total_duration: u32,
    pub total_lectures: u32,
    pub total_sections: u32,
    pub average_rating: f64,
    pub total_reviews: u32,
    pub total_students: u32,
    pub sections: Vec<Section>,
    pub is_enrolled: bool,
    pub progress: Option<EnrollmentProgress>,
    pub last_updated: String,
}

impl Course {
    /// Iterates over all lectures of the course, in presentation order.
    pub fn lectures(&self) -> impl Iterator<Item = &Lecture> {
        self.sections.iter().flat_map(|s| s.lectures.iter())
    }
}

/// Viewer-authored note anchored to a video timestamp.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Note {
    pub id: String,
    pub lecture_id: String,
    pub lecture_title: String,
    pub content: String,
    /// Video position in seconds
    pub timestamp: u32,
    pub created_at: String,
    pub updated_at: String,
}

/// Viewer-authored bookmark anchored to a video timestamp.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Bookmark {
    pub id: String,
    pub lecture_id: String,
    pub lecture_title: String,
    pub title: String,
    /// Video position in seconds
    pub timestamp: u32,
    pub created_at: String,
}

/// Formats a duration in seconds as a human readable string, e.g. "2h 30min".
pub fn format_duration(seconds: u32) -> String {
    if seconds == 0 {
        return "0 min".to_string();
    }

    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;

    if hours > 0 {
        if minutes > 0 {
            format!("{hours}h {minutes}min")
        } else {
            format!("{hours}h")
        }
    } else {
        format!("{minutes} min")
    }
}

/// Formats a video timestamp as "M:SS", or "H:MM:SS" past the first hour.
pub fn format_timestamp(seconds: u32) -> String {
    if seconds == 0 {
        return "0:00".to_string();
    }

    let hours = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{hours}:{mins:02}:{secs:02}")
    } else {
        format!("{mins}:{secs:02}")
    }
}

/// Recomputes the lecture count from the nested sections.
pub fn total_lectures(sections: &[Section]) -> u32 {
    sections.iter().map(|s| s.lectures.len() as u32).sum()
}

/// Recomputes the total duration in seconds from the nested lectures.
pub fn total_duration(sections: &[Section]) -> u32 {
    sections
        .iter()
        .flat_map(|s| s.lectures.iter())
        .map(|l| l.duration)
        .sum()
}

/// Dashboard-level progress percentage: `round(100 * completed / total)`
/// over the flattened lecture list, `0` when there are no lectures.
pub fn completion_percentage(sections: &[Section]) -> u32 {
    let total: u32 = total_lectures(sections);
    if total == 0 {
        return 0;
    }
    let completed = sections
        .iter()
        .flat_map(|s| s.lectures.iter())
        .filter(|l| l.is_completed)
        .count() as f64;
    (100.0 * completed / f64::from(total)).round() as u32
}

#[cfg(test)]
pub mod test {
    use super::*;
    use googletest::prelude::*;

    fn lecture(id: &str, completed: bool) -> Lecture {
        Lecture {
            id: id.to_string(),
            is_completed: completed,
            duration: 60,
            ..Lecture::default()
        }
    }

    fn section(id: &str, lectures: Vec<Lecture>) -> Section {
        Section {
            id: id.to_string(),
            lectures,
            ..Section::default()
        }
    }

    #[googletest::gtest]
    fn format_duration_buckets() -> googletest::Result<()> {
        expect_that!(format_duration(0), eq("0 min"));
        expect_that!(format_duration(59), eq("0 min"));
        expect_that!(format_duration(90), eq("1 min"));
        expect_that!(format_duration(3600), eq("1h"));
        expect_that!(format_duration(3660), eq("1h 1min"));
        expect_that!(format_duration(9000), eq("2h 30min"));
        Ok(())
    }

    #[googletest::gtest]
    fn format_timestamp_buckets() -> googletest::Result<()> {
        expect_that!(format_timestamp(0), eq("0:00"));
        expect_that!(format_timestamp(45), eq("0:45"));
        expect_that!(format_timestamp(61), eq("1:01"));
        expect_that!(format_timestamp(3661), eq("1:01:01"));
        Ok(())
    }

    #[googletest::gtest]
    fn level_labels() -> googletest::Result<()> {
        expect_that!(CourseLevel::parse("advanced"), some(eq(CourseLevel::Advanced)));
        expect_that!(CourseLevel::parse("expert"), none());
        expect_that!(CourseLevel::Beginner.label(), eq("Débutant"));
        Ok(())
    }

    #[googletest::gtest]
    fn completion_percentage_rounds() -> googletest::Result<()> {
        let sections = vec![
            section("s1", vec![lecture("l1", true), lecture("l2", false)]),
            section("s2", vec![lecture("l3", false)]),
        ];
        expect_that!(completion_percentage(&sections), eq(33));

        let sections = vec![section(
            "s1",
            vec![lecture("l1", true), lecture("l2", true), lecture("l3", false)],
        )];
        expect_that!(completion_percentage(&sections), eq(67));
        Ok(())
    }

    #[googletest::gtest]
    fn completion_percentage_of_empty_course_is_zero() -> googletest::Result<()> {
        expect_that!(completion_percentage(&[]), eq(0));
        expect_that!(completion_percentage(&[section("s1", vec![])]), eq(0));
        Ok(())
    }

    #[googletest::gtest]
    fn recomputed_counters() -> googletest::Result<()> {
        let sections = vec![
            section("s1", vec![lecture("l1", false), lecture("l2", false)]),
            section("s2", vec![lecture("l3", true)]),
        ];
        expect_that!(total_lectures(&sections), eq(3));
        expect_that!(total_duration(&sections), eq(180));
        Ok(())
    }
}
