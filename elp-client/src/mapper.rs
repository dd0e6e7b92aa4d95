//! Tolerant mapping of backend payloads into the strict curriculum model.
//!
//! The backend ships loosely shaped JSON: envelopes may or may not wrap the
//! payload, identifiers arrive as numbers or strings, booleans as `true` or
//! `1`, and any field can be missing outright. Everything here degrades to
//! a per-field default instead of failing, so a partially malformed payload
//! still yields a structurally valid entity and the UI always has something
//! to render. No function in this module returns an error.

use serde_json::Value;

use crate::media::MediaResolver;
use crate::model::{
    Bookmark, Certificate, ContentType, Course, CourseLevel, EnrollmentProgress, Instructor,
    LastLecture, Lecture, LectureResource, Note, Section,
};

/// First present, non-null value among the candidate keys. The backend is
/// transitioning between snake_case and camelCase names, so most fields are
/// looked up under both.
fn field<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| value.get(k))
        .find(|v| !v.is_null())
}

fn str_field(value: &Value, keys: &[&str]) -> String {
    field(value, keys)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn opt_str_field(value: &Value, keys: &[&str]) -> Option<String> {
    field(value, keys)
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Identifiers are coerced to string form whether the backend sent a string
/// or a number, so identifier equality holds across payload shapes.
fn id_field(value: &Value, keys: &[&str]) -> String {
    match field(value, keys) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Numbers may arrive as JSON numbers or numeric strings.
fn f64_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn f64_field(value: &Value, keys: &[&str]) -> f64 {
    field(value, keys).and_then(f64_of).unwrap_or_default()
}

fn opt_f64_field(value: &Value, keys: &[&str]) -> Option<f64> {
    field(value, keys).and_then(f64_of)
}

fn u32_field(value: &Value, keys: &[&str]) -> u32 {
    f64_field(value, keys).max(0.0) as u32
}

fn u64_field(value: &Value, keys: &[&str]) -> u64 {
    f64_field(value, keys).max(0.0) as u64
}

/// Boolean-like fields accept a native boolean or the integers `1`/`0`.
fn bool_field(value: &Value, keys: &[&str]) -> bool {
    match field(value, keys) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        _ => false,
    }
}

fn items<'a>(value: &'a Value, keys: &[&str]) -> &'a [Value] {
    field(value, keys)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// String list fields arrive either as a JSON array or as a JSON-encoded
/// string (the same encoding the admin forms submit).
fn str_list_field(value: &Value, keys: &[&str]) -> Vec<String> {
    match field(value, keys) {
        Some(Value::Array(values)) => values
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(encoded)) => serde_json::from_str(encoded).unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn media_field(value: &Value, keys: &[&str], media: &MediaResolver) -> String {
    media.resolve(&str_field(value, keys))
}

fn opt_media_field(value: &Value, keys: &[&str], media: &MediaResolver) -> Option<String> {
    opt_str_field(value, keys).map(|path| media.resolve(&path))
}

/// Unwraps a catalog payload, accepting `{"courses": [...]}` or a bare array.
pub fn course_list(payload: &Value, media: &MediaResolver) -> Vec<Course> {
    let records = match payload.as_array() {
        Some(records) => records.as_slice(),
        None => items(payload, &["courses"]),
    };
    records.iter().map(|r| map_course(r, media)).collect()
}

/// Unwraps a detail payload, accepting `{"course": {...}}` or a bare object.
pub fn course_detail(payload: &Value, media: &MediaResolver) -> Course {
    let record = match field(payload, &["course"]) {
        Some(record) if record.is_object() => record,
        _ => payload,
    };
    map_course(record, media)
}

/// Unwraps a notes payload, accepting `{"notes": [...]}` or a bare array.
pub fn note_list(payload: &Value) -> Vec<Note> {
    let records = match payload.as_array() {
        Some(records) => records.as_slice(),
        None => items(payload, &["notes"]),
    };
    records.iter().map(map_note).collect()
}

/// Unwraps a bookmarks payload, accepting `{"bookmarks": [...]}` or a bare
/// array.
pub fn bookmark_list(payload: &Value) -> Vec<Bookmark> {
    let records = match payload.as_array() {
        Some(records) => records.as_slice(),
        None => items(payload, &["bookmarks"]),
    };
    records.iter().map(map_bookmark).collect()
}

pub fn map_course(record: &Value, media: &MediaResolver) -> Course {
    Course {
        id: id_field(record, &["id"]),
        title: str_field(record, &["title"]),
        subtitle: str_field(record, &["subtitle"]),
        description: str_field(record, &["description"]),
        thumbnail: media_field(record, &["thumbnail", "image"], media),
        promo_video: opt_media_field(record, &["promo_video", "promoVideo"], media),
        category: str_field(record, &["category"]),
        subcategory: str_field(record, &["subcategory"]),
        level: CourseLevel::parse(&str_field(record, &["level"])).unwrap_or_default(),
        language: str_field(record, &["language"]),
        price: f64_field(record, &["price"]),
        discount_price: opt_f64_field(record, &["discount_price", "discountPrice"]),
        instructor: map_instructor(field(record, &["instructor"]).unwrap_or(&Value::Null), media),
        what_you_will_learn: str_list_field(record, &["what_you_will_learn", "whatYouWillLearn"]),
        requirements: str_list_field(record, &["requirements"]),
        target_audience: str_list_field(record, &["target_audience", "targetAudience"]),
        total_duration: u32_field(record, &["total_duration", "totalDuration"]),
        total_lectures: u32_field(record, &["total_lectures", "totalLectures"]),
        total_sections: u32_field(record, &["total_sections", "totalSections"]),
        average_rating: f64_field(record, &["average_rating", "averageRating", "rating"]),
        total_reviews: u32_field(record, &["total_reviews", "totalReviews"]),
        total_students: u32_field(record, &["total_students", "totalStudents", "students_count"]),
        sections: items(record, &["sections"])
            .iter()
            .map(|s| map_section(s, media))
            .collect(),
        is_enrolled: bool_field(record, &["is_enrolled", "isEnrolled"]),
        progress: field(record, &["progress", "enrollment"])
            .filter(|v| v.is_object())
            .map(|v| map_progress(v, media)),
        last_updated: str_field(record, &["last_updated", "lastUpdated", "updated_at"]),
    }
}

/// Some endpoints still ship the instructor as a bare display name; in that
/// case everything but the name takes its default.
pub fn map_instructor(record: &Value, media: &MediaResolver) -> Instructor {
    if let Some(name) = record.as_str() {
        return Instructor {
            name: name.to_string(),
            ..Instructor::default()
        };
    }
    Instructor {
        id: id_field(record, &["id"]),
        name: str_field(record, &["name"]),
        avatar: media_field(record, &["avatar"], media),
        bio: str_field(record, &["bio"]),
        total_students: u32_field(record, &["total_students", "totalStudents"]),
        total_courses: u32_field(record, &["total_courses", "totalCourses"]),
        average_rating: f64_field(record, &["average_rating", "averageRating"]),
    }
}

pub fn map_section(record: &Value, media: &MediaResolver) -> Section {
    Section {
        id: id_field(record, &["id"]),
        title: str_field(record, &["title"]),
        description: str_field(record, &["description"]),
        order_index: u32_field(record, &["order_index", "orderIndex"]),
        learning_objective: str_field(record, &["learning_objective", "learningObjective"]),
        lectures_count: u32_field(record, &["lectures_count", "lecturesCount"]),
        total_duration: u32_field(record, &["total_duration", "totalDuration"]),
        lectures: items(record, &["lectures"])
            .iter()
            .map(|l| map_lecture(l, media))
            .collect(),
    }
}

pub fn map_lecture(record: &Value, media: &MediaResolver) -> Lecture {
    Lecture {
        id: id_field(record, &["id"]),
        title: str_field(record, &["title"]),
        description: str_field(record, &["description"]),
        content_type: ContentType::parse(&str_field(record, &["content_type", "contentType"]))
            .unwrap_or_default(),
        order_index: u32_field(record, &["order_index", "orderIndex"]),
        video_url: opt_media_field(record, &["video_url", "videoUrl"], media),
        duration: u32_field(record, &["duration"]),
        article_content: opt_str_field(record, &["article_content", "articleContent"]),
        is_preview: bool_field(record, &["is_preview", "isPreview"]),
        is_downloadable: bool_field(record, &["is_downloadable", "isDownloadable"]),
        resources: items(record, &["resources"])
            .iter()
            .map(|r| map_resource(r, media))
            .collect(),
        is_completed: bool_field(record, &["is_completed", "isCompleted"]),
        video_position: u32_field(record, &["video_position", "videoPosition"]),
    }
}

pub fn map_resource(record: &Value, media: &MediaResolver) -> LectureResource {
    LectureResource {
        id: id_field(record, &["id"]),
        title: str_field(record, &["title"]),
        file_url: media_field(record, &["file_url", "fileUrl"], media),
        file_size: u64_field(record, &["file_size", "fileSize"]),
    }
}

pub fn map_progress(record: &Value, media: &MediaResolver) -> EnrollmentProgress {
    EnrollmentProgress {
        id: id_field(record, &["id"]),
        enrolled_at: str_field(record, &["enrolled_at", "enrolledAt"]),
        progress_percentage: f64_field(record, &["progress_percentage", "progressPercentage"]),
        completed_lectures: u32_field(record, &["completed_lectures", "completedLectures"]),
        total_lectures: u32_field(record, &["total_lectures", "totalLectures"]),
        total_time_watched: u32_field(record, &["total_time_watched", "totalTimeWatched"]),
        is_completed: bool_field(record, &["is_completed", "isCompleted"]),
        completed_at: opt_str_field(record, &["completed_at", "completedAt"]),
        last_lecture: field(record, &["last_lecture", "lastLecture"])
            .filter(|v| v.is_object())
            .map(map_last_lecture),
        last_video_position: u32_field(record, &["last_video_position", "lastVideoPosition"]),
        certificate: field(record, &["certificate"])
            .filter(|v| v.is_object())
            .map(|v| map_certificate(v, media)),
    }
}

fn map_last_lecture(record: &Value) -> LastLecture {
    LastLecture {
        id: id_field(record, &["id"]),
        title: str_field(record, &["title"]),
        section_title: str_field(record, &["section_title", "sectionTitle"]),
    }
}

pub fn map_certificate(record: &Value, media: &MediaResolver) -> Certificate {
    Certificate {
        id: id_field(record, &["id"]),
        certificate_number: str_field(record, &["certificate_number", "certificateNumber"]),
        issued_at: str_field(record, &["issued_at", "issuedAt"]),
        student_name: str_field(record, &["student_name", "studentName"]),
        course_title: str_field(record, &["course_title", "courseTitle"]),
        instructor_name: str_field(record, &["instructor_name", "instructorName"]),
        completion_date: str_field(record, &["completion_date", "completionDate"]),
        pdf_url: media_field(record, &["pdf_url", "pdfUrl"], media),
    }
}

pub fn map_note(record: &Value) -> Note {
    Note {
        id: id_field(record, &["id"]),
        lecture_id: id_field(record, &["lecture_id", "lectureId"]),
        lecture_title: str_field(record, &["lecture_title", "lectureTitle"]),
        content: str_field(record, &["content"]),
        timestamp: u32_field(record, &["timestamp"]),
        created_at: str_field(record, &["created_at", "createdAt"]),
        updated_at: str_field(record, &["updated_at", "updatedAt"]),
    }
}

pub fn map_bookmark(record: &Value) -> Bookmark {
    Bookmark {
        id: id_field(record, &["id"]),
        lecture_id: id_field(record, &["lecture_id", "lectureId"]),
        lecture_title: str_field(record, &["lecture_title", "lectureTitle"]),
        title: str_field(record, &["title"]),
        timestamp: u32_field(record, &["timestamp"]),
        created_at: str_field(record, &["created_at", "createdAt"]),
    }
}
