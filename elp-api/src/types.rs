//! Common data types used by the API request payloads

/// A file selected for upload, sent as one part of a multipart form.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct FileAttachment {
    /// File name reported to the backend
    pub file_name: String,
    /// Raw file contents
    pub bytes: Vec<u8>,
}

/// Multipart form payload for creating or updating a course.
///
/// The three list fields are JSON-encoded into a single text part each,
/// which is what the backend expects. File parts are only included when an
/// attachment is present, so an update without new media leaves the stored
/// files untouched.
#[derive(Debug, Default, PartialEq, Clone)]
pub struct CourseForm {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub price: f64,
    pub discount_price: Option<f64>,
    pub level: String,
    pub category: String,
    pub language: String,
    pub what_you_will_learn: Vec<String>,
    pub requirements: Vec<String>,
    pub target_audience: Vec<String>,
    pub thumbnail: Option<FileAttachment>,
    pub promo_video: Option<FileAttachment>,
}

/// Multipart form payload for creating or updating a lecture.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct LectureForm {
    pub title: String,
    pub description: String,
    /// One of `video`, `article` or `quiz`
    pub content_type: String,
    pub is_preview: bool,
    pub is_downloadable: bool,
    pub video_file: Option<FileAttachment>,
}
