//! Wire types for the provider's task API.

use serde::{Deserialize, Serialize};

/// Model identifier for image inpainting/editing tasks.
pub const IMAGE_EDIT_MODEL: &str = "inpaint-pro";

/// Model identifier for still-to-motion clip generation tasks.
pub const VIDEO_CLIP_MODEL: &str = "motion-pro";

/// Task family accepted by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Img2img,
    Txt2img,
}

/// Provider-specific input payload.
///
/// Opaque to callers beyond construction: the provider decides what each
/// field means for a given model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskInput {
    /// Natural-language instruction
    pub prompt: String,

    /// Source media reference (required for img2img)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Mask reference for inpainting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mask_url: Option<String>,

    /// Output aspect ratio ("16:9", "9:16", "1:1")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,

    /// Clip duration in seconds, as a string ("5" or "10")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    /// Negative prompt for motion generation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,

    /// Output format ("jpeg", "png", "webp", "mp4")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,
}

impl TaskInput {
    /// Input for an img2img edit with just a prompt and source image.
    pub fn img2img(prompt: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image_url: Some(image_url.into()),
            mask_url: None,
            aspect_ratio: None,
            duration: None,
            negative_prompt: None,
            output_format: None,
        }
    }

    /// Attach a mask reference.
    pub fn with_mask(mut self, mask_url: impl Into<String>) -> Self {
        self.mask_url = Some(mask_url.into());
        self
    }

    /// Set the output aspect ratio.
    pub fn with_aspect_ratio(mut self, aspect_ratio: impl Into<String>) -> Self {
        self.aspect_ratio = Some(aspect_ratio.into());
        self
    }

    /// Set the clip duration.
    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = Some(duration.into());
        self
    }

    /// Set the negative prompt.
    pub fn with_negative_prompt(mut self, negative_prompt: impl Into<String>) -> Self {
        self.negative_prompt = Some(negative_prompt.into());
        self
    }

    /// Set the output format.
    pub fn with_output_format(mut self, output_format: impl Into<String>) -> Self {
        self.output_format = Some(output_format.into());
        self
    }
}

/// Body for `POST /jobs/createTask`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    pub model: String,
    pub task_type: TaskType,
    pub input: TaskInput,
}

/// Envelope for `POST /jobs/createTask`.
///
/// `code` of 0 or 200 signals acceptance; anything else is an error.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskResponse {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    pub data: Option<CreateTaskData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskData {
    pub task_id: String,
}

/// Envelope for `GET /jobs/getTask`.
#[derive(Debug, Clone, Deserialize)]
pub struct GetTaskResponse {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    pub data: Option<TaskData>,
}

/// Polled task state.
///
/// `status` is kept as the raw provider string so an unrecognized value can
/// be surfaced verbatim.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskData {
    pub task_id: String,
    pub status: String,
    pub output: Option<TaskOutput>,
    pub error: Option<String>,
}

/// Output of a completed task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskOutput {
    /// Generated media references. The provider uses one array for both
    /// image and video results; a clip task reads the first entry.
    pub images: Vec<MediaOutput>,
}

/// One generated media reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaOutput {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_input_skips_absent_fields() {
        let input = TaskInput::img2img("remove the car", "https://example.com/a.jpg");
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["prompt"], "remove the car");
        assert!(json.get("mask_url").is_none());
        assert!(json.get("duration").is_none());
    }

    #[test]
    fn test_get_task_response_parses_output() {
        let body = r#"{
            "code": 0,
            "message": "ok",
            "data": {
                "task_id": "t-1",
                "status": "completed",
                "output": { "images": [{ "url": "https://cdn.example.com/r.jpg", "width": 1024 }] }
            }
        }"#;
        let resp: GetTaskResponse = serde_json::from_str(body).unwrap();
        let data = resp.data.unwrap();
        assert_eq!(data.status, "completed");
        assert_eq!(data.output.unwrap().images[0].width, Some(1024));
    }
}
