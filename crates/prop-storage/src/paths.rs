//! Deterministic media paths.
//!
//! Keys are derived from workspace / owning aggregate / entity ids so that
//! re-running a job overwrites the previous attempt's object instead of
//! accumulating copies.

use prop_models::{ClipId, ImageId, ProjectId, VideoProjectId, WorkspaceId};

/// Key for a stored image edit result.
pub fn image_result_key(
    workspace_id: &WorkspaceId,
    project_id: &ProjectId,
    image_id: &ImageId,
    ext: &str,
) -> String {
    format!("{}/{}/images/{}.{}", workspace_id, project_id, image_id, ext)
}

/// Key for the uploaded mask of an image edit.
pub fn image_mask_key(
    workspace_id: &WorkspaceId,
    project_id: &ProjectId,
    image_id: &ImageId,
) -> String {
    format!("{}/{}/masks/{}.png", workspace_id, project_id, image_id)
}

/// Key for a stored video clip result.
pub fn clip_result_key(
    workspace_id: &WorkspaceId,
    video_project_id: &VideoProjectId,
    clip_id: &ClipId,
) -> String {
    format!("{}/{}/videos/{}.mp4", workspace_id, video_project_id, clip_id)
}

/// Content type for a result image extension.
pub fn image_content_type(ext: &str) -> &'static str {
    match ext {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_deterministic() {
        let ws = WorkspaceId::from("ws1");
        let proj = ProjectId::from("p1");
        let img = ImageId::from("i1");

        assert_eq!(
            image_result_key(&ws, &proj, &img, "jpg"),
            "ws1/p1/images/i1.jpg"
        );
        assert_eq!(image_mask_key(&ws, &proj, &img), "ws1/p1/masks/i1.png");

        let vp = VideoProjectId::from("v1");
        let clip = ClipId::from("c1");
        assert_eq!(clip_result_key(&ws, &vp, &clip), "ws1/v1/videos/c1.mp4");
    }

    #[test]
    fn test_content_types() {
        assert_eq!(image_content_type("jpeg"), "image/jpeg");
        assert_eq!(image_content_type("png"), "image/png");
        assert_eq!(image_content_type("bin"), "application/octet-stream");
    }
}
