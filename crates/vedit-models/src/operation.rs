//! Operation definitions and wire payload mapping.
//!
//! Each operation carries its own settings record. The mapping from an
//! [`Operation`] to the backend request body is pure and total: every
//! variant produces a well-formed `{ operation, settings }` payload even
//! with default settings.

use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the supported media transformations.
///
/// Exactly one operation may be active per session.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Cut silent passages out of the audio track
    RemoveSilence(SilenceSettings),
    /// Segment the speaker out of the background
    RemoveBackground(BackgroundSettings),
    /// Transcribe speech into a subtitle track
    GenerateSubtitles(SubtitleSettings),
    /// Increase resolution with a super-resolution model
    UpscaleVideo(UpscaleSettings),
    /// Re-aim the speaker's gaze
    RedirectGaze(GazeSettings),
}

impl Operation {
    /// Wire name of the operation, as the backend expects it.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::RemoveSilence(_) => "remove_silence",
            Operation::RemoveBackground(_) => "remove_background",
            Operation::GenerateSubtitles(_) => "generate_subtitles",
            Operation::UpscaleVideo(_) => "upscale_video",
            Operation::RedirectGaze(_) => "redirect_gaze",
        }
    }

    /// Whether a completed run produces a secondary subtitle artifact.
    pub fn produces_subtitles(&self) -> bool {
        matches!(self, Operation::GenerateSubtitles(_))
    }

    /// Build the backend request body for this operation.
    pub fn to_request(&self) -> ProcessRequest {
        let settings = match self {
            Operation::RemoveSilence(s) => OperationSettings::Silence(s.clone()),
            Operation::RemoveBackground(s) => OperationSettings::Background(s.clone()),
            Operation::GenerateSubtitles(s) => OperationSettings::Subtitle(s.clone()),
            Operation::UpscaleVideo(s) => OperationSettings::Upscale(s.clone()),
            Operation::RedirectGaze(s) => OperationSettings::Gaze(s.clone()),
        };
        ProcessRequest {
            operation: self.name(),
            settings,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Request body for `POST /process/{session_id}`.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessRequest {
    /// Operation wire name
    pub operation: &'static str,
    /// Operation-specific settings object
    pub settings: OperationSettings,
}

/// Settings object for the process request, one shape per operation.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum OperationSettings {
    Silence(SilenceSettings),
    Background(BackgroundSettings),
    Subtitle(SubtitleSettings),
    Upscale(UpscaleSettings),
    Gaze(GazeSettings),
}

/// Settings for silence removal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SilenceSettings {
    /// Loudness below this level counts as silence, in dBFS
    pub silence_threshold_db: f32,
    /// Frames of margin kept around each cut
    pub frame_margin: u32,
}

impl Default for SilenceSettings {
    fn default() -> Self {
        Self {
            silence_threshold_db: -30.0,
            frame_margin: 6,
        }
    }
}

/// Speed/quality tradeoff for background segmentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundMode {
    Fast,
    #[default]
    Quality,
}

/// What replaces the removed background.
///
/// Serialized as a single string field: the literal `"transparent"`, a hex
/// color, or an image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackgroundTarget {
    Transparent,
    Color(String),
    Image(String),
}

impl Default for BackgroundTarget {
    fn default() -> Self {
        BackgroundTarget::Transparent
    }
}

impl BackgroundTarget {
    /// Wire value for this target.
    pub fn as_wire(&self) -> &str {
        match self {
            BackgroundTarget::Transparent => "transparent",
            BackgroundTarget::Color(hex) => hex,
            BackgroundTarget::Image(path) => path,
        }
    }
}

impl Serialize for BackgroundTarget {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

/// Settings for background removal.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundSettings {
    /// Speed/quality mode
    pub mode: BackgroundMode,
    /// Replacement background
    pub background_target: BackgroundTarget,
}

/// Settings for subtitle generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtitleSettings {
    /// Transcription language, primary subtag only (e.g. "pt")
    pub language_code: String,
}

impl SubtitleSettings {
    /// Create settings for the given language tag.
    ///
    /// The backend only understands primary subtags, so regionalized tags
    /// like `pt-BR` are reduced to `pt`.
    pub fn new(language: &str) -> Self {
        let primary = language
            .split(['-', '_'])
            .next()
            .unwrap_or(language)
            .to_lowercase();
        Self {
            language_code: primary,
        }
    }
}

impl Default for SubtitleSettings {
    fn default() -> Self {
        Self::new("pt")
    }
}

/// Upscaling factor. Serialized as the number 2 or 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScaleFactor {
    #[default]
    X2,
    X4,
}

impl ScaleFactor {
    pub fn as_u8(&self) -> u8 {
        match self {
            ScaleFactor::X2 => 2,
            ScaleFactor::X4 => 4,
        }
    }
}

impl Serialize for ScaleFactor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

/// Output quality for upscaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UpscaleQuality {
    Low,
    Medium,
    #[default]
    High,
}

/// Settings for video upscaling.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpscaleSettings {
    /// 2x or 4x
    pub scale_factor: ScaleFactor,
    /// Super-resolution model name, "auto" lets the backend pick
    pub model: String,
    /// Output quality
    pub quality: UpscaleQuality,
}

impl Default for UpscaleSettings {
    fn default() -> Self {
        Self {
            scale_factor: ScaleFactor::X2,
            model: "auto".to_string(),
            quality: UpscaleQuality::High,
        }
    }
}

/// Settings for gaze redirection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GazeSettings {
    /// Horizontal gaze target in [-1.0, 1.0]; 0.0 looks at the camera
    pub target_direction: f32,
}

impl GazeSettings {
    /// Create settings with the direction clamped to the valid range.
    pub fn new(target_direction: f32) -> Self {
        Self {
            target_direction: target_direction.clamp(-1.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_operations() -> Vec<Operation> {
        vec![
            Operation::RemoveSilence(SilenceSettings::default()),
            Operation::RemoveBackground(BackgroundSettings::default()),
            Operation::GenerateSubtitles(SubtitleSettings::default()),
            Operation::UpscaleVideo(UpscaleSettings::default()),
            Operation::RedirectGaze(GazeSettings::default()),
        ]
    }

    #[test]
    fn test_default_payloads_are_total() {
        for op in default_operations() {
            let request = op.to_request();
            let value = serde_json::to_value(&request).unwrap();
            assert_eq!(value["operation"], op.name());
            let settings = value["settings"].as_object().unwrap();
            assert!(
                !settings.is_empty(),
                "{} produced an empty settings object",
                op.name()
            );
        }
    }

    #[test]
    fn test_silence_payload_fields() {
        let request = Operation::RemoveSilence(SilenceSettings::default()).to_request();
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["settings"]["silenceThresholdDb"], -30.0);
        assert_eq!(value["settings"]["frameMargin"], 6);
    }

    #[test]
    fn test_background_target_wire_values() {
        let transparent = BackgroundSettings::default();
        let value = serde_json::to_value(&transparent).unwrap();
        assert_eq!(value["mode"], "quality");
        assert_eq!(value["backgroundTarget"], "transparent");

        let color = BackgroundSettings {
            mode: BackgroundMode::Fast,
            background_target: BackgroundTarget::Color("#00FF00".into()),
        };
        let value = serde_json::to_value(&color).unwrap();
        assert_eq!(value["mode"], "fast");
        assert_eq!(value["backgroundTarget"], "#00FF00");

        let image = BackgroundTarget::Image("backdrop.png".into());
        assert_eq!(image.as_wire(), "backdrop.png");
    }

    #[test]
    fn test_subtitle_language_normalization() {
        assert_eq!(SubtitleSettings::new("pt-BR").language_code, "pt");
        assert_eq!(SubtitleSettings::new("en_US").language_code, "en");
        assert_eq!(SubtitleSettings::new("ES").language_code, "es");
        assert_eq!(SubtitleSettings::default().language_code, "pt");
    }

    #[test]
    fn test_scale_factor_serializes_as_number() {
        let request = Operation::UpscaleVideo(UpscaleSettings {
            scale_factor: ScaleFactor::X4,
            ..Default::default()
        })
        .to_request();
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["settings"]["scaleFactor"], 4);
        assert_eq!(value["settings"]["model"], "auto");
        assert_eq!(value["settings"]["quality"], "high");
    }

    #[test]
    fn test_gaze_direction_clamped() {
        assert_eq!(GazeSettings::new(3.0).target_direction, 1.0);
        assert_eq!(GazeSettings::new(-1.5).target_direction, -1.0);
        assert_eq!(GazeSettings::new(0.25).target_direction, 0.25);
    }

    #[test]
    fn test_subtitle_flag() {
        for op in default_operations() {
            assert_eq!(
                op.produces_subtitles(),
                op.name() == "generate_subtitles",
                "subtitle flag wrong for {}",
                op.name()
            );
        }
    }
}
