use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use strum_macros::{Display, EnumIter, EnumString};

/// Image types accepted by the upload form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ImageExtension {
    Png,
    Jpg,
    Jpeg,
    Gif,
}

impl ImageExtension {
    /// Extension after the last `.` of `file_name`, if it is on the allow-list.
    pub fn from_filename(file_name: &str) -> Option<Self> {
        let (_, extension) = file_name.rsplit_once('.')?;
        extension.parse().ok()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ImageInput {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WorkflowInputs {
    pub image: ImageInput,
}

/// Body of a `POST /{workspace}/workflows/{workflow}` call.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WorkflowRequest {
    pub api_key: String,
    pub use_cache: bool,
    pub inputs: WorkflowInputs,
}

impl WorkflowRequest {
    pub fn with_base64_image(api_key: impl Into<String>, image_b64: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            use_cache: true,
            inputs: WorkflowInputs {
                image: ImageInput {
                    kind: "base64".into(),
                    value: image_b64.into(),
                },
            },
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct WorkflowResponse {
    #[serde(default)]
    pub outputs: Option<Value>,
}

// Fields of the wrong shape are treated the same as missing ones.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn lenient_items<'de, D, T>(deserializer: D) -> Result<Vec<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Array(items) => Ok(items
            .into_iter()
            .map(|item| serde_json::from_value(item).ok())
            .collect()),
        _ => Ok(Vec::new()),
    }
}

// Called only when the key is present, so `null` becomes `Some(Value::Null)`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Prediction {
    /// Kept as raw JSON so a present-but-null `class` differs from a missing one.
    #[serde(default, deserialize_with = "present")]
    pub class: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub confidence: Option<f64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ModelPredictions {
    #[serde(default, deserialize_with = "lenient_items")]
    pub predictions: Vec<Option<Prediction>>,
}

/// One element of a workflow's `outputs` sequence.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct WorkflowOutput {
    #[serde(
        rename = "$steps.model.predictions",
        default,
        deserialize_with = "lenient"
    )]
    pub model_predictions: Option<ModelPredictions>,
    #[serde(default, deserialize_with = "lenient")]
    pub top_class: Option<String>,
}

impl WorkflowOutput {
    /// `None` when `value` is not a JSON object.
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    pub fn first_prediction(&self) -> Option<&Prediction> {
        self.model_predictions
            .as_ref()?
            .predictions
            .first()?
            .as_ref()
    }
}
