use serde::Deserialize;
use serde_json::{Map, Value};

/// 服务器回复的 JSON 结构（只用于反序列化，不参与业务逻辑）
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct WirePoint {
    #[serde(rename = "X")]
    pub x: f64,
    #[serde(rename = "Y")]
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct WireSize {
    #[serde(rename = "Width")]
    pub width: f64,
    #[serde(rename = "Height")]
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct WirePupil {
    #[serde(rename = "Center")]
    pub center: WirePoint,
    #[serde(rename = "Size")]
    pub size: WireSize,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WireEye {
    #[serde(rename = "FrameNumber")]
    pub frame_number: i64,
    #[serde(rename = "Pupil")]
    pub pupil: WirePupil,
    #[serde(rename = "CRs")]
    pub crs: Vec<WirePoint>,
}

#[derive(Debug, Deserialize)]
struct WireDocument {
    #[serde(rename = "Left")]
    left: WireEye,
    #[serde(rename = "Right")]
    right: WireEye,
}

const EYE_KEYS: [&str; 2] = ["Left", "Right"];

/// 解析后的回复：空文档（无数据）或完整的一帧
#[derive(Debug, Clone, PartialEq)]
pub enum RawDocument {
    Empty,
    Frame { left: WireEye, right: WireEye },
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("document has no `{0}` eye")]
    MissingEye(&'static str),
}

/// 把一条 UTF-8 回复解析成 [`RawDocument`]
///
/// 只有空对象 `{}` 是无数据标记；其他对象必须同时带 `Left` 和 `Right`，
/// 值为 `null` 也算不符合格式。
pub fn parse_document(payload: &str) -> Result<RawDocument, DecodeError> {
    let object: Map<String, Value> = serde_json::from_str(payload)?;
    if object.is_empty() {
        return Ok(RawDocument::Empty);
    }
    if let Some(missing) = EYE_KEYS.iter().find(|key| !object.contains_key(**key)) {
        return Err(DecodeError::MissingEye(*missing));
    }
    let doc: WireDocument = serde_json::from_value(Value::Object(object))?;
    Ok(RawDocument::Frame {
        left: doc.left,
        right: doc.right,
    })
}
