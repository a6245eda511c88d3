use serde::{Deserialize, Serialize};
use std::fmt;

use super::Point;

/// 单个检测结果（CR / P4）是否可信
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetectionStatus {
    Ok,
    #[default]
    Missing,
}

impl DetectionStatus {
    pub fn is_ok(self) -> bool {
        self == DetectionStatus::Ok
    }

    pub fn is_missing(self) -> bool {
        self == DetectionStatus::Missing
    }
}

/// 整帧状态：服务器返回空文档时为 `NoData`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    Ok,
    #[default]
    NoData,
}

/// 曲线跟踪哪只眼
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Eye {
    #[default]
    Left,
    Right,
}

impl Eye {
    pub fn label(self) -> &'static str {
        match self {
            Eye::Left => "Left",
            Eye::Right => "Right",
        }
    }
}

impl fmt::Display for Eye {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 单眼的一帧测量结果
///
/// 只有对应状态为 `Ok` 时几何字段才有意义；缺失的特征点报告为 `(0, 0)`。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EyeSample {
    pub frame_number: i64,
    pub pupil_center: Point,
    /// 瞳孔外接椭圆 width * height
    pub pupil_area: f64,
    pub corneal_reflection: Point,
    pub purkinje4: Point,
    pub cr_status: DetectionStatus,
    pub p4_status: DetectionStatus,
}

impl EyeSample {
    pub fn is_empty(&self) -> bool {
        *self == EyeSample::default()
    }
}

/// 双眼的一帧
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EyesSample {
    pub left: EyeSample,
    pub right: EyeSample,
    pub session_status: SessionStatus,
}

impl EyesSample {
    /// “无数据”标记：两只眼都是默认值
    pub fn no_data() -> Self {
        Self::default()
    }

    pub fn new(left: EyeSample, right: EyeSample) -> Self {
        Self {
            left,
            right,
            session_status: SessionStatus::Ok,
        }
    }

    pub fn has_data(&self) -> bool {
        self.session_status == SessionStatus::Ok
    }

    pub fn eye(&self, eye: Eye) -> &EyeSample {
        match eye {
            Eye::Left => &self.left,
            Eye::Right => &self.right,
        }
    }
}
