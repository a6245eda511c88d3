use crate::types::{DetectionStatus, EyeSample, EyesSample, Point};

use super::wire::{RawDocument, WireEye, WirePoint};

/// P4 是 CR 列表里的第 4 个元素
const P4_INDEX: usize = 3;

impl From<WirePoint> for Point {
    fn from(p: WirePoint) -> Self {
        Point::new(p.x, p.y)
    }
}

/// 解码一帧；空文档得到 `NoData`，不会失败
pub fn decode(doc: &RawDocument) -> EyesSample {
    match doc {
        RawDocument::Empty => EyesSample::no_data(),
        RawDocument::Frame { left, right } => EyesSample::new(decode_eye(left), decode_eye(right)),
    }
}

pub fn decode_eye(eye: &WireEye) -> EyeSample {
    let (corneal_reflection, cr_status) = match eye.crs.first() {
        Some(cr) => (Point::from(*cr), DetectionStatus::Ok),
        None => (Point::ORIGIN, DetectionStatus::Missing),
    };
    let (purkinje4, p4_status) = match eye.crs.get(P4_INDEX) {
        Some(p4) => (Point::from(*p4), DetectionStatus::Ok),
        None => (Point::ORIGIN, DetectionStatus::Missing),
    };

    EyeSample {
        frame_number: eye.frame_number,
        pupil_center: eye.pupil.center.into(),
        pupil_area: eye.pupil.size.width * eye.pupil.size.height,
        corneal_reflection,
        purkinje4,
        cr_status,
        p4_status,
    }
}
