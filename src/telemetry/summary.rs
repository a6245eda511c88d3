use crate::types::{Eye, EyeSample, EyesSample};

pub const NO_DATA_TEXT: &str = "No Data";
pub const NO_CR_TEXT: &str = "No CRs";
pub const NO_P4_TEXT: &str = "No P4";

/// 单眼的问题描述，没有问题时返回 None
fn eye_segment(label: &str, eye: &EyeSample, require_p4: bool) -> Option<String> {
    let cr_missing = eye.cr_status.is_missing();
    let p4_missing = require_p4 && eye.p4_status.is_missing();
    if !cr_missing && !p4_missing {
        return None;
    }

    let mut segment = format!("{}:", label);
    if cr_missing {
        segment.push(' ');
        segment.push_str(NO_CR_TEXT);
    }
    if p4_missing {
        segment.push(' ');
        segment.push_str(NO_P4_TEXT);
    }
    Some(segment)
}

/// 一帧缺失了什么，给人看的摘要
///
/// `NoData` 优先于单眼状态。否则每只眼贡献 `"<Label>: No CRs No P4"`
/// （只有该眼要求 P4 时才检查 P4），两只眼都有内容时才插入 `", "`。
/// 没有问题的帧返回空字符串。
pub fn describe_errors(sample: &EyesSample, require_p4_left: bool, require_p4_right: bool) -> String {
    if !sample.has_data() {
        return NO_DATA_TEXT.to_string();
    }

    let left = eye_segment(Eye::Left.label(), &sample.left, require_p4_left);
    let right = eye_segment(Eye::Right.label(), &sample.right, require_p4_right);

    match (left, right) {
        (Some(l), Some(r)) => format!("{}, {}", l, r),
        (Some(l), None) => l,
        (None, Some(r)) => r,
        (None, None) => String::new(),
    }
}
