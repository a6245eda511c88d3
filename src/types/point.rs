use std::fmt;

/// 二维点，所有位置字段（瞳孔中心、角膜反射、P4）都使用它
///
/// 值语义：除 `clamp_in_place` / `rotate_in_place` 外，所有操作都返回新值。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    /// 分量乘法
    pub fn mul(self, other: Point) -> Point {
        Point::new(self.x * other.x, self.y * other.y)
    }

    pub fn scale(self, factor: f64) -> Point {
        Point::new(self.x * factor, self.y * factor)
    }

    /// 按 `angle` 弧度顺时针旋转：
    /// `x' = x·cos + y·sin`，`y' = -x·sin + y·cos`
    pub fn rotate(self, angle: f64) -> Point {
        let (sin, cos) = angle.sin_cos();
        Point::new(self.x * cos + self.y * sin, -self.x * sin + self.y * cos)
    }

    /// 每个分量限制在 `[min, max]` 内
    pub fn clamp(self, min: f64, max: f64) -> Point {
        Point::new(self.x.max(min).min(max), self.y.max(min).min(max))
    }

    /// [`Point::rotate`] 的原地版本
    pub fn rotate_in_place(&mut self, angle: f64) -> &mut Self {
        *self = self.rotate(angle);
        self
    }

    /// [`Point::clamp`] 的原地版本
    pub fn clamp_in_place(&mut self, min: f64, max: f64) -> &mut Self {
        *self = self.clamp(min, max);
        self
    }

    pub fn is_origin(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Point({}, {})", self.x, self.y)
    }
}
