//! Spatial host types.

use std::fmt::Write;

/// A two-dimensional point.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Well-known text, e.g. `POINT(1 2)`.
    pub fn to_wkt(&self) -> String {
        format!("POINT({} {})", self.x, self.y)
    }
}

/// An ordered run of points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineString(pub Vec<Point>);

impl LineString {
    pub fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Well-known text, e.g. `LINESTRING(0 0,1 1)`.
    pub fn to_wkt(&self) -> String {
        wkt_linestring(&self.0)
    }
}

/// Renders points as a `LINESTRING` well-known text.
pub fn wkt_linestring(points: &[Point]) -> String {
    let mut out = String::from("LINESTRING(");
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        let _ = write!(out, "{} {}", p.x, p.y);
    }
    out.push(')');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wkt() {
        assert_eq!(Point::new(1.5, -2.0).to_wkt(), "POINT(1.5 -2)");
        let line = LineString::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]);
        assert_eq!(line.to_wkt(), "LINESTRING(0 0,1 1)");
    }
}
