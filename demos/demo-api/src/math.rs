use crate::model::Point;
use thiserror::Error;
use wirebind::describe_fn;

#[derive(Debug, Error)]
pub enum MathError {
    #[error("division by zero")]
    DivisionByZero,
}

#[describe_fn]
pub fn add(a: i32, b: i32) -> i32 {
    a + b
}

#[describe_fn]
pub fn divide(a: f64, b: f64) -> Result<f64, MathError> {
    if b == 0.0 {
        return Err(MathError::DivisionByZero);
    }
    Ok(a / b)
}

#[describe_fn]
pub fn midpoint(a: Point, b: &Point) -> Point {
    Point {
        x: (a.x + b.x) / 2.0,
        y: (a.y + b.y) / 2.0,
    }
}
