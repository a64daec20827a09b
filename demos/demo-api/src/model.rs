//! Records that cross the wire

use serde::{Deserialize, Serialize};
use wirebind::Describe;

#[derive(Debug, Clone, PartialEq, Describe, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub display_name: String,
    pub email: Option<String>,
    pub tags: Vec<String>,
    /// Reports are answered with their manager inlined
    pub manager: Option<Box<User>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Describe, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}
