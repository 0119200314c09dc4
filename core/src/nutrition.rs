//! VitalStack nutrition API contract.
//!
//! Mirrors the backend's OpenAPI document. The backend owns these shapes;
//! update this module whenever its interface changes.

use std::iter::Sum;
use std::ops::Add;

use serde::{Deserialize, Serialize};

use crate::contract::Operation;
use crate::http::HttpMethod;

/// `POST /api/nutrition/scan`: detect a dish in an image and break it down
/// into ingredients with macros.
pub struct ScanFood;

impl Operation for ScanFood {
    type Params = ();
    type Body = ScanInput;
    type Response = ScanOutput;

    const ID: &'static str = "scan-food";
    const METHOD: HttpMethod = HttpMethod::Post;
    const PATH: &'static str = "/api/nutrition/scan";
    const BODY_REQUIRED: bool = true;
}

/// Scan request: a base64-encoded image and optional free-text context.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanInput {
    pub image_base64: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ScanInput {
    pub fn new(image_base64: impl Into<String>) -> Self {
        Self {
            image_base64: image_base64.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanOutput {
    pub food_name: String,
    /// 0.0 to 1.0.
    pub confidence: f64,
    pub macros: MacroData,
    pub serving_size: String,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
}

impl ScanOutput {
    /// Sum of the per-ingredient macros.
    ///
    /// The backend derives `macros` this way, so the two should agree unless
    /// the response was edited by hand.
    pub fn ingredient_totals(&self) -> MacroData {
        self.ingredients.iter().map(|i| i.macros).sum()
    }

    /// Total ingredient weight in grams.
    pub fn total_weight_grams(&self) -> f64 {
        self.ingredients.iter().map(|i| i.weight_grams).sum()
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct MacroData {
    pub calories: i64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
}

impl Add for MacroData {
    type Output = MacroData;

    fn add(self, rhs: MacroData) -> MacroData {
        MacroData {
            calories: self.calories.saturating_add(rhs.calories),
            protein: self.protein + rhs.protein,
            carbs: self.carbs + rhs.carbs,
            fat: self.fat + rhs.fat,
            fiber: self.fiber + rhs.fiber,
        }
    }
}

impl Sum for MacroData {
    fn sum<I: Iterator<Item = MacroData>>(iter: I) -> Self {
        iter.fold(MacroData::default(), Add::add)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ingredient {
    pub name: String,
    pub weight_grams: f64,
    pub macros: MacroData,
}

/// RFC 7807 problem body returned by the backend on errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ErrorModel {
    #[serde(default)]
    pub title: String,
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorDetail>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ErrorDetail {
    #[serde(default)]
    pub message: String,
    /// Where the error occurred, e.g. `body.image_base64`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}
