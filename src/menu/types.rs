//! Menu and category types as exchanged with the backend.

use serde::{Deserialize, Serialize};

/// A dish on the menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub description: String,
  /// Name of the category the item belongs to.
  pub category: String,
  /// Price of the full portion, in minor currency units.
  pub full_price: u32,
  /// Price of the half portion; absent when the dish has no half option.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub half_price: Option<u32>,
  /// Durable URL on the image host; never raw image data.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub image: Option<String>,
  /// Whether customers can currently order the item.
  #[serde(rename = "isAvailable")]
  pub available: bool,
}

/// Input for creating a menu item.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMenuItem {
  pub name: String,
  pub description: String,
  pub category: String,
  pub full_price: u32,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub half_price: Option<u32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub image: Option<String>,
  #[serde(rename = "isAvailable")]
  pub available: bool,
}

/// Partial update for a menu item; only set fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemPatch {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub category: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub full_price: Option<u32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub half_price: Option<u32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub image: Option<String>,
  #[serde(rename = "isAvailable", skip_serializing_if = "Option::is_none")]
  pub available: Option<bool>,
}

/// A menu category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
  pub id: String,
  pub name: String,
  /// Inactive categories are hidden from the customer-facing menu.
  #[serde(rename = "isActive")]
  pub active: bool,
}
