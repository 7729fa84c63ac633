//! Cart line types and the composite line identity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Priced variant of a menu item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Portion {
  #[default]
  Full,
  Half,
}

impl Portion {
  pub fn as_str(&self) -> &'static str {
    match self {
      Portion::Full => "full",
      Portion::Half => "half",
    }
  }
}

impl fmt::Display for Portion {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Portion {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "full" => Ok(Portion::Full),
      "half" => Ok(Portion::Half),
      other => Err(format!("unknown portion '{}'", other)),
    }
  }
}

/// Identity of a cart line: base item plus portion variant.
///
/// A structured key rather than a concatenated string, so item ids containing
/// the display separator cannot collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineKey {
  pub item_id: String,
  pub portion: Portion,
}

impl LineKey {
  pub fn new(item_id: impl Into<String>, portion: Portion) -> Self {
    Self {
      item_id: item_id.into(),
      portion,
    }
  }
}

/// Displayed as `{item_id}_{portion}`, the form quantity controls pass around.
impl fmt::Display for LineKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}_{}", self.item_id, self.portion)
  }
}

impl FromStr for LineKey {
  type Err = String;

  /// Parse the display form. The portion is taken from the last `_` segment
  /// so item ids may themselves contain underscores.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (item_id, portion) = s
      .rsplit_once('_')
      .ok_or_else(|| format!("'{}' is not an item-id_portion pair", s))?;
    if item_id.is_empty() {
      return Err(format!("'{}' has an empty item id", s));
    }
    Ok(Self {
      item_id: item_id.to_string(),
      portion: portion.parse()?,
    })
  }
}

/// One order-in-progress line.
///
/// Present in a cart only while its quantity is at least 1; reaching 0
/// removes the line instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
  pub key: LineKey,
  /// Base item name, suffixed with " (Half)" for the half portion.
  pub name: String,
  /// Resolved at add time, in minor currency units.
  pub unit_price: u32,
  pub quantity: u32,
}

impl CartLine {
  pub fn line_total(&self) -> u64 {
    u64::from(self.unit_price) * u64::from(self.quantity)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_line_key_display_round_trip() {
    let key = LineKey::new("7", Portion::Half);
    assert_eq!(key.to_string(), "7_half");
    assert_eq!("7_half".parse::<LineKey>().unwrap(), key);
  }

  #[test]
  fn test_line_key_parse_keeps_underscored_ids() {
    let key: LineKey = "paneer_tikka_full".parse().unwrap();
    assert_eq!(key.item_id, "paneer_tikka");
    assert_eq!(key.portion, Portion::Full);
  }

  #[test]
  fn test_line_key_parse_rejects_garbage() {
    assert!("7".parse::<LineKey>().is_err());
    assert!("7_double".parse::<LineKey>().is_err());
    assert!("_half".parse::<LineKey>().is_err());
  }

  #[test]
  fn test_portion_defaults_to_full() {
    assert_eq!(Portion::default(), Portion::Full);
  }
}
