//! The cart itself: desired quantities keyed by item and portion.

use crate::menu::MenuItem;

use super::line::{CartLine, LineKey, Portion};

/// Order-in-progress state for one session.
///
/// Lines keep insertion order for display. All operations are synchronous
/// and run to completion before the next call is observed; there is no
/// concurrent use within a session.
#[derive(Debug, Clone, Default)]
pub struct Cart {
  lines: Vec<CartLine>,
}

impl Cart {
  pub fn new() -> Self {
    Self::default()
  }

  /// Rebuild a cart from persisted lines. Zero-quantity lines are dropped so
  /// the "present implies quantity >= 1" invariant holds regardless of what
  /// was on disk.
  pub fn from_lines(lines: Vec<CartLine>) -> Self {
    Self {
      lines: lines.into_iter().filter(|l| l.quantity > 0).collect(),
    }
  }

  /// Add one unit of an item in the given portion.
  ///
  /// The unit price is resolved here: the half price when the half portion is
  /// selected and the item defines one, the full price otherwise. Whether the
  /// item is currently orderable is the caller's concern.
  pub fn add_item(&mut self, item: &MenuItem, portion: Portion) {
    let key = LineKey::new(item.id.clone(), portion);

    if let Some(line) = self.lines.iter_mut().find(|l| l.key == key) {
      line.quantity += 1;
      return;
    }

    let unit_price = match portion {
      Portion::Half => item.half_price.unwrap_or(item.full_price),
      Portion::Full => item.full_price,
    };
    let name = match portion {
      Portion::Half => format!("{} (Half)", item.name),
      Portion::Full => item.name.clone(),
    };

    self.lines.push(CartLine {
      key,
      name,
      unit_price,
      quantity: 1,
    });
  }

  /// Adjust a line's quantity by `delta`. Reaching zero or below removes the
  /// line. An unknown key is a no-op, not an error: quantity controls may
  /// fire after the line was already removed by a decrement to zero. A
  /// positive delta on a missing line deliberately does not create one;
  /// creation goes through [`Cart::add_item`].
  pub fn update_quantity(&mut self, key: &LineKey, delta: i64) {
    let Some(index) = self.lines.iter().position(|l| l.key == *key) else {
      return;
    };

    let next = i64::from(self.lines[index].quantity) + delta;
    if next <= 0 {
      self.lines.remove(index);
    } else {
      // Saturate rather than wrap on absurd deltas.
      self.lines[index].quantity = u32::try_from(next).unwrap_or(u32::MAX);
    }
  }

  /// Quantity currently in the cart for an item/portion pair, 0 when absent.
  pub fn quantity(&self, item_id: &str, portion: Portion) -> u32 {
    self
      .lines
      .iter()
      .find(|l| l.key.item_id == item_id && l.key.portion == portion)
      .map(|l| l.quantity)
      .unwrap_or(0)
  }

  /// Remove a line outright. No-op when absent.
  pub fn remove_line(&mut self, key: &LineKey) {
    self.lines.retain(|l| l.key != *key);
  }

  pub fn total_price(&self) -> u64 {
    self.lines.iter().map(|l| l.line_total()).sum()
  }

  pub fn lines(&self) -> &[CartLine] {
    &self.lines
  }

  pub fn is_empty(&self) -> bool {
    self.lines.is_empty()
  }

  pub fn clear(&mut self) {
    self.lines.clear();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn item(id: &str, full: u32, half: Option<u32>) -> MenuItem {
    MenuItem {
      id: id.to_string(),
      name: format!("Item {}", id),
      description: String::new(),
      category: "Mains".to_string(),
      full_price: full,
      half_price: half,
      image: None,
      available: true,
    }
  }

  #[test]
  fn test_add_same_half_portion_twice_merges() {
    let mut cart = Cart::new();
    let paneer = item("A", 200, Some(120));

    cart.add_item(&paneer, Portion::Half);
    cart.add_item(&paneer, Portion::Half);

    assert_eq!(cart.lines().len(), 1);
    let line = &cart.lines()[0];
    assert_eq!(line.quantity, 2);
    assert_eq!(line.unit_price, 120);
    assert_eq!(line.name, "Item A (Half)");
  }

  #[test]
  fn test_full_and_half_are_distinct_lines() {
    let mut cart = Cart::new();
    let paneer = item("A", 200, Some(120));

    cart.add_item(&paneer, Portion::Full);
    cart.add_item(&paneer, Portion::Half);

    assert_eq!(cart.lines().len(), 2);
    assert_eq!(cart.quantity("A", Portion::Full), 1);
    assert_eq!(cart.quantity("A", Portion::Half), 1);

    // Independent quantities
    cart.update_quantity(&LineKey::new("A", Portion::Half), 2);
    assert_eq!(cart.quantity("A", Portion::Full), 1);
    assert_eq!(cart.quantity("A", Portion::Half), 3);
  }

  #[test]
  fn test_half_without_half_price_falls_back_to_full() {
    let mut cart = Cart::new();
    cart.add_item(&item("B", 150, None), Portion::Half);
    assert_eq!(cart.lines()[0].unit_price, 150);
  }

  #[test]
  fn test_decrement_to_zero_removes_line() {
    let mut cart = Cart::new();
    cart.add_item(&item("A", 200, None), Portion::Full);
    cart.add_item(&item("A", 200, None), Portion::Full);

    let key = LineKey::new("A", Portion::Full);
    cart.update_quantity(&key, -2);

    // Absent entirely, not present with zero
    assert_eq!(cart.quantity("A", Portion::Full), 0);
    assert!(cart.lines().iter().all(|l| l.key != key));
    assert!(cart.is_empty());
  }

  #[test]
  fn test_no_line_ever_holds_zero_quantity() {
    let mut cart = Cart::new();
    cart.add_item(&item("A", 200, Some(120)), Portion::Half);
    cart.add_item(&item("B", 150, None), Portion::Full);

    cart.update_quantity(&LineKey::new("A", Portion::Half), -5);
    cart.update_quantity(&LineKey::new("B", Portion::Full), -1);

    assert!(cart.lines().iter().all(|l| l.quantity >= 1));
    assert!(cart.is_empty());
  }

  #[test]
  fn test_update_unknown_key_is_noop() {
    let mut cart = Cart::new();
    cart.add_item(&item("A", 200, None), Portion::Full);

    // Neither negative nor positive deltas touch a missing line
    cart.update_quantity(&LineKey::new("Z", Portion::Full), -1);
    cart.update_quantity(&LineKey::new("Z", Portion::Full), 3);

    assert_eq!(cart.lines().len(), 1);
    assert_eq!(cart.quantity("Z", Portion::Full), 0);
  }

  #[test]
  fn test_oversized_delta_saturates_quantity() {
    let mut cart = Cart::new();
    cart.add_item(&item("A", 200, None), Portion::Full);

    let key = LineKey::new("A", Portion::Full);
    cart.update_quantity(&key, i64::from(u32::MAX) + 5);

    // Saturated, not wrapped back to a small quantity
    assert_eq!(cart.quantity("A", Portion::Full), u32::MAX);
  }

  #[test]
  fn test_remove_line_unconditional() {
    let mut cart = Cart::new();
    cart.add_item(&item("A", 200, None), Portion::Full);
    cart.add_item(&item("A", 200, None), Portion::Full);

    cart.remove_line(&LineKey::new("A", Portion::Full));
    assert!(cart.is_empty());

    // Absent key: no-op
    cart.remove_line(&LineKey::new("A", Portion::Full));
    assert!(cart.is_empty());
  }

  #[test]
  fn test_item_seven_scenario() {
    let mut cart = Cart::new();
    let item7 = item("7", 200, Some(120));

    cart.add_item(&item7, Portion::Half);
    assert_eq!(cart.quantity("7", Portion::Half), 1);
    assert_eq!(cart.lines()[0].unit_price, 120);

    let key = LineKey::new("7", Portion::Half);
    cart.update_quantity(&key, 1);
    assert_eq!(cart.quantity("7", Portion::Half), 2);
    assert_eq!(cart.total_price(), 240);

    cart.update_quantity(&key, -2);
    assert_eq!(cart.quantity("7", Portion::Half), 0);
    assert!(cart.is_empty());
    assert_eq!(cart.total_price(), 0);
  }

  #[test]
  fn test_from_lines_drops_zero_quantity() {
    let lines = vec![
      CartLine {
        key: LineKey::new("A", Portion::Full),
        name: "Item A".to_string(),
        unit_price: 200,
        quantity: 0,
      },
      CartLine {
        key: LineKey::new("B", Portion::Full),
        name: "Item B".to_string(),
        unit_price: 150,
        quantity: 2,
      },
    ];

    let cart = Cart::from_lines(lines);
    assert_eq!(cart.lines().len(), 1);
    assert_eq!(cart.quantity("B", Portion::Full), 2);
  }
}
