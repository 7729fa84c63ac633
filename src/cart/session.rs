//! Cart persistence between invocations.

use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::line::CartLine;
use super::reconciler::Cart;

fn default_true() -> bool {
  true
}

/// Session state saved to disk: the cart lines plus the ordering-window flag
/// the cart layer consults before accepting additions.
#[derive(Debug, Serialize, Deserialize)]
pub struct Session {
  #[serde(default)]
  pub lines: Vec<CartLine>,
  /// Whether the restaurant is currently accepting orders.
  #[serde(default = "default_true")]
  pub ordering_open: bool,
}

impl Default for Session {
  fn default() -> Self {
    Self {
      lines: Vec::new(),
      ordering_open: true,
    }
  }
}

impl Session {
  /// Default session file location.
  pub fn default_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("dhaba").join("cart.json"))
  }

  /// Load the session, treating a missing file as an empty session.
  pub fn load(path: &Path) -> Result<Self> {
    if !path.exists() {
      return Ok(Self::default());
    }

    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read cart session {}: {}", path.display(), e))?;

    serde_json::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse cart session {}: {}", path.display(), e))
  }

  pub fn save(&self, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create session directory: {}", e))?;
    }

    let contents = serde_json::to_string_pretty(self)
      .map_err(|e| eyre!("Failed to serialize cart session: {}", e))?;

    std::fs::write(path, contents)
      .map_err(|e| eyre!("Failed to write cart session {}: {}", path.display(), e))
  }

  pub fn cart(&self) -> Cart {
    Cart::from_lines(self.lines.clone())
  }

  pub fn set_cart(&mut self, cart: &Cart) {
    self.lines = cart.lines().to_vec();
  }
}
