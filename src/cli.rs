use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dhaba")]
#[command(about = "An offline-capable restaurant menu and ordering client")]
#[command(version)]
pub struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/dhaba/config.yaml)
  #[arg(short, long)]
  pub config: Option<PathBuf>,

  #[command(subcommand)]
  pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Browse the menu (available items only unless --all)
  Menu {
    /// Include unavailable items (admin view)
    #[arg(long)]
    all: bool,
  },

  /// List categories
  Categories {
    /// Print active category names only
    #[arg(long)]
    names: bool,
  },

  /// Manage menu items
  #[command(subcommand)]
  Item(ItemCommand),

  /// Manage categories
  #[command(subcommand)]
  Category(CategoryCommand),

  /// Upload an image to the media host and print its durable URL
  Upload { file: PathBuf },

  /// Manage the order in progress
  #[command(subcommand)]
  Cart(CartCommand),

  /// Start accepting orders
  Open,

  /// Stop accepting orders
  Close,
}

#[derive(Subcommand, Debug)]
pub enum ItemCommand {
  /// Create a menu item
  Add {
    name: String,
    #[arg(long)]
    category: String,
    /// Full-portion price in minor currency units
    #[arg(long)]
    full_price: u32,
    /// Half-portion price; omit when the dish has no half option
    #[arg(long)]
    half_price: Option<u32>,
    #[arg(long, default_value = "")]
    description: String,
    /// Durable image URL (see `dhaba upload`)
    #[arg(long)]
    image: Option<String>,
    /// Create the item hidden from customers
    #[arg(long)]
    unavailable: bool,
  },

  /// Update fields of a menu item
  Update {
    id: String,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    full_price: Option<u32>,
    #[arg(long)]
    half_price: Option<u32>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    image: Option<String>,
  },

  /// Delete a menu item
  Delete { id: String },

  /// Toggle whether customers can order an item
  Available {
    id: String,
    /// Mark unavailable instead
    #[arg(long)]
    off: bool,
  },
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommand {
  /// Create a category
  Add { name: String },

  /// Delete a category (refused while it still has items)
  Delete { id: String },

  /// Toggle whether a category shows on the customer menu
  Active {
    id: String,
    /// Hide the category instead
    #[arg(long)]
    off: bool,
  },
}

#[derive(Subcommand, Debug)]
pub enum CartCommand {
  /// Add one unit of an item to the cart
  Add {
    item_id: String,
    /// Add the half portion
    #[arg(long)]
    half: bool,
  },

  /// Adjust a line's quantity by a delta, e.g. `cart adjust 7_half -1`
  Adjust {
    /// Line id in `item_portion` form
    line: String,
    #[arg(allow_hyphen_values = true)]
    delta: i64,
  },

  /// Remove a line outright
  Remove {
    /// Line id in `item_portion` form
    line: String,
  },

  /// Show the cart and its total
  List,

  /// Empty the cart
  Clear,
}
