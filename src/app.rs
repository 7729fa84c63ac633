//! Command execution: wires the cache store, interceptor, and clients
//! together and runs one CLI command against them.

use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use url::Url;

use crate::cart::{Cart, LineKey, Portion, Session};
use crate::cli::{CartCommand, CategoryCommand, Command, ItemCommand};
use crate::config::Config;
use crate::fetch::{FetchInterceptor, SqliteStore};
use crate::menu::{MenuClient, MenuItem, MenuItemPatch, NewMenuItem, Uploader};

pub struct App {
  config: Config,
  client: MenuClient<SqliteStore>,
  interceptor: Arc<FetchInterceptor<SqliteStore>>,
  session_path: PathBuf,
}

impl App {
  pub fn new(config: Config) -> Result<Self> {
    let store = match &config.cache.path {
      Some(path) => SqliteStore::open_at(path)?,
      None => SqliteStore::open()?,
    };

    // One interceptor per process, handed to everything that talks to the
    // backend. Install and activate up front so stale generations are gone
    // before the first request.
    let interceptor = Arc::new(FetchInterceptor::new(store, config.cache.version.clone()));
    interceptor.install();
    interceptor.activate();
    info!("fetch interceptor active (generation {})", interceptor.generation());

    let base: Url = config
      .backend
      .url
      .parse()
      .map_err(|e| eyre!("Invalid backend url {}: {}", config.backend.url, e))?;
    let client = MenuClient::new(Arc::clone(&interceptor), base)?;

    let session_path = Session::default_path()?;

    Ok(Self {
      config,
      client,
      interceptor,
      session_path,
    })
  }

  pub async fn run(&self, command: Command) -> Result<()> {
    let result = match command {
      Command::Menu { all } => self.show_menu(all).await,
      Command::Categories { names } => self.show_categories(names).await,
      Command::Item(command) => self.run_item(command).await,
      Command::Category(command) => self.run_category(command).await,
      Command::Upload { file } => self.upload(&file).await,
      Command::Cart(command) => self.run_cart(command).await,
      Command::Open => self.set_ordering_open(true),
      Command::Close => self.set_ordering_open(false),
    };

    // One-shot process: let in-flight cache writes land before main returns
    // and the runtime tears them down.
    self.interceptor.drain().await;

    result
  }

  async fn show_menu(&self, all: bool) -> Result<()> {
    let items = if all {
      self.client.menu_items().await?
    } else {
      self.client.available_items().await?
    };

    if let Some(title) = &self.config.title {
      println!("{}", title);
    }
    if items.is_empty() {
      println!("No items available at the moment");
      return Ok(());
    }

    for item in items {
      print_item(&item);
    }
    Ok(())
  }

  async fn show_categories(&self, names: bool) -> Result<()> {
    if names {
      for name in self.client.category_names().await? {
        println!("{}", name);
      }
      return Ok(());
    }

    for category in self.client.categories().await? {
      let state = if category.active { "active" } else { "hidden" };
      println!("{:<12} {:<24} {}", category.id, category.name, state);
    }
    Ok(())
  }

  async fn run_item(&self, command: ItemCommand) -> Result<()> {
    match command {
      ItemCommand::Add {
        name,
        category,
        full_price,
        half_price,
        description,
        image,
        unavailable,
      } => {
        let item = self
          .client
          .create_item(&NewMenuItem {
            name,
            description,
            category,
            full_price,
            half_price,
            image,
            available: !unavailable,
          })
          .await?;
        println!("Created item {}", item.id);
      }
      ItemCommand::Update {
        id,
        name,
        category,
        full_price,
        half_price,
        description,
        image,
      } => {
        let item = self
          .client
          .update_item(
            &id,
            &MenuItemPatch {
              name,
              description,
              category,
              full_price,
              half_price,
              image,
              available: None,
            },
          )
          .await?;
        println!("Updated item {}", item.id);
      }
      ItemCommand::Delete { id } => {
        self.client.delete_item(&id).await?;
        println!("Deleted item {}", id);
      }
      ItemCommand::Available { id, off } => {
        let item = self.client.set_item_available(&id, !off).await?;
        let state = if item.available {
          "available"
        } else {
          "unavailable"
        };
        println!("Item {} is now {}", item.id, state);
      }
    }
    Ok(())
  }

  async fn run_category(&self, command: CategoryCommand) -> Result<()> {
    match command {
      CategoryCommand::Add { name } => {
        let category = self.client.create_category(&name).await?;
        println!("Created category {}", category.id);
      }
      CategoryCommand::Delete { id } => {
        self.client.delete_category(&id).await?;
        println!("Deleted category {}", id);
      }
      CategoryCommand::Active { id, off } => {
        let category = self.client.set_category_active(&id, !off).await?;
        let state = if category.active { "active" } else { "hidden" };
        println!("Category {} is now {}", category.name, state);
      }
    }
    Ok(())
  }

  async fn upload(&self, file: &std::path::Path) -> Result<()> {
    let upload = self
      .config
      .upload
      .as_ref()
      .ok_or_else(|| eyre!("No upload section in config; set upload.url and upload.preset"))?;

    let endpoint: Url = upload
      .url
      .parse()
      .map_err(|e| eyre!("Invalid upload url {}: {}", upload.url, e))?;

    let uploader = Uploader::new(endpoint, upload.preset.clone());
    let url = uploader
      .upload(file, |sent, total| {
        if total > 0 {
          eprint!("\rUploading... {}%", sent * 100 / total);
        }
      })
      .await?;
    eprintln!();

    println!("{}", url);
    Ok(())
  }

  async fn run_cart(&self, command: CartCommand) -> Result<()> {
    let mut session = Session::load(&self.session_path)?;
    let mut cart = session.cart();

    match command {
      CartCommand::Add { item_id, half } => {
        if !session.ordering_open {
          return Err(eyre!(
            "Restaurant is temporarily closed. We are not accepting orders at the moment."
          ));
        }

        let portion = if half { Portion::Half } else { Portion::Full };
        let items = self.client.available_items().await?;
        let item = items
          .iter()
          .find(|i| i.id == item_id)
          .ok_or_else(|| eyre!("No available item with id {}", item_id))?;

        cart.add_item(item, portion);
        println!(
          "{} x{}",
          LineKey::new(item_id.clone(), portion),
          cart.quantity(&item_id, portion)
        );
      }
      CartCommand::Adjust { line, delta } => {
        let key: LineKey = line.parse().map_err(|e| eyre!("Invalid line id: {}", e))?;
        cart.update_quantity(&key, delta);
        println!("{} x{}", key, cart.quantity(&key.item_id, key.portion));
      }
      CartCommand::Remove { line } => {
        let key: LineKey = line.parse().map_err(|e| eyre!("Invalid line id: {}", e))?;
        cart.remove_line(&key);
        println!("Removed {}", key);
      }
      CartCommand::List => {
        print_cart(&cart);
      }
      CartCommand::Clear => {
        cart.clear();
        println!("Cart cleared");
      }
    }

    session.set_cart(&cart);
    session.save(&self.session_path)
  }

  fn set_ordering_open(&self, open: bool) -> Result<()> {
    let mut session = Session::load(&self.session_path)?;
    session.ordering_open = open;
    session.save(&self.session_path)?;

    if open {
      println!("Now accepting orders");
    } else {
      println!("Ordering is closed");
    }
    Ok(())
  }
}

fn print_item(item: &MenuItem) {
  let prices = match item.half_price {
    Some(half) => format!("full {:>5}  half {:>5}", item.full_price, half),
    None => format!("full {:>5}", item.full_price),
  };
  let state = if item.available { "" } else { "  [unavailable]" };
  println!(
    "{:<6} {:<28} {:<16} {}{}",
    item.id, item.name, item.category, prices, state
  );
}

fn print_cart(cart: &Cart) {
  if cart.is_empty() {
    println!("Cart is empty");
    return;
  }

  for line in cart.lines() {
    println!(
      "{:<12} {:<32} {:>3} x {:>5} = {:>6}",
      line.key,
      line.name,
      line.quantity,
      line.unit_price,
      line.line_total()
    );
  }
  println!("Total: {}", cart.total_price());
}
