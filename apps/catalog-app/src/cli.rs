//! # Command Line Front End
//!
//! ```text
//! catalog [--config FILE] [--json] <COMMAND>
//!
//!   login --username U [--password P]     start a session
//!   logout                                end it
//!   whoami                                show it
//!   products list [filters] [--sort F] [--order asc|desc] [--page N]
//!   products show <ID>
//!   products add --name N --price P --stock S --brand B [...]
//!   products edit <ID> [--name N] [--price P] ... [--clear-description]
//!   products delete <ID>
//!   products brands
//!   users add --username U --email E --password P --confirm-password P
//!   users list
//!   browse                                interactive list with live search
//! ```
//!
//! Results go to stdout (tables, or JSON with `--json`); logs go to stderr.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};

use catalog_core::pipeline::{FilterCriteria, SortField, SortOrder, SortSpec, StatusFilter, StockFilter};
use catalog_core::validation::{validate_search_query, AccountForm, ProductForm};
use catalog_core::{Money, ProductStatus, ValidationError};

use crate::commands::{self, PageDto, ProductChanges, ProductDto, SessionDto, UserDto};
use crate::error::{ApiError, ApiResult};
use crate::state::{CatalogView, SearchDebouncer};
use crate::App;

/// Product catalog manager
#[derive(Parser, Debug)]
#[command(name = "catalog")]
#[command(version, about = "Manage a product catalog", long_about = None)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true, env = "CATALOG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and remember the session
    Login {
        #[arg(long)]
        username: String,
        /// Read from stdin when omitted
        #[arg(long, env = "CATALOG_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Product management
    Products {
        #[command(subcommand)]
        command: ProductCommand,
    },
    /// User management
    Users {
        #[command(subcommand)]
        command: UserCommand,
    },
    /// Interactive product list with debounced search
    Browse,
}

#[derive(Subcommand, Debug)]
pub enum ProductCommand {
    /// Filter, sort and page through products
    List(ListArgs),
    /// Show one product
    Show { id: String },
    /// Add a product
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        price: String,
        #[arg(long)]
        stock: String,
        #[arg(long)]
        brand: String,
        #[arg(long, default_value = "Active")]
        status: ProductStatus,
    },
    /// Change some fields of a product
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,
        #[arg(long)]
        clear_description: bool,
        #[arg(long)]
        price: Option<String>,
        #[arg(long)]
        stock: Option<String>,
        #[arg(long)]
        brand: Option<String>,
        #[arg(long)]
        status: Option<ProductStatus>,
    },
    /// Delete a product
    Delete { id: String },
    /// Distinct brands, for filtering
    Brands,
}

#[derive(clap::Args, Debug, Default)]
pub struct ListArgs {
    /// Matches name, description or brand (any case)
    #[arg(long, default_value = "", value_parser = validate_search_query)]
    pub search: String,
    /// Repeat to select several brands
    #[arg(long = "brand")]
    pub brands: Vec<String>,
    /// all, active or inactive
    #[arg(long, default_value = "all")]
    pub status: StatusFilter,
    #[arg(long)]
    pub min_price: Option<Money>,
    #[arg(long)]
    pub max_price: Option<Money>,
    /// all, low, in-stock or out-of-stock
    #[arg(long, default_value = "all")]
    pub stock: StockFilter,
    /// name, price, stock or createdAt
    #[arg(long, default_value = "createdAt")]
    pub sort: SortField,
    /// asc or desc
    #[arg(long, default_value = "desc")]
    pub order: SortOrder,
    #[arg(long, default_value_t = 1)]
    pub page: usize,
    /// Defaults to the configured page size
    #[arg(long)]
    pub page_size: Option<usize>,
}

impl ListArgs {
    fn into_view(self, default_page_size: usize) -> CatalogView {
        let mut criteria = FilterCriteria::default()
            .with_search(self.search)
            .with_status(self.status)
            .with_price_range(self.min_price, self.max_price)
            .with_stock_level(self.stock);
        for brand in self.brands {
            criteria = criteria.with_brand(brand);
        }

        let mut view = CatalogView::new(self.page_size.unwrap_or(default_page_size));
        view.set_criteria(criteria);
        view.set_sort(SortSpec::new(self.sort, self.order));
        view.set_page(self.page);
        view
    }
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Create a user
    Add {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
    /// List users, newest first
    List,
}

/// Runs one parsed command against the app.
pub async fn execute(app: &App, command: Command, json: bool) -> ApiResult<()> {
    let out = Output { json };

    match command {
        Command::Login { username, password } => {
            let password = match password {
                Some(p) => p,
                None => read_line("Password: ").await?,
            };
            let user = commands::login(&app.auth, &username, &password).await?;
            out.emit(&user, || println!("Logged in as {}", user.username))
        }
        Command::Logout => {
            commands::logout(&app.auth)?;
            out.emit(&serde_json::json!({ "loggedOut": true }), || println!("Logged out"))
        }
        Command::Whoami => {
            let session = commands::whoami(&app.auth);
            out.emit(&session, || match &session {
                Some(s) => print_session(s),
                None => println!("Not logged in"),
            })
        }
        Command::Products { command } => {
            commands::ensure_logged_in(&app.auth, app.config.require_login)?;
            commands::load_products(&app.catalog).await?;
            products(app, command, &out).await
        }
        Command::Users { command } => users(app, command, &out).await,
        Command::Browse => {
            commands::ensure_logged_in(&app.auth, app.config.require_login)?;
            browse(app).await
        }
    }
}

async fn products(app: &App, command: ProductCommand, out: &Output) -> ApiResult<()> {
    let catalog = &app.catalog;

    match command {
        ProductCommand::List(args) => {
            let view = args.into_view(app.config.page_size);
            let page = commands::list_products(catalog, &view);
            out.emit(&page, || print_page(&page))
        }
        ProductCommand::Show { id } => {
            let product = commands::get_product(catalog, &id)?;
            out.emit(&product, || print_product(&product))
        }
        ProductCommand::Add {
            name,
            description,
            price,
            stock,
            brand,
            status,
        } => {
            let form = ProductForm {
                name,
                description,
                price,
                brand,
                status,
                stock,
            };
            let product = commands::add_product(catalog, &form).await?;
            out.emit(&product, || println!("Added {} ({})", product.name, product.id))
        }
        ProductCommand::Edit {
            id,
            name,
            description,
            clear_description,
            price,
            stock,
            brand,
            status,
        } => {
            let changes = ProductChanges {
                name,
                description,
                clear_description,
                price,
                brand,
                status,
                stock,
            };
            let product = commands::edit_product(catalog, &id, changes).await?;
            out.emit(&product, || println!("Updated {} ({})", product.name, product.id))
        }
        ProductCommand::Delete { id } => {
            commands::delete_product(catalog, &id).await?;
            out.emit(&serde_json::json!({ "deleted": id }), || println!("Deleted {}", id))
        }
        ProductCommand::Brands => {
            let brands = commands::list_brands(catalog);
            out.emit(&brands, || brands.iter().for_each(|b| println!("{}", b)))
        }
    }
}

async fn users(app: &App, command: UserCommand, out: &Output) -> ApiResult<()> {
    let repo = app.db.users();

    match command {
        UserCommand::Add {
            username,
            email,
            password,
            confirm_password,
        } => {
            let form = AccountForm {
                username,
                email,
                password,
                confirm_password,
            };
            let user = commands::create_user(&repo, &form, app.config.password_scheme).await?;
            out.emit(&user, || println!("Created user {}", user.username))
        }
        UserCommand::List => {
            commands::ensure_logged_in(&app.auth, app.config.require_login)?;
            let users = commands::list_users(&repo).await?;
            out.emit(&users, || users.iter().for_each(print_user))
        }
    }
}

// =============================================================================
// Interactive Browser
// =============================================================================

/// One line typed in `browse`.
#[derive(Debug, Clone, PartialEq)]
pub enum BrowseInput {
    Search(String),
    Next,
    Previous,
    Page(usize),
    PageSize(usize),
    Sort(SortField),
    Brand(String),
    Status(StatusFilter),
    Stock(StockFilter),
    Price(Option<Money>, Option<Money>),
    Clear,
    Help,
    Quit,
}

impl BrowseInput {
    /// Lines starting with `:` are commands, anything else is search text.
    pub fn parse(line: &str) -> Result<BrowseInput, ValidationError> {
        let Some(command) = line.trim().strip_prefix(':') else {
            return validate_search_query(line).map(BrowseInput::Search);
        };

        let mut words = command.split_whitespace();
        let name = words.next().unwrap_or("");
        let rest: Vec<&str> = words.collect();
        let arg = rest.join(" ");

        match name {
            "q" | "quit" => Ok(BrowseInput::Quit),
            "n" | "next" => Ok(BrowseInput::Next),
            "p" | "prev" => Ok(BrowseInput::Previous),
            "page" => parse_count("page", &arg).map(BrowseInput::Page),
            "size" => parse_count("page size", &arg).map(BrowseInput::PageSize),
            "sort" => arg.parse().map(BrowseInput::Sort),
            "brand" => Ok(BrowseInput::Brand(arg)),
            "status" => arg.parse().map(BrowseInput::Status),
            "stock" => arg.parse().map(BrowseInput::Stock),
            "price" => {
                let bound = |s: Option<&&str>| -> Result<Option<Money>, ValidationError> {
                    match s {
                        None | Some(&"-") => Ok(None),
                        Some(v) => v.parse().map(Some),
                    }
                };
                Ok(BrowseInput::Price(bound(rest.first())?, bound(rest.get(1))?))
            }
            "clear" => Ok(BrowseInput::Clear),
            "" | "h" | "help" => Ok(BrowseInput::Help),
            other => Err(ValidationError::NotAllowed {
                field: format!("command :{}", other),
                allowed: [
                    "next", "prev", "page", "size", "sort", "brand", "status", "stock", "price",
                    "clear", "help", "quit",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            }),
        }
    }

    /// Applies the input to `view`. Search text is handled by the caller.
    fn apply(self, view: &mut CatalogView, total_pages: usize) {
        match self {
            BrowseInput::Next => view.next_page(total_pages),
            BrowseInput::Previous => view.previous_page(),
            BrowseInput::Page(page) => view.set_page(page),
            BrowseInput::PageSize(size) => view.set_page_size(size),
            BrowseInput::Sort(field) => view.sort_by(field),
            BrowseInput::Brand(brand) => view.toggle_brand(&brand),
            BrowseInput::Status(status) => view.set_status(status),
            BrowseInput::Stock(level) => view.set_stock_level(level),
            BrowseInput::Price(min, max) => view.set_price_range(min, max),
            BrowseInput::Clear => view.clear_filters(),
            BrowseInput::Search(_) | BrowseInput::Help | BrowseInput::Quit => {}
        }
    }
}

fn parse_count(field: &str, arg: &str) -> Result<usize, ValidationError> {
    arg.trim()
        .parse::<usize>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a positive whole number".to_string(),
        })
}

/// Loads the catalog and renders the first page with default settings.
async fn open_browser(app: &App) -> ApiResult<(CatalogView, PageDto)> {
    commands::load_products(&app.catalog).await?;
    let view = CatalogView::new(app.config.page_size);
    let page = commands::list_products(&app.catalog, &view);
    Ok((view, page))
}

/// Reads stdin line by line; plain text is debounced into the search box.
async fn browse(app: &App) -> ApiResult<()> {
    let (mut view, mut page) = open_browser(app).await?;
    let debouncer = SearchDebouncer::new(Duration::from_millis(app.config.search_debounce_ms));
    let mut settled = debouncer.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print_page(&page);
    print_browse_help();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => return Err(ApiError::internal(format!("Could not read input: {}", e))),
                };

                match BrowseInput::parse(&line) {
                    Ok(BrowseInput::Quit) => break,
                    Ok(BrowseInput::Help) => print_browse_help(),
                    Ok(BrowseInput::Search(text)) => debouncer.set(text),
                    Ok(input) => {
                        input.apply(&mut view, page.total_pages);
                        page = commands::list_products(&app.catalog, &view);
                        print_page(&page);
                    }
                    Err(e) => println!("{}", e),
                }
            }
            changed = settled.changed() => {
                if changed.is_err() {
                    break;
                }
                let search = settled.borrow_and_update().clone();
                view.set_search(search);
                page = commands::list_products(&app.catalog, &view);
                print_page(&page);
            }
        }
    }

    Ok(())
}

async fn read_line(prompt: &str) -> ApiResult<String> {
    eprint!("{}", prompt);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    match lines.next_line().await {
        Ok(line) => Ok(line.unwrap_or_default()),
        Err(e) => Err(ApiError::internal(format!("Could not read input: {}", e))),
    }
}

// =============================================================================
// Output
// =============================================================================

struct Output {
    json: bool,
}

impl Output {
    /// Prints `value` as JSON, or runs `human` to print it for people.
    fn emit<T: Serialize>(&self, value: &T, human: impl FnOnce()) -> ApiResult<()> {
        if self.json {
            let text = serde_json::to_string_pretty(value)
                .map_err(|e| ApiError::internal(format!("Could not encode output: {}", e)))?;
            println!("{}", text);
        } else {
            human();
        }
        Ok(())
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let cut: String = text.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

fn print_page(page: &PageDto) {
    println!(
        "{:<36}  {:<30}  {:>10}  {:<16}  {:<8}  {}",
        "ID", "NAME", "PRICE", "BRAND", "STATUS", "STOCK"
    );
    for p in &page.items {
        println!(
            "{:<36}  {:<30}  {:>10}  {:<16}  {:<8}  {}",
            p.id,
            truncate(&p.name, 30),
            p.price,
            truncate(&p.brand, 16),
            p.status.as_str(),
            p.stock_label
        );
    }
    if page.total_items == 0 {
        println!("No products match the current filters.");
    }
    println!(
        "Page {} of {} ({} products, {} filters active)",
        page.page,
        page.total_pages.max(1),
        page.total_items,
        page.active_filters
    );
}

fn print_product(p: &ProductDto) {
    println!("ID:          {}", p.id);
    println!("Name:        {}", p.name);
    println!("Description: {}", p.description.as_deref().unwrap_or("-"));
    println!("Price:       {}", p.price);
    println!("Brand:       {}", p.brand);
    println!("Status:      {}", p.status);
    println!("Stock:       {}", p.stock_label);
    println!("Value:       {}", p.inventory_value);
    println!("Created:     {}", p.created_at.format("%Y-%m-%d %H:%M"));
    println!("Updated:     {}", p.updated_at.format("%Y-%m-%d %H:%M"));
}

fn print_session(s: &SessionDto) {
    println!(
        "{} <{}>, logged in since {}",
        s.user.username,
        s.user.email,
        s.started_at.format("%Y-%m-%d %H:%M")
    );
}

fn print_user(u: &UserDto) {
    println!(
        "{:<36}  {:<20}  {:<30}  {}",
        u.id,
        u.username,
        u.email,
        u.created_at.format("%Y-%m-%d")
    );
}

fn print_browse_help() {
    println!("Type to search. Commands:");
    println!("  :next  :prev  :page N  :size N  :sort name|price|stock|createdAt");
    println!("  :brand NAME  :status all|active|inactive  :stock all|low|in-stock|out-of-stock");
    println!("  :price MIN MAX (use - for none)  :clear  :help  :quit");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_list_arguments() {
        let cli = Cli::try_parse_from([
            "catalog", "products", "list", "--search", "pro", "--brand", "Electronics", "--brand",
            "Books", "--status", "active", "--min-price", "10", "--stock", "in-stock", "--sort",
            "price", "--order", "asc", "--page", "2",
        ])
        .unwrap();

        let Command::Products {
            command: ProductCommand::List(args),
        } = cli.command
        else {
            panic!("expected products list");
        };

        let view = args.into_view(12);
        assert_eq!(view.criteria().search, "pro");
        assert_eq!(view.criteria().brands.len(), 2);
        assert_eq!(view.criteria().status, StatusFilter::Active);
        assert_eq!(view.criteria().price_min, Some(Money::from_major(10)));
        assert_eq!(view.criteria().stock_level, StockFilter::InStock);
        assert_eq!(view.sort(), SortSpec::new(SortField::Price, SortOrder::Asc));
        assert_eq!(view.page(), 2);
        assert_eq!(view.page_size(), 12);
    }

    #[test]
    fn test_bad_filter_value_is_rejected() {
        assert!(Cli::try_parse_from(["catalog", "products", "list", "--stock", "plenty"]).is_err());
        assert!(Cli::try_parse_from(["catalog", "products", "list", "--min-price", "1.999"]).is_err());
    }

    #[test]
    fn test_edit_flags_conflict() {
        let result = Cli::try_parse_from([
            "catalog",
            "products",
            "edit",
            "p-1",
            "--description",
            "x",
            "--clear-description",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_browse_input() {
        assert_eq!(
            BrowseInput::parse("  iphone ").unwrap(),
            BrowseInput::Search("  iphone ".to_string())
        );
        assert_eq!(BrowseInput::parse(":q").unwrap(), BrowseInput::Quit);
        assert_eq!(BrowseInput::parse(":page 3").unwrap(), BrowseInput::Page(3));
        assert_eq!(
            BrowseInput::parse(":sort price").unwrap(),
            BrowseInput::Sort(SortField::Price)
        );
        assert_eq!(
            BrowseInput::parse(":brand Home & Garden").unwrap(),
            BrowseInput::Brand("Home & Garden".to_string())
        );
        assert_eq!(
            BrowseInput::parse(":price - 100").unwrap(),
            BrowseInput::Price(None, Some(Money::from_major(100)))
        );
        assert!(BrowseInput::parse(":page 0").is_err());
        assert!(BrowseInput::parse(":stock lots").is_err());
        assert!(BrowseInput::parse(":dance").is_err());
        assert!(BrowseInput::parse(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_browse_input_updates_view() {
        let mut view = CatalogView::new(6);
        view.set_page(3);

        BrowseInput::Next.apply(&mut view, 3);
        assert_eq!(view.page(), 3);

        BrowseInput::Stock(StockFilter::Low).apply(&mut view, 3);
        assert_eq!(view.page(), 1);

        BrowseInput::Sort(SortField::Name).apply(&mut view, 3);
        BrowseInput::Sort(SortField::Name).apply(&mut view, 3);
        assert_eq!(view.sort(), SortSpec::new(SortField::Name, SortOrder::Desc));
    }

    #[tokio::test]
    async fn test_browser_opens_on_loaded_catalog() {
        use std::sync::Arc;

        use catalog_db::{Database, DbConfig};

        use crate::config::{AppConfig, Backend};
        use crate::state::MemoryStore;

        let config = AppConfig {
            backend: Backend::Local,
            page_size: 12,
            ..AppConfig::default()
        };
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let app = App::assemble(config, db, Arc::new(MemoryStore::new())).unwrap();

        let (view, page) = open_browser(&app).await.unwrap();
        assert_eq!(view.page(), 1);
        assert_eq!(page.total_items, 22);
        assert_eq!(page.items.len(), 12);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long product name", 8), "a very …");
    }
}
