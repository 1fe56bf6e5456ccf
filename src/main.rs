use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

use khata::config::{
    config_dir, global_config_file, load_config, load_global_config, resolve_output_dir, Config,
    CONFIG_TEMPLATE,
};
use khata::dashboard::{
    chart_rows, customer_balances, revenue_by_category, OrderStats, Overview, ProductStats,
    Receivables, Section,
};
use khata::error::Result;
use khata::format::{format_amount, format_balance, format_money};
use khata::ledger::{
    balance_before_sale, bill_number, build_ledger, BillData, EntryKind, StatementData,
};
use khata::model::{
    parse_date_time, parse_day, parse_order_item, BusinessInfo, Order, OrderStatus, OrderType,
    PaymentStatus,
};
use khata::pdf::{generate_bill_pdf, generate_statement_pdf};
use khata::session::Session;
use khata::store::{
    ExpensePatch, NewOrder, NewPayment, NewProduct, NewSale, ProductPatch, Store,
};

#[derive(Parser)]
#[command(name = "khata")]
#[command(version, about = "Shop book for sales, customer ledgers and expenses", long_about = None)]
struct Cli {
    /// Path to config directory (default: global pointer file or XDG config)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory, data store and the admin account
    Init {
        #[arg(long, default_value = "Admin")]
        admin_name: String,

        /// Phone number the admin logs in with
        #[arg(long, default_value = "admin")]
        admin_phone: String,

        #[arg(long, default_value = "admin")]
        admin_password: String,
    },

    /// Start a session
    Login {
        #[arg(long)]
        phone: String,

        #[arg(long)]
        password: String,
    },

    /// End the current session
    Logout,

    /// Show who is logged in
    Whoami,

    /// Change your own password
    Passwd {
        #[arg(long)]
        current: String,

        #[arg(long)]
        new: String,
    },

    /// Show config and record counts
    Status,

    /// Business details printed on statements and bills
    Business {
        #[command(subcommand)]
        action: BusinessCommand,
    },

    /// Manage product categories
    Category {
        #[command(subcommand)]
        action: CategoryCommand,
    },

    /// Manage the product catalog
    Product {
        #[command(subcommand)]
        action: ProductCommand,
    },

    /// Manage customers
    Customer {
        #[command(subcommand)]
        action: CustomerCommand,
    },

    /// Record and list sales
    Sale {
        #[command(subcommand)]
        action: SaleCommand,
    },

    /// Record and list customer payments
    Payment {
        #[command(subcommand)]
        action: PaymentCommand,
    },

    /// Place and track customer orders
    Order {
        #[command(subcommand)]
        action: OrderCommand,
    },

    /// Manage expenses
    Expense {
        #[command(subcommand)]
        action: ExpenseCommand,
    },

    /// Show a customer's ledger with running balance
    Ledger {
        /// Customer phone (default: your own)
        phone: Option<String>,
    },

    /// Generate a customer statement PDF
    Statement {
        /// Customer phone
        phone: String,

        /// First day of the statement (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Last day of the statement (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Custom output file path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Open generated PDF with system default viewer
        #[arg(long)]
        open: bool,
    },

    /// Generate the bill PDF of one sale
    Bill {
        /// Sale id from 'sale list'
        sale: u32,

        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long)]
        open: bool,
    },

    /// Admin dashboard
    Dashboard {
        #[arg(short, long, value_enum, default_value_t = Section::Overview)]
        section: Section,

        /// today, week, month, lastMonth, halfYear, year or all
        #[arg(short, long, default_value = "month")]
        window: String,
    },
}

#[derive(Subcommand)]
enum BusinessCommand {
    Show,
    Set {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        gstin: Option<String>,
    },
}

#[derive(Subcommand)]
enum CategoryCommand {
    Add {
        name: String,
        /// Default unit for products in this category
        #[arg(long, default_value = "piece")]
        unit: String,
    },
    List,
    Remove {
        name: String,
    },
}

#[derive(Subcommand)]
enum ProductCommand {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        category: String,
        #[arg(long, allow_hyphen_values = true)]
        price: f64,
        /// Defaults to the category unit
        #[arg(long)]
        unit: Option<String>,
        #[arg(long, default_value_t = 0)]
        stock: u32,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        featured: bool,
    },
    List {
        #[arg(long)]
        category: Option<String>,
        /// Only products that can be sold
        #[arg(long)]
        available: bool,
    },
    Show {
        id: u32,
    },
    Update {
        id: u32,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        price: Option<f64>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        unit: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        stock: Option<u32>,
        #[arg(long)]
        available: Option<bool>,
        #[arg(long)]
        featured: Option<bool>,
    },
    /// Add units to stock
    Restock {
        id: u32,
        quantity: u32,
    },
    Remove {
        id: u32,
    },
}

#[derive(Subcommand)]
enum CustomerCommand {
    /// Add a customer (initial password is the phone number)
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
    },
    /// List customers with their balance
    List,
    Remove {
        phone: String,
    },
    /// Show a customer's balance
    Balance {
        phone: String,
    },
}

#[derive(Subcommand)]
enum SaleCommand {
    /// Record a sale and decrement stock
    Add {
        #[arg(long)]
        product: u32,
        #[arg(long)]
        qty: u32,
        /// Customer phone (omit for walk-in sales)
        #[arg(long)]
        phone: Option<String>,
        /// Sale date (YYYY-MM-DD or YYYY-MM-DD HH:MM, default: now)
        #[arg(long)]
        date: Option<String>,
    },
    /// List sales, newest first
    List {
        #[arg(long)]
        phone: Option<String>,
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

#[derive(Subcommand)]
enum PaymentCommand {
    /// Record a payment received from a customer
    Add {
        #[arg(long)]
        phone: String,
        #[arg(long, allow_hyphen_values = true)]
        amount: f64,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },
    List {
        #[arg(long)]
        phone: Option<String>,
    },
}

#[derive(Subcommand)]
enum OrderCommand {
    /// Place an order and reserve its stock
    Add {
        /// PRODUCT_ID:QUANTITY, repeat for more lines
        #[arg(long = "item", required = true)]
        items: Vec<String>,
        /// Customer phone (admins only; customers order for themselves)
        #[arg(long)]
        phone: Option<String>,
        #[arg(long = "type", value_enum, default_value_t = OrderType::Takeaway)]
        order_type: OrderType,
        /// Required for delivery orders
        #[arg(long)]
        address: Option<String>,
        /// Special instructions
        #[arg(long)]
        note: Option<String>,
    },
    /// List orders, newest first
    List {
        #[arg(long, value_enum)]
        status: Option<OrderStatus>,
        #[arg(long)]
        phone: Option<String>,
    },
    Show {
        id: u32,
    },
    /// Move an order along or record its payment
    Status {
        id: u32,
        #[arg(long, value_enum)]
        status: Option<OrderStatus>,
        #[arg(long, value_enum)]
        payment: Option<PaymentStatus>,
    },
}

#[derive(Subcommand)]
enum ExpenseCommand {
    Add {
        #[arg(long)]
        description: String,
        #[arg(long, allow_hyphen_values = true)]
        amount: f64,
        #[arg(long)]
        date: Option<String>,
    },
    List,
    Update {
        id: u32,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        amount: Option<f64>,
        #[arg(long)]
        date: Option<String>,
    },
    Remove {
        id: u32,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    let configured_level = load_config(&cfg_dir).ok().and_then(|c| c.log.level);
    khata::logging::init(cli.verbose, configured_level.as_deref());

    match cli.command {
        Commands::Init {
            admin_name,
            admin_phone,
            admin_password,
        } => cmd_init(&cfg_dir, &admin_name, &admin_phone, &admin_password),
        Commands::Login { phone, password } => cmd_login(&cfg_dir, &phone, &password),
        Commands::Logout => cmd_logout(&cfg_dir),
        Commands::Whoami => cmd_whoami(&cfg_dir),
        Commands::Passwd { current, new } => cmd_passwd(&cfg_dir, &current, &new),
        Commands::Status => cmd_status(&cfg_dir),
        Commands::Business { action } => cmd_business(&cfg_dir, action),
        Commands::Category { action } => cmd_category(&cfg_dir, action),
        Commands::Product { action } => cmd_product(&cfg_dir, action),
        Commands::Customer { action } => cmd_customer(&cfg_dir, action),
        Commands::Sale { action } => cmd_sale(&cfg_dir, action),
        Commands::Payment { action } => cmd_payment(&cfg_dir, action),
        Commands::Order { action } => cmd_order(&cfg_dir, action),
        Commands::Expense { action } => cmd_expense(&cfg_dir, action),
        Commands::Ledger { phone } => cmd_ledger(&cfg_dir, phone),
        Commands::Statement {
            phone,
            from,
            to,
            output,
            open,
        } => cmd_statement(&cfg_dir, &phone, from, to, output, open),
        Commands::Bill { sale, output, open } => cmd_bill(&cfg_dir, sale, output, open),
        Commands::Dashboard { section, window } => cmd_dashboard(&cfg_dir, section, &window),
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn parse_optional_date_time(input: Option<String>) -> Result<Option<chrono::NaiveDateTime>> {
    input.as_deref().map(parse_date_time).transpose()
}

/// Open the store and require an admin session
fn admin_store(cfg_dir: &Path) -> Result<(Store, Session)> {
    let store = Store::open(cfg_dir)?;
    let session = Session::current(&store)?;
    session.require_admin()?;
    Ok((store, session))
}

/// Initialize config directory with template files
fn cmd_init(
    cfg_dir: &Path,
    admin_name: &str,
    admin_phone: &str,
    admin_password: &str,
) -> Result<()> {
    use std::fs;

    let store = Store::create(cfg_dir)?;
    fs::create_dir_all(cfg_dir.join("output"))?;
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;
    let admin = store.register_admin(admin_name, admin_phone, admin_password)?;

    println!("Initialized khata at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Edit your business details:  $EDITOR {}/business.toml",
        cfg_dir.display()
    );
    println!(
        "  2. Review settings:             $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!(
        "  3. Log in as admin:             khata login --phone {} --password <password>",
        admin.phone
    );
    println!();
    println!("Then add a category and your first product:");
    println!("  khata category add Kulfi --unit piece");
    println!("  khata product add --name \"Malai Kulfi\" --category Kulfi --price 40 --stock 100");

    Ok(())
}

fn cmd_login(cfg_dir: &Path, phone: &str, password: &str) -> Result<()> {
    let store = Store::open(cfg_dir)?;
    let session = Session::login(&store, phone, password)?;
    println!("Logged in as {} ({})", session.name, session.role);
    Ok(())
}

fn cmd_logout(cfg_dir: &Path) -> Result<()> {
    match Session::logout(cfg_dir)? {
        Some(session) => println!("Logged out {}", session.name),
        None => println!("No active session."),
    }
    Ok(())
}

fn cmd_whoami(cfg_dir: &Path) -> Result<()> {
    let store = Store::open(cfg_dir)?;
    let session = Session::current(&store)?;
    println!("{} ({}) - {}", session.name, session.phone, session.role);
    println!("  Since: {}", session.started.format("%Y-%m-%d %H:%M"));
    Ok(())
}

fn cmd_passwd(cfg_dir: &Path, current: &str, new: &str) -> Result<()> {
    let store = Store::open(cfg_dir)?;
    let session = Session::current(&store)?;
    store.change_password(&session, current, new)?;
    println!("Password changed for {}", session.phone);
    Ok(())
}

/// Show config location, session and record counts
fn cmd_status(cfg_dir: &Path) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let store = Store::open(cfg_dir)?;
    let business = store.business()?;

    println!("Shop Status");
    println!("{}", "-".repeat(50));

    let global_path = global_config_file();
    if load_global_config().config_dir.is_some() {
        println!("Global config:    {} (active)", global_path.display());
    }

    println!("Config directory: {}", cfg_dir.display());
    println!("Business:         {}", business.name);
    match Session::load(cfg_dir)? {
        Some(session) => println!("Logged in as:     {} ({})", session.name, session.role),
        None => println!("Logged in as:     nobody"),
    }
    println!("Customers:        {}", store.customers()?.len());
    println!("Products:         {}", store.products()?.len());
    println!("Sales:            {}", store.sales()?.len());
    println!("Orders:           {}", store.orders()?.len());
    println!("Payments:         {}", store.payments()?.len());
    println!("Expenses:         {}", store.expenses()?.len());
    println!("Currency:         {}", config.shop.currency);

    Ok(())
}

fn print_business(info: &BusinessInfo) {
    println!("{}", info.name);
    println!("  Address: {}", info.address);
    println!("  Phone:   {}", info.phone);
    if let Some(gstin) = &info.gstin {
        println!("  GSTIN:   {}", gstin);
    }
}

fn cmd_business(cfg_dir: &Path, action: BusinessCommand) -> Result<()> {
    match action {
        BusinessCommand::Show => {
            let store = Store::open(cfg_dir)?;
            print_business(&store.business()?);
        }
        BusinessCommand::Set {
            name,
            address,
            phone,
            gstin,
        } => {
            let (store, session) = admin_store(cfg_dir)?;
            let mut info = store.business()?;
            if let Some(name) = name {
                info.name = name;
            }
            if let Some(address) = address {
                info.address = address;
            }
            if let Some(phone) = phone {
                info.phone = phone;
            }
            if let Some(gstin) = gstin {
                info.gstin = Some(gstin).filter(|g| !g.trim().is_empty());
            }
            store.save_business(&session, &info)?;
            println!("Updated business info");
            print_business(&info);
        }
    }
    Ok(())
}

// Table row structs for tabled
#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "UNIT")]
    unit: String,
    #[tabled(rename = "PRODUCTS")]
    products: usize,
}

fn cmd_category(cfg_dir: &Path, action: CategoryCommand) -> Result<()> {
    match action {
        CategoryCommand::Add { name, unit } => {
            let (store, session) = admin_store(cfg_dir)?;
            let category = store.add_category(&session, &name, &unit)?;
            println!("Added category {} (/{})", category.name, category.unit);
        }
        CategoryCommand::List => {
            let store = Store::open(cfg_dir)?;
            let categories = store.categories()?;
            if categories.is_empty() {
                println!("No categories yet. Add one with 'khata category add <name>'.");
                return Ok(());
            }
            let products = store.products()?;
            let rows: Vec<CategoryRow> = categories
                .into_iter()
                .map(|c| CategoryRow {
                    products: products.iter().filter(|p| p.category == c.name).count(),
                    name: c.name,
                    unit: c.unit,
                })
                .collect();
            println!("{}", Table::new(rows).with(Style::rounded()));
        }
        CategoryCommand::Remove { name } => {
            let (store, session) = admin_store(cfg_dir)?;
            let removed = store.remove_category(&session, &name)?;
            println!("Removed category {}", removed.name);
        }
    }
    Ok(())
}

#[derive(Tabled)]
struct ProductRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "CATEGORY")]
    category: String,
    #[tabled(rename = "PRICE")]
    price: String,
    #[tabled(rename = "STOCK")]
    stock: String,
    #[tabled(rename = "STATUS")]
    status: String,
}

fn cmd_product(cfg_dir: &Path, action: ProductCommand) -> Result<()> {
    match action {
        ProductCommand::Add {
            name,
            category,
            price,
            unit,
            stock,
            description,
            featured,
        } => {
            let (store, session) = admin_store(cfg_dir)?;
            let product = store.add_product(
                &session,
                NewProduct {
                    name,
                    category,
                    price,
                    unit,
                    description,
                    stock,
                    featured,
                },
            )?;
            println!(
                "Added product #{} {} ({} in stock)",
                product.id, product.name, product.stock
            );
        }
        ProductCommand::List {
            category,
            available,
        } => {
            let config = load_config(cfg_dir)?;
            let store = Store::open(cfg_dir)?;
            let products: Vec<_> = store
                .products()?
                .into_iter()
                .filter(|p| {
                    category
                        .as_deref()
                        .map_or(true, |c| p.category.eq_ignore_ascii_case(c))
                })
                .filter(|p| !available || p.available)
                .collect();

            if products.is_empty() {
                println!("No products found.");
                return Ok(());
            }

            let rows: Vec<ProductRow> = products
                .iter()
                .map(|p| ProductRow {
                    id: p.id,
                    name: if p.featured {
                        format!("{} *", p.name)
                    } else {
                        p.name.clone()
                    },
                    category: p.category.clone(),
                    price: format!(
                        "{}/{}",
                        format_money(p.price, &config.shop.currency_symbol),
                        p.unit
                    ),
                    stock: p.stock.to_string(),
                    status: if p.available {
                        "AVAILABLE".to_string()
                    } else {
                        "UNAVAILABLE".to_string()
                    },
                })
                .collect();
            println!("{}", Table::new(rows).with(Style::rounded()));
        }
        ProductCommand::Show { id } => {
            let config = load_config(cfg_dir)?;
            let store = Store::open(cfg_dir)?;
            let p = store.product(id)?;
            println!("#{} {}", p.id, p.name);
            println!("  Category:  {}", p.category);
            println!(
                "  Price:     {}/{}",
                format_money(p.price, &config.shop.currency_symbol),
                p.unit
            );
            println!("  Stock:     {}", p.stock);
            println!("  Available: {}", if p.available { "yes" } else { "no" });
            println!("  Featured:  {}", if p.featured { "yes" } else { "no" });
            if let Some(description) = &p.description {
                println!("  {}", description);
            }
        }
        ProductCommand::Update {
            id,
            name,
            price,
            category,
            unit,
            description,
            stock,
            available,
            featured,
        } => {
            let (store, session) = admin_store(cfg_dir)?;
            let product = store.update_product(
                &session,
                id,
                ProductPatch {
                    name,
                    price,
                    category,
                    unit,
                    description,
                    stock,
                    available,
                    featured,
                },
            )?;
            println!("Updated product #{} {}", product.id, product.name);
        }
        ProductCommand::Restock { id, quantity } => {
            let (store, session) = admin_store(cfg_dir)?;
            let product = store.restock(&session, id, quantity)?;
            println!("Restocked {}: {} in stock", product.name, product.stock);
        }
        ProductCommand::Remove { id } => {
            let (store, session) = admin_store(cfg_dir)?;
            let product = store.remove_product(&session, id)?;
            println!("Removed product #{} {}", product.id, product.name);
        }
    }
    Ok(())
}

#[derive(Tabled)]
struct CustomerRow {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "PHONE")]
    phone: String,
    #[tabled(rename = "BALANCE")]
    balance: String,
}

fn cmd_customer(cfg_dir: &Path, action: CustomerCommand) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let (store, session) = admin_store(cfg_dir)?;
    let symbol = &config.shop.currency_symbol;

    match action {
        CustomerCommand::Add { name, phone } => {
            let customer = store.add_customer(&session, &name, &phone)?;
            println!("Added customer {} ({})", customer.name, customer.phone);
        }
        CustomerCommand::List => {
            let customers = store.customers()?;
            if customers.is_empty() {
                println!("No customers yet.");
                return Ok(());
            }
            let balances = customer_balances(&customers, &store.sales()?, &store.payments()?)?;
            let rows: Vec<CustomerRow> = balances
                .into_iter()
                .map(|b| CustomerRow {
                    name: b.name,
                    phone: b.phone,
                    balance: format_balance(b.balance, symbol),
                })
                .collect();
            println!("{}", Table::new(rows).with(Style::rounded()));
        }
        CustomerCommand::Remove { phone } => {
            let removed = store.remove_customer(&session, &phone)?;
            println!("Removed customer {} ({})", removed.name, removed.phone);
        }
        CustomerCommand::Balance { phone } => {
            let customer = store.find_customer(&phone)?;
            let ledger = build_ledger(&store.sales_for(&phone)?, &store.payments_for(&phone)?)?;
            println!("{} ({})", customer.name, customer.phone);
            println!("  Total debit:  {}", format_money(ledger.total_debit, symbol));
            println!("  Total credit: {}", format_money(ledger.total_credit, symbol));
            println!("  Balance:      {}", format_balance(ledger.balance(), symbol));
        }
    }
    Ok(())
}

#[derive(Tabled)]
struct SaleRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "PRODUCT")]
    product: String,
    #[tabled(rename = "QTY")]
    quantity: String,
    #[tabled(rename = "TOTAL")]
    total: String,
    #[tabled(rename = "CUSTOMER")]
    customer: String,
}

fn cmd_sale(cfg_dir: &Path, action: SaleCommand) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let (store, session) = admin_store(cfg_dir)?;
    let symbol = &config.shop.currency_symbol;

    match action {
        SaleCommand::Add {
            product,
            qty,
            phone,
            date,
        } => {
            let sale = store.record_sale(
                &session,
                NewSale {
                    product_id: product,
                    quantity: qty,
                    customer_phone: phone,
                    date: parse_optional_date_time(date)?,
                },
            )?;
            println!("Recorded sale #{}", sale.id);
            println!(
                "  Item:     {} x{} {}",
                sale.product_name, sale.quantity, sale.unit
            );
            println!("  Total:    {}", format_money(sale.total, symbol));
            if let (Some(name), Some(phone)) = (&sale.customer_name, &sale.customer_phone) {
                let ledger = build_ledger(&store.sales_for(phone)?, &store.payments_for(phone)?)?;
                println!("  Customer: {} ({})", name, phone);
                println!("  Balance:  {}", format_balance(ledger.balance(), symbol));
            }
        }
        SaleCommand::List { phone, limit } => {
            let mut sales = match &phone {
                Some(phone) => {
                    let mut sales = store.sales_for(phone)?;
                    sales.sort_by(|a, b| b.date.cmp(&a.date));
                    sales
                }
                None => store.sales()?,
            };
            if sales.is_empty() {
                println!("No sales recorded.");
                return Ok(());
            }
            let count = sales.len();
            let total: f64 = sales.iter().map(|s| s.total).sum();
            if let Some(n) = limit {
                sales.truncate(n);
            }
            let rows: Vec<SaleRow> = sales
                .iter()
                .map(|s| SaleRow {
                    id: s.id,
                    date: s.date.format("%Y-%m-%d %H:%M").to_string(),
                    product: s.product_name.clone(),
                    quantity: format!("{} {}", s.quantity, s.unit),
                    total: format_money(s.total, symbol),
                    customer: s.customer_name.clone().unwrap_or_else(|| "-".to_string()),
                })
                .collect();
            println!("{}", Table::new(rows).with(Style::rounded()));
            println!();
            println!("Total: {} sales, {}", count, format_money(total, symbol));
        }
    }
    Ok(())
}

#[derive(Tabled)]
struct PaymentRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "PHONE")]
    phone: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
    #[tabled(rename = "NOTE")]
    note: String,
}

fn cmd_payment(cfg_dir: &Path, action: PaymentCommand) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let (store, session) = admin_store(cfg_dir)?;
    let symbol = &config.shop.currency_symbol;

    match action {
        PaymentCommand::Add {
            phone,
            amount,
            date,
            note,
        } => {
            let payment = store.record_payment(
                &session,
                NewPayment {
                    customer_phone: phone.clone(),
                    amount,
                    date: parse_optional_date_time(date)?,
                    note,
                },
            )?;
            let ledger = build_ledger(&store.sales_for(&phone)?, &store.payments_for(&phone)?)?;
            println!(
                "Recorded {} payment from {} ({})",
                format_money(payment.amount, symbol),
                phone,
                format_balance(ledger.balance(), symbol)
            );
        }
        PaymentCommand::List { phone } => {
            let payments = match &phone {
                Some(phone) => store.payments_for(phone)?,
                None => store.payments()?,
            };
            if payments.is_empty() {
                println!("No payments recorded.");
                return Ok(());
            }
            let total: f64 = payments.iter().map(|p| p.amount).sum();
            let rows: Vec<PaymentRow> = payments
                .iter()
                .map(|p| PaymentRow {
                    id: p.id,
                    date: p.date.format("%Y-%m-%d %H:%M").to_string(),
                    phone: p.customer_phone.clone(),
                    amount: format_money(p.amount, symbol),
                    note: p.note.clone().unwrap_or_default(),
                })
                .collect();
            println!("{}", Table::new(rows).with(Style::rounded()));
            println!();
            println!("Total received: {}", format_money(total, symbol));
        }
    }
    Ok(())
}

#[derive(Tabled)]
struct OrderRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "NUMBER")]
    number: String,
    #[tabled(rename = "CUSTOMER")]
    customer: String,
    #[tabled(rename = "ITEMS")]
    items: usize,
    #[tabled(rename = "TOTAL")]
    total: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "PAYMENT")]
    payment: String,
}

fn order_rows(orders: &[Order], symbol: &str) -> Vec<OrderRow> {
    orders
        .iter()
        .map(|o| OrderRow {
            id: o.id,
            number: o.number.clone(),
            customer: o.customer_name.clone(),
            items: o.items.len(),
            total: format_money(o.total, symbol),
            status: o.status.to_string().to_uppercase(),
            payment: o.payment_status.to_string(),
        })
        .collect()
}

#[derive(Tabled)]
struct OrderItemRow {
    #[tabled(rename = "PRODUCT")]
    product: String,
    #[tabled(rename = "QTY")]
    quantity: String,
    #[tabled(rename = "PRICE")]
    price: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
}

/// Orders can be placed and viewed by customers; status changes are admin-only
fn cmd_order(cfg_dir: &Path, action: OrderCommand) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let store = Store::open(cfg_dir)?;
    let session = Session::current(&store)?;
    let symbol = &config.shop.currency_symbol;

    match action {
        OrderCommand::Add {
            items,
            phone,
            order_type,
            address,
            note,
        } => {
            let items = items
                .iter()
                .map(|item| parse_order_item(item))
                .collect::<Result<Vec<_>>>()?;
            let order = store.place_order(
                &session,
                NewOrder {
                    items,
                    customer_phone: phone,
                    order_type,
                    address,
                    instructions: note,
                },
            )?;
            println!("Placed order {} (#{})", order.number, order.id);
            println!("  Customer: {} ({})", order.customer_name, order.customer_phone);
            println!("  Lines:    {}", order.items.len());
            println!("  Total:    {}", format_money(order.total, symbol));
        }
        OrderCommand::List { status, phone } => {
            let orders = match phone {
                Some(phone) => {
                    session.ensure_can_view(&phone)?;
                    store.orders_for(&phone)?
                }
                None if session.is_admin() => store.orders()?,
                None => store.orders_for(&session.phone)?,
            };
            let orders: Vec<Order> = orders
                .into_iter()
                .filter(|o| status.map_or(true, |s| o.status == s))
                .collect();
            if orders.is_empty() {
                println!("No orders found.");
                return Ok(());
            }
            println!("{}", Table::new(order_rows(&orders, symbol)).with(Style::rounded()));
        }
        OrderCommand::Show { id } => {
            let order = store.order(&session, id)?;
            println!("{} (#{})", order.number, order.id);
            println!("  Customer: {} ({})", order.customer_name, order.customer_phone);
            println!("  Placed:   {}", order.created.format("%Y-%m-%d %H:%M"));
            println!("  Type:     {}", order.order_type);
            if let Some(address) = &order.address {
                println!("  Address:  {}", address);
            }
            if let Some(instructions) = &order.instructions {
                println!("  Note:     {}", instructions);
            }
            println!("  Status:   {}", order.status);
            println!("  Payment:  {}", order.payment_status);
            let rows: Vec<OrderItemRow> = order
                .items
                .iter()
                .map(|i| OrderItemRow {
                    product: i.product_name.clone(),
                    quantity: format!("{} {}", i.quantity, i.unit),
                    price: format_money(i.unit_price, symbol),
                    amount: format_money(i.total, symbol),
                })
                .collect();
            println!("{}", Table::new(rows).with(Style::rounded()));
            println!("Total: {}", format_money(order.total, symbol));
        }
        OrderCommand::Status {
            id,
            status,
            payment,
        } => {
            let order = store.update_order_status(&session, id, status, payment)?;
            println!(
                "Order {} is {} (payment {})",
                order.number, order.status, order.payment_status
            );
        }
    }
    Ok(())
}

#[derive(Tabled)]
struct ExpenseRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
}

fn cmd_expense(cfg_dir: &Path, action: ExpenseCommand) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let (store, session) = admin_store(cfg_dir)?;
    let symbol = &config.shop.currency_symbol;

    match action {
        ExpenseCommand::Add {
            description,
            amount,
            date,
        } => {
            let date = parse_optional_date_time(date)?;
            let expense = store.add_expense(&session, &description, amount, date)?;
            println!(
                "Added expense #{} {} ({})",
                expense.id,
                expense.description,
                format_money(expense.amount, symbol)
            );
        }
        ExpenseCommand::List => {
            let expenses = store.expenses()?;
            if expenses.is_empty() {
                println!("No expenses recorded.");
                return Ok(());
            }
            let total: f64 = expenses.iter().map(|e| e.amount).sum();
            let rows: Vec<ExpenseRow> = expenses
                .iter()
                .map(|e| ExpenseRow {
                    id: e.id,
                    date: e.date.format("%Y-%m-%d").to_string(),
                    description: e.description.clone(),
                    amount: format_money(e.amount, symbol),
                })
                .collect();
            println!("{}", Table::new(rows).with(Style::rounded()));
            println!();
            println!("Total spent: {}", format_money(total, symbol));
        }
        ExpenseCommand::Update {
            id,
            description,
            amount,
            date,
        } => {
            let patch = ExpensePatch {
                description,
                amount,
                date: parse_optional_date_time(date)?,
            };
            let expense = store.update_expense(&session, id, patch)?;
            println!(
                "Updated expense #{} {} ({})",
                expense.id,
                expense.description,
                format_money(expense.amount, symbol)
            );
        }
        ExpenseCommand::Remove { id } => {
            let expense = store.remove_expense(&session, id)?;
            println!("Removed expense #{} {}", expense.id, expense.description);
        }
    }
    Ok(())
}

#[derive(Tabled)]
struct LedgerRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "DETAILS")]
    details: String,
    #[tabled(rename = "DEBIT(-)")]
    debit: String,
    #[tabled(rename = "CREDIT(+)")]
    credit: String,
    #[tabled(rename = "BALANCE")]
    balance: String,
}

/// Show a customer's ledger. Users may only see their own.
fn cmd_ledger(cfg_dir: &Path, phone: Option<String>) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let store = Store::open(cfg_dir)?;
    let session = Session::current(&store)?;
    let phone = phone.unwrap_or_else(|| session.phone.clone());
    session.ensure_can_view(&phone)?;

    let customer = store.find_customer(&phone)?;
    let ledger = build_ledger(&store.sales_for(&phone)?, &store.payments_for(&phone)?)?;
    let symbol = &config.shop.currency_symbol;

    println!("Ledger for {} ({})", customer.name, customer.phone);

    if ledger.is_empty() {
        println!("No transactions recorded.");
    } else {
        let rows: Vec<LedgerRow> = ledger
            .entries
            .iter()
            .enumerate()
            .map(|(idx, e)| LedgerRow {
                index: idx + 1,
                date: e.date.format("%Y-%m-%d %H:%M").to_string(),
                details: e.description.clone(),
                debit: match e.kind {
                    EntryKind::Debit => format_amount(e.debit),
                    EntryKind::Credit => String::new(),
                },
                credit: match e.kind {
                    EntryKind::Credit => format_amount(e.credit),
                    EntryKind::Debit => String::new(),
                },
                balance: format_balance(e.balance, ""),
            })
            .collect();
        println!("{}", Table::new(rows).with(Style::rounded()));
    }

    println!();
    println!("Total debit:  {}", format_money(ledger.total_debit, symbol));
    println!("Total credit: {}", format_money(ledger.total_credit, symbol));
    println!("Balance:      {}", format_balance(ledger.balance(), symbol));

    Ok(())
}

fn output_path(cfg_dir: &Path, config: &Config, file_name: &str) -> Result<PathBuf> {
    let output_dir = resolve_output_dir(&config.pdf.output_dir, cfg_dir);
    std::fs::create_dir_all(&output_dir)?;
    Ok(output_dir.join(file_name))
}

/// Generate a statement PDF for one customer
fn cmd_statement(
    cfg_dir: &Path,
    phone: &str,
    from: Option<String>,
    to: Option<String>,
    output: Option<PathBuf>,
    open: bool,
) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let store = Store::open(cfg_dir)?;
    let session = Session::current(&store)?;
    session.ensure_can_view(phone)?;

    let from_date = from.as_deref().map(parse_day).transpose()?;
    let to_date = to.as_deref().map(parse_day).transpose()?;

    let customer = store.find_customer(phone)?;
    let ledger = build_ledger(&store.sales_for(phone)?, &store.payments_for(phone)?)?;
    let period = ledger.period(from_date, to_date);
    let today = today();

    let data = StatementData::new(
        store.business()?,
        &customer,
        &period,
        (from_date, to_date),
        &config,
        today,
    );

    let pdf_path = match output {
        Some(path) => path,
        None => output_path(
            cfg_dir,
            &config,
            &format!("STATEMENT-{}-{}.pdf", customer.phone, today.format("%Y-%m-%d")),
        )?,
    };

    generate_statement_pdf(&data, &pdf_path)?;

    println!("Generated statement for {} ({})", customer.name, customer.phone);
    println!("  Period:   {}", data.period);
    println!("  Entries:  {}", data.rows.len());
    println!(
        "  Balance:  {}",
        format_balance(period.closing_balance, &config.shop.currency_symbol)
    );
    println!("  Saved:    {}", pdf_path.display());

    if open {
        open_path(&pdf_path)?;
    }
    Ok(())
}

/// Generate the bill PDF for one sale
fn cmd_bill(cfg_dir: &Path, sale_id: u32, output: Option<PathBuf>, open: bool) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let (store, _session) = admin_store(cfg_dir)?;
    let sale = store.sale(sale_id)?;

    let previous_balance = match &sale.customer_phone {
        Some(phone) => Some(balance_before_sale(
            sale.id,
            &store.sales_for(phone)?,
            &store.payments_for(phone)?,
        )?),
        None => None,
    };

    let data = BillData::new(store.business()?, &sale, previous_balance, &config);
    let pdf_path = match output {
        Some(path) => path,
        None => output_path(cfg_dir, &config, &format!("{}.pdf", bill_number(sale.id)))?,
    };

    generate_bill_pdf(&data, &pdf_path)?;

    println!("Generated {}", data.number);
    println!("  Customer: {}", data.customer_name);
    println!(
        "  Total:    {}",
        format_money(data.total, &config.shop.currency_symbol)
    );
    println!("  Saved:    {}", pdf_path.display());

    if open {
        open_path(&pdf_path)?;
    }
    Ok(())
}

#[derive(Tabled)]
struct ChartRow {
    #[tabled(rename = "DAY")]
    day: String,
    #[tabled(rename = "SALES")]
    sales: String,
    #[tabled(rename = "EXPENSES")]
    expenses: String,
    #[tabled(rename = "NET")]
    net: String,
}

#[derive(Tabled)]
struct StockRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "STOCK")]
    stock: u32,
}

#[derive(Tabled)]
struct CategoryRevenueRow {
    #[tabled(rename = "CATEGORY")]
    category: String,
    #[tabled(rename = "UNITS")]
    quantity: u64,
    #[tabled(rename = "REVENUE")]
    revenue: String,
}

/// Admin dashboard, one section at a time
fn cmd_dashboard(cfg_dir: &Path, section: Section, window: &str) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let (store, _session) = admin_store(cfg_dir)?;
    let symbol = &config.shop.currency_symbol;

    match section {
        Section::Overview => {
            let users = store.users()?;
            let products = store.products()?;
            let sales = store.sales()?;
            let orders = store.orders()?;
            let expenses = store.expenses()?;
            let overview = Overview::compute(&users, &products, &sales, &orders, &expenses);

            println!("Dashboard Overview");
            println!("{}", "-".repeat(50));
            println!("Customers: {}", overview.customers);
            println!("Products:  {}", overview.products);
            println!("Sales:     {}", overview.sales);
            println!(
                "Orders:    {} ({} pending, {} completed)",
                overview.orders.total, overview.orders.pending, overview.orders.completed
            );
            println!("Revenue:   {}", format_money(overview.revenue, symbol));
            println!("Expenses:  {}", format_money(overview.expenses, symbol));
            println!("Profit:    {}", format_money(overview.profit, symbol));
            println!();

            let filter = (!window.eq_ignore_ascii_case("all")).then_some(window);
            let rows = chart_rows(&sales, &expenses, filter, today())?;
            println!("Sales vs expenses ({})", window);
            if rows.is_empty() {
                println!("No sales or expenses in this window.");
                return Ok(());
            }
            let table_rows: Vec<ChartRow> = rows
                .iter()
                .map(|r| ChartRow {
                    day: r.day.to_string(),
                    sales: format_amount(r.sales),
                    expenses: format_amount(r.expenses),
                    net: format_amount(r.net()),
                })
                .collect();
            println!("{}", Table::new(table_rows).with(Style::rounded()));
        }
        Section::Products => {
            let stats = ProductStats::compute(&store.products()?, config.shop.low_stock);
            println!("Products");
            println!("{}", "-".repeat(50));
            println!("Total:       {}", stats.total);
            println!("Available:   {}", stats.available);
            println!("Unavailable: {}", stats.unavailable);
            if !stats.low_stock.is_empty() {
                println!();
                println!("Low stock (<= {}):", config.shop.low_stock);
                let rows: Vec<StockRow> = stats
                    .low_stock
                    .iter()
                    .map(|p| StockRow {
                        id: p.id,
                        name: p.name.clone(),
                        stock: p.stock,
                    })
                    .collect();
                println!("{}", Table::new(rows).with(Style::rounded()));
            }
        }
        Section::Orders => {
            let orders = store.orders()?;
            let stats = OrderStats::compute(&orders);
            println!("Orders");
            println!("{}", "-".repeat(50));
            println!("Total:       {}", stats.total);
            println!("Pending:     {}", stats.pending);
            println!("In progress: {}", stats.in_progress);
            println!("Completed:   {}", stats.completed);
            println!("Cancelled:   {}", stats.cancelled);
            println!("Delivered:   {}", format_money(stats.revenue, symbol));
            if orders.is_empty() {
                return Ok(());
            }
            println!();
            println!("Recent orders");
            let recent = &orders[..orders.len().min(20)];
            println!("{}", Table::new(order_rows(recent, symbol)).with(Style::rounded()));
        }
        Section::Users => {
            let balances =
                customer_balances(&store.customers()?, &store.sales()?, &store.payments()?)?;
            println!("Customers: {}", balances.len());
            if balances.is_empty() {
                return Ok(());
            }
            let rows: Vec<CustomerRow> = balances
                .into_iter()
                .map(|b| CustomerRow {
                    name: b.name,
                    phone: b.phone,
                    balance: format_balance(b.balance, symbol),
                })
                .collect();
            println!("{}", Table::new(rows).with(Style::rounded()));
        }
        Section::Reports => {
            let sales = store.sales()?;
            let balances = customer_balances(&store.customers()?, &sales, &store.payments()?)?;
            let receivables = Receivables::compute(&balances);

            println!("Reports");
            println!("{}", "-".repeat(50));
            println!("Outstanding: {}", format_money(receivables.outstanding, symbol));
            println!("Advances:    {}", format_money(receivables.advances, symbol));

            let by_category = revenue_by_category(&sales);
            if !by_category.is_empty() {
                println!();
                let rows: Vec<CategoryRevenueRow> = by_category
                    .into_iter()
                    .map(|c| CategoryRevenueRow {
                        category: c.category,
                        quantity: c.quantity,
                        revenue: format_money(c.revenue, symbol),
                    })
                    .collect();
                println!("{}", Table::new(rows).with(Style::rounded()));
            }
        }
    }
    Ok(())
}

fn open_path(pdf_path: &Path) -> Result<()> {
    // Open with system default viewer
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(pdf_path).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(pdf_path).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", ""])
            .arg(pdf_path)
            .spawn()?;
    }
    Ok(())
}
