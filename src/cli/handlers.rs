use std::env;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::app::AppContext;
use crate::dashboard::Dashboard;
use crate::entity::{short_id, InboundNote};
use crate::error::{Result, StockflowError};
use crate::fixtures;
use crate::ledger;
use crate::repository;
use crate::route::Route;
use crate::session::Registration;
use crate::storage::{LocalStorage, STOCKFLOW_DIR};
use crate::theme::{self, Theme};
use crate::warnings::{check_levels, format_warning};
use crate::workflow::{InboundDraft, OutboundDraft, ProfileUpdate};

fn find_project_root() -> PathBuf {
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    project_root_from(&cwd)
}

/// Nearest ancestor of `start` (inclusive) holding .stockflow/, else `start`
fn project_root_from(start: &Path) -> PathBuf {
    start
        .ancestors()
        .find(|dir| dir.join(STOCKFLOW_DIR).is_dir())
        .unwrap_or(start)
        .to_path_buf()
}

fn open_app() -> Result<AppContext> {
    AppContext::open(&find_project_root())
}

/// Open the store and pass the route guard for `route`
fn open_guarded(route: Route) -> Result<AppContext> {
    let app = open_app()?;
    app.require(route)?;
    Ok(app)
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| StockflowError::InvalidDate(s.to_string()))
}

/// Parse "name:quantity:unit_price". The name may itself contain colons.
fn parse_inbound_item(s: &str) -> Result<(String, i64, f64)> {
    const EXPECTED: &str = "'name:quantity:unit_price'";
    let invalid = || StockflowError::InvalidItem {
        item: s.to_string(),
        expected: EXPECTED,
    };

    let mut parts = s.rsplitn(3, ':');
    let price = parts.next().ok_or_else(invalid)?;
    let quantity = parts.next().ok_or_else(invalid)?;
    let name = parts.next().ok_or_else(invalid)?;

    let quantity = quantity.trim().parse::<i64>().map_err(|_| invalid())?;
    let price = price.trim().replace(',', ".").parse::<f64>().map_err(|_| invalid())?;
    Ok((name.trim().to_string(), quantity, price))
}

/// Parse "product_id:quantity"
fn parse_outbound_item(s: &str) -> Result<(String, i64)> {
    let invalid = || StockflowError::InvalidItem {
        item: s.to_string(),
        expected: "'product_id:quantity'",
    };

    let (product_id, quantity) = s.rsplit_once(':').ok_or_else(invalid)?;
    let quantity = quantity.trim().parse::<i64>().map_err(|_| invalid())?;
    Ok((product_id.trim().to_string(), quantity))
}

fn supplier_name(storage: &LocalStorage, supplier_id: &str) -> Result<String> {
    Ok(repository::suppliers(storage)
        .find(supplier_id)?
        .map(|s| s.name)
        .unwrap_or_else(|| supplier_id.to_string()))
}

fn print_restock_warnings(app: &AppContext, product_ids: &[&str]) -> Result<()> {
    let products = repository::products(&app.storage).list()?;
    let notes = repository::inbound_notes(&app.storage).list()?;
    let levels: Vec<_> = ledger::stock_levels(&products, &notes, &app.config)
        .into_iter()
        .filter(|l| product_ids.is_empty() || product_ids.contains(&l.product_id.as_str()))
        .collect();
    for warning in check_levels(&levels) {
        eprintln!("{}", format_warning(&warning));
    }
    Ok(())
}

pub fn handle_init() -> Result<()> {
    let root = env::current_dir()?;

    AppContext::init(&root)?;

    println!("Initialized stockflow store in {}", root.display());
    println!("  Sign in with 'stockflow login', then 'stockflow seed' loads demo data.");

    Ok(())
}

pub fn handle_seed() -> Result<()> {
    let app = open_guarded(Route::Home)?;

    let stats = fixtures::seed(&app.storage)?;

    println!(
        "Seeded {} products, {} suppliers, {} inbound notes",
        stats.products, stats.suppliers, stats.notes
    );

    Ok(())
}

pub fn handle_login(email: String, password: String) -> Result<()> {
    let mut app = open_app()?;

    let result = app.session.login(&app.storage, &email, &password);
    let redirect = app.report(result, "Signed in")?;
    tracing::debug!(to = %redirect.to, "redirect");

    println!("Logged in as {}", email);
    Ok(())
}

pub fn handle_logout() -> Result<()> {
    let mut app = open_guarded(Route::Home)?;

    app.session.logout(&app.storage)?;

    println!("Logged out.");
    Ok(())
}

pub fn handle_register(name: String, email: String, password: String, confirm: String) -> Result<()> {
    let mut app = open_app()?;

    let form = Registration {
        name,
        email,
        password,
        confirm_password: confirm,
    };
    let result = app.session.register(&app.storage, &form);
    app.report(result, "Account created")?;

    println!(
        "Registration accepted for {} (accounts are not stored). Sign in with the demo credentials.",
        form.email
    );
    Ok(())
}

pub fn handle_whoami(json: bool) -> Result<()> {
    let app = open_guarded(Route::Profile)?;

    let user = app.session.user().ok_or_else(|| StockflowError::Unauthenticated {
        route: Route::Profile.to_string(),
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(user)?);
    } else {
        println!("{} <{}> ({})", user.name, user.email, user.role);
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn handle_entrada_add(
    supplier: Option<String>,
    number: Option<String>,
    date: Option<String>,
    notes: Option<String>,
    items: Vec<String>,
    template: Option<String>,
    json: bool,
) -> Result<()> {
    let mut app = open_guarded(Route::StockIn)?;

    let mut draft = InboundDraft::new(today());
    if let Some(number) = template {
        let template = fixtures::template_for(&number)
            .ok_or_else(|| StockflowError::EntityNotFound(format!("demo note {}", number)))?;
        draft.prefill_from(&template);
    }
    if let Some(supplier) = supplier {
        draft.supplier = supplier;
    }
    if let Some(number) = number {
        draft.number = number;
    }
    if let Some(date) = date {
        draft.date = Some(parse_date(&date)?);
    }
    if let Some(notes) = notes {
        draft.notes = notes;
    }
    for item in &items {
        let (name, quantity, price) = parse_inbound_item(item)?;
        draft.add_item(&app.storage, &name, quantity, price)?;
    }
    let total = draft.total();

    let receipt = app.submit_inbound(&mut draft)?;
    tracing::debug!(to = %receipt.redirect.to, after = ?receipt.redirect.after, "redirect");

    if json {
        println!("{}", serde_json::to_string_pretty(&receipt.note)?);
    } else {
        if receipt.supplier_created {
            println!(
                "Created supplier {} ({})",
                receipt.supplier.name,
                short_id(&receipt.supplier.id)
            );
        }
        println!(
            "Registered inbound note {} ({}) - {}, {} products, total {:.2}",
            receipt.note.number,
            short_id(&receipt.note.id),
            receipt.supplier.name,
            receipt.note.line_items.len(),
            total
        );
    }

    Ok(())
}

pub fn handle_entrada_list(available: bool, json: bool) -> Result<()> {
    let app = open_guarded(Route::StockIn)?;

    let notes = repository::inbound_notes(&app.storage).list()?;
    let notes: Vec<&InboundNote> = if available {
        ledger::notes_with_stock(&notes)
    } else {
        notes.iter().collect()
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&notes)?);
        return Ok(());
    }

    if notes.is_empty() {
        println!("No inbound notes found.");
        return Ok(());
    }

    for note in notes {
        println!(
            "{:>8}  {}  {}  {}  {} lines, {} available, received value {:.2}",
            note.number,
            short_id(&note.id),
            note.date,
            supplier_name(&app.storage, &note.supplier_id)?,
            note.line_items.len(),
            note.available_total(),
            note.received_value()
        );
    }

    Ok(())
}

pub fn handle_entrada_remove(id: String, force: bool) -> Result<()> {
    let app = open_guarded(Route::StockIn)?;

    let notes = repository::inbound_notes(&app.storage);
    let note = notes.resolve(&id)?;

    // Confirm deletion unless --force is used
    if !force {
        eprintln!(
            "Delete inbound note {} ({}) from {}? [y/N] ",
            note.number,
            short_id(&note.id),
            note.date
        );

        if atty::is(atty::Stream::Stdin) {
            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Cancelled.");
                return Ok(());
            }
        } else {
            return Err(StockflowError::Storage(
                "Use --force to delete in non-interactive mode".to_string(),
            ));
        }
    }

    notes.remove_by_id(&note.id)?;

    println!("Deleted inbound note {} ({})", note.number, short_id(&note.id));
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn handle_saida_add(
    note: String,
    reason: String,
    date: Option<String>,
    recipient: Option<String>,
    notes: Option<String>,
    items: Vec<String>,
    json: bool,
) -> Result<()> {
    let mut app = open_guarded(Route::StockOut)?;

    let note = repository::inbound_notes(&app.storage).resolve(&note)?;
    let mut draft = OutboundDraft::new(today());
    draft.select_note(&app.storage, &note.id)?;

    for item in &items {
        let (product_id, quantity) = parse_outbound_item(item)?;
        draft.set_quantity(&product_id, quantity);
        app.stage_outbound(&mut draft, &product_id)?;
    }

    draft.reason = reason;
    if let Some(date) = date {
        draft.date = Some(parse_date(&date)?);
    }
    draft.recipient = recipient.unwrap_or_default();
    draft.notes = notes.unwrap_or_default();

    let receipt = app.submit_outbound(&mut draft)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&receipt.movement)?);
    } else {
        println!(
            "Registered stock-out {} from note {} - {} units ({})",
            short_id(&receipt.movement.id),
            receipt.note.number,
            receipt.movement.total_quantity(),
            receipt.movement.reason
        );
        for line in &receipt.note.line_items {
            println!("  {}: {} left", line.name, line.available_quantity);
        }
    }

    let touched: Vec<&str> = receipt.movement.items.iter().map(|i| i.product_id()).collect();
    print_restock_warnings(&app, &touched)?;

    Ok(())
}

pub fn handle_saida_list(json: bool) -> Result<()> {
    let app = open_guarded(Route::StockOut)?;

    let movements = repository::outbound_movements(&app.storage).list()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&movements)?);
        return Ok(());
    }

    if movements.is_empty() {
        println!("No stock-outs found.");
        return Ok(());
    }

    let notes = repository::inbound_notes(&app.storage).snapshot()?;
    for movement in &movements {
        let number = notes
            .find(&movement.inbound_note_id)
            .map(|n| n.number.as_str())
            .unwrap_or(movement.inbound_note_id.as_str());
        println!(
            "{}  {}  note {}  {} units  {}",
            short_id(&movement.id),
            movement.date,
            number,
            movement.total_quantity(),
            movement.reason
        );
    }

    Ok(())
}

pub fn handle_stock(json: bool) -> Result<()> {
    let app = open_guarded(Route::StockQuery)?;

    let products = repository::products(&app.storage).list()?;
    let notes = repository::inbound_notes(&app.storage).list()?;
    let levels = ledger::stock_levels(&products, &notes, &app.config);

    if json {
        println!("{}", serde_json::to_string_pretty(&levels)?);
        return Ok(());
    }

    if levels.is_empty() {
        println!("No products found.");
        return Ok(());
    }

    for level in &levels {
        println!("{:<24} {:>6}  {}", level.name, level.quantity, level.status);
    }
    for warning in check_levels(&levels) {
        eprintln!("{}", format_warning(&warning));
    }

    Ok(())
}

pub fn handle_dashboard(json: bool) -> Result<()> {
    let app = open_guarded(Route::Home)?;

    let dashboard = Dashboard::load(&app.storage, &app.config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&dashboard)?);
        return Ok(());
    }

    if let Some(user) = app.session.user() {
        println!("Welcome, {}", user.name);
    }
    println!();
    println!("Products:       {}", dashboard.totals.products);
    println!("Inbound notes:  {}", dashboard.totals.inbound_notes);
    println!("Stock-outs:     {}", dashboard.totals.outbound_movements);

    let low: Vec<_> = dashboard.low_stock().collect();
    if !low.is_empty() {
        println!();
        println!("Low stock:");
        for level in low {
            println!("  {:<24} {:>6}  {}", level.name, level.quantity, level.status);
        }
    }

    println!();
    println!("Recent activity:");
    if dashboard.recent_activity.is_empty() {
        println!("  (none)");
    }
    for activity in &dashboard.recent_activity {
        println!(
            "  {}  {:<8} {:<24} {:>6}",
            activity.date, activity.kind, activity.product, activity.quantity
        );
    }

    Ok(())
}

pub fn handle_theme_show() -> Result<()> {
    let app = open_guarded(Route::Home)?;

    let theme = Theme::load_or_init(&app.storage, theme::system_prefers_dark())?;

    println!("{}", theme);
    Ok(())
}

pub fn handle_theme_toggle() -> Result<()> {
    let app = open_guarded(Route::Home)?;

    let theme = Theme::toggle(&app.storage, theme::system_prefers_dark())?;

    println!("Theme set to {}", theme);
    Ok(())
}

pub fn handle_profile_update(
    name: Option<String>,
    email: Option<String>,
    current_password: Option<String>,
    new_password: Option<String>,
    confirm: Option<String>,
) -> Result<()> {
    let mut app = open_guarded(Route::Profile)?;

    let user = app.session.user().ok_or_else(|| StockflowError::Unauthenticated {
        route: Route::Profile.to_string(),
    })?;
    let mut form = ProfileUpdate::for_user(user);
    if let Some(name) = name {
        form.name = name;
    }
    if let Some(email) = email {
        form.email = email;
    }
    form.current_password = current_password.unwrap_or_default();
    form.new_password = new_password.unwrap_or_default();
    form.confirm_password = confirm.unwrap_or_default();

    let result = form.validate();
    app.report(result, "Profile updated")?;

    println!("Profile updated for {} <{}> (changes are not stored)", form.name, form.email);
    Ok(())
}
