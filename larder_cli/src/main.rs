use clap::{Parser, Subcommand};
use larder_core::*;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use uuid::Uuid;

mod demo;

#[derive(Parser)]
#[command(name = "larder")]
#[command(about = "Recipe and menu costing toolkit", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List known units grouped by family
    Units,

    /// Convert a quantity between two units
    Convert {
        quantity: Decimal,
        from: String,
        to: String,
    },

    /// Cost a recipe with a full breakdown
    Cost {
        /// Recipe name or id
        recipe: String,

        /// Scale the total by a serving count
        #[arg(long)]
        servings: Option<Decimal>,

        /// Emit the result as JSON
        #[arg(long)]
        json: bool,

        /// Also write the breakdown rows to a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Check whether attaching sub-recipes to a recipe would create a cycle
    Check {
        /// Recipe name or id
        recipe: String,

        /// Candidate sub-recipe (name or id); repeatable
        #[arg(long = "child", required = true)]
        children: Vec<String>,
    },

    /// Price a menu with head count and markup
    Menu {
        /// Menu name or id
        menu: String,

        /// Emit the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a demo dataset to the data directory
    Seed {
        /// Overwrite an existing dataset
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    larder_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());

    match cli.command {
        Commands::Units => cmd_units(&data_dir, &config),
        Commands::Convert { quantity, from, to } => cmd_convert(&data_dir, &config, quantity, &from, &to),
        Commands::Cost {
            recipe,
            servings,
            json,
            csv,
        } => cmd_cost(&data_dir, &config, &recipe, servings, json, csv),
        Commands::Check { recipe, children } => cmd_check(&data_dir, &config, &recipe, &children),
        Commands::Menu { menu, json } => cmd_menu(&data_dir, &config, &menu, json),
        Commands::Seed { force } => cmd_seed(&data_dir, force),
    }
}

fn dataset_path(data_dir: &Path) -> PathBuf {
    data_dir.join("larder.json")
}

/// Load the dataset, falling back to the built-in unit registry when the
/// dataset carries none, and merging custom units from config.
fn load_dataset(data_dir: &Path, config: &Config) -> Result<Dataset> {
    let mut data = Dataset::load(&dataset_path(data_dir))?;

    if data.registry.units.is_empty() {
        data.registry = default_units().clone();
    }
    config.apply_custom_units(&mut data.registry)?;

    let errors = data.registry.validate();
    if !errors.is_empty() {
        eprintln!("Unit registry validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::RegistryValidation("Invalid unit registry".into()));
    }

    Ok(data)
}

/// Resolve a recipe by id or by exact name.
fn find_recipe<'a>(data: &'a Dataset, needle: &str) -> Result<&'a Recipe> {
    if let Ok(id) = Uuid::parse_str(needle) {
        if let Some(recipe) = data.recipes.get(&id) {
            return Ok(recipe);
        }
    }
    data.recipes
        .values()
        .find(|r| r.name == needle)
        .ok_or_else(|| Error::NotFound(format!("recipe '{}'", needle)))
}

fn find_menu<'a>(data: &'a Dataset, needle: &str) -> Result<&'a Menu> {
    if let Ok(id) = Uuid::parse_str(needle) {
        if let Some(menu) = data.menus.get(&id) {
            return Ok(menu);
        }
    }
    data.menus
        .values()
        .find(|m| m.name == needle)
        .ok_or_else(|| Error::NotFound(format!("menu '{}'", needle)))
}

fn money(config: &Config, amount: Decimal) -> String {
    format!("{}{:.2}", config.costing.currency_symbol, amount)
}

fn cmd_units(data_dir: &Path, config: &Config) -> Result<()> {
    let data = load_dataset(data_dir, config)?;

    // Group by family label for stable output
    let mut families: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for unit in data.registry.units.values() {
        let family = data.registry.unit_type(unit.unit_type_id)?;
        let kind = family
            .physical_kind
            .map_or("untyped", |k| k.label());
        families
            .entry(format!("{} [{}]", family.label, kind))
            .or_default()
            .push(format!("{} (ratio {})", unit.name, unit.ratio));
    }

    for (family, mut units) in families {
        println!("{}", family);
        units.sort();
        for unit in units {
            println!("  - {}", unit);
        }
    }

    Ok(())
}

fn cmd_convert(
    data_dir: &Path,
    config: &Config,
    quantity: Decimal,
    from: &str,
    to: &str,
) -> Result<()> {
    let data = load_dataset(data_dir, config)?;
    let from_unit = data.registry.unit_by_name(from)?;
    let to_unit = data.registry.unit_by_name(to)?;

    let result = convert::convert(quantity, from_unit, to_unit, &data.registry)?;
    println!("{} {} = {} {}", quantity, from, result.normalize(), to);

    Ok(())
}

fn cmd_cost(
    data_dir: &Path,
    config: &Config,
    recipe: &str,
    servings: Option<Decimal>,
    json: bool,
    csv: Option<PathBuf>,
) -> Result<()> {
    let data = load_dataset(data_dir, config)?;
    let recipe_id = find_recipe(&data, recipe)?.id;

    let (breakdown, serving_summary) = match servings {
        Some(n) => {
            let result = calculate_cost_per_serving(&data, recipe_id, n)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
                return write_csv_if_requested(&result.breakdown, csv);
            }
            let summary = format!(
                "  Cost per serving: {}\n  Total for {} servings: {}",
                money(config, result.cost_per_serving),
                result.servings.normalize(),
                money(config, result.total_cost),
            );
            (result.breakdown, Some(summary))
        }
        None => {
            let breakdown = calculate_recipe_cost(&data, recipe_id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&breakdown)?);
                return write_csv_if_requested(&breakdown, csv);
            }
            (breakdown, None)
        }
    };

    display_breakdown(config, &breakdown, serving_summary.as_deref());
    write_csv_if_requested(&breakdown, csv)
}

fn write_csv_if_requested(breakdown: &CostBreakdown, csv: Option<PathBuf>) -> Result<()> {
    if let Some(path) = csv {
        let rows = write_breakdown_csv(breakdown, &path)?;
        println!("\n✓ Wrote {} rows to {}", rows, path.display());
    }
    Ok(())
}

fn display_breakdown(config: &Config, breakdown: &CostBreakdown, serving_summary: Option<&str>) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  COST BREAKDOWN");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  {}", breakdown.recipe_name);
    println!("  Total: {}", money(config, breakdown.total_cost));
    if let Some(summary) = serving_summary {
        println!("{}", summary);
    }

    if !breakdown.item_costs.is_empty() {
        println!();
        println!("  Ingredients:");
        for line in &breakdown.item_costs {
            let mark = if line.can_calculate { "✓" } else { "✗" };
            println!(
                "    {} {} — {} {} → {}",
                mark,
                line.item_name,
                line.quantity.normalize(),
                line.unit,
                money(config, line.total_cost)
            );
        }
    }

    if !breakdown.sub_recipe_costs.is_empty() {
        println!();
        println!("  Sub-recipes:");
        for line in &breakdown.sub_recipe_costs {
            let mark = if line.can_calculate { "✓" } else { "✗" };
            println!(
                "    {} {} — ×{} → {}",
                mark,
                line.recipe_name,
                line.quantity.normalize(),
                money(config, line.total_cost)
            );
        }
    }

    if !breakdown.errors.is_empty() {
        println!();
        println!("  Problems:");
        for error in &breakdown.errors {
            println!("    ! {}", error);
        }
    }

    println!();
}

fn cmd_check(data_dir: &Path, config: &Config, recipe: &str, children: &[String]) -> Result<()> {
    let data = load_dataset(data_dir, config)?;
    let recipe_id = find_recipe(&data, recipe)?.id;

    let child_ids = children
        .iter()
        .map(|c| find_recipe(&data, c).map(|r| r.id))
        .collect::<Result<Vec<_>>>()?;

    if would_create_cycle(&data, recipe_id, &child_ids) {
        println!("✗ Attaching would create a cyclic dependency or self-reference");
        return Err(Error::CycleDetected { recipe_id });
    }

    println!("✓ Safe to attach: no cycle or self-reference");
    Ok(())
}

fn cmd_menu(data_dir: &Path, config: &Config, menu: &str, json: bool) -> Result<()> {
    let data = load_dataset(data_dir, config)?;
    let menu = find_menu(&data, menu)?;

    let pricing = price_menu(&data, menu);

    if json {
        println!("{}", serde_json::to_string_pretty(&pricing)?);
        return Ok(());
    }

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  MENU PRICING");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  {}", pricing.menu_name);
    println!("  Head count: {}", pricing.target_head_count);
    println!("  Markup: {}%", pricing.markup_percentage.normalize());
    println!();

    for segment in &pricing.segments {
        println!("  {} — {}", segment.name, money(config, segment.total_cost));
        for item in &segment.items {
            let mark = if item.can_calculate { "✓" } else { "✗" };
            println!(
                "    {} {} ×{} → {} (sells {})",
                mark,
                item.recipe_name,
                item.quantity.normalize(),
                money(config, item.base_cost),
                money(config, item.selling_price)
            );
        }
    }

    println!();
    println!("  Cost per person:     {}", money(config, pricing.total_cost));
    println!(
        "  Selling per person:  {}",
        money(config, pricing.selling_price_per_person)
    );
    println!(
        "  Total selling price: {}",
        money(config, pricing.total_selling_price)
    );

    if !pricing.errors.is_empty() {
        println!();
        println!("  Problems:");
        for error in &pricing.errors {
            println!("    ! {}", error);
        }
    }
    println!();

    Ok(())
}

fn cmd_seed(data_dir: &Path, force: bool) -> Result<()> {
    let path = dataset_path(data_dir);
    if path.exists() && !force {
        return Err(Error::Store(format!(
            "dataset already exists at {} (use --force to overwrite)",
            path.display()
        )));
    }

    let data = demo::build_demo_dataset();
    data.save(&path)?;

    println!("✓ Seeded demo dataset");
    println!("  {} items, {} recipes, {} menus", data.items.len(), data.recipes.len(), data.menus.len());
    println!("  Dataset: {}", path.display());

    Ok(())
}
