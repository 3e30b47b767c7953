//! # Seed Data Generator
//!
//! Populates the database with a demo pizzeria menu for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./pizzeria.db (default)
//! cargo run -p pizzeria-db --bin seed
//!
//! # Specify database path
//! cargo run -p pizzeria-db --bin seed -- --db ./data/pizzeria.db
//! ```
//!
//! ## Generated Menu
//! - Build-your-own pizza, calzone, subs and sandwiches with shared
//!   customization groups (size, crust, sauce, toppings, bread, ...)
//! - Specialty pizzas and calzones
//! - Salads, sides, drinks, desserts (no customizations)
//! - The "Pizza Pair" promotion: second pizza half off

use chrono::{DateTime, Utc};
use std::env;
use uuid::Uuid;

use pizzeria_core::pricing::validate_group_config;
use pizzeria_core::{
    Category, CustomizationGroup, CustomizationOption, ItemKind, MenuItem, Promotion,
    PromotionKind, SelectionType, DEFAULT_PAIR_DISCOUNT_BPS,
};
use pizzeria_db::{Database, DbConfig};

/// (name, price modifier cents, is default)
type OptionSpec = (&'static str, i64, bool);

const PIZZA_SIZES: &[OptionSpec] = &[
    ("Small 10\"", 0, false),
    ("Medium 12\"", 300, true),
    ("Large 14\"", 600, false),
    ("X-Large 16\"", 900, false),
];

const CRUSTS: &[OptionSpec] = &[
    ("Hand Tossed", 0, true),
    ("Thin", 0, false),
    ("Deep Dish", 200, false),
    ("Stuffed Crust", 250, false),
    ("Gluten Free", 300, false),
];

const SAUCES: &[OptionSpec] = &[
    ("Red Sauce", 0, true),
    ("White Garlic", 0, false),
    ("BBQ", 50, false),
    ("Pesto", 100, false),
    ("No Sauce", 0, false),
];

const TOPPINGS: &[OptionSpec] = &[
    ("Pepperoni", 175, false),
    ("Italian Sausage", 175, false),
    ("Bacon", 200, false),
    ("Ham", 175, false),
    ("Grilled Chicken", 225, false),
    ("Mushrooms", 150, false),
    ("Green Peppers", 150, false),
    ("Onions", 150, false),
    ("Black Olives", 150, false),
    ("Jalapeños", 150, false),
    ("Pineapple", 150, false),
    ("Extra Cheese", 200, false),
    ("Fresh Basil", 0, false),
    ("Oregano", 0, false),
];

const BREADS: &[OptionSpec] = &[
    ("White Roll", 0, false),
    ("Wheat Roll", 0, false),
    ("Garlic Roll", 50, false),
];

const SUB_SIZES: &[OptionSpec] = &[("6\"", 0, true), ("12\"", 400, false)];

const SUB_EXTRAS: &[OptionSpec] = &[
    ("Lettuce", 0, false),
    ("Tomato", 0, false),
    ("Onion", 0, false),
    ("Pickles", 0, false),
    ("Banana Peppers", 0, false),
    ("Provolone", 100, false),
    ("Extra Meat", 250, false),
    ("No Mayo", 0, false),
];

/// (name, description, base price cents)
const SPECIALTY_PIZZAS: &[(&str, &str, i64)] = &[
    ("Meat Lovers", "Pepperoni, sausage, bacon and ham", 1899),
    ("Supreme", "Pepperoni, sausage, peppers, onions, mushrooms, olives", 1899),
    ("Margherita", "Fresh mozzarella, tomato and basil", 1599),
    ("BBQ Chicken", "BBQ sauce, grilled chicken, red onion", 1799),
    ("Hawaiian", "Ham and pineapple", 1699),
    ("Veggie", "Mushrooms, peppers, onions, olives, tomato", 1699),
];

const SPECIALTY_CALZONES: &[(&str, &str, i64)] = &[
    ("Steak & Cheese Calzone", "Shaved steak, onions, peppers, mozzarella", 1499),
    ("Buffalo Chicken Calzone", "Buffalo chicken, ricotta, mozzarella", 1399),
];

/// (category, kind, items: (name, price))
const SIMPLE_ITEMS: &[(&str, ItemKind, &[(&str, i64)])] = &[
    (
        "Salads",
        ItemKind::Salad,
        &[("Garden Salad", 799), ("Caesar Salad", 899), ("Greek Salad", 949)],
    ),
    (
        "Sides",
        ItemKind::Side,
        &[
            ("Garlic Knots (6)", 499),
            ("Mozzarella Sticks", 699),
            ("Buffalo Wings (10)", 1199),
            ("French Fries", 399),
        ],
    ),
    (
        "Drinks",
        ItemKind::Drink,
        &[("Fountain Soda", 249), ("2 Liter Soda", 399), ("Bottled Water", 199)],
    ),
    (
        "Desserts",
        ItemKind::Dessert,
        &[("Cannoli", 449), ("Tiramisu", 599), ("Chocolate Chip Cookie", 199)],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./pizzeria.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Pizzeria Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./pizzeria.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🍕 Pizzeria Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.menu().count_items().await?;
    if existing > 0 {
        println!("⚠ Database already has {} menu items", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();
    let seeder = Seeder { db: &db, now: Utc::now() };

    // Shared customization groups
    let pizza_size = seeder
        .group("Pizza Size", SelectionType::SingleSelect, true, None, PIZZA_SIZES)
        .await?;
    let crust = seeder
        .group("Crust", SelectionType::SingleSelect, false, None, CRUSTS)
        .await?;
    let sauce = seeder
        .group("Sauce", SelectionType::SingleSelect, false, None, SAUCES)
        .await?;
    let toppings = seeder
        .group("Toppings", SelectionType::MultiSelect, false, Some(8), TOPPINGS)
        .await?;
    let bread = seeder
        .group("Bread", SelectionType::SingleSelect, true, None, BREADS)
        .await?;
    let sub_size = seeder
        .group("Sub Size", SelectionType::SingleSelect, true, None, SUB_SIZES)
        .await?;
    let sub_extras = seeder
        .group("Sub Extras", SelectionType::MultiSelect, false, None, SUB_EXTRAS)
        .await?;
    println!("✓ Created 7 customization groups");

    let pizza_groups = [&pizza_size, &crust, &sauce, &toppings];
    let calzone_groups = [&sauce, &toppings];
    let sub_groups = [&sub_size, &bread, &sub_extras];

    // Pizzas
    let pizzas = seeder.category("Pizza", 0).await?;
    let byo = seeder
        .item(&pizzas, "Build Your Own Pizza", "Cheese pizza, your toppings", ItemKind::Pizza, 1199, false)
        .await?;
    seeder.attach(&byo, &pizza_groups).await?;
    for (name, description, cents) in SPECIALTY_PIZZAS {
        let id = seeder
            .item(&pizzas, name, description, ItemKind::Pizza, *cents, true)
            .await?;
        seeder.attach(&id, &pizza_groups).await?;
    }

    // Calzones
    let calzones = seeder.category("Calzones", 1).await?;
    let byo = seeder
        .item(&calzones, "Build Your Own Calzone", "Ricotta and mozzarella", ItemKind::Calzone, 1099, false)
        .await?;
    seeder.attach(&byo, &calzone_groups).await?;
    for (name, description, cents) in SPECIALTY_CALZONES {
        let id = seeder
            .item(&calzones, name, description, ItemKind::Calzone, *cents, true)
            .await?;
        seeder.attach(&id, &calzone_groups).await?;
    }

    // Subs & sandwiches
    let subs = seeder.category("Subs & Sandwiches", 2).await?;
    for (name, kind, cents) in [
        ("Italian Sub", ItemKind::Sub, 899),
        ("Meatball Parm Sub", ItemKind::Sub, 949),
        ("Chicken Parm Sub", ItemKind::Sub, 999),
        ("Turkey Club", ItemKind::Sandwich, 899),
        ("BLT", ItemKind::Sandwich, 799),
    ] {
        let id = seeder.item(&subs, name, "", kind, cents, false).await?;
        seeder.attach(&id, &sub_groups).await?;
    }

    // Everything without options
    for (sort, (category, kind, items)) in SIMPLE_ITEMS.iter().enumerate() {
        let category_id = seeder.category(category, 3 + sort as i64).await?;
        for (name, cents) in items.iter() {
            seeder.item(&category_id, name, "", *kind, *cents, false).await?;
        }
    }

    println!("✓ Created {} menu items", db.menu().count_items().await?);

    db.promotions()
        .insert(&Promotion {
            id: Uuid::new_v4().to_string(),
            name: "Pizza Pair".to_string(),
            description: Some("Buy two pizzas, the cheaper one is half off".to_string()),
            kind: PromotionKind::PizzaPairHalfOff,
            value: DEFAULT_PAIR_DISCOUNT_BPS as i64,
            min_subtotal_cents: 0,
            starts_at: None,
            ends_at: None,
            is_active: true,
            created_at: seeder.now,
            updated_at: seeder.now,
        })
        .await?;
    println!("✓ Created Pizza Pair promotion");

    println!();
    println!("✓ Seed complete in {:?}", start.elapsed());

    Ok(())
}

/// Inserts rows with shared timestamps.
struct Seeder<'a> {
    db: &'a Database,
    now: DateTime<Utc>,
}

impl Seeder<'_> {
    async fn category(&self, name: &str, sort_order: i64) -> Result<String, Box<dyn std::error::Error>> {
        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: None,
            sort_order,
            is_active: true,
            created_at: self.now,
            updated_at: self.now,
        };
        self.db.menu().insert_category(&category).await?;
        Ok(category.id)
    }

    async fn item(
        &self,
        category_id: &str,
        name: &str,
        description: &str,
        kind: ItemKind,
        base_price_cents: i64,
        is_specialty: bool,
    ) -> Result<String, Box<dyn std::error::Error>> {
        let item = MenuItem {
            id: Uuid::new_v4().to_string(),
            category_id: category_id.to_string(),
            name: name.to_string(),
            description: Some(description.to_string()).filter(|d| !d.is_empty()),
            kind,
            base_price_cents,
            image_url: None,
            is_specialty,
            is_active: true,
            sort_order: 0,
            created_at: self.now,
            updated_at: self.now,
        };
        self.db.menu().insert_item(&item).await?;
        Ok(item.id)
    }

    async fn group(
        &self,
        name: &str,
        selection_type: SelectionType,
        is_required: bool,
        max_selections: Option<i64>,
        options: &[OptionSpec],
    ) -> Result<String, Box<dyn std::error::Error>> {
        let group = CustomizationGroup {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: None,
            selection_type,
            is_required,
            min_selections: 0,
            max_selections,
            sort_order: 0,
            is_active: true,
            created_at: self.now,
            updated_at: self.now,
        };
        validate_group_config(&group)?;
        self.db.customizations().insert_group(&group).await?;

        for (sort_order, (option_name, cents, is_default)) in options.iter().enumerate() {
            let option = CustomizationOption {
                id: Uuid::new_v4().to_string(),
                group_id: group.id.clone(),
                name: option_name.to_string(),
                price_modifier_cents: *cents,
                is_default: *is_default,
                is_active: true,
                sort_order: sort_order as i64,
                created_at: self.now,
                updated_at: self.now,
            };
            self.db.customizations().insert_option(&option).await?;
        }

        Ok(group.id)
    }

    async fn attach(&self, item_id: &str, groups: &[&String]) -> Result<(), Box<dyn std::error::Error>> {
        for (sort_order, group_id) in groups.iter().enumerate() {
            self.db
                .customizations()
                .attach_group(item_id, group_id, sort_order as i64)
                .await?;
        }
        Ok(())
    }
}
