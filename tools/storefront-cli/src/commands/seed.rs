//! Load the demo catalog.
//!
//! Seeding is idempotent: rows are matched by slug (or name for materials)
//! and only missing ones are created, so the command can run on every
//! deploy.

use anyhow::{Context as _, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use storefront_commerce::catalog::{slugify, Catalog, NewCategory, NewProduct, NewTerm};
use storefront_commerce::coupons::{CouponBook, CouponDiscount, NewCoupon};
use storefront_commerce::{BrandId, CategoryId, Currency, MaterialId, Money};
use storefront_db::Db;

use super::SeedArgs;
use crate::context::Context;
use crate::output::Output;

const CATEGORIES: [(&str, &str); 4] = [
    ("Sofás", "Sofás y sillones confortables"),
    ("Mesas", "Mesas para sala y comedor"),
    ("Sillas", "Sillas y taburetes"),
    ("Camas", "Camas y colchones"),
];

const BRANDS: [&str; 4] = ["IKEA", "Möbel", "HomeStyle", "Design Pro"];

const MATERIALS: [&str; 6] = ["Madera", "Cuero", "Tela", "Acero", "Metal", "Cristal"];

const DEMO_STOCK: i64 = 50;

struct DemoProduct {
    name: &'static str,
    sku: &'static str,
    description: &'static str,
    category: &'static str,
    brand: &'static str,
    price_cents: i64,
    materials: &'static [&'static str],
    featured: bool,
    new: bool,
}

const PRODUCTS: [DemoProduct; 7] = [
    DemoProduct {
        name: "Sofá Clásico Gris",
        sku: "SOFA-CLASSIC-GRAY",
        description: "Sofá cómodo con diseño clásico",
        category: "Sofás",
        brand: "IKEA",
        price_cents: 59_999,
        materials: &["Tela", "Madera"],
        featured: true,
        new: false,
    },
    DemoProduct {
        name: "Sofá Moderno Negro",
        sku: "SOFA-MODERN-BLACK",
        description: "Sofá contemporáneo con líneas limpias",
        category: "Sofás",
        brand: "Design Pro",
        price_cents: 89_999,
        materials: &["Cuero", "Metal"],
        featured: false,
        new: true,
    },
    DemoProduct {
        name: "Mesa Comedor Madera",
        sku: "TABLE-DINING-WOOD",
        description: "Mesa de comedor en madera maciza",
        category: "Mesas",
        brand: "Möbel",
        price_cents: 44_999,
        materials: &["Madera"],
        featured: true,
        new: false,
    },
    DemoProduct {
        name: "Mesa Centro Cristal",
        sku: "TABLE-CENTER-GLASS",
        description: "Mesa de centro con base de acero",
        category: "Mesas",
        brand: "HomeStyle",
        price_cents: 29_999,
        materials: &["Acero", "Cristal"],
        featured: false,
        new: true,
    },
    DemoProduct {
        name: "Silla Comedor",
        sku: "CHAIR-DINING-WOOD",
        description: "Silla cómoda para comedor",
        category: "Sillas",
        brand: "IKEA",
        price_cents: 14_999,
        materials: &["Madera", "Tela"],
        featured: false,
        new: false,
    },
    DemoProduct {
        name: "Cama Matrimonio",
        sku: "BED-QUEEN-WOOD",
        description: "Cama tamaño matrimonio con cabecera",
        category: "Camas",
        brand: "Design Pro",
        price_cents: 129_999,
        materials: &["Madera", "Metal"],
        featured: true,
        new: false,
    },
    DemoProduct {
        name: "Sillón Reclinable Cuero",
        sku: "ARMCHAIR-RECLINER-LEATHER",
        description: "Sillón reclinable tapizado en cuero",
        category: "Sofás",
        brand: "Möbel",
        price_cents: 74_999,
        materials: &["Cuero", "Madera"],
        featured: false,
        new: true,
    },
];

/// Rows created by one seeding run.
#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct SeedSummary {
    pub categories: usize,
    pub brands: usize,
    pub materials: usize,
    pub products: usize,
    pub coupons: usize,
}

/// Run the seed command.
pub async fn run(args: SeedArgs, ctx: &Context) -> Result<()> {
    let db = ctx.open_db().await?;

    ctx.output.header("Seeding demo data");
    let summary = seed(&db, !args.no_coupons, &ctx.output).await?;

    if ctx.output.is_json() {
        ctx.output.json(&summary);
        return Ok(());
    }

    ctx.output.kv("categories", &summary.categories.to_string());
    ctx.output.kv("brands", &summary.brands.to_string());
    ctx.output.kv("materials", &summary.materials.to_string());
    ctx.output.kv("products", &summary.products.to_string());
    ctx.output.kv("coupons", &summary.coupons.to_string());
    ctx.output.success("Demo data loaded");

    Ok(())
}

/// Create whatever part of the demo data is missing.
pub async fn seed(db: &Db, with_coupons: bool, output: &Output) -> Result<SeedSummary> {
    let catalog = Catalog::new(db.clone());
    let mut summary = SeedSummary::default();

    let steps = CATEGORIES.len() + BRANDS.len() + MATERIALS.len() + PRODUCTS.len();
    let pb = output.progress(steps as u64, "catalog");

    let mut categories: Vec<(&str, CategoryId)> = Vec::new();
    for (name, description) in CATEGORIES {
        let id = match catalog.find_category(&slugify(name)).await? {
            Some(id) => id,
            None => {
                summary.categories += 1;
                catalog
                    .create_category(NewCategory {
                        name: name.to_string(),
                        description: description.to_string(),
                        parent_id: None,
                    })
                    .await?
                    .id
            }
        };
        categories.push((name, id));
        pb.inc(1);
    }

    let mut brands: Vec<(&str, BrandId)> = Vec::new();
    for name in BRANDS {
        let id = match catalog.find_brand(&slugify(name)).await? {
            Some(id) => id,
            None => {
                summary.brands += 1;
                catalog
                    .create_brand(NewTerm::new(name, format!("Muebles {name}")))
                    .await?
                    .id
            }
        };
        brands.push((name, id));
        pb.inc(1);
    }

    let mut materials: Vec<(&str, MaterialId)> = Vec::new();
    for name in MATERIALS {
        let id = match catalog.find_material(name).await? {
            Some(material) => material.id,
            None => {
                summary.materials += 1;
                catalog
                    .create_material(NewTerm::new(name, format!("{name} de alta calidad")))
                    .await?
                    .id
            }
        };
        materials.push((name, id));
        pb.inc(1);
    }

    for product in &PRODUCTS {
        pb.set_message(product.sku);
        if catalog.find_product(&slugify(product.name)).await?.is_none() {
            catalog
                .create_product(NewProduct {
                    name: product.name.to_string(),
                    slug: None,
                    sku: product.sku.to_string(),
                    description: product.description.to_string(),
                    category_id: Some(lookup(&categories, product.category)?),
                    brand_id: Some(lookup(&brands, product.brand)?),
                    price: Money::new(product.price_cents, Currency::PEN),
                    sale_price: None,
                    stock: DEMO_STOCK,
                    is_featured: product.featured,
                    is_new: product.new,
                    material_ids: product
                        .materials
                        .iter()
                        .map(|m| lookup(&materials, m))
                        .collect::<Result<_>>()?,
                })
                .await?;
            summary.products += 1;
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    if with_coupons {
        summary.coupons = seed_coupons(&CouponBook::new(db.clone())).await?;
    }

    Ok(summary)
}

async fn seed_coupons(book: &CouponBook) -> Result<usize> {
    let demo = [
        ("WELCOME10", CouponDiscount::Percent(Decimal::from(10))),
        ("FLAT25", CouponDiscount::Amount(Decimal::from(25))),
    ];

    let existing = book.list().await?;
    let mut created = 0;
    for (code, discount) in demo {
        if existing.iter().any(|c| c.code == code) {
            continue;
        }
        book.create(NewCoupon {
            code: code.to_string(),
            discount,
        })
        .await?;
        created += 1;
    }
    Ok(created)
}

fn lookup<T: Copy>(ids: &[(&str, T)], name: &str) -> Result<T> {
    ids.iter()
        .find(|(n, _)| *n == name)
        .map(|(_, id)| *id)
        .with_context(|| format!("demo data references unknown entry {name}"))
}
