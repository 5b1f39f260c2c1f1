//! Category commands.

use anyhow::Result;
use shelf_core::AppContext;
use shelf_core::api::decode;
use shelf_core::api::queries::{self, CategoriesData, CreateCategoryData};
use shelf_core::models::CreateCategoryInput;

use super::{read, write};
use crate::cli::output;

pub async fn list(ctx: &AppContext) -> Result<()> {
    let categories = read::<CategoriesData>(ctx, &queries::get_categories())
        .await?
        .categories;
    if categories.is_empty() {
        println!("No categories found.");
        return Ok(());
    }
    let mut table = output::table(&["ID", "Title", "Description", "Parent"]);
    for category in &categories {
        table.add_row(vec![
            category.id.as_str(),
            category.title.as_str(),
            category.description.as_str(),
            category.parent_category_id.as_deref().unwrap_or("-"),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub async fn create(
    ctx: &AppContext,
    title: &str,
    description: &str,
    icon: &str,
    parent: &str,
) -> Result<()> {
    let input = CreateCategoryInput::new(title, description, icon, parent);
    let data = write(ctx, &queries::create_category(&input)).await?;
    let category = decode::<CreateCategoryData>(&data)?.category;
    println!("Category created! {} ({})", category.title, category.id);
    Ok(())
}
