//! User commands.

use anyhow::{Context, Result};
use shelf_core::AppContext;
use shelf_core::api::queries::{self, UserData, UsersData};

use super::read;
use crate::cli::output;

pub async fn list(ctx: &AppContext) -> Result<()> {
    let users = read::<UsersData>(ctx, &queries::get_users()).await?.users;
    if users.is_empty() {
        println!("No users found.");
        return Ok(());
    }
    let mut table = output::table(&["ID", "Username", "Nationality"]);
    for user in &users {
        table.add_row(vec![
            user.id.as_str(),
            user.username.as_str(),
            user.nationality.as_str(),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub async fn show(ctx: &AppContext, id: &str) -> Result<()> {
    let user = read::<UserData>(ctx, &queries::get_user(Some(id)))
        .await?
        .user
        .context("User not found")?;
    println!("{} ({})", user.username, user.id);
    if !user.nationality.is_empty() {
        println!("Nationality: {}", user.nationality);
    }
    if !user.birth_date.is_empty() {
        println!("Born: {}", user.birth_date);
    }
    if !user.bio.is_empty() {
        println!();
        println!("{}", user.bio);
    }
    Ok(())
}
