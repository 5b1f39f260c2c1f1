//! Account and session commands.

use anyhow::Result;
use shelf_core::AppContext;
use shelf_core::api::decode;
use shelf_core::api::queries::{self, LoginUserData, RegisterUserData};
use shelf_core::models::{AuthPayload, LoginUserInput, RegisterUserInput};

use super::write;

pub async fn register(ctx: &AppContext, input: RegisterUserInput) -> Result<()> {
    let data = write(ctx, &queries::register_user(&input)).await?;
    let payload = decode::<RegisterUserData>(&data)?.payload;
    let name = store(ctx, payload);
    println!("Registered and logged in as {name}");
    Ok(())
}

pub async fn login(ctx: &AppContext, username: String, password: String) -> Result<()> {
    let input = LoginUserInput { username, password };
    let data = write(ctx, &queries::login_user(&input)).await?;
    let payload = decode::<LoginUserData>(&data)?.payload;
    let name = store(ctx, payload);
    println!("Logged in as {name}");
    Ok(())
}

fn store(ctx: &AppContext, payload: AuthPayload) -> String {
    let name = payload.user.username.clone();
    ctx.session.set_session(payload.user, payload.token);
    name
}

pub fn logout(ctx: &AppContext) {
    ctx.logout();
    println!("Logged out.");
}

pub fn whoami(ctx: &AppContext) {
    match ctx.session.user() {
        Some(user) => println!("{} ({})", user.username, user.id),
        None => println!("Not logged in."),
    }
}
