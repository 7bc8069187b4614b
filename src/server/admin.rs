//! Administrative command handlers.
//!
//! Operators seed the first administrator with `create-user --role admin`,
//! since the HTTP API only ever registers members.

use anyhow::{Context, Result, bail};
use argon2::{Algorithm, Argon2, ParamsBuilder, Version};
use chrono::Utc;

use super::{
    AppConfig,
    Commands,
    cli::{CreateUserArgs, SetActiveArgs, SetRoleArgs},
    daemon::setup_database,
};
use crate::{db, forum::validate, models::NewUser, users::hash_password};

/// Execute an administrative command.
///
/// # Errors
///
/// Propagates validation failures and database errors.
pub async fn run_command(command: Commands, cfg: &AppConfig) -> Result<()> {
    match command {
        Commands::CreateUser(args) => run_create_user(args, cfg).await,
        Commands::SetRole(args) => run_set_role(args, cfg).await,
        Commands::SetActive(args) => run_set_active(args, cfg).await,
    }
}

/// Build an Argon2 instance using the supplied configuration parameters.
///
/// # Errors
///
/// Returns any error emitted while constructing the Argon2 parameter set.
pub fn argon2_from_config(cfg: &AppConfig) -> Result<Argon2<'static>> {
    let params = ParamsBuilder::new()
        .m_cost(cfg.argon2_m_cost)
        .t_cost(cfg.argon2_t_cost)
        .p_cost(cfg.argon2_p_cost)
        .build()
        .with_context(|| {
            format!(
                "invalid Argon2 params derived from config: m_cost={}, t_cost={}, p_cost={}",
                cfg.argon2_m_cost, cfg.argon2_t_cost, cfg.argon2_p_cost
            )
        })?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

#[expect(clippy::print_stdout, reason = "command reports its outcome to the operator")]
async fn run_create_user(args: CreateUserArgs, cfg: &AppConfig) -> Result<()> {
    validate::username(&args.username)?;
    validate::email(&args.email)?;
    validate::password(&args.password)?;

    let argon2 = argon2_from_config(cfg)?;
    let hashed = hash_password(&argon2, &args.password)?;
    let pool = setup_database(cfg).await?;
    let mut conn = pool.get().await.context("failed to get db connection")?;
    match db::find_taken(&mut conn, &args.username, &args.email).await? {
        (true, _) => bail!("username '{}' already taken", args.username),
        (_, true) => bail!("email '{}' already registered", args.email),
        (false, false) => {}
    }

    let created_at = Utc::now().naive_utc();
    let user = db::create_user(
        &mut conn,
        &NewUser {
            username: &args.username,
            email: &args.email,
            password_hash: &hashed,
            first_name: None,
            last_name: None,
            display_name: None,
            bio: None,
            role: args.role.as_str(),
            is_active: true,
            post_count: 0,
            thread_count: 0,
            created_at,
            updated_at: created_at,
        },
    )
    .await
    .with_context(|| format!("failed to create user '{}'", args.username))?;
    println!("User {} created with id {} as {}", user.username, user.id, args.role);
    Ok(())
}

#[expect(clippy::print_stdout, reason = "command reports its outcome to the operator")]
async fn run_set_role(args: SetRoleArgs, cfg: &AppConfig) -> Result<()> {
    let pool = setup_database(cfg).await?;
    let mut conn = pool.get().await.context("failed to get db connection")?;
    let touched = db::set_user_role(&mut conn, &args.username, args.role)
        .await
        .with_context(|| format!("failed to update role of '{}'", args.username))?;
    if touched == 0 {
        bail!("no user named '{}'", args.username);
    }
    println!("User {} is now {}", args.username, args.role);
    Ok(())
}

#[expect(clippy::print_stdout, reason = "command reports its outcome to the operator")]
async fn run_set_active(args: SetActiveArgs, cfg: &AppConfig) -> Result<()> {
    let pool = setup_database(cfg).await?;
    let mut conn = pool.get().await.context("failed to get db connection")?;
    let Some(user) = db::get_user_by_name(&mut conn, &args.username).await? else {
        bail!("no user named '{}'", args.username);
    };
    db::set_user_active(&mut conn, user.id, args.active)
        .await
        .with_context(|| format!("failed to update status of '{}'", args.username))?;
    let status = if args.active { "active" } else { "banned" };
    println!("User {} is now {status}", args.username);
    Ok(())
}
