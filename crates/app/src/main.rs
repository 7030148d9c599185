use engine::{Session, User};

use crate::error::Result;

mod commands;
mod error;
mod ledger;
mod output;
mod settings;

fn main() -> Result<()> {
    let (settings, command) = settings::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "spendlens={level},engine={level}",
            level = settings.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let user = User::new(&settings.username, settings.password.as_str())?;
    let session = Session::with_policy(user, settings.policy);

    if let Some(path) = &settings.ledger {
        let rows = ledger::read(path)?;
        let (_added, rejected) = session.load(rows)?;
        if !rejected.is_empty() {
            tracing::warn!("{} ledger rows were skipped", rejected.len());
        }
    } else {
        tracing::info!("no ledger configured, starting with an empty store");
    }

    let out = commands::run(&session, &command, settings.format)?;
    println!("{out}");
    Ok(())
}
