use std::{env, fs, path::PathBuf, process::exit};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};

use caos_application::prelude as flows;
use caos_core::{
    entities::{time::TimestampMs, user::*},
    usecases,
};
use caos_db_mem::Connections;

const ENV_DB: &str = "CAOS_DB";
const ENV_STORAGE_ROOT: &str = "CAOS_STORAGE_ROOT";
const ENV_BACKUP_DIR: &str = "CAOS_BACKUP_DIR";

#[derive(Parser)]
#[command(name = "caosdb", version, about = "Operator CLI for the Caos editorial engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a backup of the database or the media folders.
    Backup {
        #[command(subcommand)]
        what: BackupTarget,
    },
    /// Verify that the environment is configured.
    CheckEnv,
    /// Self-check of the access policy against canonical fixtures.
    CheckPermissions,
    /// Purge archived proposals older than the given age.
    HistoryCleanup {
        /// Minimum age in days of the archived records to purge.
        #[arg(long, default_value_t = 90)]
        days: u32,
    },
}

#[derive(Subcommand)]
enum BackupTarget {
    Db,
    Media,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let outcome = match cli.command {
        Command::Backup {
            what: BackupTarget::Db,
        } => backup_db(),
        Command::Backup {
            what: BackupTarget::Media,
        } => backup_media(),
        Command::CheckEnv => check_env(),
        Command::CheckPermissions => check_permissions(),
        Command::HistoryCleanup { days } => history_cleanup(days),
    };
    if let Err(err) = outcome {
        eprintln!("ERROR: {err:#}");
        exit(1);
    }
    Ok(())
}

fn backup_dir() -> Result<PathBuf> {
    let dir = PathBuf::from(env::var(ENV_BACKUP_DIR).unwrap_or_else(|_| "backups".into()));
    fs::create_dir_all(&dir)
        .with_context(|| format!("Cannot create backup directory {}", dir.display()))?;
    Ok(dir)
}

fn backup_db() -> Result<()> {
    let db_path = PathBuf::from(
        env::var(ENV_DB).map_err(|_| anyhow!("{ENV_DB} is not set; nothing to back up"))?,
    );
    if !db_path.is_file() {
        return Err(anyhow!("Database file {} not found", db_path.display()));
    }
    let stamp = TimestampMs::now().into_seconds();
    let target = backup_dir()?.join(format!("caosdb-{stamp}.bak"));
    fs::copy(&db_path, &target)
        .with_context(|| format!("Copying {} failed", db_path.display()))?;
    println!("Database backed up to {}", target.display());
    Ok(())
}

fn copy_tree(from: &PathBuf, to: &PathBuf) -> Result<u64> {
    fs::create_dir_all(to)?;
    let mut copied = 0;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let source = entry.path();
        let target = to.join(entry.file_name());
        if source.is_dir() {
            copied += copy_tree(&source, &target)?;
        } else {
            fs::copy(&source, &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

fn backup_media() -> Result<()> {
    let root = PathBuf::from(
        env::var(ENV_STORAGE_ROOT)
            .map_err(|_| anyhow!("{ENV_STORAGE_ROOT} is not set; nothing to back up"))?,
    );
    if !root.is_dir() {
        return Err(anyhow!("Storage root {} not found", root.display()));
    }
    let stamp = TimestampMs::now().into_seconds();
    let target = backup_dir()?.join(format!("media-{stamp}"));
    let copied = copy_tree(&root, &target)?;
    println!("{copied} media files backed up to {}", target.display());
    Ok(())
}

fn check_env() -> Result<()> {
    let mut missing = Vec::new();
    for var in [ENV_DB, ENV_STORAGE_ROOT] {
        match env::var(var) {
            Ok(value) => println!("{var} = {value}"),
            Err(_) => {
                println!("{var} is NOT set");
                missing.push(var);
            }
        }
    }
    if missing.is_empty() {
        println!("Environment OK");
        Ok(())
    } else {
        Err(anyhow!("Missing environment variables: {}", missing.join(", ")))
    }
}

/// Replays the canonical permission fixtures against the access policy:
/// an owner, a collaborating minion, a foreign admin and a superuser.
fn check_permissions() -> Result<()> {
    let connections = Connections::init()?;
    {
        let conn = connections.exclusive()?;
        use caos_core::repositories::{UserRepo, WorldRepo};
        use caos_core::entities::world::World;
        conn.create_user(&User::new("owner", Rank::Admin))?;
        let mut minion = User::new("minion", Rank::Subadmin);
        minion.bosses.push("owner".into());
        conn.create_user(&minion)?;
        conn.create_user(&User::new("stranger", Rank::Explorer))?;
        let mut world = World::new("0101".parse().map_err(|e| anyhow!("{e}"))?, "W", Some("owner".into()));
        world.status = caos_core::entities::status::WorldStatus::Live;
        world.allow_proposals = false;
        conn.create_world(world)?;
    }

    let conn = connections.shared()?;
    use caos_core::repositories::WorldRepo;
    let world = conn.get_world(&"0101".parse().map_err(|e| anyhow!("{e}"))?)?;
    let owner = User::new("owner", Rank::Admin);
    let mut minion = User::new("minion", Rank::Subadmin);
    minion.bosses.push("owner".into());
    let stranger = User::new("stranger", Rank::Explorer);

    let checks = [
        (
            "owner has OWNER access",
            usecases::access_level(&*conn, &owner, &world)? == usecases::AccessLevel::Owner,
        ),
        (
            "minion can propose",
            usecases::can_propose_on(&*conn, &minion, &world)?,
        ),
        (
            "explorer cannot propose",
            !usecases::can_propose_on(&*conn, &stranger, &world).unwrap_or(false),
        ),
    ];
    let mut failed = 0;
    for (label, ok) in checks {
        println!("{} {label}", if ok { "PASS" } else { "FAIL" });
        if !ok {
            failed += 1;
        }
    }
    if failed > 0 {
        return Err(anyhow!("{failed} permission checks failed"));
    }
    println!("Permissions OK");
    Ok(())
}

fn history_cleanup(days: u32) -> Result<()> {
    let connections = Connections::init()?;
    let cutoff_ms =
        TimestampMs::now().into_inner() - i64::from(days) * 24 * 60 * 60 * 1000;
    let purged = flows::history_cleanup(&connections, TimestampMs::from_inner(cutoff_ms))
        .map_err(|e| anyhow!("{e}"))?;
    println!("Purged {purged} archived proposals older than {days} days");
    Ok(())
}
