use std::{error::Error, io::Write};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{Engine, EngineError};
use migration::MigratorTrait;
use sea_orm::Database;

#[derive(Parser, Debug)]
#[command(name = "splitledger_admin")]
#[command(about = "Admin utilities for Splitledger (bootstrap users, friends and groups)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./splitledger.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Friend(Friend),
    Group(Group),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
}

#[derive(Args, Debug)]
struct Friend {
    #[command(subcommand)]
    command: FriendCommand,
}

#[derive(Subcommand, Debug)]
enum FriendCommand {
    Add(FriendAddArgs),
}

#[derive(Args, Debug)]
struct FriendAddArgs {
    /// Email of the user adding the friend.
    #[arg(long)]
    email: String,
    #[arg(long)]
    friend_email: String,
}

#[derive(Args, Debug)]
struct Group {
    #[command(subcommand)]
    command: GroupCommand,
}

#[derive(Subcommand, Debug)]
enum GroupCommand {
    Create(GroupCreateArgs),
}

#[derive(Args, Debug)]
struct GroupCreateArgs {
    #[arg(long)]
    admin_email: String,
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    description: String,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let p1 = prompt_password("Password: ")?;
        if p1.is_empty() {
            execute!(
                out,
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::CurrentLine),
                Print("Password must not be empty.\r\n")
            )?;
            continue;
        }

        let p2 = prompt_password("Confirm password: ")?;
        if p1 == p2 {
            return Ok(p1);
        }

        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print("Passwords do not match. Try again.\r\n")
        )?;
    }

    Err("too many attempts".into())
}

async fn connect_engine(database_url: &str) -> Result<Engine, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(Engine::builder().database(db).build().await?)
}

/// Exit with a readable message on lookup and conflict errors.
fn exit_on_user_error(err: EngineError) -> Box<dyn Error + Send + Sync> {
    match err {
        EngineError::KeyNotFound(_) | EngineError::ExistingKey(_) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
        EngineError::Validation(_) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
        other => other.into(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let engine = connect_engine(&cli.database_url).await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt_password_twice()?;
            let user = engine
                .signup(&args.name, &args.email, &password)
                .await
                .map_err(exit_on_user_error)?;
            println!("created user: {} ({})", user.email, user.id);
        }
        Command::Friend(Friend {
            command: FriendCommand::Add(args),
        }) => {
            let user = engine
                .user_by_email(&args.email)
                .await
                .map_err(exit_on_user_error)?;
            let friend = engine
                .add_friend(&user.id, &args.friend_email)
                .await
                .map_err(exit_on_user_error)?;
            println!("{} and {} are now friends", user.email, friend.email);
        }
        Command::Group(Group {
            command: GroupCommand::Create(args),
        }) => {
            let admin = engine
                .user_by_email(&args.admin_email)
                .await
                .map_err(exit_on_user_error)?;
            let group = engine
                .create_group(&admin.id, &args.name, &args.description)
                .await
                .map_err(exit_on_user_error)?;
            println!("created group: {} ({})", group.name, group.id);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_group_create() {
        let cli = Cli::try_parse_from([
            "splitledger_admin",
            "--database-url",
            "sqlite::memory:",
            "group",
            "create",
            "--admin-email",
            "alice@example.com",
            "--name",
            "Flat",
        ])
        .unwrap();
        let Command::Group(Group {
            command: GroupCommand::Create(args),
        }) = cli.command
        else {
            panic!("expected group create");
        };
        assert_eq!(args.admin_email, "alice@example.com");
        assert_eq!(args.description, "");
    }

    #[test]
    fn friend_add_needs_both_emails() {
        assert!(
            Cli::try_parse_from(["splitledger_admin", "friend", "add", "--email", "a@example.com"])
                .is_err()
        );
    }
}
