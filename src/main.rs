use agrostock_auth::auth::{authorize, visible_tabs, CredentialAuthority, SessionSlot};
use agrostock_auth::config::AuthConfig;
use agrostock_auth::error::ErrorResponse;
use agrostock_auth::ViewSection;
use log::error;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

const HELP: &str = "commands: login <user> <password> | whoami | tabs | open <section> | users | logout | demo | quit";

const DEMO_ACCOUNTS: &str = "Demo accounts:
  Admin:        admin / admin123
  Farmer:       farmer / farmer123
  Veterinarian: vet / vet123";

fn main() -> ExitCode {
    env_logger::init();

    let config = match AuthConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let (authority, mut slot) = match agrostock_auth::bootstrap(&config) {
        Ok(parts) => parts,
        Err(e) => {
            error!("Failed to load principals: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("AgroStock Analytics. {}", HELP);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to read input: {}", e);
                return ExitCode::FAILURE;
            }
        };
        if !handle(&authority, &mut slot, &line) {
            break;
        }
        if let Err(e) = stdout.flush() {
            error!("Failed to flush output: {}", e);
        }
    }

    slot.logout();
    ExitCode::SUCCESS
}

/// Run one command. Returns `false` when the loop should stop.
fn handle(authority: &CredentialAuthority, slot: &mut SessionSlot, line: &str) -> bool {
    let mut words = line.split_whitespace();
    let command = match words.next() {
        Some(command) => command,
        None => return true,
    };

    match command {
        "login" => {
            let (username, password) = match credentials(words.next(), words.next()) {
                Some(pair) => pair,
                None => {
                    println!("Please enter both username and password");
                    return true;
                }
            };
            match slot.login(authority, username, password) {
                Ok(session) => {
                    println!("Welcome! [{}]", session.role.label());
                    println!("Farm: {}", session.display_name);
                    println!("Tabs: {}", visible_tabs(session.role).join(" | "));
                }
                Err(e) => report(ErrorResponse::from(e)),
            }
        }
        "whoami" => match slot.current() {
            Some(session) => println!(
                "{} [{}] {} since {}",
                session.identity,
                session.role.label(),
                session.display_name,
                session.issued_at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            None => println!("Not logged in"),
        },
        "tabs" => match slot.current() {
            Some(session) => println!("{}", visible_tabs(session.role).join(" | ")),
            None => println!("Not logged in"),
        },
        "open" => {
            let section = match words.next().map(str::parse::<ViewSection>) {
                Some(Ok(section)) => section,
                Some(Err(e)) => {
                    println!("{}", e);
                    return true;
                }
                None => {
                    println!("usage: open <section>");
                    return true;
                }
            };
            match slot.current() {
                Some(session) => match authorize(session, section) {
                    Ok(()) => println!("Showing {}", section.title()),
                    Err(e) => report(ErrorResponse::from(e)),
                },
                None => println!("Not logged in"),
            }
        }
        "users" => match slot.current() {
            Some(session) => match authority.user_directory(session) {
                Ok(entries) => {
                    for entry in entries {
                        println!(
                            "{:<10} {:<13} {:<24} {:<20} {}",
                            entry.username,
                            entry.role,
                            entry.contact_email,
                            entry.display_name,
                            entry.status
                        );
                    }
                }
                Err(e) => report(ErrorResponse::from(e)),
            },
            None => println!("Not logged in"),
        },
        "logout" => {
            if slot.logout().is_some() {
                println!("Logged out");
            }
        }
        "demo" => println!("{}", DEMO_ACCOUNTS),
        "quit" | "exit" => return false,
        _ => println!("{}", HELP),
    }
    true
}

/// Both fields must be filled in before a login attempt is made.
fn credentials<'a>(username: Option<&'a str>, password: Option<&'a str>) -> Option<(&'a str, &'a str)> {
    match (username, password) {
        (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
            Some((username, password))
        }
        _ => None,
    }
}

fn report(response: ErrorResponse) {
    match response.error_description {
        Some(description) => println!("{}", description),
        None => println!("{}", response.error),
    }
}
