use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, IsTerminal, Write};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::debug;

use margdarshi_client::{
    AuthGateway, ChatClient, ClientError, FileTokenStore, SessionDecoder, SessionGuard, SignupForm,
};
use margdarshi_shared::{telemetry::init_cli_telemetry, ClientConfig};

#[derive(Parser, Debug)]
#[command(
    name = "margdarshi",
    version,
    about = "Margdarshi - ask the Bhagavad Gita guide from your terminal"
)]
struct Cli {
    /// Base URL of the Margdarshi server
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// File holding the session token
    #[arg(long, global = true)]
    token_path: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and keep the session on disk
    Login {
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(long, env = "MARGDARSHI_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create an account (sign in afterwards)
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        age: String,
        #[arg(long, env = "MARGDARSHI_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Defaults to the password
        #[arg(long)]
        confirm_password: Option<String>,
    },
    /// Ask one question, or read questions line by line from stdin
    Ask { question: Vec<String> },
    /// Forget the stored session
    Logout,
    /// Show who is signed in
    Whoami,
}

struct Client {
    guard: Arc<SessionGuard>,
    gateway: AuthGateway,
    chat: ChatClient,
}

impl Client {
    fn from_config(cli: &Cli) -> Result<Self> {
        let config = ClientConfig::load().context("Failed to load client configuration")?;
        let base_url = cli.api_url.clone().unwrap_or(config.api.base_url);
        let token_path = cli
            .token_path
            .clone()
            .unwrap_or(config.session.token_path);

        let decoder = match config.session.verify_secret {
            Some(secret) if !secret.is_empty() => SessionDecoder::verified(secret),
            _ => SessionDecoder::unverified(),
        };
        debug!(
            "Using {} (token at {}, signature check: {})",
            base_url,
            token_path,
            decoder.verifies_signature()
        );

        let store = Arc::new(FileTokenStore::new(token_path));
        let guard = Arc::new(SessionGuard::new(store, decoder));
        guard.initialize();

        Ok(Self {
            gateway: AuthGateway::new(&base_url, guard.clone()),
            chat: ChatClient::new(&base_url, guard.clone()),
            guard,
        })
    }
}

/// Prompt on stderr and read a password with echo off. Piped input is read
/// as a plain line.
fn read_secret(prompt: &str) -> Result<String> {
    eprint!("{}", prompt);
    io::stderr().flush()?;

    if !io::stdin().is_terminal() {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        return Ok(line.trim_end_matches(['\r', '\n']).to_string());
    }

    terminal::enable_raw_mode()?;
    let typed = read_hidden_line();
    terminal::disable_raw_mode()?;
    eprintln!();
    typed
}

fn read_hidden_line() -> Result<String> {
    let mut secret = String::new();
    loop {
        if let Event::Key(key) = event::read()? {
            match apply_key(&mut secret, key) {
                SecretInput::Continue => {}
                SecretInput::Done => return Ok(secret),
                SecretInput::Cancelled => bail!("Cancelled"),
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum SecretInput {
    Continue,
    Done,
    Cancelled,
}

fn apply_key(secret: &mut String, key: KeyEvent) -> SecretInput {
    if key.kind != KeyEventKind::Press {
        return SecretInput::Continue;
    }
    match key.code {
        KeyCode::Enter => SecretInput::Done,
        KeyCode::Esc => SecretInput::Cancelled,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            SecretInput::Cancelled
        }
        KeyCode::Backspace => {
            secret.pop();
            SecretInput::Continue
        }
        KeyCode::Char(c) => {
            secret.push(c);
            SecretInput::Continue
        }
        _ => SecretInput::Continue,
    }
}

async fn ask_one(client: &Client, question: &str) -> Result<(), ClientError> {
    let reply = client.chat.ask(question).await?;
    println!("{}", reply.answer);
    Ok(())
}

async fn run(cli: Cli) -> Result<Result<(), ClientError>> {
    let client = Client::from_config(&cli)?;

    let outcome = match cli.command {
        Command::Login { email, password } => {
            let password = match password {
                Some(p) => p,
                None => read_secret("Password: ")?,
            };
            client.gateway.login(&email, &password).await.map(|session| {
                println!("Welcome, {}!", session.claims.display_name);
            })
        }
        Command::Signup {
            name,
            email,
            age,
            password,
            confirm_password,
        } => {
            let password = match password {
                Some(p) => p,
                None => read_secret("Password: ")?,
            };
            let form = SignupForm {
                name,
                email,
                age,
                confirm_password: confirm_password.unwrap_or_else(|| password.clone()),
                password,
            };
            client.gateway.signup(&form).await.map(|message| println!("{}", message))
        }
        Command::Ask { question } if !question.is_empty() => {
            ask_one(&client, &question.join(" ")).await
        }
        Command::Ask { .. } => {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                match ask_one(&client, &line).await {
                    Err(ClientError::Unauthorized) => return Ok(Err(ClientError::Unauthorized)),
                    Err(e) => eprintln!("{}", e),
                    Ok(()) => {}
                }
            }
            Ok(())
        }
        Command::Logout => client.gateway.logout().map(|_| println!("Signed out.")),
        Command::Whoami => client.guard.require_session().map(|session| {
            println!(
                "{} <{}> (session valid until {})",
                session.claims.display_name,
                session.claims.email,
                format_expiry(session.claims.expires_at)
            );
        }),
    };

    Ok(outcome)
}

fn format_expiry(epoch_seconds: i64) -> String {
    DateTime::<Utc>::from_timestamp(epoch_seconds, 0)
        .map(|at| at.to_rfc2822())
        .unwrap_or_else(|| epoch_seconds.to_string())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_cli_telemetry();

    match run(Cli::parse()).await? {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(ClientError::Unauthorized) => {
            eprintln!("You are not signed in. Run `margdarshi login` first.");
            Ok(ExitCode::from(2))
        }
        Err(e) => {
            eprintln!("{}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_ask_joins_words() {
        let cli = Cli::try_parse_from(["margdarshi", "ask", "What", "is", "dharma?"]).unwrap();
        match cli.command {
            Command::Ask { question } => assert_eq!(question.join(" "), "What is dharma?"),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_overrides() {
        let cli = Cli::try_parse_from([
            "margdarshi",
            "whoami",
            "--api-url",
            "http://localhost:9000",
            "--token-path",
            "/tmp/token",
        ])
        .unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://localhost:9000"));
        assert_eq!(cli.token_path.as_deref(), Some("/tmp/token"));
    }

    #[test]
    fn test_secret_keys() {
        let mut secret = String::new();
        for c in "gandivx".chars() {
            let outcome = apply_key(&mut secret, KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
            assert_eq!(outcome, SecretInput::Continue);
        }
        apply_key(&mut secret, KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE));
        apply_key(&mut secret, KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE));

        let release = KeyEvent {
            kind: KeyEventKind::Release,
            ..KeyEvent::new(KeyCode::Char('z'), KeyModifiers::NONE)
        };
        assert_eq!(apply_key(&mut secret, release), SecretInput::Continue);

        assert_eq!(
            apply_key(&mut secret, KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)),
            SecretInput::Done
        );
        assert_eq!(secret, "gandiva");
    }

    #[test]
    fn test_secret_cancel() {
        let mut secret = String::new();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(apply_key(&mut secret, ctrl_c), SecretInput::Cancelled);
        assert!(secret.is_empty());
    }

    #[test]
    fn test_format_expiry() {
        assert!(format_expiry(0).contains("1970"));
        assert_eq!(format_expiry(i64::MAX), i64::MAX.to_string());
    }
}
