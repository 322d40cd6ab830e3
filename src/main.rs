use std::process::ExitCode;

use clap::Parser;

use shopchat::api::ApiClient;
use shopchat::app::{self, AppError};
use shopchat::auth::AuthSession;
use shopchat::config::{Cli, Command};
use shopchat::storage::KeyValueStore;
use shopchat::tracing_sub;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("shopchat: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let store = cli.store();
    let api = ApiClient::new(&cli.api_base)?;

    match cli.command() {
        Command::Run => {
            tracing_sub::init(cli.log_file.as_deref(), &cli.log_level)?;
            app::run(store, api, runtime.handle().clone(), cli.tick())
        }
        command => {
            tracing_sub::init_stderr(&cli.log_level);
            let mut auth = AuthSession::restore(store, api);
            runtime.block_on(account_command(&mut auth, command))
        }
    }
}

async fn account_command<S: KeyValueStore>(
    auth: &mut AuthSession<S>,
    command: Command,
) -> Result<(), AppError> {
    match command {
        Command::Run => {}
        Command::Login { username, password } => {
            auth.login(&username, &password).await?;
            println!("Signed in as {username}");
        }
        Command::Register {
            username,
            email,
            password,
        } => {
            auth.register(&username, &email, &password).await?;
            println!("Registered and signed in as {username}");
        }
        Command::Logout => {
            auth.logout().await;
            println!("Signed out");
        }
        Command::Whoami => match auth.user() {
            Some(name) => println!("{name}"),
            None => println!("guest"),
        },
    }
    Ok(())
}
