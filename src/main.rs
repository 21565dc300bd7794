use std::io::Write;
use std::path::PathBuf;

use adb_wifi_push::adb::{
    AdbError, AlwaysConfirm, Confirm, ConnectionManager, Endpoint, PromptConfirm, PushOutcome,
    PushResult, Pusher, SystemAdb,
};
use adb_wifi_push::args::{Args, Mode};
use adb_wifi_push::config::Config;

fn main() {
    env_logger::init();

    let Some(args) = Args::parse() else {
        return;
    };

    let rt = tokio::runtime::Runtime::new().expect("Failed to start tokio runtime");
    let code = rt.block_on(run(args));
    std::process::exit(code);
}

async fn run(args: Args) -> i32 {
    let config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {e}");
            return 2;
        }
    };

    let endpoint_spec = args.device.clone().or_else(|| config.address.clone());
    let endpoint = match endpoint_spec.as_deref().map(|s| Endpoint::parse(s, config.port)) {
        Some(Ok(endpoint)) => endpoint,
        Some(Err(e)) => {
            eprintln!("❌ {e}");
            return 2;
        }
        None => {
            eprintln!("❌ No device address given (use --device=<addr> or set 'address' in the config file)");
            return 2;
        }
    };

    let runner = SystemAdb;
    let manager = ConnectionManager::new(&runner);
    match manager.ensure_connected(&endpoint).await {
        Ok(true) => log::info!("Connected to {endpoint}"),
        Ok(false) => {
            eprintln!("❌ {}", AdbError::ConnectionFailed { endpoint });
            return 2;
        }
        Err(e) => {
            eprintln!("❌ {e}");
            return 2;
        }
    }

    match &args.mode {
        Mode::Read(remote) => match manager.read_remote_file(remote).await {
            Ok(bytes) => {
                if std::io::stdout().write_all(&bytes).is_err() {
                    return 1;
                }
                0
            }
            Err(e) => {
                eprintln!("❌ {e}");
                1
            }
        },
        Mode::Push => {
            let destination = args
                .dest
                .clone()
                .unwrap_or_else(|| config.destination.clone());
            let confirm: &dyn Confirm = if args.confirm_each {
                &PromptConfirm
            } else {
                &AlwaysConfirm
            };
            let pusher = Pusher::new(&runner, confirm, args.quiet, !args.no_summary);

            let quiet = args.quiet;
            let items: Box<dyn Iterator<Item = PathBuf>> = if args.from_stdin {
                Box::new(
                    std::io::stdin()
                        .lines()
                        .map_while(Result::ok)
                        .filter(|line| !line.trim().is_empty())
                        .map(PathBuf::from),
                )
            } else {
                Box::new(args.files.clone().into_iter())
            };

            let results = pusher
                .push_all(items, &destination, |result| report(result, quiet))
                .await;

            // Skips alone are not an overall failure.
            if results.iter().any(PushResult::failed) { 1 } else { 0 }
        }
    }
}

fn report(result: &PushResult, quiet: bool) {
    match &result.outcome {
        PushOutcome::Succeeded { remote_path } => {
            if !quiet {
                println!("✅ {} -> {remote_path}", result.source.display());
            }
        }
        PushOutcome::Failed { detail } => {
            eprintln!("❌ {}: {detail}", result.source.display());
        }
        PushOutcome::Skipped => {
            eprintln!("⚠️ {} skipped", result.source.display());
        }
    }
}
