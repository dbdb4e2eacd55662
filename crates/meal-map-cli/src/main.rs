use std::process::ExitCode;

mod device;
mod driver;
mod logging;
mod settings;

fn main() -> ExitCode {
    logging::setup_logging();
    let settings = settings::Settings::from_cli();

    // One thread: the session is driven by a single event loop
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to build the async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let report = match runtime.block_on(driver::run(&settings)) {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let json = if settings.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    };
    match json {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Failed to encode the report: {e}");
            ExitCode::FAILURE
        }
    }
}
