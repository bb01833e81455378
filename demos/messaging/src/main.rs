use std::process::ExitCode;

use httprule::GeneratorOptions;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Print the routes of the bundled protos as JSON.
///
/// The first argument is read as the plugin parameter, e.g.
/// `unsupported_query_fields=skip`.
fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let parameter = std::env::args().nth(1).unwrap_or_default();

    let routes = parameter
        .parse::<GeneratorOptions>()
        .and_then(messaging_demo::generate_routes);

    match routes {
        Ok(routes) => match serde_json::to_string_pretty(&routes) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(err) => {
                error!(error = %err, "failed to serialize routes");
                ExitCode::FAILURE
            }
        },
        Err(err) => {
            error!(error = %err, "route generation failed");
            ExitCode::FAILURE
        }
    }
}
