use crate::cli::actions::{server, Action};
use crate::docsgate::session::DEFAULT_TIMEOUT_SECONDS;
use anyhow::Result;

pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    Ok(Action::Server(server::Args {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        auth_url: matches
            .get_one("auth-url")
            .map(|s: &String| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("missing required argument: --auth-url"))?,
        api_url: matches
            .get_one("api-url")
            .map(|s: &String| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("missing required argument: --api-url"))?,
        timeout: matches
            .get_one::<u64>("timeout")
            .copied()
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;

    #[test]
    fn test_handler_builds_server_action() {
        let matches = commands::new().get_matches_from(vec![
            "docsgate",
            "--port",
            "9090",
            "--auth-url",
            "http://auth:8001/api/v1",
            "--api-url",
            "http://docs:8000",
            "--timeout",
            "3",
        ]);

        let Action::Server(args) = handler(&matches).unwrap();

        assert_eq!(args.port, 9090);
        assert_eq!(args.auth_url, "http://auth:8001/api/v1");
        assert_eq!(args.api_url, "http://docs:8000");
        assert_eq!(args.timeout, 3);
    }
}
