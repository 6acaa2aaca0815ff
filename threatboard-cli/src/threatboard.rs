use clap::{Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;
use threatboard::config::{DEFAULT_DEV_PORT, DevServerConfig};
use threatboard::models::{DEFAULT_SCRAPE_INTERVAL, IocQuery, NewSource, SessionQuery, SourceUpdate};
use threatboard::{ApiClient, ApiError, ApiResponse};

mod serve;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
const DEFAULT_CLI_API_URL: &str = "http://localhost:5000/api";

#[derive(Debug, Parser)]
#[command(
    name = "threatboard",
    about = "Serve the threatboard dashboard, or talk to its backend from the terminal.",
    version = VERSION,
    author = AUTHOR,
)]
struct Cli {
    /// Base URL of the backend API.
    #[arg(long, global = true, env = "THREATBOARD_API_URL", default_value = DEFAULT_CLI_API_URL)]
    api_url: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Serve the built dashboard and proxy /api to the backend.
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        host: IpAddr,
        #[arg(short, long, default_value_t = DEFAULT_DEV_PORT)]
        port: u16,
        /// Directory holding the built dashboard.
        #[arg(long, default_value = "dist")]
        dist: PathBuf,
        /// Origin the /api proxy forwards to. Defaults to $THREATBOARD_API_URL,
        /// then http://localhost:5000.
        #[arg(long)]
        backend: Option<String>,
        /// Verify the backend's TLS certificate.
        #[arg(long)]
        verify_tls: bool,
    },
    Health,
    Sources,
    AddSource {
        #[arg(long)]
        url: String,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        inactive: bool,
        /// Scrape interval in seconds.
        #[arg(long, default_value_t = DEFAULT_SCRAPE_INTERVAL)]
        interval: u32,
    },
    UpdateSource {
        id: u64,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        active: Option<bool>,
        #[arg(long)]
        interval: Option<u32>,
    },
    DeleteSource {
        id: u64,
    },
    /// Scrape a single URL right away.
    Scrape {
        url: String,
        #[arg(long)]
        include_private_ips: bool,
    },
    ScrapeSource {
        id: u64,
    },
    Iocs {
        #[arg(long = "type")]
        ioc_type: Option<String>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        per_page: Option<u32>,
    },
    Stats,
    Sessions {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        per_page: Option<u32>,
    },
    SessionIocs {
        id: u64,
    },
}

async fn execute(client: &ApiClient, command: Commands) -> Result<ApiResponse, ApiError> {
    match command {
        Commands::Health => client.health_check().await,
        Commands::Sources => client.get_sources().await,
        Commands::AddSource {
            url,
            name,
            description,
            inactive,
            interval,
        } => {
            let source = NewSource {
                url,
                name,
                description,
                active: !inactive,
                scrape_interval: interval,
            };
            client.create_source(&source).await
        }
        Commands::UpdateSource {
            id,
            url,
            name,
            description,
            active,
            interval,
        } => {
            let update = SourceUpdate {
                url,
                name,
                description,
                active,
                scrape_interval: interval,
            };
            client.update_source(id, &update).await
        }
        Commands::DeleteSource { id } => client.delete_source(id).await,
        Commands::Scrape {
            url,
            include_private_ips,
        } => client.scrape_adhoc(&url, Some(include_private_ips)).await,
        Commands::ScrapeSource { id } => client.scrape_source(id).await,
        Commands::Iocs {
            ioc_type,
            search,
            page,
            per_page,
        } => {
            let query = IocQuery {
                page,
                per_page,
                ioc_type,
                search,
            };
            client.get_iocs(&query).await
        }
        Commands::Stats => client.get_ioc_stats().await,
        Commands::Sessions { page, per_page } => {
            client.get_sessions(&SessionQuery { page, per_page }).await
        }
        Commands::SessionIocs { id } => client.get_session_iocs(id).await,
        Commands::Serve { .. } => Err(ApiError::InvalidArgument("serve is not an API call")),
    }
}

/// Applies the `serve` flags on top of the environment derived config.
fn serve_config(
    mut config: DevServerConfig,
    host: IpAddr,
    port: u16,
    backend: Option<String>,
    verify_tls: bool,
) -> DevServerConfig {
    config.host = host;
    config.port = port;
    if let Some(backend) = backend {
        config.proxy.target = backend;
    }
    config.proxy.secure = verify_tls;
    config
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let args = Cli::parse();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    match args.command {
        Commands::Serve {
            host,
            port,
            dist,
            backend,
            verify_tls,
        } => {
            let config = serve_config(DevServerConfig::from_env(), host, port, backend, verify_tls);
            runtime.block_on(serve::serve(config, dist))
        }
        command => {
            let client = ApiClient::new(args.api_url);
            let response = runtime.block_on(execute(&client, command))?;
            if !response.data.is_null() {
                println!("{}", serde_json::to_string_pretty(&response.data)?);
            } else {
                println!("{}", response.status);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_defaults_to_all_interfaces() {
        let cli = Cli::try_parse_from(["threatboard", "serve"]).unwrap();
        match cli.command {
            Commands::Serve { host, port, dist, .. } => {
                assert_eq!(host.to_string(), "0.0.0.0");
                assert_eq!(port, 8080);
                assert_eq!(dist, PathBuf::from("dist"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn serve_config_prefers_flag_over_environment() {
        let host: IpAddr = "127.0.0.1".parse().unwrap();
        let env = || DevServerConfig::from_lookup(|_| Some("http://intel.internal:5000".into()));

        let config = serve_config(env(), host, 9000, None, false);
        assert_eq!(config.bind_addr().to_string(), "127.0.0.1:9000");
        assert_eq!(config.proxy.target, "http://intel.internal:5000");
        assert!(!config.proxy.secure);

        let config = serve_config(env(), host, 9000, Some("https://other:8443".into()), true);
        assert_eq!(config.proxy.target, "https://other:8443");
        assert!(config.proxy.secure);

        let config = serve_config(DevServerConfig::default(), host, 9000, None, false);
        assert_eq!(config.proxy.target, "http://localhost:5000");
    }

    #[test]
    fn ioc_filters_parse() {
        let cli =
            Cli::try_parse_from(["threatboard", "iocs", "--type", "ip_address", "--page", "2"])
                .unwrap();
        match cli.command {
            Commands::Iocs { ioc_type, page, search, .. } => {
                assert_eq!(ioc_type.as_deref(), Some("ip_address"));
                assert_eq!(page, Some(2));
                assert_eq!(search, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
